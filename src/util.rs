//! Utility functions for IRC protocol handling.
//!
//! This module provides helpers commonly needed when working with IRC
//! messages: safe string truncation, outbound message wrapping and the
//! opaque keys used by CTCP PING.

/// Truncates a string to at most `max_bytes` bytes without breaking a
/// multi-byte UTF-8 codepoint at the end.
///
/// Essential when working against byte-counted IRC line limits; naively
/// cutting at a byte boundary could produce invalid UTF-8.
///
/// # Examples
///
/// ```
/// use irc_engine::util::truncate_utf8_safe;
///
/// assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
/// assert_eq!(truncate_utf8_safe("héllo", 2), "h"); // no split codepoint
/// assert_eq!(truncate_utf8_safe("hi", 10), "hi");
/// ```
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Split a message into lines of at most `width` bytes.
///
/// Newlines always break; runs of whitespace collapse to single spaces;
/// white-space near the limit is preferred as a breaking point and words
/// longer than the whole width are hard-split. Empty lines produce no
/// output.
pub fn split_message(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        wrap_line(line.trim_end_matches('\r'), width, &mut out);
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let width = width.max(1);
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word;
        while word.len() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let mut head = truncate_utf8_safe(word, width);
            if head.is_empty() {
                // A codepoint wider than the budget still has to move.
                let first = word.chars().next().map(char::len_utf8).unwrap_or(1);
                head = &word[..first];
            }
            out.push(head.to_string());
            word = &word[head.len()..];
        }
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

/// Generate an opaque 12-character key for a CTCP PING query.
///
/// Drawn from the printable ASCII range; backslashes are avoided so the
/// key survives X-level quoting unchanged.
pub(crate) fn ping_key() -> String {
    let mut bytes = [0u8; 12];
    if getrandom::getrandom(&mut bytes).is_err() {
        // An unlikely entropy failure still needs a usable key.
        bytes = *b"000000000000";
    }
    bytes
        .iter()
        .map(|&b| {
            let ch = b'!' + (b % 94);
            if ch == b'\\' {
                '|'
            } else {
                char::from(ch)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
        assert_eq!(truncate_utf8_safe("hi", 10), "hi");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        let s = "Hello 👋 World";
        assert_eq!(truncate_utf8_safe(s, 8), "Hello ");
    }

    #[test]
    fn test_split_prefers_whitespace() {
        let chunks = split_message("the quick brown fox", 10);
        assert_eq!(chunks, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_split_breaks_on_newlines() {
        let chunks = split_message("one\ntwo three", 80);
        assert_eq!(chunks, vec!["one", "two three"]);
    }

    #[test]
    fn test_split_hard_breaks_long_words() {
        let chunks = split_message(&"a".repeat(1000), 187);
        assert_eq!(chunks.len(), 6);
        assert!(chunks.iter().all(|c| c.len() <= 187));
        assert_eq!(chunks.iter().map(String::len).sum::<usize>(), 1000);
    }

    #[test]
    fn test_split_skips_empty_lines() {
        let chunks = split_message("a\n\nb", 80);
        assert_eq!(chunks, vec!["a", "b"]);
    }

    #[test]
    fn test_split_collapses_whitespace_runs() {
        let chunks = split_message("a   b", 80);
        assert_eq!(chunks, vec!["a b"]);
    }

    #[test]
    fn test_ping_key_shape() {
        let key = ping_key();
        assert_eq!(key.chars().count(), 12);
        assert!(key.chars().all(|c| c.is_ascii_graphic()));
        assert!(!key.contains('\\'));
    }
}
