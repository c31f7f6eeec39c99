//! MODE change-string parsing.
//!
//! A MODE line like `+o-v alice bob` is decoded into two lists of
//! `(letter, parameter)` changes, one for modes added and one for modes
//! removed. Which letters consume a parameter depends on the direction
//! and on server capabilities, so the caller supplies the per-direction
//! parameter sets (derived from ISUPPORT `PREFIX` and `CHANMODES`).

use crate::error::ModeParseError;

/// One mode change: the mode letter and its parameter, if it took one.
pub type ModeChange = (char, Option<Vec<u8>>);

/// Parse an IRC mode string.
///
/// `modes` must begin with `+` or `-`; each sign toggles direction and
/// must introduce at least one letter. `param_modes` is the pair of
/// letter sets that consume a parameter `(when set, when cleared)`.
/// Every entry of `params` must be consumed, exactly.
pub fn parse_modes(
    modes: &str,
    params: &[Vec<u8>],
    param_modes: (&str, &str),
) -> Result<(Vec<ModeChange>, Vec<ModeChange>), ModeParseError> {
    if modes.is_empty() {
        return Err(ModeParseError::EmptyModeString);
    }
    if !modes.starts_with(['+', '-']) {
        return Err(ModeParseError::Malformed {
            modes: modes.to_string(),
        });
    }

    let mut added: Vec<ModeChange> = Vec::new();
    let mut removed: Vec<ModeChange> = Vec::new();
    let mut params = params.iter();

    let mut adding = true;
    let mut run_len = -1i32;
    for ch in modes.chars() {
        match ch {
            '+' | '-' => {
                if run_len == 0 {
                    return Err(ModeParseError::EmptySequence {
                        modes: modes.to_string(),
                    });
                }
                adding = ch == '+';
                run_len = 0;
            }
            _ => {
                let takes_param = if adding {
                    param_modes.0.contains(ch)
                } else {
                    param_modes.1.contains(ch)
                };
                let param = if takes_param {
                    match params.next() {
                        Some(param) => Some(param.clone()),
                        None => {
                            return Err(ModeParseError::NotEnoughParameters { mode: ch });
                        }
                    }
                } else {
                    None
                };
                if adding {
                    added.push((ch, param));
                } else {
                    removed.push((ch, param));
                }
                run_len += 1;
            }
        }
    }

    let remaining = params.count();
    if remaining > 0 {
        return Err(ModeParseError::TooManyParameters {
            modes: modes.to_string(),
            remaining,
        });
    }
    if run_len == 0 {
        return Err(ModeParseError::EmptySequence {
            modes: modes.to_string(),
        });
    }

    Ok((added, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(params: &[&str]) -> Vec<Vec<u8>> {
        params.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_all_added_with_params() {
        let (added, removed) =
            parse_modes("+ooo", &args(&["a", "b", "c"]), ("o", "o")).unwrap();
        assert_eq!(
            added,
            vec![
                ('o', Some(b"a".to_vec())),
                ('o', Some(b"b".to_vec())),
                ('o', Some(b"c".to_vec())),
            ]
        );
        assert!(removed.is_empty());
    }

    #[test]
    fn test_mixed_directions() {
        let (added, removed) =
            parse_modes("+o-v", &args(&["a", "b"]), ("ov", "ov")).unwrap();
        assert_eq!(added, vec![('o', Some(b"a".to_vec()))]);
        assert_eq!(removed, vec![('v', Some(b"b".to_vec()))]);
    }

    #[test]
    fn test_paramless_modes() {
        let (added, removed) = parse_modes("+n-i", &[], ("", "")).unwrap();
        assert_eq!(added, vec![('n', None)]);
        assert_eq!(removed, vec![('i', None)]);
    }

    #[test]
    fn test_set_only_param_direction() {
        // 'k' takes a parameter when set but not when cleared.
        let (added, removed) =
            parse_modes("+k-k", &args(&["secret"]), ("k", "")).unwrap();
        assert_eq!(added, vec![('k', Some(b"secret".to_vec()))]);
        assert_eq!(removed, vec![('k', None)]);
    }

    #[test]
    fn test_empty_mode_string() {
        assert_eq!(
            parse_modes("", &[], ("", "")),
            Err(ModeParseError::EmptyModeString)
        );
    }

    #[test]
    fn test_missing_leading_sign() {
        assert!(matches!(
            parse_modes("ov", &[], ("", "")),
            Err(ModeParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_consecutive_signs() {
        assert!(matches!(
            parse_modes("+-o", &args(&["a"]), ("o", "o")),
            Err(ModeParseError::EmptySequence { .. })
        ));
    }

    #[test]
    fn test_trailing_sign() {
        assert!(matches!(
            parse_modes("+o-", &args(&["a"]), ("o", "o")),
            Err(ModeParseError::EmptySequence { .. })
        ));
    }

    #[test]
    fn test_not_enough_parameters() {
        assert_eq!(
            parse_modes("+oo", &args(&["a"]), ("o", "o")),
            Err(ModeParseError::NotEnoughParameters { mode: 'o' })
        );
    }

    #[test]
    fn test_too_many_parameters() {
        assert!(matches!(
            parse_modes("+n", &args(&["stray"]), ("", "")),
            Err(ModeParseError::TooManyParameters { remaining: 1, .. })
        ));
    }
}
