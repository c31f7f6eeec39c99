//! Named-signal event bus.
//!
//! Signals are named emitters cached per bus. Receivers register once per
//! `(receiver, sender)` pair and are invoked concurrently on every
//! emission; the emitter waits for all of them (a barrier) but their
//! relative order is undefined. A receiver that panics is logged and
//! never interrupts its siblings or the emitter.
//!
//! The bus is a per-engine registry rather than process-global state;
//! each [`crate::session::Session`] holds one (possibly shared) handle.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::Semaphore;
use tracing::error;

use crate::event::Event;

/// Identifies the session emitting an event.
pub type EmitterId = u64;

/// A registered receiver: an async callback taking the emitter id and the
/// event payload.
pub type Receiver = Arc<dyn Fn(EmitterId, Arc<Event>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Upper bound on concurrently running receiver invocations per bus.
const DELIVERY_POOL_SIZE: usize = 500;

/// Wrap an async closure into a [`Receiver`].
///
/// Registration identity is the returned `Arc`: connecting the same
/// `Arc` (clones included) twice is a no-op, while two separate
/// `receiver(..)` calls with identical code are distinct receivers.
pub fn receiver<F, Fut>(f: F) -> Receiver
where
    F: Fn(EmitterId, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |id, event| -> BoxFuture<'static, ()> { Box::pin(f(id, event)) })
}

/// A named emitter with its receiver set.
pub struct Signal {
    name: String,
    pool: Arc<Semaphore>,
    receivers: Mutex<Vec<(Receiver, Option<EmitterId>)>>,
}

impl Signal {
    fn new(name: String, pool: Arc<Semaphore>) -> Signal {
        Signal {
            name,
            pool,
            receivers: Mutex::new(Vec::new()),
        }
    }

    /// The signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a receiver for every sender.
    pub fn connect(&self, receiver: Receiver) {
        self.connect_for(receiver, None);
    }

    /// Register a receiver, optionally scoped to a single sender.
    ///
    /// A `(receiver, sender)` pair already present is left alone, so a
    /// double connect results in a single invocation per emission.
    pub fn connect_for(&self, receiver: Receiver, sender: Option<EmitterId>) {
        let mut receivers = self.receivers.lock().expect("receiver set poisoned");
        let key = receiver_key(&receiver);
        let registered = receivers
            .iter()
            .any(|(other, scope)| receiver_key(other) == key && *scope == sender);
        if !registered {
            receivers.push((receiver, sender));
        }
    }

    /// Emit this signal on behalf of `sender`.
    ///
    /// Every receiver registered for any sender, or for this one, is
    /// scheduled on its own task; the call returns once all of them have
    /// finished. Receiver panics are logged and swallowed.
    pub async fn send(&self, sender: EmitterId, event: Event) {
        let event = Arc::new(event);
        let matching: Vec<Receiver> = {
            let receivers = self.receivers.lock().expect("receiver set poisoned");
            receivers
                .iter()
                .filter(|(_, scope)| scope.is_none() || *scope == Some(sender))
                .map(|(receiver, _)| receiver.clone())
                .collect()
        };
        if matching.is_empty() {
            return;
        }

        let mut tasks = Vec::with_capacity(matching.len());
        for receiver in matching {
            let permit = match self.pool.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let event = Arc::clone(&event);
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                receiver(sender, event).await;
            }));
        }

        for task in tasks {
            if let Err(err) = task.await {
                if err.is_panic() {
                    error!(signal = %self.name, "receiver panicked: {}", err);
                }
            }
        }
    }
}

fn receiver_key(receiver: &Receiver) -> usize {
    Arc::as_ptr(receiver) as *const () as usize
}

/// A registry of named signals.
///
/// Repeated [`SignalBus::signal`] calls with the same name return the
/// same emitter.
pub struct SignalBus {
    pool: Arc<Semaphore>,
    signals: Mutex<HashMap<String, Arc<Signal>>>,
}

impl Default for SignalBus {
    fn default() -> Self {
        SignalBus {
            pool: Arc::new(Semaphore::new(DELIVERY_POOL_SIZE)),
            signals: Mutex::new(HashMap::new()),
        }
    }
}

impl SignalBus {
    /// Create an empty bus.
    pub fn new() -> SignalBus {
        SignalBus::default()
    }

    /// Return the signal `name`, creating it if required.
    pub fn signal(&self, name: &str) -> Arc<Signal> {
        let mut signals = self.signals.lock().expect("signal registry poisoned");
        match signals.get(name) {
            Some(signal) => Arc::clone(signal),
            None => {
                let signal = Arc::new(Signal::new(name.to_string(), Arc::clone(&self.pool)));
                signals.insert(name.to_string(), Arc::clone(&signal));
                signal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_receiver(counter: Arc<AtomicUsize>) -> Receiver {
        receiver(move |_, _| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn test_signal_is_cached_by_name() {
        let bus = SignalBus::new();
        let a = bus.signal("on-privmsg");
        let b = bus.signal("on-privmsg");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_duplicate_connect_invokes_once() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-signed-on");
        let counter = Arc::new(AtomicUsize::new(0));
        let recv = counting_receiver(Arc::clone(&counter));
        signal.connect(Arc::clone(&recv));
        signal.connect(recv);

        signal.send(1, Event::SignedOn).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_receiver_distinct_senders() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-signed-on");
        let counter = Arc::new(AtomicUsize::new(0));
        let recv = counting_receiver(Arc::clone(&counter));
        signal.connect_for(Arc::clone(&recv), Some(1));
        signal.connect_for(recv, Some(2));

        signal.send(1, Event::SignedOn).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        signal.send(2, Event::SignedOn).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sender_scoped_routing() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-joined");
        let any = Arc::new(AtomicUsize::new(0));
        let scoped = Arc::new(AtomicUsize::new(0));
        signal.connect(counting_receiver(Arc::clone(&any)));
        signal.connect_for(counting_receiver(Arc::clone(&scoped)), Some(7));

        signal
            .send(
                7,
                Event::Joined {
                    channel: "#a".to_string(),
                },
            )
            .await;
        signal
            .send(
                8,
                Event::Joined {
                    channel: "#b".to_string(),
                },
            )
            .await;

        assert_eq!(any.load(Ordering::SeqCst), 2);
        assert_eq!(scoped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_receiver_is_isolated() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-motd");
        let counter = Arc::new(AtomicUsize::new(0));
        signal.connect(receiver(|_, _| async {
            panic!("receiver blew up");
        }));
        signal.connect(counting_receiver(Arc::clone(&counter)));

        signal.send(1, Event::Motd { motd: vec![] }).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_is_a_barrier() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-left");
        let counter = Arc::new(AtomicUsize::new(0));
        let slow = Arc::clone(&counter);
        signal.connect(receiver(move |_, _| {
            let slow = Arc::clone(&slow);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                slow.fetch_add(1, Ordering::SeqCst);
            }
        }));

        signal
            .send(
                1,
                Event::Left {
                    channel: "#x".to_string(),
                },
            )
            .await;
        // The emitter only returns after the slow receiver completed.
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_receivers_run_concurrently() {
        let bus = SignalBus::new();
        let signal = bus.signal("on-topic-changed");
        let rendezvous = Arc::new(tokio::sync::Barrier::new(2));
        for _ in 0..2 {
            let rendezvous = Arc::clone(&rendezvous);
            signal.connect(receiver(move |_, _| {
                let rendezvous = Arc::clone(&rendezvous);
                async move {
                    // Both receivers must be in flight at once to pass.
                    rendezvous.wait().await;
                }
            }));
        }

        tokio::time::timeout(
            Duration::from_secs(5),
            signal.send(
                1,
                Event::TopicChanged {
                    user: crate::prefix::User::parse("a!b@c"),
                    channel: "#t".to_string(),
                    topic: "t".to_string(),
                },
            ),
        )
        .await
        .expect("receivers deadlocked instead of running concurrently");
    }
}
