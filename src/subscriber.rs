//! Inbound sample handling and latency reporting.

use std::sync::Arc;

use crate::bus::Subscription;
use crate::clock::unix_millis;
use crate::codec;
use crate::shutdown::ShutdownSignal;

/// Per-message capability invoked for every delivered payload.
///
/// The bus gives no ordering guarantee across deliveries and may
/// invoke the handler concurrently; implementations must tolerate
/// concurrent, repeated invocation.
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, payload: &[u8]);
}

/// Stateless handler that reports one latency observation per message.
///
/// The observation is receive time minus the embedded send time, in
/// milliseconds. It can be negative when publisher and subscriber run
/// on unsynchronized clocks; the value is reported as observed, not
/// corrected.
pub struct LatencySampler;

impl MessageHandler for LatencySampler {
    fn on_message(&self, payload: &[u8]) {
        let received_at = unix_millis();
        match codec::decode(payload) {
            Ok(sent_at) => {
                let diff = latency_millis(sent_at, received_at);
                if diff < 0 {
                    log::warn!(
                        "---> received ( {} ) sent ( {} ) - diff {} ms (clocks look unsynchronized)",
                        received_at,
                        sent_at,
                        diff
                    );
                } else {
                    log::info!(
                        "---> received ( {} ) sent ( {} ) - diff {} ms",
                        received_at,
                        sent_at,
                        diff
                    );
                }
            }
            // Malformed payload: drop the observation, keep the
            // subscription alive.
            Err(e) => log::warn!("dropping malformed sample: {}", e),
        }
    }
}

/// Receive-minus-send difference in milliseconds.
pub fn latency_millis(sent_at_millis: u64, received_at_millis: u64) -> i64 {
    received_at_millis as i64 - sent_at_millis as i64
}

/// Drains `subscription`, invoking `handler` once per delivered
/// payload, until the shutdown event fires or the bus closes the
/// subscription.
pub async fn run(
    mut subscription: Box<dyn Subscription>,
    handler: Arc<dyn MessageHandler>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::info!("shutdown observed, stopping subscriber");
                return;
            }

            delivery = subscription.next() => {
                match delivery {
                    Some(payload) => handler.on_message(&payload),
                    None => {
                        log::warn!("subscription closed by the bus");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    #[test]
    fn latency_computation_test() {
        assert_eq!(latency_millis(1000, 1042), 42);
    }

    #[test]
    fn latency_preserves_clock_skew_test() {
        // Subscriber clock behind the publisher clock.
        assert_eq!(latency_millis(2000, 1970), -30);
    }

    #[test]
    fn malformed_payload_does_not_panic_test() {
        let sampler = LatencySampler;
        sampler.on_message(&[]);
        sampler.on_message(&[1, 2, 3]);
        // Handler stays usable after a decode failure.
        sampler.on_message(&codec::encode(1000));
    }

    /// Handler that decodes and records every delivered timestamp.
    struct RecordingHandler {
        seen: Mutex<Vec<u64>>,
    }

    impl MessageHandler for RecordingHandler {
        fn on_message(&self, payload: &[u8]) {
            if let Ok(sent_at) = codec::decode(payload) {
                self.seen.lock().unwrap().push(sent_at);
            }
        }
    }

    #[test]
    fn concurrent_invocations_stay_independent_test() {
        const N: u64 = 64;
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });

        let workers: Vec<_> = (0..N)
            .map(|i| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    let payload = codec::encode(1_000_000 + i);
                    handler.on_message(&payload);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut seen = handler.seen.lock().unwrap().clone();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..N).map(|i| 1_000_000 + i).collect();
        assert_eq!(seen, expected, "observations were lost or cross-contaminated");
    }
}
