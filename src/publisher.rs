//! Periodic sample emission.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::bus::{BusError, MessageBus};
use crate::clock::unix_millis;
use crate::codec;
use crate::configuration::PublishErrorPolicy;
use crate::shutdown::ShutdownSignal;

/// Emits one timestamped sample to the bus per tick interval.
pub struct Publisher {
    subject: String,
    interval: Duration,
    on_publish_error: PublishErrorPolicy,
}

impl Publisher {
    pub fn new(
        subject: impl Into<String>,
        interval: Duration,
        on_publish_error: PublishErrorPolicy,
    ) -> Self {
        Self {
            subject: subject.into(),
            interval,
            on_publish_error,
        }
    }

    /// Runs the tick loop until the shutdown event fires.
    ///
    /// Each tick captures the current wall-clock time, encodes it and
    /// publishes it to the configured subject. After cancellation is
    /// observed no further ticks are processed; a publish already in
    /// flight may still be delivered.
    ///
    /// Publish failures follow the configured policy: only
    /// [`PublishErrorPolicy::Abort`] terminates the loop with an error.
    pub async fn run(
        &self,
        bus: Arc<dyn MessageBus>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), BusError> {
        let mut ticker = tokio::time::interval(self.interval);
        // interval yields its first tick immediately; consume it so
        // emission starts one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("shutdown observed, stopping publish loop");
                    return Ok(());
                }

                _ = ticker.tick() => {
                    let sent_at = unix_millis();
                    let payload = Bytes::copy_from_slice(&codec::encode(sent_at));
                    match bus.publish(&self.subject, payload).await {
                        Ok(()) => log::debug!("published sample sent ( {} )", sent_at),
                        Err(e) => match self.on_publish_error {
                            PublishErrorPolicy::Ignore => {}
                            PublishErrorPolicy::Log => {
                                log::warn!("publish failed, continuing: {}", e);
                            }
                            PublishErrorPolicy::Abort => {
                                log::error!("publish failed, aborting: {}", e);
                                return Err(e);
                            }
                        },
                    }
                }
            }
        }
    }
}
