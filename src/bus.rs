//! Message bus boundary.
//!
//! The sampling engine talks to the bus through the [`MessageBus`] and
//! [`Subscription`] traits so that tests can substitute an in-memory
//! fabric. [`NatsBus`] is the production implementation over a core
//! NATS client.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use thiserror::Error;

/// Errors reported by the bus boundary.
#[derive(Error, Debug)]
pub enum BusError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("publish failed: {0}")]
    PublishFailed(String),
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),
    #[error("flush failed: {0}")]
    FlushFailed(String),
}

/// One registered subscription on a subject.
#[async_trait]
pub trait Subscription: Send {
    /// Next delivered payload, or `None` once the bus has closed the
    /// subscription.
    async fn next(&mut self) -> Option<Bytes>;
}

/// Publish/subscribe capability consumed by the sampling engine.
///
/// Implementations must be safe for concurrent use from the publisher
/// and subscriber tasks without external locking.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Fire-and-forget publish of `payload` to `subject`.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError>;

    /// Registers a subscription on `subject`.
    ///
    /// Registration itself may fail; per-message delivery problems do
    /// not surface here.
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, BusError>;

    /// Ensures buffered client state, including pending subscription
    /// registrations, has reached the server.
    async fn flush(&self) -> Result<(), BusError>;
}

/// Core NATS implementation of [`MessageBus`].
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connects to `server`, authenticating with the NATS credentials
    /// file at `creds_path`.
    pub async fn connect(server: &str, creds_path: &str) -> Result<Self, BusError> {
        let creds_path = std::path::PathBuf::from(creds_path);
        let client = async_nats::ConnectOptions::with_credentials_file(creds_path)
            .await
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?
            .connect(server)
            .await
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

struct NatsSubscription {
    subscriber: async_nats::Subscriber,
}

#[async_trait]
impl Subscription for NatsSubscription {
    async fn next(&mut self) -> Option<Bytes> {
        self.subscriber.next().await.map(|msg| msg.payload)
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| BusError::PublishFailed(e.to_string()))
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, BusError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::SubscribeFailed(e.to_string()))?;
        Ok(Box::new(NatsSubscription { subscriber }))
    }

    async fn flush(&self) -> Result<(), BusError> {
        self.client
            .flush()
            .await
            .map_err(|e| BusError::FlushFailed(e.to_string()))
    }
}
