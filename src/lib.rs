//! buslat - one-way latency sampler for publish/subscribe buses.
//!
//! This crate provides a small CLI tool that publishes timestamped
//! samples on a fixed bus subject and/or subscribes to that subject,
//! reporting receive-minus-send latency for every delivered message.
//!
//! # Usage
//!
//! Publish and measure on the same host:
//! ```bash
//! buslat --pub --sub --creds ~/.creds/ngs.creds
//! ```
//!
//! Split roles across two hosts (the clocks must be synchronized for
//! the observations to mean anything):
//! ```bash
//! buslat --pub --creds /etc/buslat/ngs.creds
//! buslat --sub --creds /etc/buslat/ngs.creds
//! ```

/// Message bus boundary and the NATS implementation.
pub mod bus;
/// Wall-clock capture.
pub mod clock;
/// Timestamp wire encoding/decoding.
pub mod codec;
/// Command-line configuration and validation.
pub mod configuration;
/// Periodic sample publisher.
pub mod publisher;
/// Cooperative shutdown coordination.
pub mod shutdown;
/// Inbound sample handling and latency reporting.
pub mod subscriber;
