use clap::{Parser, ValueEnum};
use std::fmt;
use thiserror::Error;

/// Validation errors for the command-line configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("at least one of --pub or --sub must be set")]
    NoModeSelected,
    #[error("bus credentials are required, please set --creds to the credentials path")]
    MissingCredentials,
    #[error("--interval must be at least one second")]
    ZeroInterval,
}

/// What the publisher does when a publish call fails.
///
/// The reference behavior is best-effort sampling: a transient bus
/// hiccup should not stop the loop. The policy makes that choice
/// explicit and overridable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PublishErrorPolicy {
    /// Keep sampling, discard the failure silently.
    Ignore,
    /// Keep sampling, log the failure.
    Log,
    /// Stop the publish loop and exit with an error.
    Abort,
}

impl fmt::Display for PublishErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PublishErrorPolicy::Ignore => write!(f, "ignore"),
            PublishErrorPolicy::Log => write!(f, "log"),
            PublishErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// Command-line flags; every flag can also be supplied through a
/// `BUSLAT_*` environment variable.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Configuration {
    /// Continuous publish mode
    #[clap(long = "pub", env = "BUSLAT_PUB")]
    pub publish: bool,
    /// Subscribe to the sampling subject
    #[clap(long = "sub", env = "BUSLAT_SUB")]
    pub subscribe: bool,
    /// Path to user credentials for the bus
    #[clap(long, env = "BUSLAT_CREDS", default_value = "")]
    pub creds: String,
    /// Bus server URL
    #[clap(long, env = "BUSLAT_SERVER", default_value = "nats://connect.ngs.global")]
    pub server: String,
    /// Subject samples are published to
    #[clap(long, env = "BUSLAT_SUBJECT", default_value = "sample.event")]
    pub subject: String,
    /// Seconds between samples
    #[clap(long, env = "BUSLAT_INTERVAL", default_value_t = 5)]
    pub interval: u64,
    /// Publish-failure policy for the tick loop
    #[clap(
        long,
        value_enum,
        env = "BUSLAT_ON_PUBLISH_ERROR",
        default_value_t = PublishErrorPolicy::Log
    )]
    pub on_publish_error: PublishErrorPolicy,
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.publish && !self.subscribe {
            return Err(ConfigurationError::NoModeSelected);
        }
        if self.creds.is_empty() {
            return Err(ConfigurationError::MissingCredentials);
        }
        // A zero tick period cannot drive the publish loop.
        if self.interval == 0 {
            return Err(ConfigurationError::ZeroInterval);
        }
        Ok(())
    }
}
