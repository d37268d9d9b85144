//! device-link: delivery of short command strings to the card holder
//!
//! The controller firmware accepts opaque ASCII commands. This crate provides
//! the [`DeviceTransport`] trait and feature-gated backends: HTTP POST
//! (`http`), MQTT publish (`mqtt`), and a local poll/ack [`CommandMailbox`]
//! for controllers that can only poll. The default build enables a `mock`
//! backend so binaries and tests compile on any host.

mod types;
pub use types::{DeviceCommand, SentCommand, Timestamp};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::DeviceTransport;

mod mailbox;
pub use mailbox::{CommandMailbox, MailboxTransport, NO_COMMAND};

mod dry_run;
pub use dry_run::LogTransport;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::MockTransport;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "mqtt")]
mod mqtt;
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttSettings, MqttTransport};
