//! Email delivery for two-factor codes

pub mod log_channel;

pub use log_channel::LogEmailChannel;
