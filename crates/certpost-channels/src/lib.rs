//! # Certpost Channels
//! Outbound delivery channel implementations.

pub mod email;

pub use email::SmtpMailer;
