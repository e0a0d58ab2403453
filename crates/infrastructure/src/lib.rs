//! k8sdns Infrastructure Layer
pub mod dns;
pub mod watch;
