//! LINE relay core library: configuration, Messaging API client, webhook parsing and the
//! HTTP gateway used by the CLI.

pub mod config;
pub mod gateway;
pub mod line;
