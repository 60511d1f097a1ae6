//! Core types

pub mod config;


pub use config::{ReceiverConfig, ReceiverConfigBuilder, SenderConfig, SenderConfigBuilder};
