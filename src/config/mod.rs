//! Client configuration

mod config;

pub use config::{ClientConfig, CONFIG_ENV, USER_AGENT_STRING};
