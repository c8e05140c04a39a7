//! Command implementations.

pub(crate) mod ports;
pub(crate) mod show_config;
