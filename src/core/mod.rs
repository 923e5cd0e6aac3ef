//! Fundamental building blocks: state, errors, config, logging.

pub mod config;
pub mod error;
pub mod logging;
pub mod state;
