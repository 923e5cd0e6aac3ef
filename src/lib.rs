//! LAN discovery library root
//!
//! Clients register a device under the network address they are observed
//! from, and discover the devices registered from that same address.

pub mod core;
pub mod data;
pub mod services;

pub mod build;

pub use crate::core::config::{Cli, ServerConfig};
pub use crate::core::error::{Error, Result};
pub use crate::core::state::AppState;
pub use crate::data::registry::{DeviceRecord, Registry};
pub use crate::services::router::create_router;
pub use crate::services::server::{run, run_until};

/// Prelude module that re-exports the most commonly used types and functions.
pub mod prelude {
    pub use crate::build::{get_build_info, BuildInfo};
    pub use crate::core::config::{Cli, ConfigError, ServerConfig};
    pub use crate::core::error::{Error, Result};
    pub use crate::core::logging::{init_logging, LogFormat};
    pub use crate::core::state::AppState;

    pub use crate::data::cache::{
        FileTemplateCache, InMemoryTemplates, TemplateError, TemplateResult, TemplateSource,
    };
    pub use crate::data::clock::{Clock, ManualClock, SystemClock};
    pub use crate::data::registry::{CullReport, DeviceRecord, Registry};

    pub use crate::services::client_addr::{resolve_client_addr, ClientAddr};
    pub use crate::services::culler::spawn_culler;
    pub use crate::services::handlers::{DeviceList, RegisterParams};
    pub use crate::services::listing::render_listing;
    pub use crate::services::router::create_router;
    pub use crate::services::server::{
        bind, run, run_until, serve_listener, shutdown_signal, ServeOptions, ServerError,
    };
}
