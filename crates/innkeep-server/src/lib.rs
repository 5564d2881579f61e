//! HTTP API for innkeep.
//!
//! Every response body is the same JSON envelope:
//!
//! ```text
//! { "success": bool, "data"?: ..., "message"?: "...", "error"?: "..." }
//! ```
//!
//! The `innkeep` binary wraps this crate with `serve`, `migrate`, `status`
//! and `seed` commands.

pub mod api;
pub mod commands;
mod state;

pub use state::{AppState, Uploads};

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// built-in default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,innkeep=debug,innkeep_server=debug,tower_http=debug"));
    fmt().with_env_filter(filter).init();
}
