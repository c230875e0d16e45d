//! # Lenscout Common
//!
//! Building blocks shared by every crate in the workspace:
//!
//! * **[`config`]**: every tunable of a scan, loadable from the environment.
//! * **[`error`]**: configuration errors.
//! * **[`network`]**: candidate address generation, target parsing and
//!   local address detection.
//!
//! All crates log through the re-exported `tracing` macros below so the CLI
//! formatter sees one consistent vocabulary.

pub mod config;
pub mod error;
pub mod network;
pub mod utils;

pub use tracing::{debug, error, info, trace, warn};

/// Logs a positive outcome (a discovery, a finished phase).
///
/// Emitted as an `INFO` event tagged with `status = "success"`.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::info!(status = "success", $($arg)+)
    };
}
