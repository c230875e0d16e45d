//! # Lenscout Core
//!
//! The discovery engine: probes, the result session, the phased orchestrator
//! and the [`discovery::DiscoveryService`] entry point built on top of them.

pub mod discovery;
pub mod network;
pub mod scanner;
