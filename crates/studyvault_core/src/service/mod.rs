//! Vault services.
//!
//! # Responsibility
//! - `tree_service`: in-memory item tree and its invariants.
//! - `recent_service` / `progress_service`: recency and study bookkeeping.
//! - `vault_service`: the orchestrator composing everything with the stores.

pub mod progress_service;
pub mod recent_service;
pub mod tree_service;
pub mod vault_service;
