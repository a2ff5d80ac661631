//! Host-facing bindings for StudyVault core.

pub mod api;
