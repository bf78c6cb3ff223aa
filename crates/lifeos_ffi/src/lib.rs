//! Flutter-facing bindings for Life OS core.

pub mod api;
