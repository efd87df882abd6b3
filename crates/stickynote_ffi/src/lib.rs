//! Flutter-facing bindings for the StickyNote core.

pub mod api;
