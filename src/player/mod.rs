//! The core of the crate: per-guild players, their queues, and the registry
//! that owns them.

pub mod guild;
pub mod registry;
pub mod song;
