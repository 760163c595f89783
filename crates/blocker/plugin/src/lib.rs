//! Block App Plugin
//!
//! Method-channel facade over the block list, permissions and overlay,
//! plus an axum router exposing the channels to the UI layer.

mod channel;
mod manager;
mod overlay;
mod permission;
mod plugin;
mod router;

pub use channel::*;
pub use manager::*;
pub use overlay::*;
pub use permission::*;
pub use plugin::*;
pub use router::*;

#[cfg(test)]
mod testing;
