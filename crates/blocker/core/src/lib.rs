//! Block App Core
//!
//! Domain types and pure logic for foreground-app blocking: the persisted
//! block list, the foreground monitor state machine, and the overlay
//! controller. Platform access is injected through the traits defined here.

mod app;
mod blocklist;
mod catalog;
mod monitor;
mod overlay;
mod permissions;
mod usage;

pub use app::*;
pub use blocklist::*;
pub use catalog::*;
pub use monitor::*;
pub use overlay::*;
pub use permissions::*;
pub use usage::*;
