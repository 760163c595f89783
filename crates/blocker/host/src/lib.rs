//! Block App Host
//!
//! Desktop host for the app blocker: platform backends for macOS and the
//! configuration the `blocker-host` binary starts from.

pub mod catalog;
pub mod config;
pub mod frontmost;
pub mod overlay;
pub mod permissions;
