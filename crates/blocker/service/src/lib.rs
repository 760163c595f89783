//! Block App Service
//!
//! The background blocking service: a fixed-interval foreground poll that
//! feeds an ordered overlay action queue, and a supervisor that starts and
//! stops it on request.

mod queue;
mod service;
mod supervisor;

pub use queue::*;
pub use service::*;
pub use supervisor::*;

#[cfg(test)]
mod testing;
