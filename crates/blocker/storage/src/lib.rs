//! Block App Storage
//!
//! Diesel-based persistence for the block list.

mod models;
mod schema;
mod sqlite;

pub use sqlite::SqliteStorage;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
