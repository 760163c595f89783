//! SQLite storage implementation.

use color_eyre::eyre::WrapErr as _;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;

use blocker_core::{AppId, BlockListPersistence, BlockedApps};

use crate::models::NewBlockedApp;
use crate::schema::blocked_apps;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// SQLite-based block list storage.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) the database at `database_url`.
    pub fn new(database_url: &str) -> color_eyre::eyre::Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .wrap_err("failed to create connection pool")?;

        Ok(Self { pool })
    }

    /// Run migrations.
    pub fn run_migrations(&self) -> color_eyre::eyre::Result<()> {
        use diesel_migrations::MigrationHarness as _;

        let mut conn = self
            .pool
            .get()
            .wrap_err("failed to get connection for migrations")?;

        conn.run_pending_migrations(crate::MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("migration failed: {}", e))?;

        Ok(())
    }

    fn conn(
        &self,
    ) -> color_eyre::eyre::Result<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .wrap_err("failed to get database connection")
    }
}

impl BlockListPersistence for SqliteStorage {
    fn load(&self) -> color_eyre::eyre::Result<BlockedApps> {
        let mut conn = self.conn()?;

        let ids: Vec<String> = blocked_apps::table
            .select(blocked_apps::app_id)
            .load(&mut conn)
            .wrap_err("failed to load blocked apps")?;

        Ok(ids.into_iter().map(AppId::from).collect())
    }

    fn save(&self, apps: &BlockedApps) -> color_eyre::eyre::Result<()> {
        let mut conn = self.conn()?;

        let rows: Vec<NewBlockedApp<'_>> = apps
            .iter()
            .map(|id| NewBlockedApp { app_id: id.as_str() })
            .collect();

        // Replace the whole set atomically
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(blocked_apps::table).execute(conn)?;

            if !rows.is_empty() {
                diesel::insert_into(blocked_apps::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            Ok(())
        })
        .wrap_err("failed to save blocked apps")?;

        tracing::debug!(count = rows.len(), "block list persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocker_core::BlockList;
    use std::sync::Arc;

    fn storage(dir: &tempfile::TempDir) -> SqliteStorage {
        let path = dir.path().join("block-app.db");
        let storage = SqliteStorage::new(path.to_str().unwrap()).unwrap();
        storage.run_migrations().unwrap();
        storage
    }

    #[test]
    fn test_fresh_database_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let first: BlockedApps = ["com.a".into(), "com.b".into()].into_iter().collect();
        storage.save(&first).unwrap();

        let second: BlockedApps = ["com.c".into()].into_iter().collect();
        storage.save(&second).unwrap();

        assert_eq!(storage.load().unwrap(), second);

        storage.save(&BlockedApps::new()).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_block_list_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let list = BlockList::new(Arc::new(storage(&dir)));
            list.load();
            list.add("com.x".into());
            list.add("com.y".into());
            list.remove("com.y");
        }

        let list = BlockList::new(Arc::new(storage(&dir)));
        list.load();
        assert!(list.contains("com.x"));
        assert!(!list.contains("com.y"));
    }

    #[test]
    fn test_missing_table_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unmigrated.db");
        let storage = SqliteStorage::new(path.to_str().unwrap()).unwrap();

        assert!(storage.load().is_err());

        let list = BlockList::new(Arc::new(storage));
        list.load();
        assert!(list.is_empty());
    }
}
