//! Database models.

use diesel::prelude::*;

use crate::schema::blocked_apps;

/// New blocked app for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blocked_apps)]
pub struct NewBlockedApp<'a> {
    pub app_id: &'a str,
}
