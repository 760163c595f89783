//! Diesel schema definitions.

diesel::table! {
    blocked_apps (app_id) {
        app_id -> Text,
    }
}
