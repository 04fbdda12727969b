//! Health logging helper: standard log output plus a health_events row.

use crate::db::Database;

/// Log a message and mirror it into the health_events side-table. A failed
/// insert only degrades to plain logging.
pub fn record_health_event(db: &Database, level: log::Level, component: &str, message: &str) {
    log::log!(level, "[{}] {}", component, message);
    if let Err(e) = db.insert_health_event(level.as_str(), component, message) {
        log::warn!("Failed to record health event: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_into_side_table() {
        let db = Database::new(":memory:").unwrap();
        record_health_event(&db, log::Level::Info, "server", "started");

        let events = db.recent_health_events(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, "INFO");
        assert_eq!(events[0].message, "started");
    }
}
