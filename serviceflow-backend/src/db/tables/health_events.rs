//! Health event side-table operations

use chrono::Utc;
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::HealthEvent;

impl Database {
    pub fn insert_health_event(
        &self,
        level: &str,
        component: &str,
        message: &str,
    ) -> SqliteResult<()> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO health_events (level, component, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![level, component, message, now],
        )?;
        Ok(())
    }

    /// Most recent health events, newest first.
    pub fn recent_health_events(&self, limit: i64) -> SqliteResult<Vec<HealthEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, level, component, message, created_at
             FROM health_events ORDER BY id DESC LIMIT ?1",
        )?;
        let events = stmt
            .query_map([limit], |row| {
                Ok(HealthEvent {
                    id: row.get(0)?,
                    level: row.get(1)?,
                    component: row.get(2)?,
                    message: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn records_and_lists_newest_first() {
        let db = Database::new(":memory:").unwrap();
        db.insert_health_event("info", "server", "started").unwrap();
        db.insert_health_event("warn", "rpc", "slow endpoint").unwrap();

        let events = db.recent_health_events(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].component, "rpc");
        assert_eq!(events[1].component, "server");

        let limited = db.recent_health_events(1).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
