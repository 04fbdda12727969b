//! Agent settings database operations

use chrono::Utc;
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::AgentSetting;

impl Database {
    /// Insert or update a setting. One row per (agent_name, key).
    pub fn upsert_agent_setting(
        &self,
        agent_name: &str,
        key: &str,
        value: &str,
        encrypted: bool,
    ) -> SqliteResult<AgentSetting> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO agent_settings (agent_name, key, value, encrypted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(agent_name, key) DO UPDATE SET
                value = excluded.value,
                encrypted = excluded.encrypted,
                updated_at = excluded.updated_at",
            rusqlite::params![agent_name, key, value, encrypted as i32, now],
        )?;

        drop(conn);
        self.get_agent_setting(agent_name, key).map(|opt| opt.unwrap())
    }

    pub fn get_agent_setting(
        &self,
        agent_name: &str,
        key: &str,
    ) -> SqliteResult<Option<AgentSetting>> {
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT id, agent_name, key, value, encrypted, created_at, updated_at
             FROM agent_settings WHERE agent_name = ?1 AND key = ?2",
            [agent_name, key],
            Self::row_to_agent_setting,
        );
        match result {
            Ok(setting) => Ok(Some(setting)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_agent_settings(&self, agent_name: &str) -> SqliteResult<Vec<AgentSetting>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, agent_name, key, value, encrypted, created_at, updated_at
             FROM agent_settings WHERE agent_name = ?1 ORDER BY key",
        )?;
        let settings = stmt
            .query_map([agent_name], Self::row_to_agent_setting)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(settings)
    }

    /// Delete a setting. Returns true if a row was deleted.
    pub fn delete_agent_setting(&self, agent_name: &str, key: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM agent_settings WHERE agent_name = ?1 AND key = ?2",
            [agent_name, key],
        )?;
        Ok(rows > 0)
    }

    fn row_to_agent_setting(row: &rusqlite::Row) -> rusqlite::Result<AgentSetting> {
        Ok(AgentSetting {
            id: row.get(0)?,
            agent_name: row.get(1)?,
            key: row.get(2)?,
            value: row.get(3)?,
            encrypted: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn upsert_is_unique_per_agent_and_key() {
        let db = Database::new(":memory:").unwrap();

        db.upsert_agent_setting("concierge", "model", "kimi", false).unwrap();
        let updated = db.upsert_agent_setting("concierge", "model", "qwen", false).unwrap();
        assert_eq!(updated.value, "qwen");

        // Same key under a different agent is a separate row
        db.upsert_agent_setting("publisher", "model", "kimi", false).unwrap();

        assert_eq!(db.list_agent_settings("concierge").unwrap().len(), 1);
        assert_eq!(db.list_agent_settings("publisher").unwrap().len(), 1);
    }

    #[test]
    fn get_and_delete() {
        let db = Database::new(":memory:").unwrap();

        assert!(db.get_agent_setting("concierge", "missing").unwrap().is_none());

        db.upsert_agent_setting("concierge", "api_key", "secret", true).unwrap();
        let setting = db.get_agent_setting("concierge", "api_key").unwrap().unwrap();
        assert!(setting.encrypted);

        assert!(db.delete_agent_setting("concierge", "api_key").unwrap());
        assert!(!db.delete_agent_setting("concierge", "api_key").unwrap());
    }
}
