//! User record operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::User;

impl Database {
    /// Create the user row for a wallet if it doesn't exist yet, and attach
    /// any platform IDs seen on this contact. Idempotent: repeated calls for
    /// the same wallet return the existing row. Platform IDs are only filled
    /// in, never overwritten.
    pub fn ensure_user(
        &self,
        wallet_address: &str,
        discord_id: Option<&str>,
        telegram_id: Option<&str>,
    ) -> SqliteResult<User> {
        let conn = self.conn();
        let wallet = wallet_address.to_lowercase();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (wallet_address, discord_id, telegram_id, subscription_tier, credit_balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'free', 0, ?4, ?4)
             ON CONFLICT(wallet_address) DO UPDATE SET
                discord_id = COALESCE(discord_id, excluded.discord_id),
                telegram_id = COALESCE(telegram_id, excluded.telegram_id),
                updated_at = excluded.updated_at",
            rusqlite::params![wallet, discord_id, telegram_id, now],
        )?;

        drop(conn);
        self.get_user(&wallet).map(|opt| opt.unwrap())
    }

    pub fn get_user(&self, wallet_address: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let wallet = wallet_address.to_lowercase();

        let mut stmt = conn.prepare(
            "SELECT id, wallet_address, discord_id, telegram_id, subscription_tier, credit_balance, created_at, updated_at
             FROM users WHERE wallet_address = ?1",
        )?;

        let user = stmt.query_row([&wallet], Self::row_to_user).ok();
        Ok(user)
    }

    pub fn list_users(&self) -> SqliteResult<Vec<User>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            "SELECT id, wallet_address, discord_id, telegram_id, subscription_tier, credit_balance, created_at, updated_at
             FROM users ORDER BY id",
        )?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(users)
    }

    /// Set a user's subscription tier. Returns the updated row, or None if
    /// the wallet has no user record.
    pub fn update_user_tier(&self, wallet_address: &str, tier: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let wallet = wallet_address.to_lowercase();
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn.execute(
            "UPDATE users SET subscription_tier = ?1, updated_at = ?2 WHERE wallet_address = ?3",
            rusqlite::params![tier, now, wallet],
        )?;

        drop(conn);
        if rows_affected == 0 {
            return Ok(None);
        }
        self.get_user(&wallet)
    }

    /// Adjust a user's credit balance by `delta` (positive or negative).
    /// Returns the updated row, or None if the wallet has no user record.
    pub fn adjust_user_credits(
        &self,
        wallet_address: &str,
        delta: i64,
    ) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let wallet = wallet_address.to_lowercase();
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn.execute(
            "UPDATE users SET credit_balance = credit_balance + ?1, updated_at = ?2 WHERE wallet_address = ?3",
            rusqlite::params![delta, now, wallet],
        )?;

        drop(conn);
        if rows_affected == 0 {
            return Ok(None);
        }
        self.get_user(&wallet)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(User {
            id: row.get(0)?,
            wallet_address: row.get(1)?,
            discord_id: row.get(2)?,
            telegram_id: row.get(3)?,
            subscription_tier: row.get(4)?,
            credit_balance: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn first_contact_creates_user_with_defaults() {
        let db = Database::new(":memory:").unwrap();

        let user = db
            .ensure_user("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B", Some("disc#1"), None)
            .unwrap();

        // Wallet is stored lowercased
        assert_eq!(user.wallet_address, "0xab5801a7d398351b8be11c439e05c5b3259aec9b");
        assert_eq!(user.subscription_tier, "free");
        assert_eq!(user.credit_balance, 0);
        assert_eq!(user.discord_id.as_deref(), Some("disc#1"));
    }

    #[test]
    fn repeat_contact_is_idempotent_and_fills_platform_ids() {
        let db = Database::new(":memory:").unwrap();

        let first = db.ensure_user("0xabc0000000000000000000000000000000000001", None, None).unwrap();
        let second = db
            .ensure_user(
                "0xABC0000000000000000000000000000000000001",
                Some("disc#2"),
                Some("tg-9"),
            )
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.discord_id.as_deref(), Some("disc#2"));
        assert_eq!(second.telegram_id.as_deref(), Some("tg-9"));

        // Existing platform IDs are not overwritten
        let third = db
            .ensure_user("0xabc0000000000000000000000000000000000001", Some("other"), None)
            .unwrap();
        assert_eq!(third.discord_id.as_deref(), Some("disc#2"));
    }

    #[test]
    fn tier_and_credit_updates() {
        let db = Database::new(":memory:").unwrap();
        db.ensure_user("0xabc0000000000000000000000000000000000002", None, None).unwrap();

        let user = db
            .update_user_tier("0xabc0000000000000000000000000000000000002", "pro")
            .unwrap()
            .unwrap();
        assert_eq!(user.subscription_tier, "pro");

        let user = db
            .adjust_user_credits("0xabc0000000000000000000000000000000000002", 50)
            .unwrap()
            .unwrap();
        assert_eq!(user.credit_balance, 50);

        let user = db
            .adjust_user_credits("0xabc0000000000000000000000000000000000002", -20)
            .unwrap()
            .unwrap();
        assert_eq!(user.credit_balance, 30);

        // Unknown wallet updates return None
        assert!(db.update_user_tier("0xdead000000000000000000000000000000000000", "pro").unwrap().is_none());
    }
}
