//! Encrypted agent settings manager.
//!
//! Values marked secret are stored as an `enc:v1:<nonce>:<ciphertext>`
//! envelope (ChaCha20-Poly1305, base64) and decrypted on read. Without a
//! configured key, everything is stored plaintext and reading an envelope
//! fails with a clear error instead of returning ciphertext.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce};
use std::sync::Arc;

use crate::db::Database;
use crate::models::AgentSetting;

const ENVELOPE_PREFIX: &str = "enc:v1:";

/// True if a stored value is a cipher envelope rather than plaintext.
pub fn is_encrypted_value(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

/// Symmetric cipher for setting values. Key is 32 bytes, base64-encoded in
/// the environment.
#[derive(Clone)]
pub struct SettingsCipher {
    key: [u8; 32],
}

impl SettingsCipher {
    /// Parse a base64-encoded 32-byte key. Returns None (with a warning) on
    /// anything else, so a bad key degrades to plaintext storage rather than
    /// failing startup.
    pub fn from_encoded_key(encoded: &str) -> Option<Self> {
        match BASE64.decode(encoded.trim().as_bytes()) {
            Ok(bytes) if bytes.len() == 32 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(&bytes);
                Some(SettingsCipher { key })
            }
            Ok(bytes) => {
                log::warn!(
                    "Settings encryption key ignored: expected 32 bytes, got {}",
                    bytes.len()
                );
                None
            }
            Err(e) => {
                log::warn!("Settings encryption key ignored: invalid base64: {}", e);
                None
            }
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, String> {
        let nonce_bytes: [u8; 12] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);
        let aead = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| format!("Failed to initialize settings cipher: {}", e))?;
        let ciphertext = aead
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| format!("Failed to encrypt setting: {}", e))?;

        Ok(format!(
            "{}{}:{}",
            ENVELOPE_PREFIX,
            BASE64.encode(nonce_bytes),
            BASE64.encode(ciphertext)
        ))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, String> {
        let envelope = stored
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| "Value is not an encrypted envelope".to_string())?;

        let mut parts = envelope.split(':');
        let nonce_b64 = parts.next().unwrap_or_default();
        let ciphertext_b64 = parts.next().unwrap_or_default();
        if nonce_b64.is_empty() || ciphertext_b64.is_empty() || parts.next().is_some() {
            return Err("Setting envelope is malformed".to_string());
        }

        let nonce_raw = BASE64
            .decode(nonce_b64.as_bytes())
            .map_err(|e| format!("Failed to decode setting nonce: {}", e))?;
        if nonce_raw.len() != 12 {
            return Err("Setting nonce length is invalid".to_string());
        }
        let ciphertext = BASE64
            .decode(ciphertext_b64.as_bytes())
            .map_err(|e| format!("Failed to decode setting ciphertext: {}", e))?;

        let aead = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| format!("Failed to initialize settings cipher: {}", e))?;
        let decrypted = aead
            .decrypt(Nonce::from_slice(&nonce_raw), ciphertext.as_ref())
            .map_err(|_| "Failed to decrypt setting (wrong key?)".to_string())?;

        String::from_utf8(decrypted).map_err(|e| format!("Setting plaintext is invalid utf8: {}", e))
    }
}

/// Settings store over the agent_settings table with transparent encryption.
pub struct SettingsManager {
    db: Arc<Database>,
    cipher: Option<SettingsCipher>,
}

impl SettingsManager {
    pub fn new(db: Arc<Database>, cipher: Option<SettingsCipher>) -> Self {
        SettingsManager { db, cipher }
    }

    pub fn has_cipher(&self) -> bool {
        self.cipher.is_some()
    }

    /// Store a setting. When `secret` and a cipher is configured, the value
    /// is sealed before it hits the database.
    pub fn set(
        &self,
        agent_name: &str,
        key: &str,
        value: &str,
        secret: bool,
    ) -> Result<AgentSetting, String> {
        let (stored, encrypted) = match (&self.cipher, secret) {
            (Some(cipher), true) => (cipher.encrypt(value)?, true),
            (None, true) => {
                log::warn!(
                    "Secret setting {}/{} stored plaintext: no encryption key configured",
                    agent_name,
                    key
                );
                (value.to_string(), false)
            }
            _ => (value.to_string(), false),
        };

        self.db
            .upsert_agent_setting(agent_name, key, &stored, encrypted)
            .map_err(|e| format!("Failed to save setting: {}", e))
    }

    /// Read a setting's plaintext value.
    pub fn get(&self, agent_name: &str, key: &str) -> Result<Option<String>, String> {
        let setting = self
            .db
            .get_agent_setting(agent_name, key)
            .map_err(|e| format!("Failed to read setting: {}", e))?;

        match setting {
            Some(s) => self.reveal(&s).map(Some),
            None => Ok(None),
        }
    }

    /// List an agent's settings with values decrypted. A row that cannot be
    /// decrypted is returned with an empty value rather than failing the list.
    pub fn list(&self, agent_name: &str) -> Result<Vec<AgentSetting>, String> {
        let settings = self
            .db
            .list_agent_settings(agent_name)
            .map_err(|e| format!("Failed to list settings: {}", e))?;

        Ok(settings
            .into_iter()
            .map(|mut s| {
                match self.reveal(&s) {
                    Ok(value) => s.value = value,
                    Err(e) => {
                        log::warn!("Cannot decrypt setting {}/{}: {}", s.agent_name, s.key, e);
                        s.value = String::new();
                    }
                }
                s
            })
            .collect())
    }

    pub fn delete(&self, agent_name: &str, key: &str) -> Result<bool, String> {
        self.db
            .delete_agent_setting(agent_name, key)
            .map_err(|e| format!("Failed to delete setting: {}", e))
    }

    fn reveal(&self, setting: &AgentSetting) -> Result<String, String> {
        if !setting.encrypted && !is_encrypted_value(&setting.value) {
            return Ok(setting.value.clone());
        }
        match &self.cipher {
            Some(cipher) => cipher.decrypt(&setting.value),
            None => Err("Setting is encrypted but no decryption key is configured".to_string()),
        }
    }
}
