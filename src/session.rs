//! Token persistence and the explicit session handed to API calls.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CobranzaError, Result};
use crate::models::Rol;

pub const TOKEN_KEY: &str = "token";

/// String-keyed persistent store
pub trait TokenStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Key-value table kept in `session.toml` inside the config directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("session.toml"),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| CobranzaError::ConfigParse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        let content = toml::to_string(entries).map_err(|e| {
            CobranzaError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Claims the client reads out of the JWT payload. Never verified locally.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Claims {
    #[serde(alias = "role")]
    pub rol: Option<Rol>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// True once `exp` (seconds since the epoch) lies in the past.
    /// Tokens without an expiry never expire locally.
    pub fn is_expired(&self, now_ts: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_ts)
    }
}

/// An authenticated session. Built once per command and passed to every
/// API call that needs a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the stored token. No token means no session.
    pub fn load(store: &dyn TokenStore) -> Result<Session> {
        match store.get(TOKEN_KEY)? {
            Some(token) if !token.trim().is_empty() => Ok(Session::new(token.trim())),
            _ => Err(CobranzaError::AuthenticationMissing),
        }
    }

    pub fn save(&self, store: &dyn TokenStore) -> Result<()> {
        store.set(TOKEN_KEY, &self.token)
    }

    pub fn clear(store: &dyn TokenStore) -> Result<()> {
        store.remove(TOKEN_KEY)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn claims(&self) -> Result<Claims> {
        let payload = self
            .token
            .split('.')
            .nth(1)
            .ok_or_else(|| CobranzaError::InvalidToken("not a JWT".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| CobranzaError::InvalidToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CobranzaError::InvalidToken(e.to_string()))
    }

    pub fn role(&self) -> Result<Rol> {
        self.claims()?
            .rol
            .ok_or_else(|| CobranzaError::InvalidToken("no role claim".to_string()))
    }

    pub fn require_admin(&self) -> Result<()> {
        match self.role()? {
            Rol::Administrador => Ok(()),
            Rol::Trabajador => Err(CobranzaError::Forbidden),
        }
    }
}

#[cfg(test)]
pub(crate) fn fake_jwt(claims_json: &str) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.firma",
        URL_SAFE_NO_PAD.encode(claims_json)
    )
}
