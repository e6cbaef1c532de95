// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use vendorhub_app::{SettingKey, SettingValue};

pub const APP_NAME: &str = "vendorhub";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSetting {
    pub key: SettingKey,
    pub value: SettingValue,
}

/// Local preferences that outlive a session: sidebar layout and the last
/// email used to sign in. Everything else lives on the server.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        tracing::debug!(path = %path.display(), "opened settings database");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the settings table on first run. An existing table must carry
    /// every column the upsert writes.
    pub fn bootstrap(&self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("sql/schema.sql"))
            .context("create schema")?;
        self.conn
            .prepare("SELECT key, value, updated_at FROM settings LIMIT 0")
            .map(drop)
            .context(
                "settings table needs key, value and updated_at columns; delete the settings database to recreate it",
            )
    }

    fn get_setting_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read setting {key}"))
    }

    fn put_setting_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert setting {key}"))?;
        Ok(())
    }

    pub fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        let raw = self.get_setting_raw(key.as_str())?;
        raw.map(|value| {
            SettingValue::parse_for_key(key, &value).ok_or_else(|| {
                anyhow!(
                    "setting `{}` has invalid value `{}`; run `vendorhub --check` or delete the settings database",
                    key.as_str(),
                    value
                )
            })
        })
        .transpose()
    }

    pub fn put_setting(&self, key: SettingKey, value: SettingValue) -> Result<()> {
        let raw = value.to_storage(key).ok_or_else(|| {
            anyhow!(
                "setting `{}` expected {:?} value",
                key.as_str(),
                key.expected_value_kind()
            )
        })?;
        tracing::debug!(key = key.as_str(), "persisting setting");
        self.put_setting_raw(key.as_str(), &raw)
    }

    pub fn list_settings(&self) -> Result<Vec<AppSetting>> {
        let mut settings = Vec::with_capacity(SettingKey::ALL.len());
        for key in SettingKey::ALL {
            if let Some(value) = self.get_setting(key)? {
                settings.push(AppSetting { key, value });
            }
        }
        Ok(settings)
    }

    /// `None` when the user has never toggled the sidebar.
    pub fn sidebar_collapsed(&self) -> Result<Option<bool>> {
        match self.get_setting(SettingKey::UiSidebarCollapsed)? {
            Some(SettingValue::Bool(value)) => Ok(Some(value)),
            Some(SettingValue::Text(_)) => bail!(
                "setting `{}` must be true/false",
                SettingKey::UiSidebarCollapsed.as_str()
            ),
            None => Ok(None),
        }
    }

    pub fn put_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        self.put_setting(SettingKey::UiSidebarCollapsed, SettingValue::Bool(collapsed))
    }

    pub fn last_email(&self) -> Result<Option<String>> {
        match self.get_setting(SettingKey::AuthLastEmail)? {
            Some(SettingValue::Text(value)) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_owned()))
                }
            }
            Some(SettingValue::Bool(_)) => bail!(
                "setting `{}` must be text",
                SettingKey::AuthLastEmail.as_str()
            ),
            None => Ok(None),
        }
    }

    pub fn put_last_email(&self, email: &str) -> Result<()> {
        self.put_setting(
            SettingKey::AuthLastEmail,
            SettingValue::Text(email.trim().to_owned()),
        )
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("VENDORHUB_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set VENDORHUB_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("settings.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!("database path {path:?} contains '?'; use a plain file path");
    }

    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
