// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vendorhub_app::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PAGE_SIZE};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_MENU_CACHE_TTL: &str = "30m";
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_PAGE_SIZE: u32 = 100;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            storage: Storage::default(),
            ui: Ui::default(),
            session: SessionConfig::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub page_size: Option<u32>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
    pub max_upload_size: Option<i64>,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            db_path: None,
            max_upload_size: Some(DEFAULT_MAX_UPLOAD_BYTES as i64),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub sidebar_collapsed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub menu_cache_ttl: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            menu_cache_ttl: Some(DEFAULT_MENU_CACHE_TTL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("VENDORHUB_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set VENDORHUB_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(vendorhub_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [storage], [ui], [session], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.api.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            bail!(
                "api.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            vendorhub_store::validate_db_path(db_path)?;
        }

        if let Some(max_size) = self.storage.max_upload_size
            && max_size <= 0
        {
            bail!(
                "storage.max_upload_size in {} must be positive, got {}",
                path.display(),
                max_size
            );
        }

        if let Some(ttl) = &self.session.menu_cache_ttl {
            parse_duration(ttl)
                .with_context(|| format!("session.menu_cache_ttl in {}", path.display()))?;
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.trim().to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn page_size(&self) -> u32 {
        self.api.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => vendorhub_store::default_db_path(),
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.storage
            .max_upload_size
            .and_then(|size| u64::try_from(size).ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Used only until the user toggles the sidebar; the stored preference
    /// wins after that.
    pub fn sidebar_collapsed(&self) -> bool {
        self.ui.sidebar_collapsed.unwrap_or(false)
    }

    pub fn menu_cache_ttl(&self) -> Result<time::Duration> {
        let ttl = parse_duration(
            self.session
                .menu_cache_ttl
                .as_deref()
                .unwrap_or(DEFAULT_MENU_CACHE_TTL),
        )?;
        time::Duration::try_from(ttl).context("session.menu_cache_ttl is out of range")
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .trim()
            .to_ascii_lowercase()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.db_path()?.with_file_name("vendorhub.log")),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# vendorhub config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\npage_size = {}\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/vendorhub/settings.db)\n# db_path = \"/absolute/path/to/settings.db\"\nmax_upload_size = {}\n\n[ui]\nsidebar_collapsed = false\n\n[session]\nmenu_cache_ttl = \"{}\"\n\n[log]\nlevel = \"{}\"\n# file = \"/absolute/path/to/vendorhub.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
            DEFAULT_MAX_UPLOAD_BYTES,
            DEFAULT_MENU_CACHE_TTL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }
    if let Some(value) = raw.strip_suffix('h') {
        let hours: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(hours * 3600));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m, <N>h (for example 500ms or 10s)")
}
