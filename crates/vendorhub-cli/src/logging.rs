// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "VENDORHUB_LOG";
const OWN_TARGETS: [&str; 5] = [
    "vendorhub",
    "vendorhub_app",
    "vendorhub_api",
    "vendorhub_store",
    "vendorhub_tui",
];

/// Installs the global subscriber. Output goes to `path` because the
/// terminal is owned by the TUI.
pub fn init(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let directive = filter_directive(env::var(LOG_ENV).ok().as_deref(), level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}; check {LOG_ENV} or [log].level"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

/// `VENDORHUB_LOG` wins verbatim; otherwise our crates log at `level` and
/// dependencies stay at warn.
fn filter_directive(env_value: Option<&str>, level: &str) -> String {
    if let Some(value) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        return value.to_owned();
    }
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

#[cfg(test)]
mod tests {
    use super::filter_directive;

    #[test]
    fn env_value_overrides_config_level() {
        assert_eq!(
            filter_directive(Some("trace,reqwest=debug"), "info"),
            "trace,reqwest=debug"
        );
    }

    #[test]
    fn blank_env_falls_back_to_config_level() {
        let directive = filter_directive(Some("  "), "debug");
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("vendorhub_api=debug"));
        assert!(directive.contains("vendorhub=debug"));
    }

    #[test]
    fn directive_parses_as_env_filter() {
        let directive = filter_directive(None, "info");
        assert!(tracing_subscriber::EnvFilter::try_new(directive).is_ok());
    }
}
