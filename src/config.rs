use std::collections::HashSet;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_TARGETS: &str = "Adam,Eve";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream authority, `host` or `host:port`.
    pub upstream_host: String,
    /// Ordered target names; each becomes `GET /<name>` on the upstream.
    pub targets: Vec<String>,
    pub upstream_timeout: Duration,
    pub listen_host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't have to touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::Missing("HOST"))?;

        let targets = parse_targets(&lookup("UPSTREAM_TARGETS").unwrap_or_else(|| DEFAULT_TARGETS.to_string()))?;

        let timeout_ms = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "UPSTREAM_TIMEOUT_MS",
                    value: raw.clone(),
                    expected: "a positive number of milliseconds",
                })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                expected: "a valid port number",
            })?,
            None => 8081,
        };

        Ok(Self {
            upstream_host,
            targets,
            upstream_timeout: Duration::from_millis(timeout_ms),
            listen_host: lookup("LISTEN_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }
}

fn parse_targets(raw: &str) -> Result<Vec<String>, ConfigError> {
    let targets: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if targets.is_empty() {
        return Err(ConfigError::NoTargets);
    }

    // Names key the merged response, so each must be unique.
    let mut seen = HashSet::new();
    if let Some(dup) = targets.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(ConfigError::DuplicateTarget(dup.clone()));
    }
    Ok(targets)
}
