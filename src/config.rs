use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;

use crate::core::narration::Voice;
use crate::core::reports::{AcceptancePolicy, Clock};
use crate::infra::speech::configured_voices;

pub const DEFAULT_SOURCE: &str = ".";
pub const DEFAULT_NARRATOR_COMMAND: &str = "espeak-ng";
pub const DEFAULT_VOICE: &str = "en-us";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Where the dashboard reads reports from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(String),
    Directory(PathBuf),
}

impl SourceLocation {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            SourceLocation::Http(value.to_string())
        } else {
            SourceLocation::Directory(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: SourceLocation,
    pub policy: AcceptancePolicy,
    /// `None` uses the machine's local time.
    pub timezone: Option<Tz>,
    pub narrator_command: String,
    pub preferred_voice: Option<String>,
    /// Offered when the narrator program cannot list its own voices.
    pub voices: Vec<Voice>,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = SourceLocation::parse(
            &get("DASHBOARD_SOURCE").unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        );

        let policy = match get("DASHBOARD_ACCEPT") {
            Some(value) => value.parse().map_err(|message| ConfigError::Invalid {
                key: "DASHBOARD_ACCEPT",
                message,
            })?,
            None => AcceptancePolicy::Permissive,
        };

        let timezone = get("DASHBOARD_TIMEZONE")
            .map(|value| {
                value.trim().parse::<Tz>().map_err(|e| ConfigError::Invalid {
                    key: "DASHBOARD_TIMEZONE",
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let preferred_voice = match lookup("NARRATOR_VOICE") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(value.trim().to_string()),
            None => Some(DEFAULT_VOICE.to_string()),
        };

        Ok(Self {
            source,
            policy,
            timezone,
            narrator_command: get("NARRATOR_COMMAND")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_NARRATOR_COMMAND.to_string()),
            preferred_voice,
            voices: get("NARRATOR_VOICES")
                .map(|list| configured_voices(&list))
                .unwrap_or_default(),
        })
    }

    pub fn clock(&self) -> Clock {
        match self.timezone {
            Some(tz) => Clock::Zone(tz),
            None => Clock::Local,
        }
    }
}
