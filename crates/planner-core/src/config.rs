use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PlannerError, Result};

/// Top-level config (planner.toml + PLANNER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            scheduler: SchedulerConfig::default(),
            telegram: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Scheduling knobs, read once at startup and fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Reminder horizons in minutes before a task's due time, in the order
    /// they are evaluated each tick.
    #[serde(default = "default_lead_times")]
    pub lead_times_min: Vec<u32>,
    /// Polling interval of the scheduler loop, in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Extended pause after a failed tick, in seconds.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Clock time of the once-daily weekly-task digest.
    #[serde(default = "default_digest_at")]
    pub digest_at: ClockTime,
    /// Clock time on Monday at which incomplete weekly tasks roll forward.
    #[serde(default = "default_rollover_at")]
    pub rollover_at: ClockTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lead_times_min: default_lead_times(),
            tick_secs: default_tick_secs(),
            backoff_secs: default_backoff_secs(),
            digest_at: default_digest_at(),
            rollover_at: default_rollover_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

/// Wall-clock time of day at minute resolution, written as `"HH:MM"` in
/// config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour/minute are range-checked on parse, so this cannot fail.
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| PlannerError::InvalidClockTime(s.to_string()))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| PlannerError::InvalidClockTime(s.to_string()))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| PlannerError::InvalidClockTime(s.to_string()))?;
        if hour > 23 || minute > 59 {
            return Err(PlannerError::InvalidClockTime(s.to_string()));
        }
        Ok(Self { hour, minute })
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn default_lead_times() -> Vec<u32> {
    vec![5, 15, 30, 60]
}
fn default_tick_secs() -> u64 {
    30
}
fn default_backoff_secs() -> u64 {
    60
}
fn default_digest_at() -> ClockTime {
    ClockTime::new(10, 0)
}
fn default_rollover_at() -> ClockTime {
    ClockTime::new(0, 5)
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.planner/planner.db", home)
}

impl PlannerConfig {
    /// Load config from a TOML file with PLANNER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.planner/planner.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: PlannerConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PLANNER_").split("__"))
            .extract()
            .map_err(|e| PlannerError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.planner/planner.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_parses_and_displays() {
        let t: ClockTime = "10:00".parse().unwrap();
        assert_eq!(t, ClockTime::new(10, 0));
        assert_eq!(t.to_string(), "10:00");

        let t: ClockTime = "00:05".parse().unwrap();
        assert_eq!(t, ClockTime::new(0, 5));
    }

    #[test]
    fn clock_time_rejects_garbage() {
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("10:60".parse::<ClockTime>().is_err());
        assert!("1000".parse::<ClockTime>().is_err());
        assert!("aa:bb".parse::<ClockTime>().is_err());
    }

    #[test]
    fn scheduler_defaults_match_product_constants() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.lead_times_min, vec![5, 15, 30, 60]);
        assert_eq!(cfg.tick_secs, 30);
        assert_eq!(cfg.backoff_secs, 60);
        assert_eq!(cfg.digest_at, ClockTime::new(10, 0));
    }
}
