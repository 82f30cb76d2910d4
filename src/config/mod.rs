// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file, and derives the
//! smaller [`SessionConfig`] a player session actually needs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::player::DEFAULT_COMPLETION_TOLERANCE;

const CONFIG_NAME: &str = "cadence";

pub const DEFAULT_SEEK_STEP_MS: i64 = 5000;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Simulated,
    Mpv,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dir: String,
    pub engine: EngineKind,
    pub seek_step_ms: i64,
    pub tick_interval_ms: u64,
    pub completion_tolerance: f64,
    pub keep_screen_on: bool,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dir: "media".to_string(),
            engine: EngineKind::default(),
            seek_step_ms: DEFAULT_SEEK_STEP_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            completion_tolerance: DEFAULT_COMPLETION_TOLERANCE,
            keep_screen_on: false,
            log_file: "cadence.log".to_string(),
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

/// Settings for a single player session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Step used by seek forward and seek backward, in milliseconds.
    pub seek_step_ms: i64,
    pub tick_interval: Duration,
    pub completion_tolerance: f64,
    pub keep_screen_on: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            seek_step_ms: cfg.seek_step_ms,
            // A zero period would make the ticker spin.
            tick_interval: Duration::from_millis(cfg.tick_interval_ms.max(1)),
            completion_tolerance: cfg.completion_tolerance,
            keep_screen_on: cfg.keep_screen_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults_follow_app_config() {
        let session = SessionConfig::default();

        assert_eq!(session.seek_step_ms, 5000);
        assert_eq!(session.tick_interval, Duration::from_secs(1));
        assert_eq!(session.completion_tolerance, 0.05);
        assert!(!session.keep_screen_on);
    }

    #[test]
    fn zero_tick_interval_is_clamped() {
        let cfg = AppConfig {
            tick_interval_ms: 0,
            ..AppConfig::default()
        };

        assert_eq!(
            SessionConfig::from(&cfg).tick_interval,
            Duration::from_millis(1)
        );
    }
}
