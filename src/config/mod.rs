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
//! This module manages the application configuration file. A missing or
//! unreadable file yields the defaults.

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    controls::Slider,
    error::Result,
    sorting::{SortKey, SortingKey},
};

const CONFIG_NAME: &str = "shelf";

const MIN_PAGE_SIZE: f64 = 1.0;
const MAX_PAGE_SIZE: f64 = 100.0;
const PAGE_SIZE_STEP: f64 = 5.0;

/// A named list of sort keys the user can switch to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderingPreset {
    pub name: String,
    pub keys: Vec<SortingKey>,
}

impl OrderingPreset {
    pub fn new(name: &str, keys: Vec<SortingKey>) -> Self {
        Self { name: name.to_string(), keys }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dirs: Vec<String>,
    pub database_path: String,
    pub log_level: String,
    /// Rows moved by page up and page down.
    pub page_size: u16,
    pub ordering_presets: Vec<OrderingPreset>,
    /// Thumbnails kept after nothing on screen references them.
    pub thumbnail_cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            database_path: "music.db".to_string(),
            log_level: "warn".to_string(),
            page_size: 20,
            ordering_presets: default_presets(),
            thumbnail_cache_capacity: 64,
        }
    }
}

impl AppConfig {
    /// The configured log level, `warn` when it does not parse.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }

    pub fn page_size(&self) -> usize {
        let slider = Slider::new(f64::from(self.page_size), MIN_PAGE_SIZE, MAX_PAGE_SIZE, 1.0);
        slider.value() as usize
    }

    /// Moves the page size one step up or down, staying within its range.
    /// Returns the new size.
    pub fn step_page_size(&mut self, up: bool) -> usize {
        let mut slider =
            Slider::new(f64::from(self.page_size), MIN_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_SIZE_STEP);
        let value = if up { slider.increment() } else { slider.decrement() };
        self.page_size = value as u16;
        self.page_size()
    }
}

fn default_presets() -> Vec<OrderingPreset> {
    vec![
        OrderingPreset::new("Title", vec![SortingKey::ascending(SortKey::Title)]),
        OrderingPreset::new(
            "Artist",
            vec![
                SortingKey::ascending(SortKey::Artist),
                SortingKey::ascending(SortKey::Album),
                SortingKey::ascending(SortKey::DiscNumber),
                SortingKey::ascending(SortKey::TrackNumber),
            ],
        ),
        OrderingPreset::new("Recently added", vec![SortingKey::descending(SortKey::DateAdded)]),
        OrderingPreset::new("Most played", vec![SortingKey::descending(SortKey::PlayCount)]),
        OrderingPreset::new("Random", vec![SortingKey::ascending(SortKey::Random)]),
    ]
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<()> {
    confy::store(CONFIG_NAME, None, cfg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.database_path, "music.db");
        assert_eq!(config.log_level(), LevelFilter::Warn);
        assert_eq!(config.ordering_presets[0].keys, vec![SortingKey::ascending(SortKey::Title)]);
        assert!(config.ordering_presets.iter().any(|p| p.keys[0].key == SortKey::Random));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig {
            log_level: "chatty".to_string(),
            page_size: 0,
            ..AppConfig::default()
        };

        assert_eq!(config.log_level(), LevelFilter::Warn);
        assert_eq!(config.page_size(), 1);
    }

    #[test]
    fn test_page_size_steps_within_range() {
        let mut config = AppConfig { page_size: 97, ..AppConfig::default() };

        assert_eq!(config.step_page_size(true), 100);
        assert_eq!(config.step_page_size(true), 100);
        assert_eq!(config.step_page_size(false), 95);

        config.page_size = 3;
        assert_eq!(config.step_page_size(false), 1);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let config = AppConfig { log_level: "DEBUG".to_string(), ..AppConfig::default() };
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }
}
