use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::palette::Rgb;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub version: u32,
    pub light_square: Rgb,
    pub dark_square: Rgb,
    pub border: Rgb,
    pub label: Rgb,
    /// Fills the widget outside the board and its border.
    pub background: Rgb,
    pub cursor_color: Rgb,
    /// Fraction of the square side, `0.0..=0.5`.
    pub cursor_thickness: f32,
    /// Fraction of the square side, `0.0..=0.5`.
    pub marker_thickness: f32,
    pub marker_below: bool,
    pub show_border: bool,
    pub flipped: bool,
    pub show_labels: bool,
    pub show_turn_indicator: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            light_square: Rgb::new(238, 220, 186),
            dark_square: Rgb::new(172, 128, 92),
            border: Rgb::new(64, 52, 44),
            label: Rgb::new(222, 210, 188),
            background: Rgb::new(28, 28, 32),
            cursor_color: Rgb::new(72, 150, 230),
            cursor_thickness: 0.08,
            marker_thickness: 0.1,
            marker_below: false,
            show_border: true,
            flipped: false,
            show_labels: true,
            show_turn_indicator: true,
        }
    }
}

impl BoardConfig {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.cursor_thickness = clamp_fraction(self.cursor_thickness);
        self.marker_thickness = clamp_fraction(self.marker_thickness);
        self
    }
}

/// Clamps a ring thickness fraction into `0.0..=0.5`; NaN becomes zero.
pub fn clamp_fraction(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 0.5) }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `BOARD_CONFIG_PATH`, else `$XDG_CONFIG_HOME` (or `$HOME/.config`)`/board-widget/config.json`.
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("BOARD_CONFIG_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::at(base.join("board-widget").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<BoardConfig> {
        let bytes = fs::read(&self.path)?;
        let config: BoardConfig = serde_json::from_slice(&bytes)?;
        Ok(config.sanitized())
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load(&self) -> BoardConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(crate::error::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                BoardConfig::default()
            }
            Err(err) => {
                log::warn!("ignoring config {}: {err}", self.path.display());
                BoardConfig::default()
            }
        }
    }

    pub fn save(&self, config: &BoardConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_thickness() {
        let config = BoardConfig {
            version: 7,
            cursor_thickness: 3.0,
            marker_thickness: -1.0,
            ..BoardConfig::default()
        }
        .sanitized();
        assert_eq!(config.version, 1);
        assert_eq!(config.cursor_thickness, 0.5);
        assert_eq!(config.marker_thickness, 0.0);
        assert_eq!(clamp_fraction(f32::NAN), 0.0);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: BoardConfig = serde_json::from_str(r#"{"flipped":true,"light_square":{"r":1,"g":2,"b":3}}"#)
            .expect("config JSON should parse");
        assert!(parsed.flipped);
        assert_eq!(parsed.light_square, Rgb::new(1, 2, 3));
        assert_eq!(parsed.dark_square, BoardConfig::default().dark_square);
        assert!(parsed.show_border);
    }

    #[test]
    fn store_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("nested").join("config.json"));
        assert_eq!(store.load(), BoardConfig::default());

        let config = BoardConfig {
            marker_below: true,
            show_labels: false,
            ..BoardConfig::default()
        };
        store.save(&config).expect("save config");
        assert_eq!(store.load(), config);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        let store = ConfigStore::at(&path);
        assert!(store.try_load().is_err());
        assert_eq!(store.load(), BoardConfig::default());
    }
}
