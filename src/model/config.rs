use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from deck.toml (all sections optional).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store document, relative to the working directory.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "deck.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Hover time over a tab before a drag switches to it.
    #[serde(default = "default_tab_dwell_ms")]
    pub tab_dwell_ms: u64,
    /// Window after a lane swap during which further hover swaps are ignored.
    #[serde(default = "default_swap_cooldown_ms")]
    pub swap_cooldown_ms: u64,
    /// Event-loop poll interval.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tab_dwell_ms: default_tab_dwell_ms(),
            swap_cooldown_ms: default_swap_cooldown_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_tab_dwell_ms() -> u64 {
    500
}

fn default_swap_cooldown_ms() -> u64 {
    150
}

fn default_tick_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub show_key_hints: bool,
    /// Theme overrides keyed by color name, values like "#RRGGBB".
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::default();
        assert_eq!(config.store.path, "deck.json");
        assert_eq!(config.timing.tab_dwell_ms, 500);
        assert_eq!(config.timing.swap_cooldown_ms, 150);
        assert_eq!(config.timing.tick_ms, 50);
        assert!(!config.ui.show_key_hints);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [timing]
            tab_dwell_ms = 750

            [ui]
            show_key_hints = true
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.tab_dwell_ms, 750);
        assert_eq!(config.timing.swap_cooldown_ms, 150);
        assert_eq!(config.store.path, "deck.json");
        assert!(config.ui.show_key_hints);
    }
}
