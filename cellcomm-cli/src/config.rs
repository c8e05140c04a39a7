//! Configuration file support for cellcomm.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments and environment variables (CELLCOMM_*)
//! 2. Local config file (./cellcomm.toml)
//! 3. Global config file (~/.config/cellcomm/config.toml)
//!
//! `--config PATH` replaces both files.

use cellcomm::{CommandSet, Timing, UsbId, discovery::native::DEFAULT_FAMILY_B_DEVICES};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Identifier matched against family A USB descriptors when none is configured.
pub const DEFAULT_FAMILY_A_ID: &str = "BTCOMM";

/// Local configuration file name.
const LOCAL_CONFIG: &str = "cellcomm.toml";

/// Timing overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    /// Delay before the erase retry, in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Status poll interval, in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Erase confirmation timeout, in milliseconds.
    pub erase_timeout_ms: Option<u64>,
    /// Page buffering delay, in milliseconds.
    pub page_buffer_delay_ms: Option<u64>,
    /// Page reads longer than this wait for the buffering delay.
    pub page_buffer_threshold: Option<usize>,
}

/// Command code overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandConfig {
    /// Clear-status command.
    pub clear_status: Option<u8>,
    /// Read-status command.
    pub read_status: Option<u8>,
    /// Code-ROM erase command.
    pub erase_code_rom: Option<u8>,
    /// Data-flash erase command.
    pub erase_data_flash: Option<u8>,
    /// Escape-from-update command.
    pub escape_update: Option<u8>,
}

/// Discovery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Identifier string for family A boards.
    pub family_a_id: Option<String>,
    /// USB IDs of family B boards.
    #[serde(default)]
    pub family_b_devices: Vec<UsbId>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Timing overrides.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Command code overrides.
    #[serde(default)]
    pub commands: CommandConfig,
    /// Discovery configuration.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from all available sources.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_from_file(&global_path) {
                debug!("Loaded global config from {}", global_path.display());
                config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        if let Some(local_config) = Self::load_from_file(Path::new(LOCAL_CONFIG)) {
            debug!("Loaded local config from {LOCAL_CONFIG}");
            config.merge(local_config);
        }

        config
    }

    /// Load configuration from a specific file path (--config flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Could not load config from {}, using defaults",
                path.display()
            );
            Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    None
                },
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cellcomm").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one.
    fn merge(&mut self, other: Self) {
        let timing = &mut self.timing;
        merge_opt(&mut timing.retry_delay_ms, other.timing.retry_delay_ms);
        merge_opt(&mut timing.poll_interval_ms, other.timing.poll_interval_ms);
        merge_opt(&mut timing.erase_timeout_ms, other.timing.erase_timeout_ms);
        merge_opt(
            &mut timing.page_buffer_delay_ms,
            other.timing.page_buffer_delay_ms,
        );
        merge_opt(
            &mut timing.page_buffer_threshold,
            other.timing.page_buffer_threshold,
        );

        let commands = &mut self.commands;
        merge_opt(&mut commands.clear_status, other.commands.clear_status);
        merge_opt(&mut commands.read_status, other.commands.read_status);
        merge_opt(&mut commands.erase_code_rom, other.commands.erase_code_rom);
        merge_opt(
            &mut commands.erase_data_flash,
            other.commands.erase_data_flash,
        );
        merge_opt(&mut commands.escape_update, other.commands.escape_update);

        merge_opt(
            &mut self.discovery.family_a_id,
            other.discovery.family_a_id,
        );
        for device in other.discovery.family_b_devices {
            // Don't add duplicates
            if !self.discovery.family_b_devices.contains(&device) {
                self.discovery.family_b_devices.push(device);
            }
        }
    }

    /// Effective timing policy.
    pub fn timing(&self) -> Timing {
        let defaults = Timing::default();
        let t = &self.timing;
        Timing {
            retry_delay_ms: t.retry_delay_ms.unwrap_or(defaults.retry_delay_ms),
            poll_interval_ms: t.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
            erase_timeout_ms: t.erase_timeout_ms.unwrap_or(defaults.erase_timeout_ms),
            page_buffer_delay_ms: t
                .page_buffer_delay_ms
                .unwrap_or(defaults.page_buffer_delay_ms),
            page_buffer_threshold: t
                .page_buffer_threshold
                .unwrap_or(defaults.page_buffer_threshold),
        }
    }

    /// Effective command codes.
    pub fn commands(&self) -> CommandSet {
        let defaults = CommandSet::default();
        let c = &self.commands;
        CommandSet {
            clear_status: c.clear_status.unwrap_or(defaults.clear_status),
            read_status: c.read_status.unwrap_or(defaults.read_status),
            erase_code_rom: c.erase_code_rom.unwrap_or(defaults.erase_code_rom),
            erase_data_flash: c.erase_data_flash.unwrap_or(defaults.erase_data_flash),
            escape_update: c.escape_update.unwrap_or(defaults.escape_update),
        }
    }

    /// Effective family A identifier.
    pub fn family_a_id(&self) -> &str {
        self.discovery
            .family_a_id
            .as_deref()
            .unwrap_or(DEFAULT_FAMILY_A_ID)
    }

    /// Effective family B USB IDs (built-in list when none configured).
    pub fn family_b_devices(&self) -> Vec<UsbId> {
        if self.discovery.family_b_devices.is_empty() {
            DEFAULT_FAMILY_B_DEVICES.to_vec()
        } else {
            self.discovery.family_b_devices.clone()
        }
    }
}

fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
