//! Emulator settings. Values are taken from the defaults, then from an optional
//! TOML file, then from command line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use thiserror::Error;

use crate::chip::chip8::{Chip8, DEFAULT_TIMER_RESOLUTION};

/// One instruction per millisecond.
pub const DEFAULT_CLOCK_HZ: u32 = 1000;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmulatorConfig {
    /// Instructions executed per second.
    pub clock_hz: u32,

    /// Cycles between two decrements of the delay and sound timers.
    pub timer_resolution: u16,

    /// Seed for the random opcode. Random if absent.
    pub seed: Option<u64>,

    /// A `tracing_subscriber::EnvFilter` directive, used unless `RUST_LOG` is set.
    pub log_filter: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            clock_hz: DEFAULT_CLOCK_HZ,
            timer_resolution: DEFAULT_TIMER_RESOLUTION,
            seed: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub clock_hz: Option<u32>,
    pub timer_resolution: Option<u16>,
    pub seed: Option<u64>,
    pub log_filter: Option<String>,
}

/// Configuration flags shared by the binaries.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// TOML file with emulator settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Instructions executed per second
    #[arg(long)]
    pub clock_hz: Option<u32>,

    /// Cycles between two timer decrements
    #[arg(long)]
    pub timer_resolution: Option<u16>,

    /// Seed for the random opcode
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter directive, e.g. "debug" or "chip8_emulator=trace"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<EmulatorConfig, ConfigError> {
        EmulatorConfig::load(
            self.config.as_deref(),
            ConfigOverrides {
                clock_hz: self.clock_hz,
                timer_resolution: self.timer_resolution,
                seed: self.seed,
                log_filter: self.log_filter.clone(),
            },
        )
    }
}

impl EmulatorConfig {
    /// Builds a CHIP-8 with the configured seed and timer resolution.
    pub fn build_chip(&self) -> Chip8 {
        let chip8 = match self.seed {
            Some(seed) => Chip8::with_seed(seed),
            None => Chip8::new(),
        };
        chip8.with_timer_resolution(self.timer_resolution)
    }

    /// Loads the configuration, reading `path` if given and applying `overrides` on top.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };
        let config = config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EmulatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(clock_hz) = overrides.clock_hz {
            self.clock_hz = clock_hz;
        }
        if let Some(timer_resolution) = overrides.timer_resolution {
            self.timer_resolution = timer_resolution;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if let Some(log_filter) = overrides.log_filter {
            self.log_filter = log_filter;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "clock_hz",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timer_resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "timer_resolution",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Time budget of a single cycle.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.clock_hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EmulatorConfig::load(None, ConfigOverrides::default()).unwrap();
        assert_eq!(config, EmulatorConfig::default());
        assert_eq!(config.cycle_period(), Duration::from_millis(1));
        assert_eq!(config.timer_resolution, 16);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = EmulatorConfig::parse("clock_hz = 500\nseed = 7\n").unwrap();
        assert_eq!(config.clock_hz, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timer_resolution, DEFAULT_TIMER_RESOLUTION);
        assert_eq!(config.cycle_period(), Duration::from_millis(2));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EmulatorConfig::parse("clock_hz = 0"),
            Err(ConfigError::Invalid {
                field: "clock_hz",
                ..
            })
        ));
        assert!(matches!(
            EmulatorConfig::parse("speed = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EmulatorConfig::load(
                None,
                ConfigOverrides {
                    timer_resolution: Some(0),
                    ..ConfigOverrides::default()
                }
            ),
            Err(ConfigError::Invalid {
                field: "timer_resolution",
                ..
            })
        ));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "clock_hz = 250").unwrap();
        writeln!(file, "timer_resolution = 4").unwrap();
        writeln!(file, "log_filter = \"debug\"").unwrap();

        let config = EmulatorConfig::load(
            Some(file.path()),
            ConfigOverrides {
                clock_hz: Some(2000),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.clock_hz, 2000);
        assert_eq!(config.timer_resolution, 4);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_args_feed_overrides() {
        let args = ConfigArgs {
            seed: Some(9),
            clock_hz: Some(60),
            ..ConfigArgs::default()
        };
        let config = args.load().unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.clock_hz, 60);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EmulatorConfig::load(
            Some(dir.path().join("chip8.toml").as_path()),
            ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
