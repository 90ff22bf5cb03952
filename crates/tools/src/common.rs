//! Common utilities for the command line tools

use anyhow::{Context, Result};
use clap::Args;
use cwburst_core::oscillator::Waveform;
use cwburst_engine::{DeviceConfig, EngineConfig};
use cwburst_keying::timing::wpm_to_cpm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text sent by `--farewell`
pub const FAREWELL: &str = "73";
/// Text sent by `--end`
pub const END_OF_MESSAGE: &str = "+";

/// Options shared by every subcommand that builds an engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct EngineArgs {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output device: a raw device path, `*.wav`, `cpal[:NAME]` or `null`
    #[arg(short, long)]
    pub device: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Speed in characters per minute
    #[arg(long, conflicts_with = "wpm")]
    pub cpm: Option<u32>,

    /// Speed in words per minute
    #[arg(long)]
    pub wpm: Option<u32>,

    /// Minimum character speed in CpM (Farnsworth spacing when above the speed)
    #[arg(long)]
    pub min_char_speed: Option<u32>,

    /// Waveform: sine, sawtooth, square or silence
    #[arg(long)]
    pub waveform: Option<Waveform>,

    /// Rise and fall time in milliseconds
    #[arg(long)]
    pub rise_fall: Option<f64>,

    /// Constant tone frequency in Hz (random pitch otherwise)
    #[arg(long)]
    pub tone: Option<u32>,
}

impl EngineArgs {
    /// Load the configuration file, if any, and apply command line overrides
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides to `config`
    pub fn apply(&self, config: &mut EngineConfig) -> Result<()> {
        if let Some(device) = &self.device {
            config.device = device
                .parse::<DeviceConfig>()
                .with_context(|| format!("Invalid device: {}", device))?;
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(cpm) = self.cpm {
            config.code_speed = cpm;
        }
        if let Some(wpm) = self.wpm {
            config.code_speed = wpm_to_cpm(wpm);
        }
        if let Some(speed) = self.min_char_speed {
            config.min_char_speed = speed;
        }
        if let Some(waveform) = self.waveform {
            config.tuning.waveform = waveform;
        }
        if let Some(rise_fall) = self.rise_fall {
            config.tuning.rise_fall_ms = rise_fall;
        }
        if let Some(tone) = self.tone {
            config.tuning.constant_tone = true;
            config.tuning.tone_frequency = tone;
        }
        Ok(())
    }
}

/// Texts to send for one invocation, in order
///
/// Empty lines are dropped; `farewell` and `end` append "73" and "+".
pub fn session_texts<I, S>(lines: I, farewell: bool, end: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut texts: Vec<String> = lines
        .into_iter()
        .map(|l| l.as_ref().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if farewell {
        texts.push(FAREWELL.to_string());
    }
    if end {
        texts.push(END_OF_MESSAGE.to_string());
    }
    texts
}

/// Initialize logging: WARN by default, INFO with `verbose`, DEBUG with `debug`
pub fn init_logging(verbose: bool, debug: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file
pub fn load_config<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // Try JSON first, then TOML
    if let Ok(config) = serde_json::from_str(&content) {
        return Ok(config);
    }

    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("Failed to parse config file {:?}: {}", path, e),
    }
}

/// Save configuration to file, JSON for `.json` paths and TOML otherwise
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use tempfile::TempDir;

    #[test]
    fn test_overrides() {
        let args = EngineArgs {
            device: Some("null".to_string()),
            wpm: Some(25),
            waveform: Some(Waveform::Square),
            tone: Some(700),
            ..EngineArgs::default()
        };
        let config = args.engine_config().unwrap();
        assert_eq!(config.device, DeviceConfig::Null);
        assert_eq!(config.code_speed, 125);
        assert_eq!(config.tuning.waveform, Waveform::Square);
        assert!(config.tuning.constant_tone);
        assert_eq!(config.tuning.tone_frequency, 700);
        assert_eq!(config.sample_rate, 44100);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = EngineArgs {
            cpm: Some(0),
            ..EngineArgs::default()
        };
        assert!(args.engine_config().is_err());
    }

    #[test]
    fn test_session_texts() {
        let texts = session_texts(["cq test", "  ", "de test k"], true, true);
        assert_eq!(texts, vec!["cq test", "de test k", "73", "+"]);
        assert!(session_texts(Vec::<String>::new(), false, false).is_empty());
    }

    #[quickcheck]
    fn prop_session_texts_never_empty_entries(lines: Vec<String>, farewell: bool, end: bool) -> bool {
        session_texts(&lines, farewell, end).iter().all(|t| !t.is_empty())
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = EngineConfig::default();
        config.code_speed = 150;
        config.device = DeviceConfig::Null;

        for name in ["engine.toml", "engine.json"] {
            let path = dir.path().join(name);
            save_config(&config, &path).unwrap();
            let loaded: EngineConfig = load_config(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "code_speed = 120\nrise_fall_ms = 4.0\n").unwrap();

        let args = EngineArgs {
            config: Some(path),
            cpm: Some(180),
            device: Some("null".to_string()),
            ..EngineArgs::default()
        };
        let config = args.engine_config().unwrap();
        assert_eq!(config.code_speed, 180);
        assert_eq!(config.tuning.rise_fall_ms, 4.0);
    }

    #[test]
    fn test_unparseable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "code_speed = [").unwrap();
        assert!(load_config::<EngineConfig>(&path).is_err());
    }
}
