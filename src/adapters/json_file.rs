//! JSON file adapters for the host binary.
//!
//! - [`JsonFileSource`]: a readings file, either a JSON array of readings
//!   or an object `{ "readings": [...] }`.  Raw probe captures in the same
//!   two shapes (`{ "captures": [...] }`) are calibrated on load.
//! - [`JsonConfigFile`]: a [`MonitorConfig`] stored as pretty JSON.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::app::ports::{ConfigError, ConfigPort, SensorSource, SourceError};
use crate::config::MonitorConfig;
use crate::sensors::Reading;
use crate::sensors::calibration::{Calibration, RawCapture};

use super::memory::MemorySensorSource;

#[derive(Deserialize)]
#[serde(untagged)]
enum ReadingsFile {
    List(Vec<Reading>),
    Wrapped { readings: Vec<Reading> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CapturesFile {
    List(Vec<RawCapture>),
    Wrapped { captures: Vec<RawCapture> },
}

fn read_text(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|e| SourceError::Io(e.to_string()))
}

/// Readings loaded once from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    inner: MemorySensorSource,
}

impl JsonFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let source = Self::parse(&read_text(path.as_ref())?)?;
        info!(
            "JsonFileSource: {} readings from {}",
            source.readings().len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let readings = match serde_json::from_str(text).map_err(|e| SourceError::Malformed(e.to_string()))? {
            ReadingsFile::List(r) | ReadingsFile::Wrapped { readings: r } => r,
        };
        Ok(Self {
            inner: MemorySensorSource::new(readings),
        })
    }

    /// Load raw captures and convert each with `cal`.
    pub fn open_raw(path: impl AsRef<Path>, cal: &Calibration) -> Result<Self, SourceError> {
        let source = Self::parse_raw(&read_text(path.as_ref())?, cal)?;
        info!(
            "JsonFileSource: {} raw captures from {}",
            source.readings().len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    pub fn parse_raw(text: &str, cal: &Calibration) -> Result<Self, SourceError> {
        let captures = match serde_json::from_str(text).map_err(|e| SourceError::Malformed(e.to_string()))? {
            CapturesFile::List(c) | CapturesFile::Wrapped { captures: c } => c,
        };
        Ok(Self {
            inner: MemorySensorSource::new(captures.iter().map(|c| c.to_reading(cal)).collect()),
        })
    }

    /// All readings, oldest first.
    pub fn readings(&self) -> &[Reading] {
        self.inner.readings()
    }
}

impl SensorSource for JsonFileSource {
    fn latest(&self) -> Result<Option<Reading>, SourceError> {
        self.inner.latest()
    }

    fn historical(&self, start: u64, end: u64, limit: usize) -> Result<Vec<Reading>, SourceError> {
        self.inner.historical(start, end, limit)
    }
}

/// Configuration persisted as a JSON file.  A missing file loads defaults.
#[derive(Debug, Clone)]
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("JsonConfigFile: {} not found, using defaults", self.path.display());
                return Ok(MonitorConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let cfg: MonitorConfig = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|_| ConfigError::IoError)
    }
}
