use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_API_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_MIN_CONFIDENCE: f32 = 0.4;

#[derive(Debug, Deserialize, Default)]
struct WayfinderdConfigFile {
    api: Option<ApiConfigFile>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    min_confidence: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct WayfinderdConfig {
    pub api_addr: String,
    pub detector: DetectorSettings,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub backend: String,
    pub min_confidence: f32,
}

impl WayfinderdConfig {
    /// Load configuration: optional JSON file named by `WAYFINDER_CONFIG`,
    /// then env overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("WAYFINDER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: WayfinderdConfigFile) -> Self {
        let api_addr = file
            .api
            .and_then(|api| api.addr)
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        let detector = DetectorSettings {
            backend: file
                .detector
                .as_ref()
                .and_then(|detector| detector.backend.clone())
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            min_confidence: file
                .detector
                .and_then(|detector| detector.min_confidence)
                .unwrap_or(DEFAULT_MIN_CONFIDENCE),
        };
        Self { api_addr, detector }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("WAYFINDER_API_ADDR") {
            if !addr.trim().is_empty() {
                self.api_addr = addr;
            }
        }
        if let Ok(backend) = std::env::var("WAYFINDER_DETECTOR_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(confidence) = std::env::var("WAYFINDER_MIN_CONFIDENCE") {
            let parsed: f32 = confidence
                .parse()
                .map_err(|_| anyhow!("WAYFINDER_MIN_CONFIDENCE must be a float"))?;
            self.detector.min_confidence = parsed;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.detector.backend.trim().is_empty() {
            return Err(anyhow!("detector backend name must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.detector.min_confidence) {
            return Err(anyhow!(
                "min_confidence must be within 0..=1, got {}",
                self.detector.min_confidence
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<WayfinderdConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
