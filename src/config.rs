use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::report::MailConfig;

const DEFAULT_API_ADDR: &str = "127.0.0.1:8710";
const DEFAULT_DETECTION_URL: &str = "http://127.0.0.1:8791";

#[derive(Debug, Deserialize, Default)]
struct ClearancedConfigFile {
    api: Option<ApiConfigFile>,
    detection: Option<DetectionConfigFile>,
    mail: Option<MailConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    worker_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MailConfigFile {
    endpoint: Option<String>,
    to: Option<String>,
    to_name: Option<String>,
    from: Option<String>,
    from_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClearancedConfig {
    pub api_addr: String,
    pub detection_url: String,
    pub mail: MailConfig,
}

impl ClearancedConfig {
    /// Load configuration from the optional JSON file named by
    /// `CLEARANCE_CONFIG`, then apply env overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CLEARANCE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ClearancedConfigFile) -> Self {
        let defaults = MailConfig::default();
        let api_addr = file
            .api
            .and_then(|api| api.addr)
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        let detection_url = file
            .detection
            .and_then(|detection| detection.worker_url)
            .unwrap_or_else(|| DEFAULT_DETECTION_URL.to_string());
        let mail_file = file.mail.unwrap_or_default();
        let mail = MailConfig {
            endpoint: mail_file.endpoint.unwrap_or(defaults.endpoint),
            to: mail_file.to.unwrap_or(defaults.to),
            to_name: mail_file.to_name.unwrap_or(defaults.to_name),
            from: mail_file.from.unwrap_or(defaults.from),
            from_name: mail_file.from_name.unwrap_or(defaults.from_name),
        };
        Self {
            api_addr,
            detection_url,
            mail,
        }
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("CLEARANCE_API_ADDR") {
            if !addr.trim().is_empty() {
                self.api_addr = addr;
            }
        }
        if let Ok(url) = std::env::var("CLEARANCE_DETECTION_URL") {
            if !url.trim().is_empty() {
                self.detection_url = url;
            }
        }
        if let Ok(endpoint) = std::env::var("CLEARANCE_MAIL_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.mail.endpoint = endpoint;
            }
        }
        if let Ok(to) = std::env::var("CLEARANCE_BUG_REPORT_TO") {
            if !to.trim().is_empty() {
                self.mail.to = to;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.detection_url).context("invalid detection worker url")?;
        Url::parse(&self.mail.endpoint).context("invalid mail endpoint url")?;
        if self.mail.to.trim().is_empty() {
            return Err(anyhow!("bug report recipient must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ClearancedConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
