//! Bug report formatting and email dispatch.
//!
//! Bug reports arrive from the frontend as a JSON snapshot of the user's
//! session (description, browser info, application state, screenshots) and
//! are relayed as a plaintext email through a transactional mail HTTP API.
//! This module never touches the geometry core.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SUBJECT_PREVIEW_CHARS: usize = 50;

/// Bug report payload submitted by the frontend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    pub description: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub screen_resolution: String,
    #[serde(default)]
    pub window_size: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state: AppState,
    #[serde(default)]
    pub local_storage: StoredConfig,
    #[serde(default)]
    pub console_info: String,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

/// Application state snapshot. Fields are raw JSON values; the frontend's
/// vocabulary here is not a stable contract.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub has_photo: Value,
    pub is_calibrated: Value,
    pub scale: Value,
    pub position: Value,
    pub detected_objects: Value,
    pub obstacles: Value,
    pub zones: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    #[serde(rename = "hasOpenAIKey")]
    pub has_open_ai_key: Value,
    #[serde(rename = "hasCloudflareUrl")]
    pub has_cloudflare_url: Value,
}

#[derive(Debug, Deserialize)]
pub struct Screenshot {
    #[serde(default)]
    pub name: Option<String>,
    pub data: String,
}

#[derive(Debug, Serialize)]
struct Attachment {
    filename: String,
    content: String,
    #[serde(rename = "type")]
    mime_type: String,
}

/// Mail dispatch settings for bug reports.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub endpoint: String,
    pub to: String,
    pub to_name: String,
    pub from: String,
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mailchannels.net/tx/v1/send".to_string(),
            to: "support@clearance.app".to_string(),
            to_name: "Support".to_string(),
            from: "bug-reports@clearance.app".to_string(),
            from_name: "Clearance Bug Reporter".to_string(),
        }
    }
}

/// Bug report mailer backed by a transactional mail HTTP API.
pub struct Mailer {
    agent: ureq::Agent,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self { agent, config }
    }

    pub fn send_bug_report(&self, report: &BugReport) -> Result<()> {
        let body = format_report(report);
        let mut payload = json!({
            "personalizations": [
                { "to": [{ "email": self.config.to, "name": self.config.to_name }] }
            ],
            "from": { "email": self.config.from, "name": self.config.from_name },
            "subject": subject_line(&report.description),
            "content": [
                { "type": "text/plain", "value": body },
                { "type": "text/html", "value": body.replace('\n', "<br>") },
            ],
        });

        let attachments = extract_attachments(&report.screenshots);
        if !attachments.is_empty() {
            payload["attachments"] = serde_json::to_value(&attachments)?;
        }

        self.agent
            .post(&self.config.endpoint)
            .send_json(payload)
            .context("send bug report email")?;
        Ok(())
    }
}

fn subject_line(description: &str) -> String {
    let preview: String = description.chars().take(SUBJECT_PREVIEW_CHARS).collect();
    if description.chars().count() > SUBJECT_PREVIEW_CHARS {
        format!("Bug Report: {}...", preview)
    } else {
        format!("Bug Report: {}", preview)
    }
}

fn format_report(report: &BugReport) -> String {
    let mut lines = Vec::new();

    lines.push("===== BUG REPORT =====".to_string());
    lines.push(format!("Submitted: {}", report.timestamp));
    lines.push(String::new());
    lines.push("--- USER DESCRIPTION ---".to_string());
    lines.push(report.description.clone());
    lines.push(String::new());
    lines.push("--- BROWSER INFORMATION ---".to_string());
    lines.push(format!("User Agent: {}", report.user_agent));
    lines.push(format!("Platform: {}", report.platform));
    lines.push(format!("Screen Resolution: {}", report.screen_resolution));
    lines.push(format!("Window Size: {}", report.window_size));
    lines.push(format!("URL: {}", report.url));
    lines.push(String::new());
    lines.push("--- APPLICATION STATE ---".to_string());
    lines.push(format!("Has Photo: {}", report.state.has_photo));
    lines.push(format!("Is Calibrated: {}", report.state.is_calibrated));
    lines.push(format!("Scale: {}", report.state.scale));
    lines.push(format!("Position: {}", report.state.position));
    lines.push(format!("Detected Objects: {}", report.state.detected_objects));
    lines.push(format!("Obstacles: {}", report.state.obstacles));
    lines.push(format!("Zones: {}", report.state.zones));
    lines.push(String::new());
    lines.push("--- CONFIGURATION ---".to_string());
    lines.push(format!(
        "Has OpenAI Key: {}",
        report.local_storage.has_open_ai_key
    ));
    lines.push(format!(
        "Has Cloudflare URL: {}",
        report.local_storage.has_cloudflare_url
    ));
    lines.push(String::new());
    lines.push("--- CONSOLE INFO ---".to_string());
    lines.push(report.console_info.clone());

    if !report.screenshots.is_empty() {
        lines.push(String::new());
        lines.push("--- SCREENSHOTS ---".to_string());
        lines.push(format!(
            "{} screenshot(s) attached",
            report.screenshots.len()
        ));
    }

    lines.push(String::new());
    lines.push("===== END REPORT =====".to_string());

    lines.join("\n")
}

/// Pull base64 attachments out of `data:image/...;base64,` screenshot URIs.
/// Screenshots in any other encoding are dropped.
fn extract_attachments(screenshots: &[Screenshot]) -> Vec<Attachment> {
    static DATA_URI_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = DATA_URI_RE
        .get_or_init(|| regex::Regex::new(r"^data:(image/\w+);base64,(.+)$").unwrap());

    screenshots
        .iter()
        .enumerate()
        .filter_map(|(i, shot)| {
            let caps = re.captures(&shot.data)?;
            Some(Attachment {
                filename: shot
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("screenshot-{}.png", i + 1)),
                mime_type: caps[1].to_string(),
                content: caps[2].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(description: &str) -> BugReport {
        serde_json::from_value(json!({
            "description": description,
            "timestamp": "2024-06-01T12:00:00Z",
            "userAgent": "TestBrowser/1.0",
            "platform": "Linux",
            "state": { "hasPhoto": true, "scale": 2.5 },
            "localStorage": { "hasOpenAIKey": false },
            "consoleInfo": "no errors",
        }))
        .expect("bug report fixture")
    }

    #[test]
    fn formatted_report_carries_every_section() {
        let body = format_report(&report_with("zones render offset"));

        assert!(body.starts_with("===== BUG REPORT ====="));
        assert!(body.contains("--- USER DESCRIPTION ---\nzones render offset"));
        assert!(body.contains("User Agent: TestBrowser/1.0"));
        assert!(body.contains("Has Photo: true"));
        assert!(body.contains("Scale: 2.5"));
        assert!(body.contains("Has OpenAI Key: false"));
        assert!(body.contains("--- CONSOLE INFO ---\nno errors"));
        assert!(body.ends_with("===== END REPORT ====="));
    }

    #[test]
    fn subject_truncates_long_descriptions() {
        let short = subject_line("zones render offset");
        assert_eq!(short, "Bug Report: zones render offset");

        let long = subject_line(&"x".repeat(80));
        assert_eq!(long, format!("Bug Report: {}...", "x".repeat(50)));
    }

    #[test]
    fn attachments_come_from_base64_data_uris() {
        let screenshots = vec![
            Screenshot {
                name: Some("before.png".to_string()),
                data: "data:image/png;base64,AAAA".to_string(),
            },
            Screenshot {
                name: None,
                data: "data:image/jpeg;base64,BBBB".to_string(),
            },
            Screenshot {
                name: Some("bogus.bin".to_string()),
                data: "not-a-data-uri".to_string(),
            },
        ];

        let attachments = extract_attachments(&screenshots);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename, "before.png");
        assert_eq!(attachments[0].mime_type, "image/png");
        assert_eq!(attachments[0].content, "AAAA");
        assert_eq!(attachments[1].filename, "screenshot-2.png");
        assert_eq!(attachments[1].mime_type, "image/jpeg");
    }

    #[test]
    fn missing_screenshot_section_when_none_attached() {
        let body = format_report(&report_with("no screenshots"));
        assert!(!body.contains("--- SCREENSHOTS ---"));
    }
}
