use std::sync::Mutex;

use tempfile::NamedTempFile;

use clearance_engine::config::ClearancedConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "CLEARANCE_CONFIG",
        "CLEARANCE_API_ADDR",
        "CLEARANCE_DETECTION_URL",
        "CLEARANCE_MAIL_ENDPOINT",
        "CLEARANCE_BUG_REPORT_TO",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "api": {
            "addr": "0.0.0.0:9000"
        },
        "detection": {
            "worker_url": "https://vision.internal/detect"
        },
        "mail": {
            "endpoint": "https://mail.internal/send",
            "to": "ops@installer.example",
            "to_name": "Ops",
            "from": "reports@installer.example",
            "from_name": "Clearance Reports"
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("CLEARANCE_CONFIG", file.path());
    std::env::set_var("CLEARANCE_API_ADDR", "127.0.0.1:9100");
    std::env::set_var("CLEARANCE_BUG_REPORT_TO", "oncall@installer.example");

    let cfg = ClearancedConfig::load().expect("load config");

    assert_eq!(cfg.api_addr, "127.0.0.1:9100");
    assert_eq!(cfg.detection_url, "https://vision.internal/detect");
    assert_eq!(cfg.mail.endpoint, "https://mail.internal/send");
    assert_eq!(cfg.mail.to, "oncall@installer.example");
    assert_eq!(cfg.mail.to_name, "Ops");
    assert_eq!(cfg.mail.from, "reports@installer.example");
    assert_eq!(cfg.mail.from_name, "Clearance Reports");

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ClearancedConfig::load().expect("load config");

    assert_eq!(cfg.api_addr, "127.0.0.1:8710");
    assert_eq!(cfg.detection_url, "http://127.0.0.1:8791");
    assert_eq!(cfg.mail.endpoint, "https://api.mailchannels.net/tx/v1/send");
    assert!(!cfg.mail.to.is_empty());

    clear_env();
}

#[test]
fn rejects_invalid_detection_url() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("CLEARANCE_DETECTION_URL", "not a url");
    let err = ClearancedConfig::load().expect_err("invalid url must fail");
    assert!(err.to_string().contains("detection worker url"));

    clear_env();
}
