use std::sync::Mutex;

use tempfile::NamedTempFile;

use wayfinder::config::WayfinderdConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "WAYFINDER_CONFIG",
        "WAYFINDER_API_ADDR",
        "WAYFINDER_DETECTOR_BACKEND",
        "WAYFINDER_MIN_CONFIDENCE",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = WayfinderdConfig::load().expect("load config");
    assert_eq!(cfg.api_addr, "127.0.0.1:8000");
    assert_eq!(cfg.detector.backend, "stub");
    assert_eq!(cfg.detector.min_confidence, 0.4);

    clear_env();
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
        "detector": {
            "backend": "stub",
            "min_confidence": 0.5
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("WAYFINDER_CONFIG", file.path());
    std::env::set_var("WAYFINDER_MIN_CONFIDENCE", "0.25");

    let cfg = WayfinderdConfig::load().expect("load config");

    assert_eq!(cfg.api_addr, "0.0.0.0:9000");
    assert_eq!(cfg.detector.backend, "stub");
    assert_eq!(cfg.detector.min_confidence, 0.25);

    clear_env();
}

#[test]
fn rejects_out_of_range_confidence() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("WAYFINDER_MIN_CONFIDENCE", "1.5");
    assert!(WayfinderdConfig::load().is_err());

    std::env::set_var("WAYFINDER_MIN_CONFIDENCE", "not a float");
    assert!(WayfinderdConfig::load().is_err());

    clear_env();
}
