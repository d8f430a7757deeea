use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_verdict"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "verdict init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".verdict.toml");
    assert!(config_path.exists(), ".verdict.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[rules]"));
    assert!(content.contains("[filter]"));

    // Verify it's valid TOML that verdict-core can parse
    let config: verdict_core::VerdictConfig = toml::from_str(&content).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".verdict.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_verdict"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
