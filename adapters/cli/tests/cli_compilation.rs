use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "tidewater"])
        .status()
        .expect("failed to invoke cargo check for tidewater CLI binary");

    assert!(status.success(), "cargo check --bin tidewater should succeed");
}

#[test]
fn headless_run_prints_final_report() {
    let output = Command::new(env!("CARGO_BIN_EXE_tidewater"))
        .args(["--ticks", "20", "--tick-ms", "250", "--order", "1:stone"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run tidewater binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Tidewater."), "{stdout}");
    assert!(stdout.contains("after 20 ticks (5.0s simulated)"), "{stdout}");
}

#[test]
fn unknown_order_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_tidewater"))
        .args(["--order", "1:gold"])
        .output()
        .expect("failed to run tidewater binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a harvestable resource"), "{stderr}");
}
