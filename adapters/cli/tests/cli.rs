use std::{path::PathBuf, process::Command};

fn outpost() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_outpost"));
    let _ = command.env("RUST_LOG", "info");
    command
}

#[test]
fn idle_session_runs_to_completion() {
    let output = outpost()
        .args(["--ticks", "200", "--seed", "7"])
        .output()
        .expect("failed to launch the outpost binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("headless run finished"), "{stdout}");
    assert!(stdout.contains("frames=200"), "{stdout}");
}

#[test]
fn bundled_script_replays() {
    let script = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts/patrol.toml");
    let output = outpost()
        .arg("--script")
        .arg(&script)
        .output()
        .expect("failed to launch the outpost binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frames=332"), "{stdout}");
    assert!(stdout.contains("buildings=1"), "{stdout}");
}

#[test]
fn missing_script_fails_with_context() {
    let output = outpost()
        .args(["--script", "/nonexistent/outpost.toml"])
        .output()
        .expect("failed to launch the outpost binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not load script"), "{stderr}");
}
