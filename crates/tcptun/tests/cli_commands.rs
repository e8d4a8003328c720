#![cfg(all(unix, feature = "cli"))]

use std::process::Command;

fn tcptun() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tcptun"));
    cmd.env_remove("TCPTUN_INTERFACE")
        .env_remove("TCPTUN_PORT")
        .env_remove("TCPTUN_LOG_LEVEL");
    cmd
}

#[test]
fn version_reports_package_version() {
    let output = tcptun().arg("version").output().expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("tcptun {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_reports_build_details() {
    let output = tcptun()
        .arg("version")
        .arg("--extended")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: tcptun"));
    assert!(stdout.contains("target_os: "));
    assert!(stdout.contains("wire_format: "));
}

#[cfg(target_os = "linux")]
#[test]
fn doctor_passes_on_clean_env() {
    let output = tcptun()
        .arg("--format")
        .arg("json")
        .arg("doctor")
        .output()
        .expect("doctor should run");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("doctor output should be json");
    assert_eq!(report["overall"], "pass");
    assert!(report["checks"]
        .as_array()
        .map(|checks| checks.iter().any(|c| c["name"] == "loopback_tcp"))
        .unwrap_or(false));
}

#[test]
fn missing_interface_is_a_usage_error() {
    let output = tcptun().arg("server").output().expect("server should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--interface"));
}

#[cfg(target_os = "linux")]
#[test]
fn overlong_interface_name_exits_64() {
    let output = tcptun()
        .arg("--log-level")
        .arg("error")
        .arg("server")
        .arg("-i")
        .arg("this-name-is-too-long")
        .arg("-p")
        .arg("0")
        .output()
        .expect("server should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interface name too long"));
}

#[test]
fn unresolvable_server_exits_3() {
    let output = tcptun()
        .arg("--log-level")
        .arg("error")
        .arg("client")
        .arg("-i")
        .arg("tun0")
        .arg("host.invalid")
        .output()
        .expect("client should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resolve failed"));
}
