use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_pawpal");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run pawpal --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("conflicts"));
}

#[test]
fn cli_smoke_subcommand_help() {
    let exe = env!("CARGO_BIN_EXE_pawpal");
    let output = Command::new(exe)
        .args(["task", "add", "--help"])
        .output()
        .expect("failed to run pawpal task add --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--repeat"));
}
