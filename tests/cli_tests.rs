//! End-to-end tests for the command line interface

mod common;

use assert_cmd::Command;
use common::TestApp;
use kodegen_bundler_electron::bundler::Platform;
use predicates::prelude::*;

fn bundler_cmd(app: &TestApp) -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_electron").unwrap();
    cmd.arg("--app-dir")
        .arg(app.path())
        .env_remove("KODEGEN_BUNDLE_ARCH");
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("kodegen_bundler_electron")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--continue-on-failure"))
        .stdout(predicate::str::contains("--platform"));
}

#[test]
fn test_dry_run_prints_commands() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "x64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("macOS (x64)"))
        .stdout(predicate::str::contains("--platform=darwin"))
        .stdout(predicate::str::contains("--platform=win32"))
        .stdout(predicate::str::contains("electron-installer-debian"))
        .stdout(predicate::str::contains("x86_64"));

    assert!(!app.out_dir().exists(), "dry run must not create output");
}

#[test]
fn test_arch_from_environment() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--platform", "linux"])
        .env("KODEGEN_BUNDLE_ARCH", "arm64")
        .assert()
        .success()
        .stdout(predicate::str::contains("--arch=arm64"))
        .stdout(predicate::str::contains("aarch64"));
}

#[test]
fn test_unsupported_architecture() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "sparc"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported architecture: sparc"));
}

#[test]
fn test_unknown_platform() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "x64", "--platform", "beos"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported platform: beos"));
}

#[test]
fn test_dry_run_with_missing_icon_fails() {
    let app = TestApp::new();
    app.remove_icon(Platform::Darwin);

    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "x64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("icon.icns"));
}

#[test]
fn test_name_override_and_missing_name() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "x64", "--platform", "win32"])
        .args(["--name", "Renamed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed --platform=win32"));

    std::fs::write(app.path().join("package.json"), "{}").unwrap();
    bundler_cmd(&app)
        .args(["--dry-run", "--arch", "x64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_zero_step_timeout_is_rejected() {
    let app = TestApp::new();

    bundler_cmd(&app)
        .args(["--dry-run", "--step-timeout", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--step-timeout"));
}

#[cfg(unix)]
fn use_shell_tools(app: &TestApp) {
    std::fs::write(
        app.path().join("bundle.toml"),
        "[tools]\nrunner = \"sh\"\n",
    )
    .unwrap();
}

#[cfg(unix)]
#[test]
fn test_successful_build() {
    let app = TestApp::new();
    use_shell_tools(&app);
    app.write_script("electron-packager", "mkdir -p build/CopyCat-win32-x64 && echo packaged");

    bundler_cmd(&app)
        .args(["--arch", "x64", "--platform", "win32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundling CopyCat 1.4.2"))
        .stdout(predicate::str::contains("packaged"))
        .stdout(predicate::str::contains("completed successfully"));

    assert!(app.out_dir().join("CopyCat-win32-x64").is_dir());
}

#[cfg(unix)]
#[test]
fn test_failing_installer_fails_the_run() {
    let app = TestApp::new();
    use_shell_tools(&app);
    app.write_script("electron-packager", "exit 0");
    app.write_script(
        "electron-installer-debian",
        "echo 'dpkg-deb not found' >&2; exit 4",
    );

    bundler_cmd(&app)
        .args(["--arch", "x64", "--platform", "linux"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dpkg-deb not found"))
        .stderr(predicate::str::contains("exit code 4"))
        .stderr(predicate::str::contains("Build failed"));
}

#[cfg(unix)]
#[test]
fn test_stop_and_continue_policies() {
    let app = TestApp::new();
    use_shell_tools(&app);
    // Fails for win32 only; records every platform it was asked to package.
    app.write_script(
        "electron-packager",
        "echo \"$3\" >> packaged.log; [ \"$3\" != --platform=win32 ]",
    );
    app.write_script("electron-installer-dmg", "exit 0");
    app.write_script("electron-installer-debian", "exit 0");
    app.write_script("electron-installer-redhat", "exit 0");

    bundler_cmd(&app)
        .args(["--arch", "x64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 not attempted"));
    let log = std::fs::read_to_string(app.path().join("packaged.log")).unwrap();
    assert_eq!(log, "--platform=darwin\n--platform=win32\n");

    std::fs::remove_file(app.path().join("packaged.log")).unwrap();
    bundler_cmd(&app)
        .args(["--arch", "x64", "--continue-on-failure"])
        .assert()
        .code(1);
    let log = std::fs::read_to_string(app.path().join("packaged.log")).unwrap();
    assert_eq!(
        log,
        "--platform=darwin\n--platform=win32\n--platform=linux\n"
    );
}

#[cfg(unix)]
#[test]
fn test_report_is_written() {
    let app = TestApp::new();
    use_shell_tools(&app);
    app.write_script("electron-packager", "exit 0");
    let report = app.path().join("reports/build.json");

    bundler_cmd(&app)
        .args(["--arch", "arm64", "--platform", "win32", "--report"])
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["product_name"], "CopyCat");
    assert_eq!(json["version"], "1.4.2");
    assert_eq!(json["requested"], 1);
    assert_eq!(json["failure_policy"], "stop-on-first-failure");
    assert_eq!(json["results"][0]["state"], "succeeded");
    assert_eq!(json["results"][0]["target"]["platform"], "win32");
    assert_eq!(json["results"][0]["target"]["arch"], "arm64");
}

#[cfg(unix)]
#[test]
fn test_out_directory_from_config() {
    let app = TestApp::new();
    std::fs::write(
        app.path().join("bundle.toml"),
        "[output]\ndir = \"dist\"\n\n[tools]\nrunner = \"sh\"\n",
    )
    .unwrap();
    app.write_script("electron-packager", "exit 0");

    bundler_cmd(&app)
        .args(["--arch", "x64", "--platform", "win32"])
        .assert()
        .success();

    assert!(app.path().join("dist").is_dir());
    assert!(!app.out_dir().exists());
}

#[cfg(unix)]
#[test]
fn test_runner_exit_status_decides_the_outcome() {
    let app = TestApp::new();

    std::fs::write(app.path().join("bundle.toml"), "[tools]\nrunner = \"true\"\n").unwrap();
    bundler_cmd(&app).args(["--arch", "x64"]).assert().success();

    std::fs::write(app.path().join("bundle.toml"), "[tools]\nrunner = \"false\"\n").unwrap();
    bundler_cmd(&app)
        .args(["--arch", "x64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exit code 1"));
}
