//! Integration tests for the localdeps binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_plugin(manifest: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("requirements.txt"), manifest).unwrap();
    temp
}

fn write_dist_info(deps_dir: &Path, name: &str, version: &str) {
    let info = deps_dir.join(format!("{}-{}.dist-info", name, version));
    fs::create_dir_all(&info).unwrap();
    fs::write(
        info.join("METADATA"),
        format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version),
    )
    .unwrap();
}

fn localdeps(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("localdeps"));
    cmd.current_dir(dir)
        .env_remove("LOCALDEPS_PYTHON")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("localdeps"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Private Python dependencies"))
        .stdout(predicate::str::contains("install"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("localdeps"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("localdeps"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn check_without_deps_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six>=1.10,<2.0\n");
    localdeps(temp.path())
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Dependencies are not installed"));
    Ok(())
}

#[test]
fn check_with_installed_deps_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six>=1.10,<2.0\n");
    write_dist_info(&temp.path().join("deps_public"), "six", "1.16.0");
    localdeps(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All dependencies are installed"));
    Ok(())
}

#[test]
fn check_json_reports_each_requirement() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\nrequests\n");
    write_dist_info(&temp.path().join("deps_public"), "six", "1.16.0");
    let output = localdeps(temp.path())
        .args(["check", "--json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(report["satisfied"], false);
    assert_eq!(report["state"], "unsatisfied");
    assert_eq!(report["requirements"][0]["status"], "satisfied");
    assert_eq!(report["requirements"][0]["version"], "1.16.0");
    assert_eq!(report["requirements"][1]["status"], "missing");
    Ok(())
}

#[test]
fn list_prints_names() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("# plugin deps\nsix>=1.10\nrequests[socks]\n");
    localdeps(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("six"))
        .stdout(predicate::str::contains("requests"));
    Ok(())
}

#[test]
fn list_with_bad_manifest_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\n=>2\n");
    localdeps(temp.path())
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
    Ok(())
}

#[test]
fn project_flag_overrides_current_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\n");
    let elsewhere = TempDir::new()?;
    localdeps(elsewhere.path())
        .args(["list", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("six"));
    Ok(())
}

#[test]
fn configured_deps_dir_is_used() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\n");
    fs::create_dir_all(temp.path().join(".localdeps"))?;
    fs::write(temp.path().join(".localdeps/config.yml"), "deps_dir: vendor\n")?;
    write_dist_info(&temp.path().join("vendor"), "six", "1.16.0");
    localdeps(temp.path()).arg("check").assert().success();
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\n");
    fs::create_dir_all(temp.path().join(".localdeps"))?;
    fs::write(
        temp.path().join(".localdeps/config.yml"),
        "install_timeout_secs: 0\n",
    )?;
    localdeps(temp.path())
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("install_timeout_secs"));
    Ok(())
}

#[test]
fn panel_lists_requirements() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_plugin("six\nrequests\n");
    localdeps(temp.path())
        .arg("panel")
        .assert()
        .success()
        .stdout(predicate::str::contains("- six"))
        .stdout(predicate::str::contains("- requests"));
    Ok(())
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const LANDING_PYTHON: &str = r#"#!/bin/sh
case "$2" in
  ensurepip) exit 0 ;;
esac
while [ $# -gt 0 ]; do
  if [ "$1" = "--target" ]; then target="$2"; fi
  shift
done
echo "Collecting six"
mkdir -p "$target/six-1.16.0.dist-info"
printf 'Metadata-Version: 2.1\nName: six\nVersion: 1.16.0\n' > "$target/six-1.16.0.dist-info/METADATA"
echo "Successfully installed six-1.16.0"
"#;

    fn with_python(temp: &TempDir, script: &str) {
        let python = temp.path().join("fake-python");
        fs::write(&python, script).unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
        fs::create_dir_all(temp.path().join(".localdeps")).unwrap();
        fs::write(
            temp.path().join(".localdeps/config.yml"),
            format!("python: {}\n", python.display()),
        )
        .unwrap();
    }

    #[test]
    fn install_then_check_succeeds() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_plugin("six>=1.10\n");
        with_python(&temp, LANDING_PYTHON);

        localdeps(temp.path())
            .args(["install", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Dependencies installed"));
        assert!(temp.path().join("deps_public/six-1.16.0.dist-info").is_dir());

        localdeps(temp.path()).arg("check").assert().success();
        Ok(())
    }

    #[test]
    fn install_exit_zero_without_packages_fails() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_plugin("six\n");
        with_python(&temp, "#!/bin/sh\nexit 0\n");

        localdeps(temp.path())
            .args(["install", "--yes"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Dependencies are not installed"));
        Ok(())
    }

    #[test]
    fn install_failure_exits_1() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_plugin("six\n");
        with_python(&temp, "#!/bin/sh\necho 'No matching distribution' >&2\nexit 1\n");

        localdeps(temp.path())
            .args(["install", "--yes"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Dependencies are not installed"));
        Ok(())
    }

    #[test]
    fn python_env_var_overrides_config() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_plugin("six\n");
        with_python(&temp, "#!/bin/sh\nexit 1\n");
        let landing = temp.path().join("landing-python");
        fs::write(&landing, LANDING_PYTHON)?;
        fs::set_permissions(&landing, fs::Permissions::from_mode(0o755))?;

        localdeps(temp.path())
            .env("LOCALDEPS_PYTHON", &landing)
            .args(["install", "--yes"])
            .assert()
            .success();
        Ok(())
    }

    #[test]
    fn exercise_passes_search_path() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_plugin("six\n");
        with_python(&temp, "#!/bin/sh\necho \"${PYTHONPATH##*:}/six.py\"\n");

        localdeps(temp.path())
            .args(["exercise", "six"])
            .assert()
            .success()
            .stdout(predicate::str::contains("deps_public/six.py"));
        Ok(())
    }
}
