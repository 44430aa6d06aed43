use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("textinc").unwrap();
    cmd.env_remove("TEXTINC_INCLUDE_PATH")
        .env_remove("TEXTINC_MARKER")
        .env_remove("RUST_LOG");
    cmd
}

fn tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("inc")).unwrap();
    fs::write(
        temp.path().join("main.c"),
        "top\n#include \"local.h\"\n#include <sys.h>\nbottom\n",
    )
    .unwrap();
    fs::write(temp.path().join("local.h"), "local\n").unwrap();
    fs::write(temp.path().join("inc/sys.h"), "sys\n").unwrap();
    temp
}

#[test]
fn flatten_to_stdout() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "-I", "inc"])
        .assert()
        .success()
        .stdout("top\nlocal\nsys\nbottom\n");
}

#[test]
fn flatten_to_file() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "-I", "inc", "-o", "flat.c"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(
        fs::read_to_string(temp.path().join("flat.c")).unwrap(),
        "top\nlocal\nsys\nbottom\n"
    );
}

#[test]
fn search_path_from_env() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .env("TEXTINC_INCLUDE_PATH", "inc")
        .args(["main.c", "-o", "flat.c"])
        .assert()
        .success();
}

#[test]
fn unresolved_include_prints_diagnostic() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "-o", "flat.c"])
        .assert()
        .code(1)
        .stdout("unknown include file sys.h at file main.c at line 3\n");
    assert_eq!(
        fs::read_to_string(temp.path().join("flat.c")).unwrap(),
        "top\nlocal\n"
    );
}

#[test]
fn missing_input_fails() {
    let temp = TempDir::new().unwrap();
    cmd()
        .current_dir(temp.path())
        .args(["nope.c", "-o", "out.c"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("Cannot open input file"));
    assert!(!temp.path().join("out.c").exists());
}

#[test]
fn check_mode() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "-I", "inc", "--check"])
        .assert()
        .success()
        .stdout("");
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "--check"])
        .assert()
        .code(1)
        .stdout(contains("unknown include file sys.h"));
}

#[test]
fn list_plain() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "--list"])
        .assert()
        .success()
        .stdout(contains("main.c:2: \"local.h\" -> local.h"))
        .stdout(contains("main.c:3: <sys.h> -> (unresolved)"));
}

#[test]
fn list_json() {
    let temp = tree();
    let output = cmd()
        .current_dir(temp.path())
        .args(["main.c", "-I", "inc", "--list=json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["form"], "angled");
    assert_eq!(records[1]["resolved"], "inc/sys.h");
}

#[test]
fn custom_marker() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.css"), "@import \"a.css\"\nbody {}\n").unwrap();
    fs::write(temp.path().join("a.css"), "a {}\n").unwrap();
    cmd()
        .current_dir(temp.path())
        .args(["main.css", "--marker", "@import"])
        .assert()
        .success()
        .stdout("a {}\nbody {}\n");
}

#[test]
fn marker_from_env() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.s"), ".include \"defs.s\"\nnop\n").unwrap();
    fs::write(temp.path().join("defs.s"), ".equ X, 1\n").unwrap();
    cmd()
        .current_dir(temp.path())
        .env("TEXTINC_MARKER", r"\.include")
        .arg("main.s")
        .assert()
        .success()
        .stdout(".equ X, 1\nnop\n");
}

#[test]
fn directory_include_is_empty() {
    let temp = tree();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("dir.c"), "a\n#include \"sub\"\nb\n").unwrap();
    cmd()
        .current_dir(temp.path())
        .arg("dir.c")
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn invalid_marker_is_usage_error() {
    let temp = tree();
    cmd()
        .current_dir(temp.path())
        .args(["main.c", "--marker", "(oops"])
        .assert()
        .code(2)
        .stderr(contains("Invalid directive syntax"));
}

#[test]
fn circular_include_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.h"), "#include \"a.h\"\n").unwrap();
    cmd()
        .current_dir(temp.path())
        .arg("a.h")
        .assert()
        .code(1)
        .stderr(contains("Circular include").and(contains("a.h")));
}
