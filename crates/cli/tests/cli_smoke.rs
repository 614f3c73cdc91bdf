//! CLI smoke tests for luapack.
//!
//! These tests verify that the commands run end to end against a scratch
//! project and return appropriate exit codes.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the luapack binary.
fn luapack_cmd() -> Command {
  cargo_bin_cmd!("luapack")
}

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Create a buildable scratch project with all three default entries.
fn temp_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let root = temp.path();

  write(root, "version.txt", "0.9.0\n");
  write(root, "src/compiler.lua", "require \"src.shared\"\nreturn shared()\n");
  write(root, "src/runtime.lua", "require \"src.shared\"\nreturn shared()\n");
  write(root, "src/shared.lua", "function shared()\n  return 1 -- stub\nend\n");
  write(
    root,
    "src/standalone.lua",
    "local c = --[[build-embed \"build/compiler.lua\"]]--[[/build-embed]]\nreturn #c\n",
  );

  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  luapack_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  luapack_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("luapack"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "minify"] {
    luapack_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// build
// =============================================================================

#[test]
fn build_all_default_targets() {
  let temp = temp_project();

  luapack_cmd()
    .arg("build")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("compiler"));

  assert!(temp.path().join("build/compiler.lua").exists());
  assert!(temp.path().join("build/runtime.lua").exists());
  assert!(temp.path().join("build/standalone.lua").exists());
}

#[test]
fn build_single_target() {
  let temp = temp_project();

  luapack_cmd()
    .arg("build")
    .arg("runtime")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success();

  assert!(temp.path().join("build/runtime.lua").exists());
  assert!(!temp.path().join("build/compiler.lua").exists());
}

#[test]
fn build_respects_out_dir() {
  let temp = temp_project();

  luapack_cmd()
    .arg("build")
    .arg("compiler")
    .arg("--root")
    .arg(temp.path())
    .arg("--out-dir")
    .arg(temp.path().join("dist"))
    .assert()
    .success();

  assert!(temp.path().join("dist/compiler.lua").exists());
  assert!(!temp.path().join("build").exists());
}

#[test]
fn build_unknown_target_fails() {
  let temp = temp_project();

  luapack_cmd()
    .arg("build")
    .arg("bogus")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown target"));
}

#[test]
fn build_missing_entry_fails() {
  let temp = temp_project();
  fs::remove_file(temp.path().join("src/runtime.lua")).unwrap();

  luapack_cmd()
    .arg("build")
    .arg("runtime")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure();
}

#[test]
fn failed_target_does_not_abort_siblings() {
  let temp = temp_project();
  fs::remove_file(temp.path().join("src/runtime.lua")).unwrap();

  luapack_cmd()
    .arg("build")
    .arg("runtime")
    .arg("compiler")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("runtime"));

  // The sibling after the failure still built.
  assert!(temp.path().join("build/compiler.lua").exists());
}

#[test]
fn quiet_flag_suppresses_progress() {
  let temp = temp_project();

  luapack_cmd()
    .arg("--quiet")
    .arg("build")
    .arg("compiler")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
}

#[test]
fn json_format_prints_report() {
  let temp = temp_project();

  luapack_cmd()
    .arg("build")
    .arg("compiler")
    .arg("--root")
    .arg(temp.path())
    .arg("--format")
    .arg("json")
    .assert()
    .success()
    .stdout(predicate::str::contains("\"artifact_bytes\""));
}

// =============================================================================
// minify
// =============================================================================

#[test]
fn minify_prints_to_stdout() {
  let temp = TempDir::new().unwrap();
  let file = temp.path().join("input.lua");
  fs::write(&file, "local  x = 1 -- gone\nreturn x\n").unwrap();

  luapack_cmd()
    .arg("minify")
    .arg(&file)
    .assert()
    .success()
    .stdout(predicate::str::contains("local x=1 return x"));
}

#[test]
fn minify_missing_file_fails() {
  luapack_cmd()
    .arg("minify")
    .arg("/nonexistent/input.lua")
    .assert()
    .failure();
}

#[test]
fn minify_malformed_input_fails() {
  let temp = TempDir::new().unwrap();
  let file = temp.path().join("bad.lua");
  fs::write(&file, "x = \u{1}\n").unwrap();

  luapack_cmd()
    .arg("minify")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("unrecognized character"));
}
