//! CLI integration tests for modbound.
//!
//! These tests drive the binary against small on-disk trees.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the modbound binary command, isolated from any user config.
fn modbound(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("modbound").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1");
    cmd
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A root module with two library packages beneath it.
fn demo_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("repo");
    write(&root, "go.mod", "module example.com/demo\n\ngo 1.21\n");
    write(&root, "pkg/a/BUILD.bazel", "go_library(name = \"lib1\")\n");
    write(&root, "pkg/b/BUILD.bazel", "go_library(name = \"lib2\")\n");
    tmp
}

const EXPECTED_ROOT_BUILD: &str = r#"load("//rules/go_mod:go_mod.bzl", "go_mod")

go_mod(
    name = "go_mod_dir",
    module_path = "example.com/demo",
    go_mod = ":go.mod",
    deps = [
        "//pkg/a:lib1",
        "//pkg/b:lib2",
    ],
)
"#;

// ============================================================================
// modbound generate
// ============================================================================

#[test]
fn test_generate_writes_module_rule() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com/demo //:go_mod_dir (2 deps)"))
        .stdout(predicate::str::contains("Updated 1 build file(s)"));

    let text = fs::read_to_string(root.join("BUILD.bazel")).unwrap();
    assert_eq!(text, EXPECTED_ROOT_BUILD);
}

#[test]
fn test_generate_defaults_to_current_directory() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path())
        .arg("generate")
        .current_dir(&root)
        .assert()
        .success();

    assert!(root.join("BUILD.bazel").exists());
}

#[test]
fn test_generate_twice_changes_nothing() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path()).arg("generate").arg(&root).assert().success();
    modbound(tmp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 0 build file(s)"));

    let text = fs::read_to_string(root.join("BUILD.bazel")).unwrap();
    assert_eq!(text, EXPECTED_ROOT_BUILD);
}

#[test]
fn test_generate_dry_run_leaves_tree_untouched() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path())
        .args(["generate", "--dry-run"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would update 1 build file(s)"));

    assert!(!root.join("BUILD.bazel").exists());
}

#[test]
fn test_generate_json_report() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    let output = modbound(tmp.path())
        .args(["generate", "--json", "--dry-run"])
        .arg(&root)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["directories"], 4);
    assert_eq!(report["skipped"], serde_json::json!([]));
    let emitted = report["emitted"].as_array().unwrap();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0]["package"], "");
    assert_eq!(emitted[0]["kind"], "go_mod");
    assert_eq!(emitted[0]["module_path"], "example.com/demo");
    assert_eq!(
        emitted[0]["deps"],
        serde_json::json!(["//pkg/a:lib1", "//pkg/b:lib2"])
    );
}

#[test]
fn test_generate_honors_project_config() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");
    write(&root, ".modbound.toml", "[rule]\nname = \"module\"\n");

    modbound(tmp.path()).arg("generate").arg(&root).assert().success();

    let text = fs::read_to_string(root.join("BUILD.bazel")).unwrap();
    assert!(text.contains("name = \"module\""));
}

#[test]
fn test_generate_leaves_unparseable_build_file_untouched() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");
    let broken = "go_library(\n    name = \"lib1\",\n    srcs = [\"a.go\",\n)\n";
    write(&root, "pkg/a/BUILD.bazel", broken);

    modbound(tmp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("expected `]`, found `)`"))
        .stderr(predicate::str::contains("left untouched"));

    assert_eq!(fs::read_to_string(root.join("pkg/a/BUILD.bazel")).unwrap(), broken);
    let text = fs::read_to_string(root.join("BUILD.bazel")).unwrap();
    assert!(text.contains("deps = [\"//pkg/b:lib2\"]"));
}

#[test]
fn test_generate_keeps_comments_and_package_calls() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");
    write(
        &root,
        "BUILD.bazel",
        "# keep: owned by platform team\npackage(default_visibility = [\"//visibility:public\"])\n",
    );

    modbound(tmp.path()).arg("generate").arg(&root).assert().success();

    let text = fs::read_to_string(root.join("BUILD.bazel")).unwrap();
    assert!(text.contains("# keep: owned by platform team\npackage("));
    assert!(text.contains("go_mod("));
}

#[test]
fn test_generate_skips_bad_manifest() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");
    write(&root, "go.mod", "go 1.21\n");

    modbound(tmp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("module"));

    assert!(!root.join("BUILD.bazel").exists());
}

// ============================================================================
// modbound resolve
// ============================================================================

#[test]
fn test_resolve_ancestor() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path())
        .arg("resolve")
        .arg(root.join("pkg/a"))
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("repo"))
        .stdout(predicate::str::contains("(self)").not());
}

#[test]
fn test_resolve_current() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");

    modbound(tmp.path())
        .arg("resolve")
        .arg(&root)
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("(self)"));
}

#[test]
fn test_resolve_without_manifest() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("repo");
    fs::create_dir_all(root.join("src")).unwrap();

    modbound(tmp.path())
        .arg("resolve")
        .arg(root.join("src"))
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::diff("none\n"));
}

#[test]
fn test_resolve_outside_root_fails() {
    let tmp = demo_tree();
    let root = tmp.path().join("repo");
    let outside = tmp.path().join("elsewhere");
    fs::create_dir_all(&outside).unwrap();

    modbound(tmp.path())
        .arg("resolve")
        .arg(&outside)
        .arg("--root")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not inside the configured root"))
        .stderr(predicate::str::contains("--root"));
}

// ============================================================================
// modbound completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    modbound(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modbound"));
}

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();

    modbound(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("completions"));
}
