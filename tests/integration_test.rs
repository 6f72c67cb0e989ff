// Integration tests for pydoc-md

use assert_cmd::Command;
use predicates::prelude::*;
use pydoc_md::{Config, DocGenerator, EmptyDirs, Error, OsFs, ParseErrorPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const A_PY: &str = r#"def f(x: int) -> int:
    """Double the input."""
    return x * 2


def _g():
    pass
"#;

const B_PY: &str = r#"class C:
    """A small class."""

    def m(self):
        pass

    def _hidden(self):
        pass
"#;

/// Source tree with `pkg/a.py`, `pkg/sub/b.py` and a directory holding no sources
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pkg/a.py", A_PY);
    write(dir.path(), "pkg/sub/b.py", B_PY);
    write(dir.path(), "pkg/assets/deep/logo.txt", "not python");
    write(dir.path(), "pkg/__pycache__/a.cpython-311.py", "def cached(): pass\n");
    dir
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn generate(source: &Path, output: &Path, config: &Config) -> pydoc_md::Result<pydoc_md::GenerationReport> {
    DocGenerator::new(&OsFs, config)?.generate(source, output)
}

/// Every path under `root`, relative and sorted, directories suffixed with `/`
fn listing(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            if e.file_type().is_dir() { format!("{}/", rel) } else { rel }
        })
        .collect();
    paths.sort();
    paths
}

fn bin() -> Command {
    Command::cargo_bin("pydoc-md").unwrap()
}

// ============================================================================
// Library Tests
// ============================================================================

#[test]
fn test_end_to_end_tree() {
    let source = sample_project();
    let output = TempDir::new().unwrap();

    let report = generate(source.path(), output.path(), &Config::default()).unwrap();
    assert_eq!(report.pages_written, 2);
    assert!(report.skipped.is_empty());

    assert_eq!(
        listing(output.path()),
        vec!["README.md", "SUMMARY.md", "pkg/", "pkg/a.md", "pkg/sub/", "pkg/sub/b.md"]
    );

    let a = fs::read_to_string(output.path().join("pkg/a.md")).unwrap();
    assert!(a.starts_with("# a.py"));
    assert!(a.contains("f(x: int) -> int"));
    assert!(a.contains("Double the input."));
    assert!(!a.contains("_g"));
    assert!(a.contains("*No classes*"));

    let b = fs::read_to_string(output.path().join("pkg/sub/b.md")).unwrap();
    assert!(b.contains("### class `C`"));
    assert!(b.contains("A small class."));
    assert!(b.contains("m(self)"));
    assert!(!b.contains("_hidden"));
    assert!(b.contains("*No functions*"));

    let summary = fs::read_to_string(output.path().join("SUMMARY.md")).unwrap();
    assert_eq!(
        summary,
        "* [pkg]()\n    * [a](pkg/a.md)\n    * [sub]()\n        * [b](pkg/sub/b.md)\n"
    );
}

#[test]
fn test_output_root_must_exist() {
    let source = sample_project();
    let parent = TempDir::new().unwrap();
    let missing = parent.path().join("docs");

    let err = generate(source.path(), &missing, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::OutputDirNotFound(_)));
    assert!(!missing.exists());
}

#[test]
fn test_idempotent_output() {
    let source = sample_project();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    generate(source.path(), first.path(), &Config::default()).unwrap();
    generate(source.path(), second.path(), &Config::default()).unwrap();

    let files = listing(first.path());
    assert_eq!(files, listing(second.path()));
    for file in files.iter().filter(|f| !f.ends_with('/')) {
        let left = fs::read(first.path().join(file)).unwrap();
        let right = fs::read(second.path().join(file)).unwrap();
        assert_eq!(left, right, "{} differs between runs", file);
    }
}

#[test]
fn test_prune_strategy_matches_lookahead() {
    let source = sample_project();
    let lookahead = TempDir::new().unwrap();
    let pruned = TempDir::new().unwrap();

    let mut config = Config::default();
    generate(source.path(), lookahead.path(), &config).unwrap();

    config.output.empty_dirs = EmptyDirs::Prune;
    let report = generate(source.path(), pruned.path(), &config).unwrap();
    assert_eq!(report.directories_pruned, 2);

    assert_eq!(listing(lookahead.path()), listing(pruned.path()));
}

#[test]
fn test_parse_error_aborts_by_default() {
    let source = sample_project();
    write(source.path(), "pkg/broken.py", "def broken(:\n    pass\n");
    let output = TempDir::new().unwrap();

    let err = generate(source.path(), output.path(), &Config::default()).unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().contains("broken.py"));
    assert!(!output.path().join("SUMMARY.md").exists());
}

#[test]
fn test_parse_error_skipped_when_configured() {
    let source = sample_project();
    write(source.path(), "pkg/broken.py", "def broken(:\n    pass\n");
    let output = TempDir::new().unwrap();

    let mut config = Config::default();
    config.output.on_parse_error = ParseErrorPolicy::Skip;
    let report = generate(source.path(), output.path(), &config).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("broken.py"));
    assert!(!output.path().join("pkg/broken.md").exists());
    assert!(output.path().join("pkg/a.md").exists());
}

#[test]
fn test_config_file_overrides() {
    let source = sample_project();
    let output = TempDir::new().unwrap();
    let config_path = source.path().join("pydoc-md.toml");
    fs::write(
        &config_path,
        r#"
[source]
exclude = ["**/sub"]

[output]
summary_file = "NAV.md"
no_classes = "Nothing here."
"#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    generate(source.path(), output.path(), &config).unwrap();

    assert!(output.path().join("NAV.md").exists());
    assert!(!output.path().join("pkg/sub").exists());
    let a = fs::read_to_string(output.path().join("pkg/a.md")).unwrap();
    assert!(a.contains("Nothing here."));
}

#[test]
fn test_template_override_directory() {
    let source = sample_project();
    let output = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    fs::write(
        templates.path().join("function.md.tera"),
        "- {{ name }}: {{ signature }}\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.templates.directory = Some(PathBuf::from(templates.path()));
    generate(source.path(), output.path(), &config).unwrap();

    let a = fs::read_to_string(output.path().join("pkg/a.md")).unwrap();
    assert!(a.contains("- f: f(x: int) -> int"));
    // file template still the built-in one
    assert!(a.contains("## Functions"));
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_generate() {
    let source = sample_project();
    let output = TempDir::new().unwrap();

    bin()
        .arg("generate")
        .arg("--dir")
        .arg(source.path())
        .arg("--out-dir")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 pages"));

    assert!(output.path().join("pkg/sub/b.md").exists());
    assert!(output.path().join("README.md").exists());
}

#[test]
fn test_cli_missing_output_root() {
    let source = sample_project();
    let parent = TempDir::new().unwrap();

    bin()
        .args(["generate", "-d"])
        .arg(source.path())
        .arg("-o")
        .arg(parent.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output directory does not exist"));
}

#[test]
fn test_cli_parse_failure_exit_code() {
    let source = sample_project();
    write(source.path(), "pkg/broken.py", "class Broken(\n");
    let output = TempDir::new().unwrap();

    bin()
        .args(["generate", "-d"])
        .arg(source.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.py"));

    bin()
        .args(["generate", "--skip-invalid", "-d"])
        .arg(source.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 1 unparsable"));
}

#[test]
fn test_cli_inspect() {
    let source = sample_project();
    let file = source.path().join("pkg/a.py");

    bin()
        .arg("inspect")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("# a.py").and(predicate::str::contains("f(x: int) -> int")));

    bin()
        .arg("inspect")
        .arg(&file)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\"").and(predicate::str::contains("\"signature\": \"f(x: int) -> int\"")));
}

#[test]
fn test_cli_version() {
    bin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pydoc-md "));
}
