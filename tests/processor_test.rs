use pyboil::error::{Error, Result};
use pyboil::ignore::parse_keep_patterns;
use pyboil::processor::{MaterializeOptions, Materializer, OverwritePolicy};
use pyboil::renderer::{MiniJinjaRenderer, TemplateRenderer};
use pyboil::template::{Registry, Template};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const EXPECTED_ENTRIES: [&str; 7] = [
    "main.py",
    "install.sh",
    "requirements.txt",
    "config.json",
    ".gitignore",
    "README.md",
    "data",
];

fn options(output_dir: &Path) -> MaterializeOptions {
    MaterializeOptions { output_dir: output_dir.to_path_buf(), ..Default::default() }
}

fn entries(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn expected_entries() -> BTreeSet<String> {
    EXPECTED_ENTRIES.iter().map(|e| e.to_string()).collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o100 != 0
}

#[test_log::test]
fn test_materialize_creates_exact_entry_set() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let result = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("demo"))
        .unwrap();

    let root = temp_dir.path().join("demo");
    assert_eq!(result.root, root);
    assert_eq!(result.project_name, "demo");
    assert_eq!(entries(&root), expected_entries());
    assert!(result.removed.is_empty());

    let written: Vec<PathBuf> = EXPECTED_ENTRIES.iter().map(|e| root.join(e)).collect();
    assert_eq!(result.written, written);
}

#[test_log::test]
fn test_acme_tool_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("acme-tool"))
        .unwrap();

    let root = temp_dir.path().join("acme-tool");
    assert!(root.is_dir());

    let readme = fs::read_to_string(root.join("README.md")).unwrap();
    let first_line = readme.lines().next().unwrap();
    assert!(first_line.contains("acme-tool"));
    assert!(readme.contains("acme-tool/\n"));
    assert!(!readme.contains("{{"));

    let data = root.join("data");
    assert!(data.is_dir());
    assert_eq!(fs::read_dir(&data).unwrap().count(), 0);

    assert!(root.join("main.py").is_file());
    #[cfg(unix)]
    {
        assert!(is_executable(&root.join("main.py")));
        assert!(is_executable(&root.join("install.sh")));
    }
}

#[test]
fn test_literal_templates_written_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let result = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("verbatim"))
        .unwrap();

    for template in registry.templates().filter(|t| !t.render) {
        let content = fs::read_to_string(result.root.join(&template.relative_path)).unwrap();
        assert_eq!(content, template.body, "{}", template.relative_path.display());
    }
    if cfg!(unix) {
        assert!(result.warnings.is_empty());
    }
}

#[test]
fn test_blank_and_absent_names_use_default() {
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let explicit_dir = TempDir::new().unwrap();
    let explicit = Materializer::new(&registry, &engine, options(explicit_dir.path()))
        .materialize(Some("python-boilerplate"))
        .unwrap();

    for name in [None, Some(""), Some("   ")] {
        let temp_dir = TempDir::new().unwrap();
        let result = Materializer::new(&registry, &engine, options(temp_dir.path()))
            .materialize(name)
            .unwrap();

        assert_eq!(result.project_name, "python-boilerplate");
        assert_eq!(result.root, temp_dir.path().join("python-boilerplate"));
        assert!(!dir_diff::is_different(&result.root, &explicit.root).unwrap());
    }
}

#[test_log::test]
fn test_second_run_overwrites_content() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();
    let materializer = Materializer::new(&registry, &engine, options(temp_dir.path()));

    let first = materializer.materialize(Some("demo")).unwrap();
    fs::write(first.root.join("main.py"), "edited\n").unwrap();

    let second = materializer.materialize(Some("demo")).unwrap();
    assert_eq!(first.written, second.written);

    let main_py = fs::read_to_string(second.root.join("main.py")).unwrap();
    assert_eq!(main_py, registry.get("main.py").unwrap().body);
    assert_eq!(entries(&second.root), expected_entries());
}

#[test_log::test]
fn test_stale_entries_from_other_registry_are_removed() {
    let temp_dir = TempDir::new().unwrap();
    let engine = MiniJinjaRenderer::new();

    let old_registry = Registry::new(
        vec![
            Template::new("old.txt", "stale\n"),
            Template::new("lib/helpers.py", "pass\n"),
            Template::new("main.py", "old body\n"),
        ],
        vec![PathBuf::from("cache/nested")],
    )
    .unwrap();
    let first = Materializer::new(&old_registry, &engine, options(temp_dir.path()))
        .materialize(Some("demo"))
        .unwrap();

    // wrong types for generated entries
    fs::create_dir_all(first.root.join("README.md/inner")).unwrap();
    fs::write(first.root.join("data"), "not a directory").unwrap();

    let registry = Registry::builtin();
    let second = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("demo"))
        .unwrap();

    assert_eq!(entries(&second.root), expected_entries());
    assert!(second.root.join("README.md").is_file());
    assert!(second.root.join("data").is_dir());
    assert_eq!(fs::read_dir(second.root.join("data")).unwrap().count(), 0);

    let removed: BTreeSet<PathBuf> = second.removed.into_iter().collect();
    assert!(removed.contains(&second.root.join("old.txt")));
    assert!(removed.contains(&second.root.join("lib")));
    assert!(removed.contains(&second.root.join("cache")));
    assert!(removed.contains(&second.root.join("README.md")));
}

#[test]
fn test_keep_patterns_survive_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
    fs::write(root.join("notes.txt"), "remove me").unwrap();

    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();
    let options = MaterializeOptions {
        output_dir: temp_dir.path().to_path_buf(),
        keep: parse_keep_patterns([".git"]).unwrap(),
        ..Default::default()
    };

    let result = Materializer::new(&registry, &engine, options).materialize(Some("demo")).unwrap();

    assert!(root.join(".git/HEAD").is_file());
    assert!(!root.join("notes.txt").exists());
    assert_eq!(result.removed, vec![root.join("notes.txt")]);
}

#[test]
fn test_refuse_policy_rejects_non_empty_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("keep.txt"), "mine").unwrap();

    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();
    let options = MaterializeOptions {
        output_dir: temp_dir.path().to_path_buf(),
        overwrite: OverwritePolicy::Refuse,
        ..Default::default()
    };

    match Materializer::new(&registry, &engine, options).materialize(Some("demo")) {
        Err(Error::PathConflict { path, .. }) => assert_eq!(path, root),
        other => panic!("Expected PathConflict, got {other:?}"),
    }
    assert_eq!(entries(&root), BTreeSet::from(["keep.txt".to_string()]));
}

#[test]
fn test_refuse_policy_accepts_empty_root() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("demo")).unwrap();

    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();
    let options = MaterializeOptions {
        output_dir: temp_dir.path().to_path_buf(),
        overwrite: OverwritePolicy::Refuse,
        ..Default::default()
    };

    let result = Materializer::new(&registry, &engine, options).materialize(Some("demo"));
    assert!(result.is_ok());
}

#[test]
fn test_root_occupied_by_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    fs::write(&root, "a file").unwrap();

    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    match Materializer::new(&registry, &engine, options(temp_dir.path())).materialize(Some("demo")) {
        Err(Error::PathConflict { path, .. }) => assert_eq!(path, root),
        other => panic!("Expected PathConflict, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&root).unwrap(), "a file");
}

#[test]
fn test_write_failure_names_failing_path() {
    let temp_dir = TempDir::new().unwrap();
    let too_long = "x".repeat(300);
    let registry = Registry::new(
        vec![
            Template::new("ok.txt", "fine\n"),
            Template::new(too_long.as_str(), "never written\n"),
            Template::new("after.txt", "skipped\n"),
        ],
        vec![],
    )
    .unwrap();
    let engine = MiniJinjaRenderer::new();

    let err = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("demo"))
        .unwrap_err();

    let root = temp_dir.path().join("demo");
    assert_eq!(err.completed_paths().to_vec(), vec![root.join("ok.txt")]);
    match err {
        Error::WriteFailure { path, .. } => assert_eq!(path, root.join(&too_long)),
        other => panic!("Expected WriteFailure, got {other:?}"),
    }
    assert!(root.join("ok.txt").is_file());
    assert!(!root.join("after.txt").exists());
}

#[test]
fn test_invalid_name_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let result = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("../escape"));

    assert!(matches!(result, Err(Error::InvalidProjectName { .. })));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_render_error_names_template() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(
        vec![Template::new("README.md", "# {{ missing }}\n").rendered()],
        vec![],
    )
    .unwrap();
    let engine = MiniJinjaRenderer::new();

    match Materializer::new(&registry, &engine, options(temp_dir.path())).materialize(Some("demo")) {
        Err(Error::TemplateError { name, .. }) => assert_eq!(name, "README.md"),
        other => panic!("Expected TemplateError, got {other:?}"),
    }
}

#[test_log::test]
fn test_render_error_keeps_completed_files() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(
        vec![
            Template::new("main.py", "print('hi')\n").executable(),
            Template::new("README.md", "# {{ missing }}\n").rendered(),
            Template::new("after.txt", "skipped\n"),
        ],
        vec![PathBuf::from("data")],
    )
    .unwrap();
    let engine = MiniJinjaRenderer::new();

    let err = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("demo"))
        .unwrap_err();

    let root = temp_dir.path().join("demo");
    assert!(matches!(err, Error::TemplateError { .. }));
    assert_eq!(err.completed_paths().to_vec(), vec![root.join("main.py")]);
    assert!(!root.join("README.md").exists());
    assert!(!root.join("after.txt").exists());
    #[cfg(unix)]
    assert!(is_executable(&root.join("main.py")));
}

#[test]
fn test_path_conflict_keeps_completed_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("pkg"), "kept file").unwrap();

    let registry = Registry::new(
        vec![Template::new("a.txt", "a\n"), Template::new("pkg/mod.py", "pass\n")],
        vec![],
    )
    .unwrap();
    let engine = MiniJinjaRenderer::new();
    let options = MaterializeOptions {
        output_dir: temp_dir.path().to_path_buf(),
        keep: parse_keep_patterns(["pkg"]).unwrap(),
        ..Default::default()
    };

    let err = Materializer::new(&registry, &engine, options)
        .materialize(Some("demo"))
        .unwrap_err();

    assert_eq!(err.completed_paths().to_vec(), vec![root.join("a.txt")]);
    match err {
        Error::PathConflict { path, .. } => assert_eq!(path, root.join("pkg")),
        other => panic!("Expected PathConflict, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(root.join("pkg")).unwrap(), "kept file");
}

#[test]
fn test_nested_template_paths() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(
        vec![Template::new("src/pkg/__init__.py", "").executable()],
        vec![PathBuf::from("var/log")],
    )
    .unwrap();
    let engine = MiniJinjaRenderer::new();

    let result = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .materialize(Some("nested"))
        .unwrap();

    assert!(result.root.join("src/pkg/__init__.py").is_file());
    assert!(result.root.join("var/log").is_dir());
}

/// Raises the cancel flag while rendering, so the check before the next write fires.
struct CancellingRenderer {
    flag: Arc<AtomicBool>,
}

impl TemplateRenderer for CancellingRenderer {
    fn render(&self, _name: &str, template: &str, _context: &serde_json::Value) -> Result<String> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(template.to_string())
    }
}

#[test]
fn test_cancel_between_writes() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(
        vec![
            Template::new("a.txt", "a"),
            Template::new("b.txt", "b").rendered(),
            Template::new("c.txt", "c"),
        ],
        vec![PathBuf::from("data")],
    )
    .unwrap();
    let flag = Arc::new(AtomicBool::new(false));
    let engine = CancellingRenderer { flag: flag.clone() };

    let err = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .with_cancel_flag(flag)
        .materialize(Some("demo"))
        .unwrap_err();

    let root = temp_dir.path().join("demo");
    match err {
        Error::Cancelled { written, removed } => {
            assert!(removed.is_empty());
            assert_eq!(written, vec![root.join("a.txt"), root.join("b.txt")])
        }
        other => panic!("Expected Cancelled, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "b");
    assert!(!root.join("c.txt").exists());
    assert!(!root.join("data").exists());
}

#[test]
fn test_cancel_before_start() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let err = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .with_cancel_flag(Arc::new(AtomicBool::new(true)))
        .materialize(Some("demo"))
        .unwrap_err();

    assert!(err.completed_paths().is_empty());
    assert!(!temp_dir.path().join("demo").exists());
}

#[test]
fn test_cancel_before_stale_removal() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    fs::create_dir_all(root.join("old")).unwrap();
    fs::write(root.join("old/a.txt"), "a").unwrap();
    fs::write(root.join("stale.txt"), "stale").unwrap();

    let registry = Registry::builtin();
    let engine = MiniJinjaRenderer::new();

    let err = Materializer::new(&registry, &engine, options(temp_dir.path()))
        .with_cancel_flag(Arc::new(AtomicBool::new(true)))
        .materialize(Some("demo"))
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(err.removed_paths().is_empty());
    assert!(err.completed_paths().is_empty());
    assert!(root.join("old/a.txt").is_file());
    assert!(root.join("stale.txt").is_file());
}
