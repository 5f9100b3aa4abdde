use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use markdown_section::{MarkdownOptions, SectionOptions};
use markdown_section_config::{Config, ConfigError, ConfigSourceKind, LoadOptions};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.classes, SectionOptions::default());
    assert_eq!(config.markdown, MarkdownOptions::default());
    assert_eq!(config.sources.working_directory, working_dir);
    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(".markdown-section.toml"),
        r#"
        [classes]
        heading_class = true
        custom_class = "root"

        [markdown]
        tables = true
        "#,
    );

    let workspace = git_root.join("workspace");
    fs::create_dir(&workspace).expect("create workspace");

    write_file(
        workspace.join(".markdown-section.toml"),
        r#"
        [classes]
        custom_class_prefix = "doc-"
        custom_class = "local"

        [markdown]
        strikethrough = true
        "#,
    );

    let override_path = workspace.join("override.toml");
    write_file(
        &override_path,
        r#"
        [classes]
        section_class = false
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&workspace)
            .with_override_path(&override_path),
    )
    .expect("load config with precedence");

    assert_eq!(
        config.classes,
        SectionOptions {
            section_class: false,
            heading_class: true,
            custom_class_prefix: "doc-".into(),
            custom_class: "local".into(),
        }
    );
    assert!(config.markdown.tables);
    assert!(config.markdown.strikethrough);
    assert!(!config.markdown.tasklists);

    let kinds: Vec<_> = config
        .sources
        .layers
        .iter()
        .map(|layer| layer.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override
        ]
    );
}

#[test]
fn relative_override_resolves_against_working_dir() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join("custom.toml"),
        r#"
        [classes]
        custom_class = "from-override"
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&working_dir)
            .with_override_path("custom.toml"),
    )
    .expect("load override");

    assert_eq!(config.classes.custom_class, "from-override");
    assert_eq!(
        config.sources.layers.last().and_then(|layer| layer.path.clone()),
        Some(working_dir.join("custom.toml"))
    );
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(&working_dir)
            .with_override_path("absent.toml"),
    )
    .expect_err("expected missing override");

    match err {
        ConfigError::OverrideNotFound { path } => {
            assert_eq!(path, working_dir.join("absent.toml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(".markdown-section.toml"),
        r#"
        [classes]
        heading_class = "yes please"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected parse failure");

    match err {
        ConfigError::Parse { path, .. } => {
            assert_eq!(path, working_dir.join(".markdown-section.toml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_class_prefix_surfaces_validation_error() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(".markdown-section.toml"),
        r#"
        [classes]
        custom_class_prefix = "two words"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected validation failure");

    match err {
        ConfigError::Validation(errors) => {
            let joined = errors.to_string();
            assert!(
                joined.contains("prefix 'two words' must not contain whitespace"),
                "unexpected error output: {joined}"
            );
            assert!(
                joined.contains("local config at"),
                "unexpected error output: {joined}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn inline_toml_uses_defaults_for_missing_fields() {
    let config = Config::from_toml_str(
        r#"
        [markdown]
        smart_punctuation = true
        "#,
    )
    .expect("parse inline config");

    assert_eq!(config.classes, SectionOptions::default());
    assert!(config.markdown.smart_punctuation);
    assert!(!config.markdown.tables);
}
