//! Configuration loader for markdown-section.
//!
//! Settings resolve through a precedence stack:
//! built-in defaults → git root → working directory → override path.
//! Each layer only replaces the fields it sets. The result is expressed in the
//! option types of the `markdown-section` crate so callers never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use markdown_section::{MarkdownOptions, SectionOptions};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".markdown-section.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub classes: SectionOptions,
    pub markdown: MarkdownOptions,
    pub sources: ConfigSources,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn defaults() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let mut merged = PartialConfig::defaults(ConfigSource::defaults());
        let mut source_layers = vec![ConfigSource::defaults()];

        let git_config_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let (classes, markdown) = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            classes,
            markdown,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Parses a single TOML document on top of the built-in defaults, without
    /// touching the filesystem.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let source = ConfigSource::for_file(ConfigSourceKind::Override, PathBuf::from("<inline>"));
        let mut merged = PartialConfig::defaults(ConfigSource::defaults());
        let layer = parse_layer(contents, source.clone()).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        merged.merge(layer);

        let (classes, markdown) = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            classes,
            markdown,
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![ConfigSource::defaults(), source],
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            classes: SectionOptions::default(),
            markdown: MarkdownOptions::default(),
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![ConfigSource::defaults()],
            },
        }
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    parse_layer(&contents, source).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })
}

fn parse_layer(contents: &str, source: ConfigSource) -> Result<PartialConfig, toml::de::Error> {
    let raw: RawConfig = toml::from_str(contents)?;
    Ok(raw.into_partial(source))
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    section_class: Option<bool>,
    heading_class: Option<bool>,
    custom_class_prefix: Option<Located<String>>,
    custom_class: Option<Located<String>>,
    markdown: MarkdownPartial,
}

#[derive(Clone, Debug, Default)]
struct MarkdownPartial {
    tables: Option<bool>,
    strikethrough: Option<bool>,
    tasklists: Option<bool>,
    smart_punctuation: Option<bool>,
    heading_attributes: Option<bool>,
}

impl PartialConfig {
    fn defaults(source: ConfigSource) -> Self {
        let classes = SectionOptions::default();
        let markdown = MarkdownOptions::default();
        PartialConfig {
            section_class: Some(classes.section_class),
            heading_class: Some(classes.heading_class),
            custom_class_prefix: Some(Located::new(classes.custom_class_prefix, source.clone())),
            custom_class: Some(Located::new(classes.custom_class, source)),
            markdown: MarkdownPartial {
                tables: Some(markdown.tables),
                strikethrough: Some(markdown.strikethrough),
                tasklists: Some(markdown.tasklists),
                smart_punctuation: Some(markdown.smart_punctuation),
                heading_attributes: Some(markdown.heading_attributes),
            },
        }
    }

    fn merge(&mut self, other: PartialConfig) {
        merge_field(&mut self.section_class, other.section_class);
        merge_field(&mut self.heading_class, other.heading_class);
        merge_field(&mut self.custom_class_prefix, other.custom_class_prefix);
        merge_field(&mut self.custom_class, other.custom_class);

        let markdown = other.markdown;
        merge_field(&mut self.markdown.tables, markdown.tables);
        merge_field(&mut self.markdown.strikethrough, markdown.strikethrough);
        merge_field(&mut self.markdown.tasklists, markdown.tasklists);
        merge_field(&mut self.markdown.smart_punctuation, markdown.smart_punctuation);
        merge_field(&mut self.markdown.heading_attributes, markdown.heading_attributes);
    }

    fn finalize(self) -> Result<(SectionOptions, MarkdownOptions), ConfigValidationErrors> {
        let mut errors = Vec::new();

        let custom_class_prefix = self
            .custom_class_prefix
            .map(|located| {
                if let Some(message) = check_class_prefix(&located.value) {
                    errors.push(
                        ConfigValidationError::new(Some(located.source.clone()), message)
                            .with_context("classes.custom_class_prefix"),
                    );
                }
                located.value
            })
            .unwrap_or_default();

        let custom_class = self
            .custom_class
            .map(|located| {
                if let Some(message) = check_custom_class(&located.value) {
                    errors.push(
                        ConfigValidationError::new(Some(located.source.clone()), message)
                            .with_context("classes.custom_class"),
                    );
                }
                located.value
            })
            .unwrap_or_default();

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        let defaults = SectionOptions::default();
        let classes = SectionOptions {
            section_class: self.section_class.unwrap_or(defaults.section_class),
            heading_class: self.heading_class.unwrap_or(defaults.heading_class),
            custom_class_prefix,
            custom_class,
        };

        let markdown = MarkdownOptions {
            tables: self.markdown.tables.unwrap_or_default(),
            strikethrough: self.markdown.strikethrough.unwrap_or_default(),
            tasklists: self.markdown.tasklists.unwrap_or_default(),
            smart_punctuation: self.markdown.smart_punctuation.unwrap_or_default(),
            heading_attributes: self.markdown.heading_attributes.unwrap_or_default(),
        };

        Ok((classes, markdown))
    }
}

fn merge_field<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

const FORBIDDEN_CLASS_CHARS: &[char] = &['"', '\'', '<', '>', '&'];

/// Returns a validation message when `prefix` cannot be glued onto `h{level}`.
pub fn check_class_prefix(prefix: &str) -> Option<String> {
    if prefix.chars().any(char::is_whitespace) {
        return Some(format!("prefix '{prefix}' must not contain whitespace"));
    }
    check_custom_class(prefix)
}

/// Returns a validation message when `class` cannot sit inside a quoted
/// attribute value without being escaped.
pub fn check_custom_class(class: &str) -> Option<String> {
    class
        .chars()
        .find(|ch| FORBIDDEN_CLASS_CHARS.contains(ch))
        .map(|ch| format!("'{class}' contains forbidden character '{ch}'"))
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    classes: Option<RawClasses>,
    #[serde(default)]
    markdown: Option<RawMarkdown>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let mut partial = PartialConfig::default();

        if let Some(classes) = self.classes {
            partial.section_class = classes.section_class;
            partial.heading_class = classes.heading_class;
            partial.custom_class_prefix = classes
                .custom_class_prefix
                .map(|value| Located::new(value, source.clone()));
            partial.custom_class = classes
                .custom_class
                .map(|value| Located::new(value, source));
        }

        if let Some(markdown) = self.markdown {
            partial.markdown = MarkdownPartial {
                tables: markdown.tables,
                strikethrough: markdown.strikethrough,
                tasklists: markdown.tasklists,
                smart_punctuation: markdown.smart_punctuation,
                heading_attributes: markdown.heading_attributes,
            };
        }

        partial
    }
}

#[derive(Debug, Deserialize)]
struct RawClasses {
    #[serde(default)]
    section_class: Option<bool>,
    #[serde(default)]
    heading_class: Option<bool>,
    #[serde(default)]
    custom_class_prefix: Option<String>,
    #[serde(default)]
    custom_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMarkdown {
    #[serde(default)]
    tables: Option<bool>,
    #[serde(default)]
    strikethrough: Option<bool>,
    #[serde(default)]
    tasklists: Option<bool>,
    #[serde(default)]
    smart_punctuation: Option<bool>,
    #[serde(default)]
    heading_attributes: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_replace_only_the_fields_they_set() {
        let mut merged = PartialConfig::defaults(ConfigSource::defaults());
        let layer = parse_layer(
            "[classes]\nheading_class = true\n",
            ConfigSource::for_file(ConfigSourceKind::Local, PathBuf::from("local.toml")),
        )
        .unwrap();
        merged.merge(layer);

        let (classes, markdown) = merged.finalize().unwrap();
        assert!(classes.section_class);
        assert!(classes.heading_class);
        assert_eq!(markdown, MarkdownOptions::default());
    }

    #[test]
    fn validation_reports_every_bad_field_with_its_source() {
        let layer = parse_layer(
            "[classes]\ncustom_class_prefix = \"my prefix\"\ncustom_class = \"a<b\"\n",
            ConfigSource::for_file(ConfigSourceKind::Override, PathBuf::from("bad.toml")),
        )
        .unwrap();
        let mut merged = PartialConfig::defaults(ConfigSource::defaults());
        merged.merge(layer);

        let errors = merged.finalize().unwrap_err();
        let rendered = errors.to_string();
        assert_eq!(errors.iter().count(), 2);
        assert!(rendered.contains("classes.custom_class_prefix: prefix 'my prefix' must not contain whitespace"));
        assert!(rendered.contains("classes.custom_class: 'a<b' contains forbidden character '<'"));
        assert!(rendered.contains("override config at bad.toml"));
    }

    #[test]
    fn class_checks_accept_ordinary_tokens() {
        assert_eq!(check_class_prefix("doc-"), None);
        assert_eq!(check_custom_class("card wide"), None);
        assert!(check_class_prefix("a b").is_some());
        assert!(check_custom_class("x\"y").is_some());
    }

    #[test]
    fn ampersand_is_rejected_in_class_values() {
        assert_eq!(
            check_custom_class("a&b"),
            Some("'a&b' contains forbidden character '&'".to_owned())
        );
        assert!(check_class_prefix("doc&").is_some());
    }
}
