//! Layered configuration for callout-enhance.
//!
//! Layers, lowest precedence first: built-in defaults, the git root's
//! `.callout-enhance.toml`, the working directory's, then an explicit
//! override file. Later layers replace individual keys; lists are replaced
//! wholesale rather than appended.

mod error;
mod file;
mod pattern;

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigValidationError, ConfigValidationErrors};
pub use pattern::{Pattern, PatternList};

use file::ConfigFile;

pub const CONFIG_FILE_NAME: &str = ".callout-enhance.toml";

const DEFAULT_INCLUDE: &[&str] = &["**/*.html", "**/*.htm"];
const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**"];

#[derive(Clone, Debug)]
pub struct Config {
    pub project: ProjectSettings,
    pub scan: ScanSettings,
    pub output: OutputSettings,
    pub sources: ConfigSources,
}

#[derive(Clone, Debug)]
pub struct ProjectSettings {
    /// Rendered site directory, absolute.
    pub root: PathBuf,
    pub exclude: PatternList,
}

#[derive(Clone, Debug)]
pub struct ScanSettings {
    pub include: PatternList,
    pub exclude: PatternList,
    pub follow_links: bool,
}

#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub backup: bool,
}

#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    /// Layers that contributed, in the order they were applied.
    pub layers: Vec<ConfigSource>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    /// Directory relative paths in this layer resolve against.
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn defaults(base_dir: &Path) -> Self {
        Self {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir: base_dir.to_path_buf(),
        }
    }

    fn file(kind: ConfigSourceKind, path: &Path) -> Self {
        Self {
            kind,
            path: Some(path.to_path_buf()),
            base_dir: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} {}", self.kind, path.display()),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "built-in defaults",
            Self::GitRoot => "git root config",
            Self::Local => "local config",
            Self::Override => "override config",
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    /// Defaults to the process working directory.
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

impl Config {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = match options.working_dir {
            Some(dir) => fs::canonicalize(&dir).map_err(|source| ConfigError::WorkingDirectory {
                attempted: dir,
                source,
            })?,
            None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
                attempted: PathBuf::from("."),
                source,
            })?,
        };

        let override_path = options.override_path.map(|path| working_dir.join(path));
        if let Some(path) = &override_path {
            if !path.is_file() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let local = working_dir.join(CONFIG_FILE_NAME);
        let git = git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));

        let mut candidates = Vec::new();
        if let Some(git) = git.filter(|git| *git != local) {
            candidates.push((ConfigSourceKind::GitRoot, git));
        }
        candidates.push((ConfigSourceKind::Local, local));

        let mut resolver = Resolver::new(ConfigSource::defaults(&working_dir));
        for (kind, path) in candidates {
            if path.is_file() && override_path.as_ref() != Some(&path) {
                resolver.apply(ConfigFile::read(&path)?, ConfigSource::file(kind, &path));
            }
        }
        if let Some(path) = &override_path {
            resolver.apply(
                ConfigFile::read(path)?,
                ConfigSource::file(ConfigSourceKind::Override, path),
            );
        }

        resolver
            .finish(working_dir)
            .map_err(ConfigError::Validation)
    }
}

fn git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// A value together with the layer that last set it.
#[derive(Clone, Debug)]
struct Layered<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Layered<T> {
    fn new(value: T, source: &ConfigSource) -> Self {
        Self {
            value,
            source: source.clone(),
        }
    }

    fn set(&mut self, value: Option<T>, source: &ConfigSource) {
        if let Some(value) = value {
            self.value = value;
            self.source = source.clone();
        }
    }
}

struct Resolver {
    layers: Vec<ConfigSource>,
    root: Layered<PathBuf>,
    project_exclude: Layered<Vec<String>>,
    include: Layered<Vec<String>>,
    scan_exclude: Layered<Vec<String>>,
    follow_links: Layered<bool>,
    backup: Layered<bool>,
}

impl Resolver {
    fn new(defaults: ConfigSource) -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        };
        Self {
            root: Layered::new(PathBuf::from("."), &defaults),
            project_exclude: Layered::new(Vec::new(), &defaults),
            include: Layered::new(owned(DEFAULT_INCLUDE), &defaults),
            scan_exclude: Layered::new(owned(DEFAULT_EXCLUDE), &defaults),
            follow_links: Layered::new(false, &defaults),
            backup: Layered::new(false, &defaults),
            layers: vec![defaults],
        }
    }

    fn apply(&mut self, file: ConfigFile, source: ConfigSource) {
        self.root.set(file.project.root, &source);
        self.project_exclude.set(file.project.exclude, &source);
        self.include.set(file.scan.include_patterns, &source);
        self.scan_exclude.set(file.scan.exclude_patterns, &source);
        self.follow_links.set(file.scan.follow_links, &source);
        self.backup.set(file.output.backup, &source);
        self.layers.push(source);
    }

    fn finish(self, working_directory: PathBuf) -> Result<Config, ConfigValidationErrors> {
        let mut errors = Vec::new();

        if self.include.value.is_empty() {
            errors.push(ConfigValidationError {
                key: "scan.include_patterns".to_owned(),
                message: "must list at least one pattern".to_owned(),
                source: Some(self.include.source.clone()),
            });
        }

        let project_exclude = compile(self.project_exclude, "project.exclude", &mut errors);
        let include = compile(self.include, "scan.include_patterns", &mut errors);
        let scan_exclude = compile(self.scan_exclude, "scan.exclude_patterns", &mut errors);

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        let root = self.root.source.base_dir.join(&self.root.value);
        let root = fs::canonicalize(&root).unwrap_or(root);

        Ok(Config {
            project: ProjectSettings {
                root,
                exclude: project_exclude,
            },
            scan: ScanSettings {
                include,
                exclude: scan_exclude,
                follow_links: self.follow_links.value,
            },
            output: OutputSettings {
                backup: self.backup.value,
            },
            sources: ConfigSources {
                working_directory,
                layers: self.layers,
            },
        })
    }
}

fn compile(
    patterns: Layered<Vec<String>>,
    key: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> PatternList {
    PatternList::compile(patterns.value, &patterns.source, key, errors)
}
