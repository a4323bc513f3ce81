use std::path::Path;

use globset::{Glob, GlobMatcher};

use crate::error::ConfigValidationError;
use crate::ConfigSource;

/// A glob as written in configuration, compiled once at load time.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    pub(crate) fn compile(
        original: String,
        source: &ConfigSource,
        key: &str,
    ) -> Result<Self, ConfigValidationError> {
        let glob = Glob::new(&original).map_err(|err| ConfigValidationError {
            key: key.to_owned(),
            message: format!("invalid glob pattern '{original}': {err}"),
            source: Some(source.clone()),
        })?;
        Ok(Self {
            matcher: glob.compile_matcher(),
            original,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PatternList(Vec<Pattern>);

impl PatternList {
    /// Compile every glob in `values`, collecting failures into `errors`
    /// so one bad entry does not hide the next.
    pub(crate) fn compile(
        values: Vec<String>,
        source: &ConfigSource,
        key: &str,
        errors: &mut Vec<ConfigValidationError>,
    ) -> Self {
        let patterns = values
            .into_iter()
            .filter_map(|value| match Pattern::compile(value, source, key) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    errors.push(err);
                    None
                }
            })
            .collect();
        Self(patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.0.iter()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.0.iter().any(|pattern| pattern.is_match(path))
    }
}
