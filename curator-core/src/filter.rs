//! Include/exclude/rename policy applied to artifact names.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

/// A compiled artifact-name pattern. Matches anywhere in the name unless the
/// expression anchors itself.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(expr).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

/// Compile every expression, reporting the first one that fails.
pub fn compile_all<S: AsRef<str>>(exprs: &[S]) -> Result<Vec<Pattern>, (String, regex::Error)> {
    exprs
        .iter()
        .map(|expr| {
            let expr = expr.as_ref();
            Pattern::new(expr).map_err(|e| (expr.to_owned(), e))
        })
        .collect()
}

/// Stateless artifact filter. The empty filter accepts every name unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub include: Vec<Pattern>,
    pub exclude: Vec<Pattern>,
    pub rename: BTreeMap<String, String>,
}

impl AssetFilter {
    /// Output name for `name`, or `None` when the artifact is rejected.
    ///
    /// The rename map is applied first and the include/exclude lists see the
    /// renamed value. Excludes win over includes; an empty include list accepts
    /// anything not excluded. An empty name, before or after renaming, is always
    /// rejected.
    pub fn accept(&self, name: &str) -> Option<String> {
        let name = self.rename.get(name).map(String::as_str).unwrap_or(name);

        if name.is_empty() {
            return None;
        }
        if self.exclude.iter().any(|p| p.is_match(name)) {
            return None;
        }
        if self.include.is_empty() || self.include.iter().any(|p| p.is_match(name)) {
            return Some(name.to_owned());
        }
        None
    }
}
