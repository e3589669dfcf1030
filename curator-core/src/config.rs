//! YAML configuration: packages, their sources and filter policies.
//!
//! # File layout
//!
//! ```yaml
//! last_n: 2
//! packages:
//!   cilium:
//!     primary:
//!       github: cilium/cilium
//!       include: ['\.yaml$']
//!       exclude: ['^test-']
//!       rename: { install.yaml: cilium.yaml }
//!       overrides:
//!         v1.14: { include: ['^cilium'] }
//!         v1.14.2: { exclude: ['.*'] }
//!     additional:
//!       - s3: { bucket: artifacts, prefix: charts/cilium-extras }
//! ```
//!
//! # API pattern
//!
//! The file deserializes into the `*Spec` structs, then [`ConfigSpec::compile`]
//! validates everything eagerly: patterns are compiled, origins parsed and
//! override keys canonicalized. Nothing in a compiled [`Config`] can fail later
//! because of a configuration mistake.
//!
//! Loading has two forms:
//! - `load_at(path)` — explicit path; used in tests with `TempDir`
//! - `load()` — `<home>/.curator/config.yaml`, delegates to `load_at`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::{compile_all, AssetFilter};
use crate::source::{Origin, Source};
use crate::types::{Package, PackageName};

/// Window size used when the file does not set `last_n`.
pub const DEFAULT_LAST_N: usize = 3;

// ---------------------------------------------------------------------------
// 1. Raw schema
// ---------------------------------------------------------------------------

/// Include/exclude/rename lists as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
}

/// An object-storage origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3Spec {
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
}

/// One source as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Spec>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, FilterSpec>,
}

/// One package as written in the file. The name is the mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
    #[serde(default)]
    pub alternatives: bool,
    pub primary: SourceSpec,
    #[serde(default)]
    pub additional: Vec<SourceSpec>,
}

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSpec {
    #[serde(default = "default_last_n")]
    pub last_n: usize,
    #[serde(default)]
    pub packages: BTreeMap<String, PackageSpec>,
}

fn default_last_n() -> usize {
    DEFAULT_LAST_N
}

// ---------------------------------------------------------------------------
// 2. Compiled configuration
// ---------------------------------------------------------------------------

/// Validated configuration. Packages are ordered by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub last_n: usize,
    pub packages: Vec<Package>,
}

impl Config {
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name.0 == name)
    }
}

impl ConfigSpec {
    /// Validate and compile every package.
    pub fn compile(self) -> Result<Config, ConfigError> {
        let packages = self
            .packages
            .into_iter()
            .map(|(name, spec)| compile_package(name, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Config {
            last_n: self.last_n,
            packages,
        })
    }
}

fn compile_package(name: String, spec: PackageSpec) -> Result<Package, ConfigError> {
    let primary = compile_source(&name, "primary source", spec.primary)?;
    let additional = spec
        .additional
        .into_iter()
        .enumerate()
        .map(|(i, source)| compile_source(&name, &format!("additional source #{}", i + 1), source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Package {
        name: PackageName(name),
        alternatives: spec.alternatives,
        primary,
        additional,
    })
}

fn compile_source(package: &str, scope: &str, spec: SourceSpec) -> Result<Source, ConfigError> {
    let origin = match (spec.github, spec.s3) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::AmbiguousOrigin {
                package: package.to_owned(),
                scope: scope.to_owned(),
            })
        }
        (None, None) => {
            return Err(ConfigError::MissingOrigin {
                package: package.to_owned(),
                scope: scope.to_owned(),
            })
        }
        (Some(identifier), None) => {
            Origin::from_repository(&identifier).ok_or_else(|| {
                ConfigError::InvalidSourceIdentifier {
                    package: package.to_owned(),
                    scope: scope.to_owned(),
                    identifier: identifier.clone(),
                }
            })?
        }
        (None, Some(s3)) => {
            if s3.bucket.is_empty() || s3.bucket.contains('/') {
                return Err(ConfigError::InvalidSourceIdentifier {
                    package: package.to_owned(),
                    scope: scope.to_owned(),
                    identifier: format!("s3://{}/{}", s3.bucket, s3.prefix),
                });
            }
            Origin::S3 {
                bucket: s3.bucket,
                prefix: s3.prefix,
            }
        }
    };

    let base = FilterSpec {
        include: spec.include,
        exclude: spec.exclude,
        rename: spec.rename,
    };
    let mut source = Source::new(origin);
    source.filter = compile_filter(package, scope, base)?;

    for (key, filter) in spec.overrides {
        let override_scope = format!("{scope}, override '{key}'");
        let filter = compile_filter(package, &override_scope, filter)?;
        source
            .overrides
            .insert(&key, filter)
            .map_err(|error| ConfigError::Override {
                package: package.to_owned(),
                scope: scope.to_owned(),
                source: error,
            })?;
    }
    Ok(source)
}

fn compile_filter(package: &str, scope: &str, spec: FilterSpec) -> Result<AssetFilter, ConfigError> {
    let invalid = |(pattern, error): (String, regex::Error)| ConfigError::InvalidPattern {
        package: package.to_owned(),
        scope: scope.to_owned(),
        pattern,
        error,
    };
    Ok(AssetFilter {
        include: compile_all(&spec.include).map_err(invalid)?,
        exclude: compile_all(&spec.exclude).map_err(invalid)?,
        rename: spec.rename,
    })
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// `<home>/.curator/config.yaml`. Pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".curator").join("config.yaml")
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

/// Parse and compile configuration held in memory.
pub fn from_yaml_str(yaml: &str) -> Result<Config, ConfigError> {
    let spec: ConfigSpec = serde_yaml::from_str(yaml)?;
    spec.compile()
}

/// Load and compile the configuration file at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// and line context) if malformed, and a validation error naming the package
/// and source if a pattern, origin or override key is wrong.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let spec: ConfigSpec = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    spec.compile()
}

/// `load_at` convenience wrapper for the default location.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&default_path()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
