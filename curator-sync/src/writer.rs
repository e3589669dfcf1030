//! Bundle writer: numbered, provenance-stamped files per retained release.
//!
//! ## Layout
//!
//! ```text
//! <out>/<package>/<tag>/00-<name>            (one sequence per release)
//! <out>/<package>/<tag>/<label>/00-<name>    (alternatives: one sequence per source)
//! ```
//!
//! Every file starts with `# Source: <url>` followed by the downloaded bytes.
//!
//! ## `atomic_write` — 5-step protocol
//!
//! 1. SHA-256 hash the new content.
//! 2. Hash the file currently on disk, if any → skip if identical.
//! 3. Write to `<path>.curator.tmp`.
//! 4. Rename to final path (atomic on POSIX).
//! 5. On rename failure, remove the `.tmp` and leave the original untouched.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use curator_core::Asset;

use crate::error::{io_err, SyncError};
use crate::pipeline::PackagePlan;
use crate::provider::ReleaseProvider;

const TMP_SUFFIX: &str = ".curator.tmp";

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; content on disk already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
    /// File is no longer part of the bundle and was deleted.
    Removed { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been deleted.
    WouldRemove { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path }
            | WriteResult::Removed { path }
            | WriteResult::WouldRemove { path } => path,
        }
    }
}

/// Outcome of writing one package.
#[derive(Debug)]
pub struct BundleResult {
    pub package: String,
    pub writes: Vec<WriteResult>,
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// `<out>/<package>/<tag>`. Pure, no I/O.
pub fn bundle_dir(out: &Path, package: &str, tag: &str) -> PathBuf {
    out.join(package).join(tag)
}

/// `"<index>-<name>"` with a two-digit index.
pub fn numbered_name(index: usize, name: &str) -> String {
    format!("{index:02}-{name}")
}

/// First line of every bundled file.
pub fn provenance_header(url: &str) -> String {
    format!("# Source: {url}\n")
}

fn check_name(name: &str) -> Result<(), SyncError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(SyncError::InvalidAssetName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

fn digest(content: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(content);
    hex::encode(h.finalize())
}

/// Atomically write `content` to `path` unless the file already holds it.
pub(crate) fn atomic_write(
    path: &Path,
    content: &[u8],
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()));
    atomic_write_with_tmp(path, content, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &[u8],
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    // Steps 1-2: compare against what is on disk.
    match std::fs::read(path) {
        Ok(existing) if digest(&existing) == digest(content) => {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(path, e)),
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    // Step 3: ensure parent directories exist, write to .tmp.
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    // Steps 4-5: atomic rename to final path.
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

/// Write `assets` as one numbered sequence in `dir`, then delete anything
/// else left in `dir` by an earlier run.
///
/// Every name is checked before the first write, so a bad name leaves `dir`
/// untouched.
fn write_sequence(
    dir: &Path,
    assets: &[&Asset],
    provider: &dyn ReleaseProvider,
    dry_run: bool,
    writes: &mut Vec<WriteResult>,
) -> Result<(), SyncError> {
    for asset in assets {
        check_name(&asset.name)?;
    }

    let mut expected = BTreeSet::new();
    for (index, asset) in assets.iter().enumerate() {
        let file_name = numbered_name(index, &asset.name);

        let mut content = provenance_header(&asset.url).into_bytes();
        content.extend_from_slice(&provider.download(asset)?);

        writes.push(atomic_write(&dir.join(&file_name), &content, dry_run)?);
        expected.insert(file_name);
    }
    prune(dir, &expected, dry_run, writes)
}

/// Remove every regular file and directory in `dir` whose name is not in `keep`.
fn prune(
    dir: &Path,
    keep: &BTreeSet<String>,
    dry_run: bool,
    writes: &mut Vec<WriteResult>,
) -> Result<(), SyncError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_err(dir, e)),
    };

    let mut stale: Vec<(PathBuf, bool)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| !keep.contains(&*e.file_name().to_string_lossy()))
        .filter_map(|e| {
            let kind = e.file_type().ok()?;
            (kind.is_file() || kind.is_dir()).then(|| (e.path(), kind.is_dir()))
        })
        .collect();
    stale.sort();

    for (path, is_dir) in stale {
        if dry_run {
            tracing::info!("[dry-run] would remove: {}", path.display());
            writes.push(WriteResult::WouldRemove { path });
            continue;
        }
        let removed = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(|e| io_err(&path, e))?;
        tracing::info!("removed: {}", path.display());
        writes.push(WriteResult::Removed { path });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// write_package
// ---------------------------------------------------------------------------

/// Write every retained release of `plan` below `out`.
///
/// Without alternatives the bundle directory holds one numbered sequence.
/// With alternatives it holds one subdirectory per section label and nothing
/// else. Either way, entries the plan no longer produces are removed.
pub fn write_package(
    out: &Path,
    plan: &PackagePlan,
    provider: &dyn ReleaseProvider,
    dry_run: bool,
) -> Result<BundleResult, SyncError> {
    for release in &plan.releases {
        for section in &release.sections {
            if plan.alternatives {
                check_name(&section.label)?;
            }
            for asset in &section.assets {
                check_name(&asset.name)?;
            }
        }
    }

    let mut writes = Vec::new();
    for release in &plan.releases {
        let dir = bundle_dir(out, &plan.package, &release.tag);
        if plan.alternatives {
            let mut labels = BTreeSet::new();
            for section in &release.sections {
                let assets: Vec<&Asset> = section.assets.iter().collect();
                write_sequence(
                    &dir.join(&section.label),
                    &assets,
                    provider,
                    dry_run,
                    &mut writes,
                )?;
                labels.insert(section.label.clone());
            }
            prune(&dir, &labels, dry_run, &mut writes)?;
        } else {
            let assets: Vec<&Asset> = release.assets().collect();
            write_sequence(&dir, &assets, provider, dry_run, &mut writes)?;
        }
    }
    Ok(BundleResult {
        package: plan.package.clone(),
        writes,
    })
}

/// Write every plan in order.
pub fn write_all(
    out: &Path,
    plans: &[PackagePlan],
    provider: &dyn ReleaseProvider,
    dry_run: bool,
) -> Result<Vec<BundleResult>, SyncError> {
    plans
        .iter()
        .map(|plan| write_package(out, plan, provider, dry_run))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
