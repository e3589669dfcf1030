//! Release-window selection: keep the releases of the N most recent minor lines.

use semver::Version;

use crate::error::{SelectError, VersionError};
use crate::types::Release;

/// Releases of the `n` newest minor lines, newest first.
///
/// The input may be in any order and is left untouched. Every patch release of
/// a retained minor line is kept. `n == 0` keeps everything. Releases with equal
/// versions keep their input order.
pub fn last_n(n: usize, releases: &[Release]) -> Result<Vec<Release>, SelectError> {
    let sorted = sort_descending(releases)?;
    let Some((newest, _)) = sorted.first() else {
        return Err(SelectError::EmptyInput);
    };

    let mut end = sorted.len();
    if n > 0 {
        let mut line = (newest.major, newest.minor);
        let mut remaining = n;
        for (index, (version, _)) in sorted.iter().enumerate() {
            let current = (version.major, version.minor);
            if current == line {
                continue;
            }
            line = current;
            remaining -= 1;
            if remaining == 0 {
                end = index;
                break;
            }
        }
    }

    Ok(sorted
        .into_iter()
        .take(end)
        .map(|(_, release)| release.clone())
        .collect())
}

/// Pair each release with its parsed version, newest first (stable).
fn sort_descending(releases: &[Release]) -> Result<Vec<(Version, &Release)>, VersionError> {
    let mut keyed = releases
        .iter()
        .map(|release| release.version().map(|v| (v, release)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(keyed)
}
