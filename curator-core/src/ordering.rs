//! Application order for release artifacts.
//!
//! Custom resource definitions must exist before the workloads that use them,
//! and post-install jobs run once everything else is in place. Everything else
//! is ordered byte-wise by name.

use std::cmp::Ordering;

use crate::types::Asset;

/// Names ending with this suffix are applied first.
pub const CRD_SUFFIX: &str = "crds.yaml";

/// Names ending with this suffix are applied last.
pub const POST_INSTALL_SUFFIX: &str = "post-install-jobs.yaml";

fn placement(name: &str) -> u8 {
    if name.ends_with(CRD_SUFFIX) {
        0
    } else if name.ends_with(POST_INSTALL_SUFFIX) {
        2
    } else {
        1
    }
}

/// Total order over artifact names: CRDs, then regular artifacts, then
/// post-install jobs; ties broken byte-wise.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    placement(a)
        .cmp(&placement(b))
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// Strict "applies before" relation between two assets.
pub fn less(a: &Asset, b: &Asset) -> bool {
    compare_names(&a.name, &b.name) == Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crds_first_post_install_last() {
        let mut names = vec!["z-post-install-jobs.yaml", "m.yaml", "a-crds.yaml"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, ["a-crds.yaml", "m.yaml", "z-post-install-jobs.yaml"]);
    }

    #[test]
    fn markers_beat_lexicographic_order() {
        assert_eq!(compare_names("zz-crds.yaml", "a.yaml"), Ordering::Less);
        assert_eq!(compare_names("a-post-install-jobs.yaml", "zz.yaml"), Ordering::Greater);
    }

    #[test]
    fn markers_match_without_separator() {
        assert_eq!(compare_names("crds.yaml", "a.yaml"), Ordering::Less);
        assert_eq!(compare_names("foocrds.yaml", "a.yaml"), Ordering::Less);
        assert_eq!(compare_names("post-install-jobs.yaml", "z.yaml"), Ordering::Greater);
    }

    #[test]
    fn same_marker_falls_back_to_bytes() {
        assert_eq!(compare_names("a-crds.yaml", "b-crds.yaml"), Ordering::Less);
        assert_eq!(compare_names("B.yaml", "a.yaml"), Ordering::Less);
    }

    #[test]
    fn less_is_irreflexive() {
        let a = Asset::new("a-crds.yaml", "https://example.com/a");
        assert!(!less(&a, &a));
    }
}
