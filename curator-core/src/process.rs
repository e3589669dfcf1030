//! Per-release artifact filtering and ordering.

use crate::error::VersionError;
use crate::ordering;
use crate::source::Source;
use crate::types::{Asset, Release};

/// Rebuild `release.assets` from the names `accept` keeps, renamed to the
/// returned value. Surviving assets keep their relative order.
pub fn filter_assets<F>(release: &mut Release, accept: F)
where
    F: Fn(&str) -> Option<String>,
{
    release.assets = std::mem::take(&mut release.assets)
        .into_iter()
        .filter_map(|asset| {
            accept(&asset.name).map(|name| Asset {
                name,
                url: asset.url,
            })
        })
        .collect();
}

/// Reorder `release.assets` into application order (stable).
pub fn sort_assets(release: &mut Release) {
    release
        .assets
        .sort_by(|a, b| ordering::compare_names(&a.name, &b.name));
}

/// Filter with the policy `source` resolves for the release's tag, then sort.
pub fn process_release(source: &Source, release: &mut Release) -> Result<(), VersionError> {
    let filter = source.resolve(&release.tag_name)?;
    filter_assets(release, |name| filter.accept(name));
    sort_assets(release);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn release(names: &[&str]) -> Release {
        Release {
            org: "acme".into(),
            repo: "widget".into(),
            tag_name: "v1.0.0".into(),
            assets: names
                .iter()
                .map(|n| Asset::new(*n, format!("https://example.com/{n}")))
                .collect(),
            created: Utc::now(),
        }
    }

    fn names(r: &Release) -> Vec<&str> {
        r.assets.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn filter_keeps_order_and_urls() {
        let mut r = release(&["c.yaml", "a.txt", "b.yaml"]);
        filter_assets(&mut r, |n| n.ends_with(".yaml").then(|| n.to_uppercase()));
        assert_eq!(names(&r), ["C.YAML", "B.YAML"]);
        assert_eq!(r.assets[0].url, "https://example.com/c.yaml");
    }

    #[test]
    fn sort_is_stable_for_renamed_duplicates() {
        let mut r = release(&["x.yaml", "x.yaml"]);
        r.assets[1].url = "second".into();
        sort_assets(&mut r);
        assert_eq!(r.assets[1].url, "second");
    }
}
