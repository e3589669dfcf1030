use std::fs;
use std::path::Path;

use curator_core::config;
use curator_sync::{plan, write_package, writer, MirrorProvider, PlanScope, WriteResult};
use tempfile::TempDir;

const CONFIG: &str = r#"
last_n: 2
packages:
  widget:
    primary:
      github: acme/widget
      include: ['\.yaml$']
      rename: { install.yaml: widget.yaml }
      overrides:
        v1.0: { exclude: ['.*'] }
    additional:
      - s3: { bucket: artifacts, prefix: charts/extras }
  gadget:
    alternatives: true
    primary:
      github: acme/gadget
    additional:
      - github: acme/widget
        include: ['\.yaml$']
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn put(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write asset");
}

fn mirror() -> TempDir {
    let root = TempDir::new().expect("mirror");
    let r = root.path();
    put(r, "acme/widget/v1.0.0/install.yaml", "kind: Old\n");
    put(r, "acme/widget/v1.1.0/install.yaml", "kind: Deployment\n");
    put(r, "acme/widget/v1.1.0/widget-crds.yaml", "kind: CustomResourceDefinition\n");
    put(r, "acme/widget/v1.1.0/README.md", "docs\n");
    put(r, "acme/widget/v1.1.0/zz-post-install-jobs.yaml", "kind: Job\n");
    put(r, "acme/widget/v1.2.0/install.yaml", "kind: Deployment\n");
    put(r, "acme/gadget/2.0/gadget.yaml", "kind: Service\n");
    put(r, "artifacts/charts/extras/v0.1.0/extras.yaml", "kind: ConfigMap\n");
    root
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read bundle dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn bundles_are_numbered_in_application_order() {
    init_logging();
    let mirror = mirror();
    let out = TempDir::new().expect("out");
    let provider = MirrorProvider::new(mirror.path());
    let cfg = config::from_yaml_str(CONFIG).expect("config");

    let plans = plan(&cfg, &PlanScope::Package("widget".into()), &provider, 3).expect("plan");
    let result = write_package(out.path(), &plans[0], &provider, false).expect("write");
    assert!(result
        .writes
        .iter()
        .all(|w| matches!(w, WriteResult::Written { .. })));

    let v110 = out.path().join("widget/v1.1.0");
    assert_eq!(
        names(&v110),
        [
            "00-widget-crds.yaml",
            "01-widget.yaml",
            "02-zz-post-install-jobs.yaml",
            "03-extras.yaml",
        ]
    );

    let first = fs::read_to_string(v110.join("00-widget-crds.yaml")).expect("read");
    let (header, body) = first.split_once('\n').expect("header line");
    assert!(header.starts_with("# Source: file://"), "header: {header}");
    assert!(header.ends_with("acme/widget/v1.1.0/widget-crds.yaml"));
    assert_eq!(body, "kind: CustomResourceDefinition\n");

    // The v1.0 override excludes everything; only the additional source remains.
    assert_eq!(names(&out.path().join("widget/v1.0.0")), ["00-extras.yaml"]);
    assert_eq!(names(&out.path().join("widget/v1.2.0")), ["00-widget.yaml", "01-extras.yaml"]);
}

#[test]
fn rerun_is_unchanged_and_prunes_stale_files() {
    init_logging();
    let mirror = mirror();
    let out = TempDir::new().expect("out");
    let provider = MirrorProvider::new(mirror.path());
    let cfg = config::from_yaml_str(CONFIG).expect("config");
    let plans = plan(&cfg, &PlanScope::All, &provider, cfg.last_n).expect("plan");

    writer::write_all(out.path(), &plans, &provider, false).expect("first run");

    let stray = out.path().join("widget/v1.2.0/07-removed-upstream.yaml");
    fs::write(&stray, "stale").expect("stray");

    let dry = writer::write_all(out.path(), &plans, &provider, true).expect("dry run");
    assert!(dry
        .iter()
        .flat_map(|r| &r.writes)
        .any(|w| matches!(w, WriteResult::WouldRemove { path } if path == &stray)));
    assert!(stray.exists(), "dry run must not delete");

    let second = writer::write_all(out.path(), &plans, &provider, false).expect("second run");
    for w in second.iter().flat_map(|r| &r.writes) {
        match w {
            WriteResult::Unchanged { .. } => {}
            WriteResult::Removed { path } => assert_eq!(path, &stray),
            other => panic!("unexpected write on re-run: {other:?}"),
        }
    }
    assert!(!stray.exists());
}

#[test]
fn alternatives_are_written_per_source() {
    init_logging();
    let mirror = mirror();
    let out = TempDir::new().expect("out");
    let provider = MirrorProvider::new(mirror.path());
    let cfg = config::from_yaml_str(CONFIG).expect("config");

    let plans = plan(&cfg, &PlanScope::Package("gadget".into()), &provider, 1).expect("plan");
    write_package(out.path(), &plans[0], &provider, false).expect("write");

    let release = out.path().join("gadget/2.0");
    assert_eq!(names(&release), ["gadget", "widget"]);
    assert_eq!(names(&release.join("gadget")), ["00-gadget.yaml"]);
    assert_eq!(names(&release.join("widget")), ["00-install.yaml"]);
}

#[test]
fn dry_run_writes_nothing() {
    init_logging();
    let mirror = mirror();
    let out = TempDir::new().expect("out");
    let provider = MirrorProvider::new(mirror.path());
    let cfg = config::from_yaml_str(CONFIG).expect("config");
    let plans = plan(&cfg, &PlanScope::All, &provider, cfg.last_n).expect("plan");

    let results = writer::write_all(out.path(), &plans, &provider, true).expect("dry run");
    assert!(results
        .iter()
        .flat_map(|r| &r.writes)
        .all(|w| matches!(w, WriteResult::WouldWrite { .. })));
    assert!(fs::read_dir(out.path()).expect("out").next().is_none());
}
