use std::io::Write;

use ar_placement::core::config::AppConfig;
use ar_placement::xr::{FeatureName, ReferenceSpaceKind};

fn ron_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

#[test]
fn local_layer_overrides_only_its_keys() {
    let base = ron_file(
        r#"(
            window: (title: "Base", autoClose: 0.0),
            session: (required_features: ["hit-test"], optional_features: ["dom-overlay"]),
            placement: (align_to_surface: true, max_placed: 0),
        )"#,
    );
    let local = ron_file(r#"(placement: (max_placed: 5), window: (autoClose: 3.5))"#);
    let (cfg, used, errors) = AppConfig::load_layered([base.path(), local.path()]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(used.len(), 2);
    assert_eq!(cfg.window.title, "Base");
    assert_eq!(cfg.window.auto_close, 3.5);
    assert_eq!(cfg.placement.max_placed, 5);
    assert!(cfg.placement.align_to_surface);
    assert!(cfg.session.required().contains(&FeatureName::HitTest));
}

#[test]
fn missing_and_broken_layers_are_reported_not_fatal() {
    let base = ron_file(r#"(session: (reference_space: "local"))"#);
    let broken = ron_file("(session: (");
    let (cfg, used, errors) =
        AppConfig::load_layered([base.path(), broken.path(), std::path::Path::new("nope/ar.local.ron")]);
    assert_eq!(used.len(), 1);
    assert_eq!(errors.len(), 2);
    assert_eq!(cfg.session.reference_space_kind(), ReferenceSpaceKind::Local);
}

#[test]
fn shipped_config_is_valid() {
    let cfg = AppConfig::load_from_file("assets/config/ar.ron").expect("assets/config/ar.ron parses");
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    assert_eq!(cfg.reticle.segments, 32);
    assert_eq!(cfg.simulation.planes.len(), 2);
}
