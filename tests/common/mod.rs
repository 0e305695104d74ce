#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use httpbind::router::{MountTable, Router};
use httpbind::{parse_model, resolve, ModelFormat, Resolution, SchemeRegistry, ServiceModel};

/// Parse a YAML model and resolve it.
pub fn load(yaml: &str) -> (ServiceModel, Resolution) {
    let model = parse_model(yaml, ModelFormat::Yaml).expect("model parses");
    let resolution = resolve(&model, &SchemeRegistry::from_model(&model));
    (model, resolution)
}

/// Like [`load`], failing the test on any resolution failure.
pub fn load_clean(yaml: &str) -> (ServiceModel, Resolution) {
    let (model, resolution) = load(yaml);
    assert!(resolution.is_clean(), "unexpected failures: {:?}", resolution.failures);
    (model, resolution)
}

/// Router over every mount of the resolution.
pub fn router(model: &ServiceModel, resolution: &Resolution) -> Router {
    Router::new(&MountTable::from_resolution(model, resolution)).expect("routes compile")
}
