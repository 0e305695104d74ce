//! Generates `src/transport` from `shop.yaml`.

use anyhow::{bail, Context};
use httpbind::{generate, load_model, resolve, CodegenOptions, SchemeRegistry};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let model_path = root.join("shop.yaml");
    println!("cargo:rerun-if-changed={}", model_path.display());

    let model = load_model(&model_path)?;
    let resolution = resolve(&model, &SchemeRegistry::from_model(&model));
    if !resolution.is_clean() {
        bail!("shop.yaml does not resolve: {:?}", resolution.failures);
    }
    let options = CodegenOptions {
        module_dir: "src/transport".to_string(),
        ..CodegenOptions::default()
    };
    for file in generate(&model, &resolution, &options)? {
        let target = root.join(&file.path);
        if std::fs::read_to_string(&target).is_ok_and(|existing| existing == file.contents) {
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&target, &file.contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}
