//! `tfx validate`: parse and check an app manifest.

use std::path::Path;

use anyhow::{Context, Result};
use twelvefactor::Manifest;

pub fn validate(path: &str, format: &str) -> Result<()> {
    let manifest = load(Path::new(path))?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        _ => {
            println!("✓ {} is valid", path);
            print!("{}", summary(&manifest));
        }
    }

    Ok(())
}

/// Read a manifest and enforce its invariants.
pub fn load(path: &Path) -> Result<Manifest> {
    let manifest = Manifest::from_file(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    manifest.validate()?;
    Ok(manifest)
}

fn summary(manifest: &Manifest) -> String {
    let mut out = format!(
        "  app: {} ({}) version {}\n",
        manifest.app.name, manifest.app.id, manifest.app.version
    );
    for process in &manifest.processes {
        out.push_str(&format!(
            "  {:<12} x{:<3} {}  {}\n",
            process.name,
            process.quantity,
            manifest.process_image(process),
            process.command.join(" "),
        ));
    }
    out
}
