//! Regenerates the icon set under `assets/` from `assets/icon.png`.

use std::path::Path;

use anyhow::Result;
use log::{info, warn};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    let report = aman::icons::generate_icons(&assets)?;

    info!("Generated {} PNG sizes", report.pngs.len());
    for container in &report.containers {
        match container.strategy {
            Some(strategy) => info!("{:?}: {} ({})", container.kind, container.path.display(), strategy),
            None => warn!("{:?}: not generated", container.kind),
        }
    }
    Ok(())
}
