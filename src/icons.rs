//! Build-time icon generation.
//!
//! Resizes one source image into every size the platforms ask for, then packs
//! the sizes into `.ico` and `.icns` containers. Each container has an ordered
//! list of encoder strategies; the first that succeeds wins and the rest are
//! skipped. A failed container never aborts the run.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, RgbaImage};
use log::{info, warn};

pub const ICON_SIZES: [u32; 8] = [16, 32, 48, 64, 128, 256, 512, 1024];
/// ICO entries top out at 256px.
pub const ICO_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];
const PLACEHOLDER_SIZE: u32 = 256;

/// Fixed input and output locations under an assets directory.
#[derive(Debug, Clone)]
pub struct IconPaths {
    pub source: PathBuf,
    pub svg_source: PathBuf,
    pub icons_dir: PathBuf,
    pub canonical_png: PathBuf,
    pub ico: PathBuf,
    pub icns: PathBuf,
}

impl IconPaths {
    pub fn new(assets_dir: &Path) -> Self {
        Self {
            source: assets_dir.join("icon.png"),
            svg_source: assets_dir.join("icon.svg"),
            icons_dir: assets_dir.join("icons"),
            canonical_png: assets_dir.join("icon.png"),
            ico: assets_dir.join("icon.ico"),
            icns: assets_dir.join("icon.icns"),
        }
    }

    pub fn sized_png(&self, size: u32) -> PathBuf {
        self.icons_dir.join(format!("icon-{size}.png"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Ico,
    Icns,
}

/// Which strategy (if any) produced a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOutcome {
    pub kind: ContainerKind,
    pub path: PathBuf,
    pub strategy: Option<&'static str>,
    pub failures: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone)]
pub struct IconReport {
    pub pngs: Vec<(u32, PathBuf)>,
    pub containers: Vec<ContainerOutcome>,
}

/// One way of producing a container from the resized PNGs.
pub trait IconEncoder {
    fn name(&self) -> &'static str;
    fn encode(&self, pngs: &[(u32, PathBuf)], out: &Path) -> Result<()>;
}

/// Multi-resolution ICO built with `image`'s encoder.
pub struct IcoFrames;

impl IconEncoder for IcoFrames {
    fn name(&self) -> &'static str {
        "image-ico"
    }

    fn encode(&self, pngs: &[(u32, PathBuf)], out: &Path) -> Result<()> {
        let mut frames = Vec::new();
        for (size, path) in pngs.iter().filter(|(size, _)| ICO_SIZES.contains(size)) {
            let encoded = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            frames.push(IcoFrame::with_encoded(encoded, *size, *size, ColorType::Rgba8)?);
        }
        if frames.is_empty() {
            bail!("no PNG of 256px or smaller to embed");
        }
        let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
        IcoEncoder::new(BufWriter::new(file)).encode_images(&frames)?;
        Ok(())
    }
}

/// Apple icon family built with the `icns` crate.
#[cfg(feature = "icns")]
pub struct IcnsFamily;

#[cfg(feature = "icns")]
impl IconEncoder for IcnsFamily {
    fn name(&self) -> &'static str {
        "icns"
    }

    fn encode(&self, pngs: &[(u32, PathBuf)], out: &Path) -> Result<()> {
        use std::io::BufReader;

        let mut family = icns::IconFamily::new();
        let mut added = 0usize;
        for (size, path) in pngs {
            let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            let image = icns::Image::read_png(BufReader::new(file))
                .with_context(|| format!("failed to decode {}", path.display()))?;
            match family.add_icon(&image) {
                Ok(()) => added += 1,
                Err(e) => log::debug!("ICNS has no slot for {size}px: {e}"),
            }
        }
        if added == 0 {
            bail!("no generated size fits an ICNS slot");
        }
        let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
        family.write(BufWriter::new(file))?;
        Ok(())
    }
}

/// Last resort: the 256px PNG copied under the container's name.
pub struct PlaceholderCopy;

impl IconEncoder for PlaceholderCopy {
    fn name(&self) -> &'static str {
        "placeholder-png"
    }

    fn encode(&self, pngs: &[(u32, PathBuf)], out: &Path) -> Result<()> {
        let (_, source) = pngs
            .iter()
            .find(|(size, _)| *size == PLACEHOLDER_SIZE)
            .ok_or_else(|| anyhow!("no {PLACEHOLDER_SIZE}px PNG to copy"))?;
        fs::copy(source, out).with_context(|| format!("failed to copy to {}", out.display()))?;
        Ok(())
    }
}

pub fn ico_strategies() -> Vec<Box<dyn IconEncoder>> {
    vec![Box::new(IcoFrames), Box::new(PlaceholderCopy)]
}

pub fn icns_strategies() -> Vec<Box<dyn IconEncoder>> {
    let mut strategies: Vec<Box<dyn IconEncoder>> = Vec::new();
    #[cfg(feature = "icns")]
    strategies.push(Box::new(IcnsFamily));
    strategies.push(Box::new(PlaceholderCopy));
    strategies
}

/// Tries each strategy in order and reports which one produced `out`.
pub fn run_strategies(
    kind: ContainerKind,
    strategies: &[Box<dyn IconEncoder>],
    pngs: &[(u32, PathBuf)],
    out: &Path,
) -> ContainerOutcome {
    let mut failures = Vec::new();
    for strategy in strategies {
        match strategy.encode(pngs, out) {
            Ok(()) => {
                info!("Wrote {} via {}", out.display(), strategy.name());
                return ContainerOutcome {
                    kind,
                    path: out.to_path_buf(),
                    strategy: Some(strategy.name()),
                    failures,
                };
            }
            Err(e) => {
                warn!("{} encoder failed for {}: {:#}", strategy.name(), out.display(), e);
                failures.push((strategy.name(), format!("{:#}", e)));
            }
        }
    }
    warn!("No encoder produced {}", out.display());
    ContainerOutcome {
        kind,
        path: out.to_path_buf(),
        strategy: None,
        failures,
    }
}

/// Regenerates every icon artifact under `assets_dir`.
pub fn generate_icons(assets_dir: &Path) -> Result<IconReport> {
    let paths = IconPaths::new(assets_dir);
    let source = load_source(&paths)?;

    fs::create_dir_all(&paths.icons_dir)
        .with_context(|| format!("failed to create {}", paths.icons_dir.display()))?;

    let mut pngs = Vec::with_capacity(ICON_SIZES.len());
    for size in ICON_SIZES {
        let out = paths.sized_png(size);
        let resized = source.resize_to_fill(size, size, FilterType::Lanczos3).to_rgba8();
        write_png(&resized, &out)?;
        info!("Wrote {}", out.display());
        pngs.push((size, out));
    }

    let largest = pngs
        .iter()
        .max_by_key(|(size, _)| *size)
        .map(|(_, path)| path.clone())
        .ok_or_else(|| anyhow!("no icon sizes configured"))?;
    fs::copy(&largest, &paths.canonical_png)
        .with_context(|| format!("failed to copy {} to {}", largest.display(), paths.canonical_png.display()))?;

    let containers = vec![
        run_strategies(ContainerKind::Ico, &ico_strategies(), &pngs, &paths.ico),
        run_strategies(ContainerKind::Icns, &icns_strategies(), &pngs, &paths.icns),
    ];

    info!("Icon generation complete. Icons available in {}", paths.icons_dir.display());
    Ok(IconReport { pngs, containers })
}

fn load_source(paths: &IconPaths) -> Result<image::DynamicImage> {
    if paths.source.exists() {
        info!("Using source: {}", paths.source.display());
        return image::open(&paths.source)
            .with_context(|| format!("failed to decode {}", paths.source.display()));
    }
    if paths.svg_source.exists() {
        bail!(
            "{} found but SVG sources are not supported; export a high-res PNG to {}",
            paths.svg_source.display(),
            paths.source.display()
        );
    }
    bail!(
        "No source icon found. Place a high-res PNG at {}",
        paths.source.display()
    )
}

fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    PngEncoder::new_with_quality(BufWriter::new(file), CompressionType::Best, PngFilter::Adaptive)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .with_context(|| format!("failed to encode {}", path.display()))
}
