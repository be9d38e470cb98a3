use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use png::{Decoder, Transformations};
use tray_icon::Icon;

const ICON_FILE: &str = "icon.png";
const FALLBACK_SIZE: u32 = 32;
const FALLBACK_COLOR: [u8; 3] = [0x4f, 0x6b, 0xed];

/// Places the tray icon is looked up, most specific first.
pub fn icon_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("assets").join(ICON_FILE));
    }
    candidates.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join(ICON_FILE),
    );
    candidates
}

/// Loads the first readable candidate, falling back to a plain generated icon.
pub fn load_tray_icon(configured: Option<&Path>) -> Result<Icon> {
    for path in icon_candidates(configured) {
        if !path.exists() {
            continue;
        }
        match load_png_file(&path) {
            Ok(icon) => {
                log::debug!("Loaded tray icon from {}", path.display());
                return Ok(icon);
            }
            Err(e) => log::warn!("Ignoring tray icon {}: {:#}", path.display(), e),
        }
    }
    log::warn!("No tray icon image found, using generated placeholder");
    fallback_icon()
}

fn load_png_file(path: &Path) -> Result<Icon> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (rgba, width, height) = decode_rgba(&data)?;
    Icon::from_rgba(rgba, width, height).map_err(|e| anyhow!("failed to create icon: {e}"))
}

pub fn fallback_icon() -> Result<Icon> {
    let (rgba, width, height) = placeholder_rgba(FALLBACK_SIZE);
    Icon::from_rgba(rgba, width, height).map_err(|e| anyhow!("failed to create icon: {e}"))
}

/// Filled circle on a transparent square.
fn placeholder_rgba(size: u32) -> (Vec<u8>, u32, u32) {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let alpha = if dx * dx + dy * dy <= radius * radius {
                255
            } else {
                0
            };
            rgba.extend_from_slice(&FALLBACK_COLOR);
            rgba.push(alpha);
        }
    }
    (rgba, size, size)
}

/// Decodes a PNG into 8-bit RGBA.
pub fn decode_rgba(png_data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let mut decoder = Decoder::new(png_data);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| anyhow!("failed to read PNG header: {e}"))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| anyhow!("failed to decode PNG: {e}"))?;

    let width = info.width;
    let height = info.height;
    let pixels = &buf[..info.buffer_size()];

    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks(2) {
                let gray = chunk[0];
                let alpha = chunk[1];
                rgba.extend_from_slice(&[gray, gray, gray, alpha]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for &gray in pixels {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
            rgba
        }
        png::ColorType::Indexed => {
            return Err(anyhow!("indexed PNG survived palette expansion"));
        }
    };

    Ok((rgba, width, height))
}
