//! Palette reduction and GIF serialization

use crate::rendering::raster::Raster;
use crate::{Error, Result, Rgb};
use color_quant::NeuQuant;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Largest palette a GIF color table can hold
pub const MAX_GIF_PALETTE: usize = 256;

// NeuQuant learns every pixel at sample factor 1. Icon-sized inputs are
// tiled up to this many pixels so the network sees enough training steps.
const NEUQUANT_SAMPLE_FACTOR: i32 = 1;
const MIN_TRAINING_PIXELS: usize = 16_384;
const REFINE_ROUNDS: usize = 64;

/// A palette-indexed GIF ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedIcon {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<Rgb>,
    pub bytes: Vec<u8>,
}

/// Reduce `raster` to at most `max_palette_size` colors and serialize it as GIF.
///
/// When the raster has no more distinct colors than the limit the palette is
/// exactly those colors in first-seen order, so the round trip is lossless.
/// Otherwise a NeuQuant palette trained on the pixels is refined against the
/// observed colors, so up to `max_palette_size` entries end up in use, and
/// each pixel maps to its nearest entry.
pub fn encode(raster: &Raster, max_palette_size: usize) -> Result<EncodedIcon> {
    if max_palette_size == 0 || max_palette_size > MAX_GIF_PALETTE {
        return Err(Error::InvalidPalette(max_palette_size));
    }
    let width = u16::try_from(raster.width())
        .map_err(|_| Error::Encode(format!("width {} exceeds GIF limit", raster.width())))?;
    let height = u16::try_from(raster.height())
        .map_err(|_| Error::Encode(format!("height {} exceeds GIF limit", raster.height())))?;

    let distinct = raster.distinct_colors();
    let (palette, indices) = if distinct.len() <= max_palette_size {
        exact_palette(raster, distinct)
    } else {
        adaptive_palette(raster, max_palette_size)
    };

    let flat: Vec<u8> = palette.iter().flat_map(|c| c.to_array()).collect();
    let mut bytes = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut bytes, width, height, &flat)?;
        let frame = gif::Frame {
            width,
            height,
            buffer: Cow::Borrowed(&indices),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame)?;
        // trailer is written when the encoder drops
    }

    log::debug!(
        "encoded {}x{} raster with {} palette entries ({} bytes)",
        width,
        height,
        palette.len(),
        bytes.len()
    );

    Ok(EncodedIcon {
        width: raster.width(),
        height: raster.height(),
        palette,
        bytes,
    })
}

fn exact_palette(raster: &Raster, palette: Vec<Rgb>) -> (Vec<Rgb>, Vec<u8>) {
    let lookup: HashMap<Rgb, u8> = palette
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i as u8))
        .collect();
    // every pixel color is in the palette by construction
    let indices = raster.pixels().map(|c| lookup[&c]).collect();
    (palette, indices)
}

fn adaptive_palette(raster: &Raster, colors: usize) -> (Vec<Rgb>, Vec<u8>) {
    let rgba: Vec<u8> = raster
        .pixels()
        .flat_map(|c| [c.0, c.1, c.2, 0xff])
        .collect();
    let repeats = MIN_TRAINING_PIXELS.div_ceil(rgba.len() / 4).max(1);
    let training = rgba.repeat(repeats);
    let nq = NeuQuant::new(NEUQUANT_SAMPLE_FACTOR, colors, &training);
    let seed: Vec<Rgb> = nq
        .color_map_rgb()
        .chunks_exact(3)
        .map(|c| Rgb(c[0], c[1], c[2]))
        .collect();

    let palette = refine(&histogram(raster), seed);
    let indices = raster.pixels().map(|c| nearest(&palette, c) as u8).collect();
    (palette, indices)
}

/// Distinct colors with their pixel counts, first-seen order.
fn histogram(raster: &Raster) -> Vec<(Rgb, u64)> {
    let mut slot: HashMap<Rgb, usize> = HashMap::new();
    let mut out: Vec<(Rgb, u64)> = Vec::new();
    for c in raster.pixels() {
        let i = *slot.entry(c).or_insert_with(|| {
            out.push((c, 0));
            out.len() - 1
        });
        out[i].1 += 1;
    }
    out
}

fn distance(a: Rgb, b: Rgb) -> u32 {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).unsigned_abs().pow(2);
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

/// Index of the closest palette entry; ties go to the lower index.
fn nearest(palette: &[Rgb], c: Rgb) -> usize {
    let mut best = 0;
    for (i, p) in palette.iter().enumerate() {
        if distance(*p, c) < distance(palette[best], c) {
            best = i;
        }
    }
    best
}

/// Pull the NeuQuant seed onto the observed colors: each entry moves to the
/// weighted mean of the colors nearest to it, and an entry no color maps to
/// is reseeded with the observed color worst served by the current palette.
fn refine(hist: &[(Rgb, u64)], mut palette: Vec<Rgb>) -> Vec<Rgb> {
    for _ in 0..REFINE_ROUNDS {
        let mut owner: Vec<usize> = hist.iter().map(|(c, _)| nearest(&palette, *c)).collect();
        let mut sums = vec![[0u64; 4]; palette.len()];
        for ((c, n), k) in hist.iter().zip(&owner) {
            let s = &mut sums[*k];
            s[0] += u64::from(c.0) * n;
            s[1] += u64::from(c.1) * n;
            s[2] += u64::from(c.2) * n;
            s[3] += n;
        }

        let mut next = palette.clone();
        for (entry, s) in next.iter_mut().zip(&sums) {
            if s[3] > 0 {
                let mean = |v: u64| ((v + s[3] / 2) / s[3]) as u8;
                *entry = Rgb(mean(s[0]), mean(s[1]), mean(s[2]));
            }
        }
        for k in (0..sums.len()).filter(|k| sums[*k][3] == 0) {
            let worst = hist
                .iter()
                .enumerate()
                .max_by_key(|(i, (c, _))| (distance(next[owner[*i]], *c), std::cmp::Reverse(*i)))
                .map(|(i, _)| i);
            match worst {
                Some(i) if distance(next[owner[i]], hist[i].0) > 0 => {
                    next[k] = hist[i].0;
                    owner[i] = k;
                }
                _ => break,
            }
        }

        if next == palette {
            break;
        }
        palette = next;
    }
    palette
}

/// Write `encoded` to `path`, creating parent directories as needed.
/// An existing file is overwritten.
pub fn save(encoded: &EncodedIcon, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, &encoded.bytes).map_err(io_err)
}

/// Decode a GIF back into a raster (first frame).
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Gif)?;
    Ok(Raster::from_image(img.to_rgb8()))
}
