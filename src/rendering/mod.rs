//! Icon rendering: pixel maps → raster → palette GIF on disk

pub mod encode;
pub mod icons;
pub mod paint;
pub mod raster;

pub use encode::{decode, encode, save, EncodedIcon};
pub use paint::{px, IconSpec, PixelOverride};
pub use raster::{render, Raster};

use crate::{Error, RenderConfig, Result};
use std::path::PathBuf;

/// Outcome of writing one icon.
#[derive(Debug)]
pub struct RenderedIcon {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<()>,
}

/// Per-icon results of a `run_all` batch, in output order.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub icons: Vec<RenderedIcon>,
}

impl RenderReport {
    /// Paths that were written successfully.
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.icons.iter().filter(|i| i.result.is_ok()).map(|i| &i.path)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenderedIcon> {
        self.icons.iter().filter(|i| i.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.icons.iter().all(|i| i.result.is_ok())
    }
}

/// File an icon kind is written to.
pub fn icon_path(config: &RenderConfig, name: &str) -> PathBuf {
    config.output_dir.join(format!("{}.gif", name))
}

/// Render and save the given specs under `config.output_dir`.
///
/// Every icon is encoded before anything is written, so an imaging failure
/// aborts the batch with no partial output. Write failures are recorded per
/// icon and do not stop the remaining icons.
pub fn run_specs(config: &RenderConfig, specs: &[IconSpec<'_>]) -> Result<RenderReport> {
    let mut encoded = Vec::with_capacity(specs.len());
    for spec in specs {
        let raster = render(spec, config.width, config.height, config.background)?;
        encoded.push((spec.name, encode(&raster, config.max_palette_size)?));
    }

    let mut report = RenderReport::default();
    for (name, icon) in encoded {
        let path = icon_path(config, name);
        let result = save(&icon, &path);
        match &result {
            Ok(()) => log::info!("wrote {} ({} colors)", path.display(), icon.palette.len()),
            Err(e) => log::warn!("could not write icon '{}': {}", name, e),
        }
        report.icons.push(RenderedIcon {
            name: name.to_string(),
            path,
            result,
        });
    }
    Ok(report)
}

/// Render the built-in icons, or only those named in `only` when it is
/// non-empty. Unknown names are a configuration error.
pub fn run_all(config: &RenderConfig, only: &[String]) -> Result<RenderReport> {
    let specs: Vec<IconSpec<'static>> = if only.is_empty() {
        icons::builtin().to_vec()
    } else {
        only.iter()
            .map(|name| {
                icons::find(name)
                    .copied()
                    .ok_or_else(|| Error::Config(format!("unknown icon kind '{}'", name)))
            })
            .collect::<Result<_>>()?
    };
    run_specs(config, &specs)
}

/// Steps for getting rendered icons onto the clock through its web UI.
pub fn upload_instructions(host: &str, config: &RenderConfig, names: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("Upload instructions:\n");
    out.push_str(&format!("1. Open http://{} in your browser\n", host));
    out.push_str("2. Go to File Manager\n");
    out.push_str("3. Navigate to ICONS folder\n");
    out.push_str(&format!(
        "4. Upload all .gif files from {}/\n",
        config.output_dir.display()
    ));
    out.push_str("\nThen update your script to use these icon names:\n");
    for name in names {
        out.push_str(&format!("  icon=\"{}\"\n", name));
    }
    out
}
