//! AWTRIX icon toolkit
//!
//! Builds small palette-indexed GIF icons for AWTRIX pixel-matrix clocks from
//! declarative pixel maps, and tries to pull catalog icons onto a device whose
//! HTTP API is not documented, falling back to manual instructions.
//!
//! # Features
//!
//! - **Renderer** (always built): `IconSpec` → `Raster` → `EncodedIcon` → file
//! - **Prober** (`probe`, default): ordered endpoint guesses over a blocking
//!   HTTP client with a manual fallback
//!
//! # Example
//!
//! ```no_run
//! use awtrix_icons::{rendering, RenderConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig {
//!     output_dir: "out/icons".into(),
//!     ..Default::default()
//! };
//!
//! let report = rendering::run_all(&config, &[])?;
//! for icon in report.written() {
//!     println!("wrote {}", icon.display());
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

// Declarative pixel maps, rasterization and GIF encoding
pub mod rendering;

// Endpoint prober (blocking HTTP); gated so the renderer builds without a TLS stack
#[cfg(feature = "probe")]
pub mod probe;

#[cfg(feature = "probe")]
pub use probe::{IconIdentifier, ProbeOutcome, ProbeReport, Prober};

/// Network address of the clock when nothing else is configured
pub const DEFAULT_DEVICE_HOST: &str = "192.168.5.56";

/// An RGB color triple.
///
/// Serializes as a three element array, so config files can write
/// `"background": [0, 0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

/// Configuration for the icon renderer
///
/// Defaults match the AWTRIX icon format: an 8x8 canvas on black, written
/// as GIF with a palette of up to 256 entries.
///
/// # Examples
///
/// ```
/// let cfg = awtrix_icons::RenderConfig::default();
/// assert_eq!((cfg.width, cfg.height), (8, 8));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory receiving one `<name>.gif` per icon
    pub output_dir: PathBuf,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Color of every cell not painted by an override
    pub background: Rgb,
    /// Upper bound on palette entries (1..=256)
    pub max_palette_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("awtrix_icons"),
            width: 8,
            height: 8,
            background: Rgb::BLACK,
            max_palette_size: 256,
        }
    }
}

/// Configuration for the endpoint prober
///
/// `endpoints` are URL templates; `{host}` and `{id}` are substituted for
/// each attempt. None of the default shapes is known to exist on real
/// firmware, they are guesses tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Host (and optional port) of the clock
    pub device_host: String,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Pause between identifiers in milliseconds
    pub delay_ms: u64,
    /// Candidate URL templates, tried in order
    pub endpoints: Vec<String>,
    /// Identifiers used when none are supplied
    pub default_identifiers: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            device_host: DEFAULT_DEVICE_HOST.to_string(),
            timeout_ms: 5000,
            delay_ms: 500,
            endpoints: vec![
                "http://{host}/api/icon?id={id}".to_string(),
                "http://{host}/api/downloadIcon?id={id}".to_string(),
                "http://{host}/icon/{id}/download".to_string(),
            ],
            default_identifiers: ["2056", "833", "1092", "6020", "52580", "2497"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProbeConfig {
    /// Check that the candidate list can produce URLs at all.
    pub fn validate(&self) -> Result<()> {
        if self.device_host.trim().is_empty() {
            return Err(Error::Config("device_host is empty".into()));
        }
        if self.endpoints.is_empty() {
            return Err(Error::Config("no endpoint templates configured".into()));
        }
        if let Some(t) = self.endpoints.iter().find(|t| !t.contains("{id}")) {
            return Err(Error::Config(format!(
                "endpoint template '{}' has no {{id}} placeholder",
                t
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file layout
///
/// ```json
/// { "render": { "output_dir": "icons" }, "probe": { "device_host": "10.0.0.7" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub probe: ProbeConfig,
}

impl AppConfig {
    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }
}
