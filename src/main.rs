use anyhow::Context;
use awtrix_icons::probe::ProbeEvent;
use awtrix_icons::rendering::{self, icons};
use awtrix_icons::{AppConfig, IconIdentifier, ProbeOutcome, Prober};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "awtrix-icons", version, about = "Create and fetch icons for AWTRIX clocks")]
struct Cli {
    /// JSON config file (render/probe sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the built-in icons as GIF files
    Render {
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Only render these icon kinds
        #[arg(long)]
        only: Vec<String>,
    },
    /// Try to pull catalog icons onto the clock
    Fetch {
        /// Icon IDs; a default airplane-themed batch is used when empty
        ids: Vec<String>,
        /// Clock address
        #[arg(long)]
        host: Option<String>,
        /// Per-attempt timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Pause between icons in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Probe this many icons at once
        #[arg(long, default_value_t = 1)]
        jobs: usize,
        /// Print every URL tried
        #[arg(long, short)]
        verbose: bool,
    },
    /// Show the built-in icon kinds
    List,
    /// Print size and colors of a GIF icon
    Inspect { file: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(p) => AppConfig::from_file(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

fn render(mut cfg: AppConfig, out: Option<PathBuf>, only: Vec<String>) -> anyhow::Result<()> {
    if let Some(out) = out {
        cfg.render.output_dir = out;
    }
    println!("Creating custom AWTRIX icons in {}/", cfg.render.output_dir.display());
    println!("{}", RULE);

    let report = match rendering::run_all(&cfg.render, &only) {
        Ok(r) => r,
        Err(e @ awtrix_icons::Error::Imaging(_)) => {
            println!("Error: {}", e);
            println!("No icons were written; check the canvas and palette settings");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for icon in &report.icons {
        match &icon.result {
            Ok(()) => println!("✓ Created: {}", icon.path.display()),
            Err(e) => println!("✗ Failed: {} ({})", icon.path.display(), e),
        }
    }

    let names: Vec<&str> = report
        .icons
        .iter()
        .filter(|i| i.result.is_ok())
        .map(|i| i.name.as_str())
        .collect();
    println!("\n{}", RULE);
    print!(
        "{}",
        rendering::upload_instructions(&cfg.probe.device_host, &cfg.render, &names)
    );
    println!("{}", RULE);

    if !report.is_complete() {
        anyhow::bail!("{} icon(s) could not be written", report.failures().count());
    }
    Ok(())
}

fn print_event(event: &ProbeEvent<'_>) {
    match event {
        ProbeEvent::Started(id) => println!("\nAttempting to download icon {}...", id),
        ProbeEvent::Attempt { .. } => {}
        ProbeEvent::Finished(report) => match &report.outcome {
            ProbeOutcome::Succeeded { url } => println!("  ✓ Downloaded via {}", url),
            ProbeOutcome::ExhaustedAllEndpoints { guidance, .. } => {
                println!("  ✗ Could not download programmatically");
                for line in guidance.lines() {
                    println!("  {}", line);
                }
            }
        },
    }
}

fn print_event_verbose(event: &ProbeEvent<'_>) {
    if let ProbeEvent::Attempt { url, .. } = event {
        println!("  … trying {}", url);
    }
    print_event(event);
}

fn fetch(
    mut cfg: AppConfig,
    ids: Vec<String>,
    host: Option<String>,
    timeout_ms: Option<u64>,
    delay_ms: Option<u64>,
    jobs: usize,
    verbose: bool,
) -> anyhow::Result<()> {
    if let Some(h) = host {
        cfg.probe.device_host = h;
    }
    if let Some(t) = timeout_ms {
        cfg.probe.timeout_ms = t;
    }
    if let Some(d) = delay_ms {
        cfg.probe.delay_ms = d;
    }
    let host = cfg.probe.device_host.clone();
    let prober = Prober::new(cfg.probe).context("setting up prober")?;

    let ids: Vec<IconIdentifier> = ids.into_iter().map(IconIdentifier::from).collect();
    if ids.is_empty() {
        println!("No icon IDs provided. Trying common airplane icons:");
    }

    println!("\n{}", RULE);
    println!("  AWTRIX Icon Downloader");
    println!("  Target: http://{}", host);
    println!("{}", RULE);

    let on_event: fn(&ProbeEvent<'_>) = if verbose { print_event_verbose } else { print_event };
    let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
    let reports = if jobs > 1 {
        prober.probe_all_parallel(&ids, jobs, on_event)
    } else {
        prober.probe_all_with(&ids, on_event)
    };

    let ok = reports.iter().filter(|r| r.outcome.is_success()).count();
    log::info!("{} of {} icons fetched", ok, reports.len());

    println!("\n{}", RULE);
    println!("  If automatic download failed, use web interface:");
    println!("  http://{}", host);
    println!("{}\n", RULE);
    Ok(())
}

fn list(cfg: &AppConfig) -> anyhow::Result<()> {
    for spec in icons::builtin() {
        let raster = rendering::render(spec, cfg.render.width, cfg.render.height, cfg.render.background)?;
        println!("{} ({} colors)", spec.name, raster.distinct_colors().len());
        print!("{}", raster.to_ascii(cfg.render.background));
        println!();
    }
    Ok(())
}

fn inspect(file: PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let raster = rendering::decode(&bytes).with_context(|| format!("decoding {}", file.display()))?;
    let colors = raster.distinct_colors();
    println!("{}: {}x{}, {} colors", file.display(), raster.width(), raster.height(), colors.len());
    for c in colors {
        println!("  #{:02x}{:02x}{:02x}", c.0, c.1, c.2);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Render { out, only } => render(cfg, out, only),
        Command::Fetch {
            ids,
            host,
            timeout_ms,
            delay_ms,
            jobs,
            verbose,
        } => fetch(cfg, ids, host, timeout_ms, delay_ms, jobs, verbose),
        Command::List => list(&cfg),
        Command::Inspect { file } => inspect(file),
    }
}
