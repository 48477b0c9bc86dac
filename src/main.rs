use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;
use thumbcache::naming::parse_size;
use thumbcache::{FsBackend, Resolver, SizeSpec, ThumbnailSettings, config};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Extensions the warm command treats as source images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tif", "tiff", "webp"];

#[derive(Parser)]
#[command(name = "thumbcache")]
#[command(about = "Fixed-size thumbnail generation with an on-disk cache")]
#[command(long_about = "\
Fixed-size thumbnail generation with an on-disk cache

Thumbnails are derived from source images by an aspect-preserving resize
followed, when the aspect ratios differ, by a top-left crop. Each result is
written once to

  <base_image_path>/Thumbnails/<bucket>/<filename>

and served from disk on every later request. Buckets are named after the
size alias (\"small-100x100\") or the literal dimensions (\"120x80\").

Configuration lives in thumbcache.toml; run 'thumbcache gen-config' to print
a documented stock file.")]
#[command(version)]
struct Cli {
    /// Path to the settings file
    #[arg(long, default_value = "thumbcache.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate (or fetch from cache) one thumbnail and print its paths
    Gen {
        /// Source image filename, relative to base_image_path
        image: String,
        /// Size alias from the config file
        #[arg(long, conflicts_with = "size", required_unless_present = "size")]
        alias: Option<String>,
        /// Literal dimensions as WxH, e.g. 120x80
        #[arg(long)]
        size: Option<String>,
    },
    /// Pre-populate every alias bucket for every image under base_image_path
    Warm,
    /// Validate the settings file and the paths it references
    Check,
    /// Print a stock thumbcache.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Gen { image, alias, size } => {
            let settings = ThumbnailSettings::load(&cli.config)?;
            let resolver = Resolver::new(settings, FsBackend::new());

            let spec = match (alias, size) {
                (Some(name), None) => SizeSpec::Alias(name),
                (None, Some(spec)) => SizeSpec::Exact(
                    parse_size(&spec)
                        .ok_or_else(|| format!("invalid --size '{spec}', expected WxH"))?,
                ),
                _ => unreachable!("clap enforces exactly one of --alias/--size"),
            };

            let thumb = resolver.request(&image, &spec)?;
            let state = if thumb.from_cache { "cached" } else { "generated" };
            println!("{} ({state})", thumb.logical_path);
            println!("  file: {}", thumb.physical_path.display());
            if thumb.used_fallback {
                println!("  note: source missing, placeholder substituted");
            }
        }
        Command::Warm => {
            let settings = ThumbnailSettings::load(&cli.config)?;
            if settings.aliases.is_empty() {
                return Err("no aliases configured, nothing to warm".into());
            }
            let base = settings.base_image_path.clone();
            let aliases: Vec<String> =
                settings.aliases.iter().map(|a| a.name.clone()).collect();
            let resolver = Resolver::new(settings, FsBackend::new());

            let images: Vec<String> = WalkDir::new(&base)
                .into_iter()
                .filter_entry(|e| {
                    e.file_name() != std::ffi::OsStr::new(thumbcache::naming::THUMBNAILS_DIR)
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| {
                    e.path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| {
                            IMAGE_EXTENSIONS
                                .iter()
                                .any(|known| known.eq_ignore_ascii_case(ext))
                        })
                })
                .filter_map(|e| {
                    e.path()
                        .strip_prefix(&base)
                        .ok()
                        .map(|p| p.to_string_lossy().into_owned())
                })
                .collect();

            println!(
                "==> Warming {} images x {} aliases",
                images.len(),
                aliases.len()
            );

            let resolver = &resolver;
            let results: Vec<_> = images
                .par_iter()
                .flat_map(|image| {
                    aliases
                        .par_iter()
                        .map(move |alias| resolver.request_alias(image, alias))
                })
                .collect();

            let mut generated = 0usize;
            let mut cached = 0usize;
            let mut failed = 0usize;
            for result in &results {
                match result {
                    Ok(thumb) if thumb.from_cache => cached += 1,
                    Ok(_) => generated += 1,
                    Err(e) => {
                        eprintln!("warm: {e}");
                        failed += 1;
                    }
                }
            }
            println!("==> {generated} generated, {cached} cached, {failed} failed");
            if failed > 0 {
                return Err(format!("{failed} thumbnails failed").into());
            }
        }
        Command::Check => {
            let settings = ThumbnailSettings::load(&cli.config)?;
            println!("==> Checking {}", cli.config.display());
            if !settings.base_image_path.is_dir() {
                return Err(format!(
                    "base_image_path does not exist: {}",
                    settings.base_image_path.display()
                )
                .into());
            }
            if !settings.missing_image().is_file() {
                println!(
                    "warning: missing_image_path not found: {} (requests for absent sources will fail)",
                    settings.missing_image().display()
                );
            }
            for alias in &settings.aliases {
                println!("  alias {} -> {}x{}", alias.name, alias.width, alias.height);
            }
            println!("==> Settings are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
