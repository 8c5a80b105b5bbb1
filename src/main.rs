use clap::{Parser, Subcommand};
use extension_gallery::builder::Builder;
use extension_gallery::config::{self, Mode};
use extension_gallery::{l10n, output, validate, watch};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn version_string() -> &'static str {
    let hash = env!("GALLERY_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else if env!("GALLERY_GIT_DIRTY") == "true" {
        Box::leak(format!("{}@{hash}-dirty", env!("CARGO_PKG_VERSION")).into_boxed_str())
    } else {
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "extension-gallery")]
#[command(about = "Build the extension gallery website")]
#[command(long_about = "\
Build the extension gallery website

Project structure:

  project/
  ├── gallery.toml                 # Config (optional, see gen-config)
  ├── extensions/
  │   ├── extensions.json          # Featured slugs, in display order
  │   ├── fetch.js                 # Served at /fetch.js
  │   └── Lily/Cast.js             # Served at /Lily/Cast.js
  ├── images/fetch.svg             # Banner for fetch (2:1, no <text>)
  ├── samples/Fetch Demo.sb3       # Sample project loading fetch.js
  ├── docs/fetch.md                # Served at /fetch.html
  ├── website/                     # Copied to the output root
  └── translations/                # <group>.json: locale -> key -> string

Generated:
  /index.html                              Homepage (not in desktop mode)
  /sitemap.xml                             Sitemap (not in desktop mode)
  /generated-metadata/extensions-v0.json   Catalog of featured extensions

Set RUST_LOG=debug for per-file detail.")]
#[command(version = version_string())]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Build mode
    #[arg(long, value_enum, default_value_t = Mode::Production, global = true)]
    mode: Mode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site and write it to the output directory
    Build {
        #[arg(long, default_value = "build")]
        output: PathBuf,
    },
    /// Check every file against the gallery rules
    Validate,
    /// Export translatable strings, one file per group
    L10n {
        #[arg(long, default_value = "l10n")]
        output: PathBuf,
    },
    /// Build, then rebuild whenever a source file changes
    Watch {
        #[arg(long, default_value = "build")]
        output: PathBuf,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build { output: out_dir } => {
            let builder = Builder::from_root(&cli.root, cli.mode)?;
            builder.check_output_dir(&out_dir)?;
            let registry = builder.build()?;
            reset_dir(&out_dir)?;
            registry.export(&out_dir)?;
            output::print_build_output(&registry, &out_dir);
        }
        Command::Validate => {
            let builder = Builder::from_root(&cli.root, cli.mode)?;
            let registry = builder.build()?;
            let failures = validate::validate_registry(&registry);
            output::print_validation_output(&failures, registry.len());
            if !failures.is_empty() {
                std::process::exit(1);
            }
        }
        Command::L10n { output: out_dir } => {
            let builder = Builder::from_root(&cli.root, cli.mode)?;
            let registry = builder.build()?;
            let merged = l10n::generate(&registry)?;
            let written = l10n::export(&merged, &out_dir)?;
            output::print_l10n_output(&merged, &written);
        }
        Command::Watch { output: out_dir } => {
            let builder = Builder::from_root(&cli.root, cli.mode)?;
            builder.check_output_dir(&out_dir)?;
            watch::watch(&builder, |registry| {
                let Some(registry) = registry else {
                    return;
                };
                let exported = reset_dir(&out_dir)
                    .map_err(|e| e.to_string())
                    .and_then(|()| registry.export(&out_dir).map_err(|e| e.to_string()));
                match exported {
                    Ok(files) => tracing::info!(files, output = %out_dir.display(), "Exported"),
                    Err(e) => tracing::error!(error = %e, "Export failed"),
                }
            })?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Empty `dir` so files removed from the sources disappear from the output.
///
/// Callers check `dir` with [`Builder::check_output_dir`] first.
fn reset_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)
}
