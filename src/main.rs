//! napigen - N-API Addon Generator
//!
//! CLI entry point: generates addon.c, manifest.json and node-gyp build files
//! for a C source/header pair, and optionally builds the addon.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use napigen::buildfiles::{self, GypiSettings, ADDON_SOURCE};
use napigen::config::NapigenConfig;
use napigen::toolchain::NodeGyp;
use napigen::{
    AddonGenerator, AddonRequest, ArtifactSet, MalformedPolicy, RedefinitionPolicy, TypeCatalogue,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "napigen")]
#[command(version)]
#[command(about = "Generate @stdlib/napi addon glue for a C function", long_about = None)]
struct Cli {
    /// C source file (.c) defining the function to wrap
    source: Option<PathBuf>,

    /// C header file (.h) declaring the function
    header: Option<PathBuf>,

    /// Directory for addon.c, manifest.json and build files
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Configuration file (default: nearest napigen.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON type catalogue replacing the built-in table
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Run node-gyp clean + configure build after writing files
    #[arg(long)]
    build: bool,

    /// Do not write binding.gyp / include.gypi
    #[arg(long)]
    no_build_files: bool,

    /// Skip malformed parameter declarations instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Fail when the source defines more than one function
    #[arg(long)]
    reject_redefinition: bool,

    /// Print addon.c to stdout without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let (source, header) = match (&cli.source, &cli.header) {
        (Some(source), Some(header)) => (source.clone(), header.clone()),
        (None, None) => {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
        _ => anyhow::bail!("Both <SOURCE> and <HEADER> are required"),
    };

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = load_config(&cli, &cwd)?;
    cmd_generate(&source, &header, &config, cli.dry_run)
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Some(level) = cli.log_level {
        builder.filter_level(level.into());
    }
    builder.init();
}

/// Configuration file overlaid with command-line flags.
fn load_config(cli: &Cli, cwd: &Path) -> Result<NapigenConfig> {
    let mut config = match &cli.config {
        Some(path) => NapigenConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => NapigenConfig::find_and_load(cwd).context("Failed to load napigen.toml")?,
    };

    if let Some(dir) = &cli.out_dir {
        config.output.dir = dir.to_string_lossy().into_owned();
    }
    if let Some(path) = &cli.catalogue {
        config.catalogue.path = Some(path.to_string_lossy().into_owned());
    }
    if cli.build {
        config.build.enabled = true;
    }
    if cli.no_build_files {
        config.output.build_files = false;
    }
    if cli.skip_malformed {
        config.extract.on_malformed = MalformedPolicy::Skip;
    }
    if cli.reject_redefinition {
        config.extract.on_redefinition = RedefinitionPolicy::Reject;
    }

    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn load_catalogue(config: &NapigenConfig) -> Result<TypeCatalogue> {
    match &config.catalogue.path {
        Some(path) => TypeCatalogue::from_json_file(path)
            .with_context(|| format!("Failed to load type catalogue '{}'", path)),
        None => Ok(TypeCatalogue::builtin()),
    }
}

fn cmd_generate(source: &Path, header: &Path, config: &NapigenConfig, dry_run: bool) -> Result<()> {
    let source_text = fs::read_to_string(source).with_context(|| {
        format!(
            "Could not read source file '{}'. Please ensure the file exists and is accessible.",
            source.display()
        )
    })?;
    if !header.is_file() {
        anyhow::bail!(
            "Could not read header file '{}'. Please ensure the file exists and is accessible.",
            header.display()
        );
    }

    let catalogue = load_catalogue(config)?;
    let generator = AddonGenerator::new(&catalogue, config.extract_options());
    let request = AddonRequest::from_paths(source_text, source, header);
    let artifacts = generator
        .generate(&request)
        .context("Error during addon generation")?;

    if dry_run {
        println!("{}", artifacts.glue_source);
        return Ok(());
    }

    let out_dir = PathBuf::from(&config.output.dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;
    write_artifacts(&artifacts, &out_dir)?;

    if config.output.build_files {
        write_build_files(source, &out_dir, config)?;
    }

    println!("Addon generation completed successfully!");

    if config.build.enabled {
        let node_gyp = NodeGyp::locate(config.build.node_gyp.as_deref().map(Path::new), &out_dir)
            .context("Failed to locate node-gyp")?;
        node_gyp.rebuild().context("Error during addon build process")?;
        println!("Addon built successfully.");
    }

    Ok(())
}

fn write_artifacts(artifacts: &ArtifactSet, out_dir: &Path) -> Result<()> {
    let addon_path = out_dir.join(ADDON_SOURCE);
    fs::write(&addon_path, &artifacts.glue_source)
        .with_context(|| format!("Failed to write {}", addon_path.display()))?;
    info!("Wrote {}", addon_path.display());

    let manifest_path = out_dir.join("manifest.json");
    artifacts
        .manifest
        .save(&manifest_path)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
    info!("Wrote {}", manifest_path.display());
    Ok(())
}

fn write_build_files(source: &Path, out_dir: &Path, config: &NapigenConfig) -> Result<()> {
    let source_dir = absolute(source.parent().unwrap_or_else(|| Path::new("")))?;
    let settings = GypiSettings::new(
        &source_dir,
        &absolute(out_dir)?,
        &absolute(Path::new(&config.build.stdlib_basedir))?,
    )
    .with_library_manifest(config.build.library_manifest.clone());

    let gyp_path = out_dir.join("binding.gyp");
    fs::write(&gyp_path, buildfiles::binding_gyp())
        .with_context(|| format!("Failed to write {}", gyp_path.display()))?;

    let gypi_path = out_dir.join("include.gypi");
    fs::write(&gypi_path, buildfiles::include_gypi(&settings))
        .with_context(|| format!("Failed to write {}", gypi_path.display()))?;

    info!("Wrote {} and {}", gyp_path.display(), gypi_path.display());
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    Ok(cwd.join(path))
}
