//! selenese-ats CLI - Main Entry Point
//!
//! Generates Testerman ATS scripts from selenese test cases and parses
//! generated scripts back into test cases.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use selenese_ats::{Formatter, FormatterOptions, TargetPlatform};
use selenese_ats_cli::commands::{batch, check, config, generate, parse};
use selenese_ats_cli::output::OutputFormat;

/// selenese-ats - Selenium test cases to Testerman ATS scripts
#[derive(Parser)]
#[command(name = "selenese-ats")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Formatter options file (TOML)
    #[arg(short, long, default_value = "selenese-ats.toml", env = "SELENESE_ATS_CONFIG", global = true)]
    config: PathBuf,

    /// Target platform, overriding the options file
    #[arg(long, global = true)]
    platform: Option<Platform>,

    /// Do not echo the commands; the script cannot be parsed back
    #[arg(long, global = true)]
    no_selenese: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Platform {
    /// Selenium Remote Control probe
    Rc,
    /// Selenium WebDriver probe
    Webdriver,
}

impl From<Platform> for TargetPlatform {
    fn from(p: Platform) -> Self {
        match p {
            Platform::Rc => TargetPlatform::RemoteControl,
            Platform::Webdriver => TargetPlatform::WebDriver,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an ATS script from a test case file
    Generate(generate::GenerateArgs),

    /// Recover a test case from a generated ATS script
    Parse(parse::ParseArgs),

    /// Show the parameters and warnings of a test case without writing
    Check(check::CheckArgs),

    /// Generate scripts for every test case below a directory
    Batch(batch::BatchArgs),

    /// Write a default options file
    InitConfig(config::InitConfigArgs),

    /// Show version information
    Version,
}

/// Options file overridden by the command line flags
fn load_formatter(
    config: &Path,
    platform: Option<Platform>,
    no_selenese: bool,
) -> anyhow::Result<Formatter> {
    let mut options = FormatterOptions::load(config)
        .with_context(|| format!("loading options from {}", config.display()))?;
    if let Some(platform) = platform {
        options = options.with_platform(platform.into());
    }
    if no_selenese {
        options.show_selenese = false;
    }
    options.validate()?;
    tracing::debug!("Using options from {}", config.display());
    Ok(Formatter::new(options))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let formatter = || load_formatter(&cli.config, cli.platform, cli.no_selenese);
    match cli.command {
        Commands::Generate(args) => generate::execute(args, &formatter()?)?,
        Commands::Parse(args) => parse::execute(args, &formatter()?, cli.format)?,
        Commands::Check(args) => check::execute(args, &formatter()?, cli.format)?,
        Commands::Batch(args) => batch::execute(args, &formatter()?, cli.format)?,
        Commands::InitConfig(args) => {
            let platform = cli.platform.map(TargetPlatform::from).unwrap_or_default();
            config::execute(args, &cli.config, platform)?
        }
        Commands::Version => {
            println!("selenese-ats v{}", selenese_ats_common::VERSION);
            println!("Selenium IDE test cases to Testerman ATS scripts");
        }
    }

    Ok(())
}
