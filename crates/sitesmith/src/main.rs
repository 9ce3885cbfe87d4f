//! sitesmith CLI - business website generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(about = "Generate single-page business websites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sitesmith.toml config file
    #[arg(short, long, default_value = "sitesmith.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a sitesmith.toml in the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate a single site and print or save its HTML
    Generate {
        /// Business name
        #[arg(short, long)]
        name: String,

        /// Website type (portfolio, saas, restaurant, ecommerce)
        #[arg(short = 't', long = "type")]
        website_type: Option<String>,

        /// Description of the desired site
        #[arg(short, long)]
        prompt: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTML-escape the business name and type
        #[arg(long)]
        escape: bool,

        /// Reject website types outside the allow-list
        #[arg(long)]
        strict: bool,
    },

    /// List the recognised website types
    Types,

    /// Build all configured sites
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Build, serve and rebuild when the config changes
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "7777")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Preview built sites
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "dist")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for generated HTML
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Generate {
            name,
            website_type,
            prompt,
            output,
            escape,
            strict,
        } => {
            let options = commands::generate::Options {
                escape,
                strict,
                output,
            };
            commands::generate::run(name, website_type, prompt, options)?;
        }
        Commands::Types => {
            commands::types::run();
        }
        Commands::Build { output, no_minify } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&cli.config, output, minify).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.config, port, !no_open).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(port, dir).await?;
        }
    }

    Ok(())
}
