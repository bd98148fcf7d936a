//! Masthead - settings, SEO metadata and content access for an editorial site.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use masthead::cli::{self, Cli, common::Workspace};
use masthead::config::{ConfigOverrides, SiteConfig};
use masthead::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);
    logger::set_quiet(cli.quiet);

    let overrides = ConfigOverrides {
        site_url: cli.site_url.clone(),
        backend_url: cli.backend_url.clone(),
        local_path: cli.local.clone(),
    };
    let config = SiteConfig::load(&cli.config, &overrides)?;

    let mut ws = Workspace::new(config);
    cli::run(&cli, &mut ws).await
}
