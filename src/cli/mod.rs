//! Command-line interface module.

mod args;
pub mod common;
pub mod content;
pub mod seo;
pub mod settings;
pub mod storage;

pub use args::{
    Cli, Commands, ContentAction, QueryArgs, SeoArgs, SettingsAction, StorageAction,
};

use anyhow::{Context, Result};

use crate::consent::{ConsentManager, ConsentState};
use crate::generator::sitemap::build_sitemap;
use crate::log;
use common::Workspace;

/// Dispatch a parsed command.
pub async fn run(cli: &Cli, ws: &mut Workspace) -> Result<()> {
    match &cli.command {
        Commands::Settings { action } => settings::run(action, ws).await,
        Commands::Content { action } => content::run(action, ws).await,
        Commands::Storage { action } => storage::run(action, ws).await,
        Commands::Seo { args } => seo::run(args, ws).await,
        Commands::Sitemap { output, minify } => {
            if let Some(output) = output {
                ws.config.sitemap.path = output.clone();
            }
            if let Some(minify) = minify {
                ws.config.sitemap.minify = *minify;
            }
            let content = ws.content()?;
            build_sitemap(&ws.config, &content)
                .await
                .context("sitemap generation failed")?;
            Ok(())
        }
        Commands::Consent { state } => run_consent(*state, ws),
    }
}

fn run_consent(state: Option<ConsentState>, ws: &Workspace) -> Result<()> {
    let manager = ConsentManager::new(ws.local.clone());
    match state {
        Some(state) => {
            if !manager.set(state) {
                anyhow::bail!("failed to save consent");
            }
            log!("consent"; "{state}");
        }
        None => match manager.state() {
            Some(state) => println!("{state}"),
            None => println!("undecided"),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use clap::Parser;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        let mut config = test_parse_config("");
        config.local.path = temp.path().join("local.json");
        Workspace::new(config)
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["masthead", "settings", "section", "industry-news", "false"]);
        assert!(matches!(
            cli.command,
            Commands::Settings {
                action: SettingsAction::Section { enabled: false, .. }
            }
        ));

        let cli = Cli::parse_from(["masthead", "-V", "content", "ls", "press_releases", "-l", "3"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Content {
                action: ContentAction::List { .. }
            }
        ));

        assert!(Cli::try_parse_from(["masthead", "consent", "maybe"]).is_err());
    }

    #[tokio::test]
    async fn test_consent_roundtrip_through_file() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp);

        let cli = Cli::parse_from(["masthead", "consent", "accepted"]);
        run(&cli, &mut ws).await.unwrap();

        let manager = ConsentManager::new(ws.local.clone());
        assert_eq!(manager.state(), Some(ConsentState::Accepted));
    }

    #[tokio::test]
    async fn test_settings_set_persists() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp);

        let cli = Cli::parse_from(["masthead", "settings", "set", "analyticsCode=G-1"]);
        run(&cli, &mut ws).await.unwrap();

        let reopened = workspace(&temp);
        assert_eq!(reopened.settings.current().analytics_code, "G-1");
    }

    #[tokio::test]
    async fn test_content_without_backend_fails() {
        let temp = TempDir::new().unwrap();
        let mut ws = workspace(&temp);
        let cli = Cli::parse_from(["masthead", "content", "stats"]);
        let err = run(&cli, &mut ws).await.unwrap_err();
        assert!(err.to_string().contains("no backend configured"));
    }
}
