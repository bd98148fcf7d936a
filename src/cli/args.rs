//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::consent::ConsentState;
use crate::content::Collection;
use crate::settings::HomepageSection;

/// Masthead site tooling: settings, content, storage, SEO and sitemap
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: masthead.toml)
    #[arg(short = 'C', long, global = true, default_value = "masthead.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Override the public site URL from the config file
    #[arg(short = 'U', long = "site-url", global = true, value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Override the backend URL from the config file
    #[arg(short = 'B', long = "backend-url", global = true, value_hint = clap::ValueHint::Url)]
    pub backend_url: Option<String>,

    /// Local store file (settings blob, consent)
    #[arg(short = 'L', long = "local", global = true, value_hint = clap::ValueHint::FilePath)]
    pub local: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show and edit the effective site settings
    #[command(visible_alias = "s")]
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Query and edit content collections
    #[command(visible_alias = "c")]
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Object storage: URL rewriting, uploads, deletes
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },

    /// Print the <head> fragment of a site path
    Seo {
        #[command(flatten)]
        args: SeoArgs,
    },

    /// Build sitemap.xml from the published content
    Sitemap {
        /// Output path (default: [sitemap].path)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Strip indentation from the XML
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,
    },

    /// Show or record the cookie-consent choice
    Consent {
        /// `accepted` or `rejected`; omit to show the stored choice
        state: Option<ConsentState>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the effective settings
    Show {
        /// Apply remote settings rows before printing
        #[arg(short, long)]
        remote: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Save fields, e.g. `siteTitle="Acme Weekly" siteLogo=null`
    Set {
        #[arg(value_name = "KEY=VALUE", required = true)]
        pairs: Vec<String>,
    },

    /// Toggle a homepage section
    Section {
        section: HomepageSection,

        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Discard locally saved settings
    Reset,

    /// Write a remote setting row; omit the value to store null
    Remote { key: String, value: Option<String> },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ContentAction {
    /// List rows of a collection
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        query: QueryArgs,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Fetch one row by id (or by slug)
    Get {
        collection: Collection,
        key: String,

        /// Treat KEY as a slug
        #[arg(short, long)]
        slug: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Insert a row given as JSON
    Create { collection: Collection, json: String },

    /// Patch a row by id with a JSON object
    Update {
        collection: Collection,
        id: String,
        json: String,
    },

    /// Delete a row by id
    Delete { collection: Collection, id: String },

    /// Row counts for the dashboard
    Stats,
}

/// Collection query arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    pub collection: Collection,

    /// Equality filter `column=value` (repeatable)
    #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Order by column; `column.desc` for descending
    #[arg(short, long)]
    pub order: Option<String>,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StorageAction {
    /// Rewrite legacy asset URLs to the configured backend
    Normalize {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Public URL of an object
    Url {
        path: String,

        /// Bucket (default: [storage].bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Upload a file under a unique name
    Upload {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Bucket (default: [storage].bucket)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Object path inside the bucket (default: timestamped file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete objects by name
    Delete {
        #[arg(required = true)]
        names: Vec<String>,

        /// Bucket (default: [storage].bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },
}

/// Seo command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SeoArgs {
    /// Site path, e.g. `/articles/big-news`
    pub path: String,

    /// Print only the JSON-LD items
    #[arg(short, long)]
    pub json: bool,

    /// Use defaults instead of fetching records and remote settings
    #[arg(long)]
    pub offline: bool,
}
