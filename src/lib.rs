//! Masthead - settings, SEO metadata and content access for an editorial
//! site backed by a hosted data service.

pub mod logger;

pub mod cli;
pub mod config;
pub mod consent;
pub mod content;
pub mod core;
pub mod generator;
pub mod local;
pub mod seo;
pub mod settings;
pub mod storage;
pub mod utils;
