//! # PumpFlux - Template Workflow Client
//!
//! Client side of PumpFlux template workflows: browse the template catalog,
//! fill in the credentials a template references, configure each node with
//! a step-by-step wizard and save the result as a new workflow.
//!
//! ## Features
//!
//! - **Placeholders**: `${name}` / `{{name}}` tokens collected into a credential map and substituted back
//! - **Wizard**: per-node configuration validated against node-type definitions
//! - **Catalog**: search, category, difficulty and favorites filters with client-side sorting
//! - **Favorites**: persisted through an injected key-value store
//! - **Native client**: `reqwest` adapter, file-backed favorites and the `pumpflux` CLI (feature `native`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pumpflux::adapters::HttpClient;
//! use pumpflux::catalog::TemplateQuery;
//! use pumpflux::config::Settings;
//! use pumpflux::domain::TemplateApi;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let client = HttpClient::new(&settings.api)?;
//!
//!     for template in client.list_templates(&TemplateQuery::default()).await? {
//!         println!("{} {}", template.id, template.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: templates, nodes, node-type definitions and the REST ports
//! - **Core**: resolver, wizard, catalog, favorites, preview and setup, free of I/O
//! - **Adapters**: HTTP client, file store and console navigator (native only)
//! - **Config**: layered settings for the CLI (native only)
//!
//! The browser UI in `ui/` builds on the core with default features off.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod favorites;
pub mod navigation;
pub mod notice;
pub mod preview;
pub mod resolver;
pub mod setup;
pub mod storage;
pub mod wizard;

#[cfg(feature = "native")]
pub mod adapters;
#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod config;

pub use error::{ApiError, StorageError};
