//! # Transkribus REST client for Rust
//!
//! Client for the [Transkribus](https://readcoop.eu/transkribus/) REST API.
//! Log in, upload scanned pages (optionally with PAGE-XML) as a document,
//! and download a document's METS manifest and transcripts.
//!
//! ## Quick start
//!
//! ```no_run
//! use transkribus::{Client, UploadPage};
//!
//! #[tokio::main]
//! async fn main() -> transkribus::Result<()> {
//!     let mut client = Client::login("user@example.com", "secret").await?;
//!
//!     let pages = vec![
//!         UploadPage::new("scans/0001.jpg", Some("scans/0001.xml".into()), 1)?,
//!         UploadPage::new("scans/0002.jpg", None, 2)?,
//!     ];
//!     let doc_id = client
//!         .upload_document(1234, "Letters 1851", &pages, &Default::default())
//!         .await?;
//!
//!     client.download_document(1234, doc_id, "letters-1851").await?;
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use transkribus::ClientBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> transkribus::Result<()> {
//! let client = ClientBuilder::new()
//!     .credentials("user@example.com", "secret")
//!     .base_url("https://transkribus.eu/TrpServer/rest")
//!     .session_lifetime(Duration::from_secs(6 * 60 * 60))
//!     .login()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod collections;
pub mod discover;
mod download;
mod errors;
mod gateway;
mod jobs;
pub mod mets;
mod models;
mod session;
mod upload;
mod uploads;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_SESSION_LIFETIME};
pub use collections::{CollectionQuery, Collections, DocumentQuery, PageQuery};
pub use download::MANIFEST_FILE;
pub use errors::{Result, TranskribusError};
pub use jobs::{JobQuery, Jobs};
pub use models::{
    Collection, DocumentStructure, DocumentSummary, Job, Page, PageDescriptor, PageList,
    TranscriptList, TranscriptRef, UploadPage, UploadStatus,
};
pub use session::Session;
pub use uploads::Uploads;
