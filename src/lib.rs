//! DocuMind: AI-powered document data extraction
//!
//! Upload a PDF or plain-text document, pick an extraction mode, and get the
//! document's key fields back as structured JSON, ready to view or export.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP dashboard and JSON API
//! - **Document processing**: upload validation, PDF page text and text decoding
//! - **Extraction**: fixed prompt schemas per mode, one chat-completion call,
//!   fenced-JSON reply parsing
//! - **Export**: display filtering, table flattening, JSON and CSV downloads
//!
//! # Modules
//!
//! - [`config`]: layered application config and provider settings
//! - [`document`]: upload validation and text extraction
//! - [`extraction`]: modes, schemas and the LLM-backed extractor
//! - [`llm`]: LLM driver trait and the chat-completions implementation
//! - [`export`]: rendering results for display and download
//! - [`session`]: per-session analysis state

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod extraction;
pub mod llm;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use crate::config::AppConfig;
use document::DocumentProcessor;
use extraction::DocumentExtractor;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Global Configuration
    pub config: Arc<AppConfig>,
    /// LLM-backed extractor (holds the shared schema table).
    pub extractor: Arc<DocumentExtractor>,
    /// Upload to text dispatch.
    pub processor: DocumentProcessor,
    /// Session store for per-user analysis state.
    pub sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, extractor: DocumentExtractor) -> Self {
        Self {
            config,
            extractor: Arc::new(extractor),
            processor: DocumentProcessor::new(),
            sessions: SessionStore::new(),
        }
    }
}
