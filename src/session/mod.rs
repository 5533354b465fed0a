//! Session-scoped analysis state.
//!
//! Each browser session owns one [`Session`] holding the current file name,
//! extracted text and extraction result. Handlers look the session up in the
//! [`SessionStore`] and pass it along explicitly, so concurrent sessions
//! never share mutable state.
//!
//! # Example
//!
//! ```rust
//! use documind::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! session.record_text("resume.pdf", "Jane Doe");
//!
//! assert_eq!(session.snapshot().text.as_deref(), Some("Jane Doe"));
//! assert!(session.snapshot().result.is_none());
//! ```

mod state;

pub use state::{AnalysisSnapshot, DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
