//! The closed set of extraction modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Analysis type selected by the user before uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtractionMode {
    Resume,
    Invoice,
    Sentiment,
}

impl ExtractionMode {
    /// All modes, in selector order.
    pub const ALL: [Self; 3] = [Self::Resume, Self::Invoice, Self::Sentiment];

    /// Internal key, e.g. `Resume`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Resume => "Resume",
            Self::Invoice => "Invoice",
            Self::Sentiment => "Sentiment",
        }
    }

    /// Human-readable selector label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Resume => "Resume Parsing",
            Self::Invoice => "Invoice Data",
            Self::Sentiment => "Sentiment Analysis",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Resume => "Extract candidate information, skills, and experience from resumes",
            Self::Invoice => "Extract invoice details, amounts, and vendor information",
            Self::Sentiment => "Analyze text sentiment, tone, and key themes",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the internal key or the selector label.
impl FromStr for ExtractionMode {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.key().eq_ignore_ascii_case(s) || mode.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExtractionError::InvalidMode(s.to_string()))
    }
}
