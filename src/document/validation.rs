//! Pre-flight checks run before any document processing.

use crate::config::UploadConfig;
use crate::error::ExtractionError;

use super::extension_of;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Check an upload against the configured limits.
///
/// Rules are applied in order: presence, extension allow-list
/// (case-insensitive), then size. A file exactly at the ceiling passes.
pub fn validate(
    file_name: Option<&str>,
    byte_size: u64,
    limits: &UploadConfig,
) -> Result<(), ExtractionError> {
    let Some(name) = file_name.filter(|n| !n.is_empty()) else {
        return Err(ExtractionError::MissingFile);
    };

    let extension = extension_of(name);
    if !limits.allows(&extension) {
        return Err(ExtractionError::UnsupportedType {
            extension,
            allowed: limits.allowed_display(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let size_mb = byte_size as f64 / BYTES_PER_MB;
    #[allow(clippy::cast_precision_loss)]
    let max_mb = limits.max_file_size_mb as f64;
    if size_mb > max_mb {
        return Err(ExtractionError::TooLarge {
            max_mb: limits.max_file_size_mb,
        });
    }

    Ok(())
}
