//! Content fingerprinting and codec file output.
//!
//! Every rendered artifact carries the [`CODEC_HASH_PLACEHOLDER`]. Before the
//! text reaches disk the placeholder is replaced by a BLAKE3 digest of the
//! text as rendered, so identical input always produces identical bytes and
//! any change to a template or a service document changes the fingerprint.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::CodecGenError;
pub use crate::template::CODEC_HASH_PLACEHOLDER;

/// How [`write_codec_file`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file atomically.
    Create,
    /// Append to the file, creating it if needed.
    Append,
}

/// Lowercase hex BLAKE3 digest of `text`.
///
/// ```
/// use codecgen::writer::content_fingerprint;
///
/// let fingerprint = content_fingerprint("class MapPutCodec {}");
/// assert_eq!(fingerprint.len(), 64);
/// assert_eq!(fingerprint, content_fingerprint("class MapPutCodec {}"));
/// ```
pub fn content_fingerprint(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Fingerprints `text`, replaces its placeholders and writes it to `path`, returning the fingerprint.
///
/// Parent directories are created on demand.
///
/// ## Errors
///
/// Returns [`CodecGenError::Io`] if a directory cannot be created or the
/// file cannot be written.
pub fn write_codec_file(path: &Path, text: &str, mode: WriteMode) -> Result<String, CodecGenError> {
    let fingerprint = content_fingerprint(text);
    let content = text.replace(CODEC_HASH_PLACEHOLDER, &fingerprint);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| CodecGenError::io(parent, e))?;
    }

    match mode {
        WriteMode::Create => write_atomic(path, &content)?,
        WriteMode::Append => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CodecGenError::io(path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| CodecGenError::io(path, e))?;
        }
    }

    debug!(path = %path.display(), ?mode, %fingerprint, "wrote codec file");
    Ok(fingerprint)
}

/// Writes to a sibling temp file, then renames it over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<(), CodecGenError> {
    let temp_path = path.with_extension(match path.extension() {
        Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
        None => "tmp".to_string(),
    });
    fs::write(&temp_path, content).map_err(|e| CodecGenError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| CodecGenError::io(path, e))?;
    Ok(())
}
