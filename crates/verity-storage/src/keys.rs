//! Storage key generation.
//!
//! Key format: `{uuid}_{sanitized original name}`. A fresh v4 UUID per upload
//! keeps concurrent uploads of the same file name from colliding.

use uuid::Uuid;

const MAX_FILENAME_LENGTH: usize = 255;

/// Length of the `{uuid}_` prefix of every storage key
const KEY_PREFIX_BYTES: usize = 37;

/// Longest sanitized name whose storage key still fits a 255-byte file name
pub const MAX_SANITIZED_BYTES: usize = MAX_FILENAME_LENGTH - KEY_PREFIX_BYTES;

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory components are dropped, characters other than alphanumerics,
/// `.`, `-` and `_` become `_`, and `..` sequences are collapsed. Names that
/// end up too short fall back to `file`. Long names are cut to
/// [`MAX_SANITIZED_BYTES`] bytes, keeping the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    truncate_keeping_extension(sanitized, MAX_SANITIZED_BYTES)
}

/// Cut `name` to at most `max_bytes` bytes on a char boundary, shortening the
/// stem so the extension survives.
fn truncate_keeping_extension(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot < max_bytes => name.split_at(dot),
        _ => (name, ""),
    };

    let mut end = max_bytes - extension.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], extension)
}

/// Generate the storage key for an upload's original filename.
pub fn storage_name_for(original_filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_filename))
}
