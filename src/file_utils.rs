//! Upload checks run before a file reaches the session.

use crate::schema::ViewerError;
use crate::session::DocumentFile;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Detects whether a file is a PDF from its filename extension or magic
/// bytes.
///
/// Browsers report an empty media type for some drag-and-drop sources, so
/// this is the fallback when no type was declared.
///
/// # Detection Strategy
///
/// 1. Filename extension check (case-insensitive)
/// 2. Magic bytes check for the `%PDF` header
pub fn looks_like_pdf(filename: &str, head: &[u8]) -> bool {
    if filename.to_lowercase().ends_with(".pdf") {
        return true;
    }
    head.len() >= 4 && &head[0..4] == b"%PDF"
}

/// Accepts a PDF no larger than `max_bytes`.
///
/// # Arguments
///
/// * `name` - Filename as reported by the browser
/// * `media_type` - Declared MIME type, possibly empty
/// * `size` - Byte size as reported by the browser
/// * `head` - Leading bytes of the file, used when `media_type` is empty
/// * `max_bytes` - Upload limit
///
/// # Returns
///
/// The file metadata to hand to `SessionState::set_file`, or the reason
/// the upload was rejected. Type is checked before size.
pub fn validate_upload(
    name: &str,
    media_type: &str,
    size: u64,
    head: &[u8],
    max_bytes: u64,
) -> Result<DocumentFile, ViewerError> {
    let media_type = media_type.trim();
    let is_pdf = if media_type.is_empty() {
        looks_like_pdf(name, head)
    } else {
        media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    };
    if !is_pdf {
        log::warn!("Rejected upload {}: media type {:?}", name, media_type);
        return Err(ViewerError::UnsupportedMediaType(media_type.to_string()));
    }
    if size > max_bytes {
        log::warn!("Rejected upload {}: {} bytes", name, size);
        return Err(ViewerError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }
    Ok(DocumentFile {
        name: name.to_string(),
        media_type: PDF_MEDIA_TYPE.to_string(),
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 50 * 1024 * 1024;

    #[test]
    fn test_accepts_pdf_under_limit() {
        let file = validate_upload("report.pdf", "application/pdf", LIMIT, &[], LIMIT).unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size, LIMIT);
    }

    #[test]
    fn test_rejects_other_media_types() {
        let err = validate_upload("photo.png", "image/png", 10, b"%PDF", LIMIT).unwrap_err();
        assert_eq!(err, ViewerError::UnsupportedMediaType("image/png".into()));
    }

    #[test]
    fn test_rejects_oversized() {
        let err = validate_upload("big.pdf", "application/pdf", LIMIT + 1, &[], LIMIT).unwrap_err();
        assert_eq!(
            err,
            ViewerError::FileTooLarge {
                size: LIMIT + 1,
                limit: LIMIT
            }
        );
    }

    #[test]
    fn test_empty_media_type_falls_back_to_detection() {
        assert!(validate_upload("scan.PDF", "", 10, &[], LIMIT).is_ok());
        assert!(validate_upload("download", "", 10, b"%PDF-1.7", LIMIT).is_ok());
        assert!(validate_upload("notes.txt", "", 10, b"hello", LIMIT).is_err());
    }
}
