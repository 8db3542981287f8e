//! Client-side acceptance rules for candidate files.
//!
//! Validation runs before any network call so obviously unusable files never
//! reach the proxy. The rules are deliberately narrow: an extension
//! allow-list and a size ceiling. Content sniffing is left to the upstream
//! service, which is the only component that actually parses documents.

use crate::error::ValidationError;
use crate::input::CandidateFile;

/// Extensions (lower-case, without the dot) the upstream can summarise.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["docx", "pdf", "ppt", "pptx", "txt", "md", "markdown"];

/// Upload ceiling in MiB.
pub const MAX_UPLOAD_MB: u64 = 200;

/// Upload ceiling in bytes. A file of exactly this size is accepted.
pub const MAX_UPLOAD_BYTES: u64 = MAX_UPLOAD_MB * 1024 * 1024;

/// Lower-cased suffix after the last `.`, or `None` when the name has no dot.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `name` carries an allow-listed extension.
pub fn is_supported_name(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Validate a candidate by name and size.
///
/// Rules are applied in order, so a file that is both the wrong type and too
/// large reports the type error.
pub fn validate_parts(name: &str, size_bytes: u64) -> Result<(), ValidationError> {
    if !is_supported_name(name) {
        return Err(ValidationError::UnsupportedType {
            name: name.to_string(),
        });
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            name: name.to_string(),
            size_bytes,
        });
    }
    Ok(())
}

/// Validate a [`CandidateFile`].
pub fn validate(file: &CandidateFile) -> Result<(), ValidationError> {
    validate_parts(file.name(), file.size_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_extension() {
        for ext in ALLOWED_EXTENSIONS {
            let name = format!("notes.{ext}");
            assert!(validate_parts(&name, 10).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(validate_parts("REPORT.PDF", 1).is_ok());
        assert!(validate_parts("Slides.PptX", 1).is_ok());
    }

    #[test]
    fn uses_suffix_after_last_dot() {
        assert!(validate_parts("archive.pdf.zip", 1).is_err());
        assert!(validate_parts("archive.zip.pdf", 1).is_ok());
    }

    #[test]
    fn rejects_unknown_and_missing_extensions() {
        for name in ["virus.exe", "image.png", "README", "", "trailing."] {
            let err = validate_parts(name, 1).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedType { .. }),
                "{name}: {err:?}"
            );
            assert!(err.to_string().contains(".markdown"));
        }
    }

    #[test]
    fn size_boundary() {
        assert!(validate_parts("a.txt", 0).is_ok());
        assert!(validate_parts("a.txt", MAX_UPLOAD_BYTES).is_ok());
        let err = validate_parts("a.txt", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                name: "a.txt".into(),
                size_bytes: MAX_UPLOAD_BYTES + 1
            }
        );
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = validate_parts("huge.iso", MAX_UPLOAD_BYTES * 2).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn ok_iff_allowed_and_within_ceiling() {
        let sizes = [0, 1, MAX_UPLOAD_BYTES - 1, MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES + 1, u64::MAX];
        for name in ["a.md", "b.docx", "c.bin", "d"] {
            for &s in &sizes {
                let expected = is_supported_name(name) && s <= MAX_UPLOAD_BYTES;
                assert_eq!(validate_parts(name, s).is_ok(), expected, "{name} / {s}");
            }
        }
    }

    #[test]
    fn validate_reads_candidate_fields() {
        let file = CandidateFile::from_bytes("deck.pptx", vec![0u8; 16]);
        assert!(validate(&file).is_ok());
        let file = CandidateFile::from_bytes("deck.key", vec![0u8; 16]);
        assert!(validate(&file).is_err());
    }
}
