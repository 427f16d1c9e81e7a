use verity_core::PipelineError;

/// Admission failures for an uploaded image.
///
/// The display strings are returned to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file extension")]
    MissingExtension,

    #[error("File extension '{0}' not allowed")]
    ExtensionNotAllowed(String),

    #[error("MIME type '{0}' not allowed")]
    ContentTypeNotAllowed(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::Validation(err.to_string())
    }
}

/// Upload admission check.
///
/// Trusts the client-declared filename and content type; the bytes themselves
/// are only inspected later, when the codec decodes them.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    /// Allow-list entries are compared lowercase.
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Check filename extension, then declared content type.
    ///
    /// The extension is whatever follows the last `.` of the filename.
    pub fn validate(&self, filename: &str, content_type: &str) -> Result<(), ValidationError> {
        let (_, extension) = filename
            .rsplit_once('.')
            .ok_or(ValidationError::MissingExtension)?;
        let extension = extension.to_lowercase();

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::ExtensionNotAllowed(extension));
        }

        let normalized = normalize_content_type(content_type);
        if !self.allowed_content_types.iter().any(|ct| *ct == normalized) {
            return Err(ValidationError::ContentTypeNotAllowed(
                content_type.to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> Result<(), ValidationError> {
        self.validate(filename, content_type)?;
        self.validate_file_size(size)
    }
}

/// `image/PNG; charset=binary` -> `image/png`
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024, // 1MB
            vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            vec!["image/png".to_string(), "image/jpeg".to_string()],
        )
    }

    #[test]
    fn test_validate_ok() {
        let validator = test_validator();
        assert!(validator.validate("note.png", "image/png").is_ok());
        assert!(validator.validate("NOTE.JPG", "image/jpeg").is_ok()); // case insensitive
        assert!(validator.validate("scan.v2.jpeg", "IMAGE/JPEG").is_ok());
    }

    #[test]
    fn test_validate_missing_extension() {
        let validator = test_validator();
        let err = validator.validate("note", "image/png").unwrap_err();
        assert_eq!(err, ValidationError::MissingExtension);
        assert_eq!(err.to_string(), "No file extension");
    }

    #[test]
    fn test_validate_extension_not_allowed() {
        let validator = test_validator();
        let err = validator.validate("notes.TXT", "image/png").unwrap_err();
        assert_eq!(err.to_string(), "File extension 'txt' not allowed");
    }

    #[test]
    fn test_extension_checked_before_content_type() {
        let validator = test_validator();
        let err = validator.validate("notes.txt", "text/plain").unwrap_err();
        assert!(matches!(err, ValidationError::ExtensionNotAllowed(_)));
    }

    #[test]
    fn test_validate_content_type_not_allowed() {
        let validator = test_validator();
        let err = validator.validate("note.png", "text/plain").unwrap_err();
        assert_eq!(err.to_string(), "MIME type 'text/plain' not allowed");
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        let validator = test_validator();
        assert!(validator
            .validate("note.png", "image/png; charset=binary")
            .is_ok());
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert_eq!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        );
        assert!(matches!(
            validator.validate_file_size(2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_converts_to_pipeline_validation_error() {
        let err: PipelineError = ValidationError::MissingExtension.into();
        assert_eq!(err, PipelineError::Validation("No file extension".to_string()));
    }
}
