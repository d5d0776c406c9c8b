//! Filename parsing helpers shared by the validator chain.

use crate::error::MediaValidationError;

/// Split a filename into `(stem, extension)` at the last dot.
///
/// The extension must be non-empty and alphanumeric. The stem may be empty
/// (`.gitignore` parses as `("", "gitignore")`).
pub fn split_filename(filename: &str) -> Result<(&str, &str), MediaValidationError> {
    let (stem, extension) = filename
        .rsplit_once('.')
        .ok_or(MediaValidationError::InvalidFileName)?;

    if extension.is_empty() || !extension.chars().all(char::is_alphanumeric) {
        return Err(MediaValidationError::InvalidFileExtension {
            extension: extension.to_string(),
            valid_extensions: Vec::new(),
            media_type: None,
        });
    }

    Ok((stem, extension))
}

/// Extract the extension of a filename (as written, case preserved).
pub fn file_extension(filename: &str) -> Result<&str, MediaValidationError> {
    split_filename(filename).map(|(_, extension)| extension)
}

/// Replace the filename's extension. The new extension is lower-cased.
pub fn change_extension(
    filename: &str,
    new_extension: &str,
) -> Result<String, MediaValidationError> {
    let (stem, _) = split_filename(filename)?;
    Ok(format!("{}.{}", stem, new_extension.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_filename() {
        assert_eq!(split_filename("photo.png").unwrap(), ("photo", "png"));
        assert_eq!(split_filename("a.b.c.JPG").unwrap(), ("a.b.c", "JPG"));
        assert_eq!(split_filename(".gitignore").unwrap(), ("", "gitignore"));
    }

    #[test]
    fn test_split_filename_no_dot() {
        assert!(matches!(
            split_filename("noextension"),
            Err(MediaValidationError::InvalidFileName)
        ));
        assert!(matches!(
            split_filename(""),
            Err(MediaValidationError::InvalidFileName)
        ));
    }

    #[test]
    fn test_split_filename_bad_extension() {
        for name in ["photo.", "photo.pn g", "archive.tar.gz-", "photo.p+g"] {
            assert!(matches!(
                split_filename(name),
                Err(MediaValidationError::InvalidFileExtension { .. })
            ));
        }
    }

    #[test]
    fn test_change_extension_lowercases() {
        assert_eq!(change_extension("photo.PNG", "WEBP").unwrap(), "photo.webp");
        assert_eq!(change_extension("a.b.jpg", "png").unwrap(), "a.b.png");
    }
}
