//! Monthly archive filename handling.
//!
//! GHCN-M archives encode the dataset and the format version in the
//! filename, e.g. `ghcnm.tavg.v4.0.1.2024.qcu.dat`. The readers check
//! the version token before touching any rows, since older format
//! versions lay their columns out differently.

use std::path::Path;

use thiserror::Error;

/// The monthly archive format version the readers support.
pub const GHCNM_VERSION: &str = "v4";

/// Whether a monthly archive file holds data or station metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyFileKind {
    /// A `.dat` data file.
    Data,
    /// A `.inv` station metadata file.
    Metadata,
}

/// A validated monthly archive filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyFilename {
    name: String,
    dataset: String,
    kind: MonthlyFileKind,
}

impl MonthlyFilename {
    /// Validates a monthly archive file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not `.dat` or `.inv`, the
    /// name carries no version token, or the version is not
    /// [`GHCNM_VERSION`].
    pub fn parse(path: &Path) -> std::result::Result<Self, MonthlyFileError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MonthlyFileError::UnrecognizedName(path.display().to_string()))?;

        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some("dat") => MonthlyFileKind::Data,
            Some("inv") => MonthlyFileKind::Metadata,
            _ => return Err(MonthlyFileError::UnrecognizedName(name.to_string())),
        };

        let parts: Vec<&str> = name.split('.').collect();
        let Some(version) = parts.get(2) else {
            return Err(MonthlyFileError::UnrecognizedName(name.to_string()));
        };
        if *version != GHCNM_VERSION {
            return Err(MonthlyFileError::VersionMismatch {
                filename: name.to_string(),
                version: (*version).to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            dataset: parts.get(1).copied().unwrap_or_default().to_string(),
            kind,
        })
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dataset token, e.g. `tavg`.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Returns whether the file holds data or metadata.
    #[must_use]
    pub const fn kind(&self) -> MonthlyFileKind {
        self.kind
    }

    /// Returns true for `.dat` data files.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self.kind, MonthlyFileKind::Data)
    }

    /// Returns true for `.inv` metadata files.
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self.kind, MonthlyFileKind::Metadata)
    }
}

/// Errors from the monthly archive filename checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthlyFileError {
    /// The filename does not match the monthly archive naming scheme.
    #[error("'{0}' does not look like a GHCN-M filename")]
    UnrecognizedName(String),

    /// The filename encodes an unsupported format version.
    #[error("'{filename}' appears to be GHCN-M {version}; only v4 is supported")]
    VersionMismatch {
        /// The offending filename.
        filename: String,
        /// The version token found.
        version: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_data_filename() {
        let path = Path::new("/data/ghcnm.tavg.v4.0.1.2024.qcu.dat");
        let fname = MonthlyFilename::parse(path).unwrap();
        assert_eq!(fname.name(), "ghcnm.tavg.v4.0.1.2024.qcu.dat");
        assert_eq!(fname.dataset(), "tavg");
        assert!(fname.is_data());
        assert!(!fname.is_metadata());
    }

    #[test]
    fn test_valid_metadata_filename() {
        let path = Path::new("ghcnm.tavg.v4.0.1.2024.qcu.inv");
        let fname = MonthlyFilename::parse(path).unwrap();
        assert_eq!(fname.kind(), MonthlyFileKind::Metadata);
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let path = Path::new("ghcnm.tavg.v3.3.0.20240101.qca.dat");
        let err = MonthlyFilename::parse(path).unwrap_err();
        assert!(matches!(
            err,
            MonthlyFileError::VersionMismatch { ref version, .. } if version == "v3"
        ));
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        let err = MonthlyFilename::parse(Path::new("ghcnm.tavg.v4.0.1.2024.qcu.txt")).unwrap_err();
        assert!(matches!(err, MonthlyFileError::UnrecognizedName(_)));
    }

    #[test]
    fn test_name_without_version_token_is_rejected() {
        let err = MonthlyFilename::parse(Path::new("data.dat")).unwrap_err();
        assert!(matches!(err, MonthlyFileError::UnrecognizedName(_)));
    }
}
