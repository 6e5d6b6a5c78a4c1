use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects which object-store client backs the storage provider. It's defined in core
/// because it's read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Any S3-compatible object store (AWS S3, MinIO, ...)
    #[default]
    S3,
    /// Process-local store, contents are lost on exit
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" | "minio" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// How uploaded media files are named inside the bucket.
///
/// The policy is chosen once when the provider is built. Object keys are never stored,
/// they are recomputed from the media id and filename on every call, so switching the
/// policy on an existing bucket orphans everything uploaded under the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// `{media_id}-{filename}`
    #[default]
    UniqueFileNames,
    /// `{media_id}/{filename}`
    UniqueFolderNames,
}

impl FromStr for NamingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "unique-file-names" | "uniquefilenames" | "files" => Ok(NamingPolicy::UniqueFileNames),
            "unique-folder-names" | "uniquefoldernames" | "folders" => {
                Ok(NamingPolicy::UniqueFolderNames)
            }
            _ => Err(anyhow::anyhow!("Invalid naming policy: {}", s)),
        }
    }
}

impl Display for NamingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NamingPolicy::UniqueFileNames => write!(f, "unique-file-names"),
            NamingPolicy::UniqueFolderNames => write!(f, "unique-folder-names"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_policy_parses_case_insensitively() {
        assert_eq!(
            "UniqueFileNames".parse::<NamingPolicy>().unwrap(),
            NamingPolicy::UniqueFileNames
        );
        assert_eq!(
            "unique_folder_names".parse::<NamingPolicy>().unwrap(),
            NamingPolicy::UniqueFolderNames
        );
        assert_eq!(
            " Unique-Folder-Names ".parse::<NamingPolicy>().unwrap(),
            NamingPolicy::UniqueFolderNames
        );
        assert!("flat".parse::<NamingPolicy>().is_err());
    }

    #[test]
    fn naming_policy_display_parses_back() {
        for policy in [NamingPolicy::UniqueFileNames, NamingPolicy::UniqueFolderNames] {
            assert_eq!(policy.to_string().parse::<NamingPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn storage_backend_parses() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("minio".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "memory".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::default(), StorageBackend::S3);
    }
}
