//! Shared key generation for every client and the public URL builder.

use homeblog_core::{MediaId, NamingPolicy};

/// Generate the object key for a media item under the given naming policy.
///
/// `UniqueFileNames` produces `{media_id}-{filename}`, `UniqueFolderNames` produces
/// `{media_id}/{filename}`. The filename is used verbatim.
pub fn generate_storage_key(media_id: &MediaId, filename: &str, naming: NamingPolicy) -> String {
    match naming {
        NamingPolicy::UniqueFileNames => format!("{}-{}", media_id, filename),
        NamingPolicy::UniqueFolderNames => format!("{}/{}", media_id, filename),
    }
}
