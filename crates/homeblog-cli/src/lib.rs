use std::path::Path;

use anyhow::Context;
use homeblog_core::Media;
use homeblog_storage::Session;

/// Content type for an upload: the explicit value if given, otherwise guessed from the
/// file extension, falling back to `application/octet-stream`.
pub fn content_type_for(path: &Path, explicit: Option<&str>) -> String {
    match explicit {
        Some(content_type) if !content_type.trim().is_empty() => content_type.trim().to_string(),
        _ => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Name an uploaded file is stored under: the explicit name, or the path's file name.
pub fn upload_filename(path: &Path, explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .filter(|name| !name.trim().is_empty())
}

/// Download a media file into `path`.
///
/// The file is removed again unless the download completes, so a missing object or a
/// failed transfer leaves nothing behind.
pub async fn download_to_file(
    session: &dyn Session,
    media: &Media,
    filename: &str,
    path: &Path,
) -> anyhow::Result<bool> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let result = session.get(media, filename, &mut file).await;
    drop(file);

    match result {
        Ok(true) => Ok(true),
        Ok(false) => {
            tokio::fs::remove_file(path).await.ok();
            Ok(false)
        }
        Err(e) => {
            tokio::fs::remove_file(path).await.ok();
            Err(e.into())
        }
    }
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
