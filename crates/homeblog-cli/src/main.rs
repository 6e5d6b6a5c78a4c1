//! Homeblog storage CLI: uploads, downloads and deletes media in the configured bucket.
//!
//! Configure with FILE_STORAGE_BUCKET plus either FILE_STORAGE_CONNECTION_STRING or
//! FILE_STORAGE_ENDPOINT / FILE_STORAGE_ACCESS_KEY / FILE_STORAGE_SECRET_KEY.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use homeblog_cli::{content_type_for, download_to_file, init_tracing, upload_filename};
use homeblog_core::{FileStorageConfig, Media, MediaId};
use homeblog_storage::create_storage;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "homeblog", about = "Homeblog media storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file for a media item
    Put {
        /// Media id (usually a UUID)
        media_id: MediaId,
        /// Path to the file to upload
        file: PathBuf,
        /// Filename to store under (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
        /// Content type (guessed from the extension if omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download a media file
    Get {
        media_id: MediaId,
        filename: String,
        /// Write to this path instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete a media file
    Delete { media_id: MediaId, filename: String },
    /// Print the public URL of a media file
    Url { media_id: MediaId, filename: String },
    /// Print the object key of a media file
    Key { media_id: MediaId, filename: String },
    /// Create the bucket with its public-read policy if it doesn't exist
    EnsureBucket,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = FileStorageConfig::from_env().context("Invalid file storage configuration")?;
    let storage = create_storage(&config)
        .await
        .context("Failed to configure file storage")?;
    let mut session = storage.open_session();

    match cli.command {
        Commands::Put {
            media_id,
            file,
            name,
            content_type,
        } => {
            let filename = upload_filename(&file, name.as_deref())
                .context("Cannot derive a filename, pass --name")?;
            let content_type = content_type_for(&file, content_type.as_deref());
            let handle = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let length = handle.metadata().await?.len();
            let media = Media::new(media_id, filename.clone());

            let key = session
                .put_stream(&media, &filename, &content_type, length, Box::pin(handle))
                .await?;
            print_json(&serde_json::json!({
                "key": key,
                "url": storage.public_url(&media, &filename),
                "content_type": content_type,
                "size_bytes": length,
            }))?;
        }
        Commands::Get {
            media_id,
            filename,
            output,
        } => {
            let media = Media::new(media_id, filename.clone());
            let found = match output {
                Some(path) => download_to_file(session.as_ref(), &media, &filename, &path).await?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    let found = session.get(&media, &filename, &mut stdout).await?;
                    stdout.flush().await?;
                    found
                }
            };
            if !found {
                anyhow::bail!("{} not found", storage.resource_name(&media, &filename));
            }
        }
        Commands::Delete { media_id, filename } => {
            let media = Media::new(media_id, filename.clone());
            let deleted = session.delete(&media, &filename).await?;
            print_json(&serde_json::json!({
                "key": storage.resource_name(&media, &filename),
                "deleted": deleted,
            }))?;
        }
        Commands::Url { media_id, filename } => {
            let media = Media::new(media_id, filename.clone());
            print_json(&serde_json::json!({ "url": storage.public_url(&media, &filename) }))?;
        }
        Commands::Key { media_id, filename } => {
            let media = Media::new(media_id, filename.clone());
            print_json(&serde_json::json!({ "key": storage.resource_name(&media, &filename) }))?;
        }
        Commands::EnsureBucket => {
            let created = session.ensure_bucket().await?;
            print_json(&serde_json::json!({
                "bucket": config.bucket,
                "created": created,
            }))?;
        }
    }

    session.close();
    Ok(())
}
