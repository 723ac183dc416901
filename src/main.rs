use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, warn};
use transkribus::{discover, Client, ClientBuilder, CollectionQuery, JobQuery, TranskribusError};

mod cli;
mod logging;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.verbose, cli.log_format, cli.log_file.as_deref()) {
        eprintln!("cannot open log file: {err}");
        std::process::exit(2);
    }

    if let Err(err) = run(cli).await {
        error!(target: "transkribus", error = %err, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> transkribus::Result<()> {
    let mut builder = ClientBuilder::new().credentials(cli.username, cli.password);
    if let Some(url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let mut client = builder.login().await?;

    let result = dispatch(&mut client, cli.command).await;

    // Log out either way; the command's own error wins.
    match client.close().await {
        Ok(_) => result,
        Err(close_err) if result.is_ok() => Err(close_err),
        Err(close_err) => {
            warn!(error = %close_err, "logout failed");
            result
        }
    }
}

async fn dispatch(client: &mut Client, command: Commands) -> transkribus::Result<()> {
    match command {
        Commands::UploadDocument {
            collection_id,
            title,
            files,
        } => upload(client, collection_id, &title, &files).await,
        Commands::DownloadDocument {
            collection_id,
            document_id,
            output,
        } => {
            client
                .download_document(collection_id, document_id, &output)
                .await?;
            println!("Document {document_id} downloaded to {}.", output.display());
            Ok(())
        }
        Commands::ListCollections { filter } => {
            let query = CollectionQuery {
                filter,
                ..Default::default()
            };
            for c in client.collections().list(&query).await? {
                println!(
                    "{}\t{}\t{}",
                    c.id,
                    c.name,
                    c.n_documents.map(|n| n.to_string()).unwrap_or_default()
                );
            }
            Ok(())
        }
        Commands::ListJobs {
            collection_id,
            status,
        } => {
            let query = JobQuery {
                collection_id,
                status,
                ..Default::default()
            };
            for job in client.jobs().list(&query).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    job.id,
                    job.state,
                    job.doc_id.map(|id| id.to_string()).unwrap_or_default(),
                    job.description.unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}

async fn upload(
    client: &mut Client,
    collection_id: i64,
    title: &str,
    files: &[PathBuf],
) -> transkribus::Result<()> {
    let pages = discover::collect_pages(files)?;
    if pages.is_empty() {
        return Err(TranskribusError::Upload(
            "no images (jpg, jpeg, tif, tiff, png) found in the given files".into(),
        ));
    }

    let doc_id = client
        .upload_document(collection_id, title, &pages, &Default::default())
        .await?;
    println!("Document uploaded successfully with ID {doc_id}.");
    Ok(())
}
