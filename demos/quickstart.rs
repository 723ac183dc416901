//! Quick-start walkthrough for the Transkribus client.
//!
//! Run with:
//!   TRANSKRIBUS_USERNAME=... TRANSKRIBUS_PASSWORD=... cargo run --example quickstart -- <collection-id> <scan-dir>

use transkribus::{discover, ClientBuilder, CollectionQuery, JobQuery};

#[tokio::main]
async fn main() -> transkribus::Result<()> {
    let mut args = std::env::args().skip(1);
    let collection_id: i64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| usage());
    let scan_dir = args.next().unwrap_or_else(|| usage());

    // -----------------------------------------------------------------------
    // 1. Log in (reads TRANSKRIBUS_USERNAME / TRANSKRIBUS_PASSWORD)
    // -----------------------------------------------------------------------
    let mut client = ClientBuilder::new().login().await?;
    println!("Session valid until {}", client.session().expires_at());

    // -----------------------------------------------------------------------
    // 2. See where documents can go
    // -----------------------------------------------------------------------
    for c in client.collections().list(&CollectionQuery::default()).await? {
        println!("  {} | {}", c.id, c.name);
    }

    // -----------------------------------------------------------------------
    // 3. Upload every image (and matching PAGE-XML) from a directory
    // -----------------------------------------------------------------------
    let pages = discover::collect_pages(&[scan_dir.clone().into()])?;
    println!("Uploading {} pages from {scan_dir}", pages.len());
    let doc_id = client
        .upload_document(collection_id, "Quickstart upload", &pages, &Default::default())
        .await?;
    println!("Created document {doc_id}");

    // -----------------------------------------------------------------------
    // 4. Check on the jobs in the collection
    // -----------------------------------------------------------------------
    let query = JobQuery {
        collection_id: Some(collection_id),
        n_values: 5,
        ..Default::default()
    };
    for job in client.jobs().list(&query).await? {
        println!("  {} | {} | terminal={}", job.id, job.state, job.is_terminal());
    }

    // -----------------------------------------------------------------------
    // 5. Download it again and log out
    // -----------------------------------------------------------------------
    let target = format!("doc-{doc_id}");
    client.download_document(collection_id, doc_id, &target).await?;
    println!("Downloaded to {target}/");

    client.close().await?;
    Ok(())
}

fn usage() -> ! {
    eprintln!("usage: quickstart <collection-id> <scan-dir>");
    std::process::exit(2);
}
