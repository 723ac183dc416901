use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;

use tracing::{debug, info};

use crate::client::Client;
use crate::collections::PageQuery;
use crate::errors::{Result, TranskribusError};
use crate::mets;

/// File name of the manifest in a downloaded document directory.
pub const MANIFEST_FILE: &str = "mets.xml";

impl Client {
    /// Download a document as a METS manifest plus one PAGE-XML file per page.
    ///
    /// The manifest's PAGE-XML pointers are rewritten to reference the
    /// transcript files written next to it. Pointers are matched to pages by
    /// position: the k-th pointer in the `PAGEXML` file group belongs to the
    /// k-th entry of the page list. If the counts differ nothing is written.
    ///
    /// Pages are fetched one after another. An error part way through leaves
    /// the files written so far in `target`.
    ///
    /// # Errors
    ///
    /// - [`TranskribusError::Download`] if a page has no transcript, two pages
    ///   share a transcript file name (or one is named like the manifest), or
    ///   the manifest and page list disagree on the number of pages.
    /// - [`TranskribusError::Parse`] if the manifest or a transcript is not
    ///   well-formed XML.
    pub async fn download_document(
        &mut self,
        collection_id: i64,
        document_id: i64,
        target: impl AsRef<Path>,
    ) -> Result<()> {
        let target = target.as_ref();

        let manifest = self.collections().mets(collection_id, document_id).await?;
        let pages = self
            .collections()
            .pages(collection_id, document_id, &PageQuery::default())
            .await?;
        debug!(document_id, pages = pages.len(), "fetched manifest and page list");

        let mut seen = HashSet::new();
        let file_names = pages
            .iter()
            .map(|page| {
                let name = page.transcript_file_name().ok_or_else(|| {
                    TranskribusError::Download(format!(
                        "page {} of document {document_id} has no transcript",
                        page.page_nr
                    ))
                })?;
                // Must stay inside `target`.
                if Path::new(name).file_name() != Some(OsStr::new(name)) {
                    return Err(TranskribusError::Download(format!(
                        "transcript file name `{name}` of page {} is not a plain file name",
                        page.page_nr
                    )));
                }
                if name == MANIFEST_FILE || !seen.insert(name) {
                    return Err(TranskribusError::Download(format!(
                        "transcript file name `{name}` of page {} clashes with another file of the document",
                        page.page_nr
                    )));
                }
                Ok(name)
            })
            .collect::<Result<Vec<_>>>()?;
        let manifest = mets::rewrite_file_locations(manifest.as_bytes(), &file_names)?;

        tokio::fs::create_dir_all(target).await?;
        tokio::fs::write(target.join(MANIFEST_FILE), manifest).await?;

        for (page, file_name) in pages.iter().zip(&file_names) {
            debug!(document_id, page_nr = page.page_nr, file_name, "fetch transcript");
            let transcript = self
                .collections()
                .transcript(collection_id, document_id, page.page_nr)
                .await?;
            let transcript = mets::format_transcript(transcript.as_bytes())?;
            tokio::fs::write(target.join(file_name), transcript).await?;
        }

        info!(collection_id, document_id, target = %target.display(), "document downloaded");
        Ok(())
    }
}
