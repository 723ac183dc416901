use std::collections::HashSet;

use tracing::{debug, info};

use crate::client::Client;
use crate::errors::{Result, TranskribusError};
use crate::models::{DocumentStructure, UploadPage};

impl Client {
    /// Upload a document into a collection and return its document id.
    ///
    /// This performs, strictly in order:
    /// 1. `POST uploads` with the page structure to open an upload.
    /// 2. `PUT uploads/{id}` once per page, in the order given.
    /// 3. `GET uploads/{id}` to learn the id of the processing job.
    /// 4. `GET jobs/{jobId}` to learn the id of the new document.
    ///
    /// The id is assigned when the job is created, so it is returned without
    /// waiting for processing to finish. Nothing is rolled back on failure:
    /// an error part way through leaves a half-filled upload on the server
    /// and the whole call has to be repeated.
    ///
    /// `metadata` is merged into the document metadata; `title` always takes
    /// precedence over a `title` key in it.
    ///
    /// # Errors
    ///
    /// - [`TranskribusError::Upload`] on duplicate page numbers, a missing
    ///   or unreadable upload, job or document id, or a rejected page.
    /// - [`TranskribusError::Io`] if a page file cannot be read.
    pub async fn upload_document(
        &mut self,
        collection_id: i64,
        title: &str,
        pages: &[UploadPage],
        metadata: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<i64> {
        let mut seen = HashSet::new();
        if let Some(dup) = pages.iter().find(|p| !seen.insert(p.page_nr())) {
            return Err(TranskribusError::Upload(format!(
                "page number {} is used more than once",
                dup.page_nr()
            )));
        }

        let structure = DocumentStructure::new(title, pages, metadata);
        let upload_id = self
            .uploads()
            .create_structure(collection_id, &structure)
            .await?;
        debug!(upload_id, pages = pages.len(), "upload created");

        for page in pages {
            debug!(upload_id, page_nr = page.page_nr(), image = %page.image().display(), "push page");
            self.uploads()
                .push_page(upload_id, page)
                .await
                .map_err(|e| match e {
                    TranskribusError::Request { status_code, body } => TranskribusError::Upload(
                        format!(
                            "page {} rejected with status {status_code}: {body}",
                            page.page_nr()
                        ),
                    ),
                    other => other,
                })?;
        }

        let status = self
            .uploads()
            .status(upload_id)
            .await
            .map_err(|e| unreadable(e, &format!("upload {upload_id} status")))?;
        let job_id = status.job_id.ok_or_else(|| {
            TranskribusError::Upload(format!("upload {upload_id} reports no jobId"))
        })?;
        debug!(upload_id, job_id = %job_id, "upload job queued");

        let job = self
            .jobs()
            .get(&job_id)
            .await
            .map_err(|e| unreadable(e, &format!("job {job_id}")))?;
        let doc_id = job
            .doc_id
            .ok_or_else(|| TranskribusError::Upload(format!("job {job_id} reports no docId")))?;

        info!(collection_id, doc_id, "document uploaded");
        Ok(doc_id)
    }
}

fn unreadable(err: TranskribusError, what: &str) -> TranskribusError {
    match err {
        TranskribusError::Parse(message) => {
            TranskribusError::Upload(format!("{what} could not be read: {message}"))
        }
        other => other,
    }
}
