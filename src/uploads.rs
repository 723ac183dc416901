use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::errors::{Result, TranskribusError};
use crate::gateway::{self, Gateway};
use crate::mets;
use crate::models::{file_name, upload_status_from_value, DocumentStructure, UploadPage, UploadStatus};

/// Requests under `uploads/`.
pub struct Uploads<'a> {
    gateway: &'a mut Gateway,
}

impl<'a> Uploads<'a> {
    pub(crate) fn new(gateway: &'a mut Gateway) -> Self {
        Self { gateway }
    }

    /// Open an upload described by a METS manifest. Returns the upload id.
    pub async fn create_from_mets(&mut self, collection_id: i64, mets: &str) -> Result<i64> {
        let resp = self
            .gateway
            .post_form(
                "uploads",
                &[("collId", Some(collection_id.to_string()))],
                &[("mets", mets)],
            )
            .await?;
        upload_id_from(resp).await
    }

    /// Open an upload described by a JSON page structure. Returns the upload id.
    pub async fn create_structure(
        &mut self,
        collection_id: i64,
        structure: &DocumentStructure,
    ) -> Result<i64> {
        let resp = self
            .gateway
            .post_json(
                "uploads",
                &[("collId", Some(collection_id.to_string()))],
                structure,
            )
            .await?;
        upload_id_from(resp).await
    }

    pub async fn status(&mut self, upload_id: i64) -> Result<UploadStatus> {
        let resp = self.gateway.get(&format!("uploads/{upload_id}"), &[]).await?;
        let value: serde_json::Value = gateway::json(resp).await?;
        Ok(upload_status_from_value(value))
    }

    /// Send one page's image, and its PAGE-XML if present.
    ///
    /// The files are read right before the request and dropped with it.
    pub async fn push_page(&mut self, upload_id: i64, page: &UploadPage) -> Result<()> {
        let mut form = Form::new().part("img", file_part(page.image()).await?);
        if let Some(xml) = page.page_xml() {
            form = form.part("xml", file_part(xml).await?);
        }

        self.gateway
            .put_multipart(&format!("uploads/{upload_id}"), form)
            .await?;
        Ok(())
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    Part::bytes(bytes)
        .file_name(file_name(path))
        .mime_str("application/octet-stream")
        .map_err(TranskribusError::Http)
}

async fn upload_id_from(resp: reqwest::Response) -> Result<i64> {
    let body = resp.bytes().await?;
    let text = mets::first_text(&body, "uploadId")
        .map_err(|e| TranskribusError::Upload(format!("unreadable upload response: {e}")))?
        .ok_or_else(|| TranskribusError::Upload("upload response carries no uploadId".into()))?;
    text.parse()
        .map_err(|_| TranskribusError::Upload(format!("upload id `{text}` is not a number")))
}
