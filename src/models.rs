use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// One page of a document to upload: an image and an optional PAGE-XML file.
///
/// Checksums are computed once, when the page is built, unless they are
/// passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPage {
    image: PathBuf,
    page_xml: Option<PathBuf>,
    page_nr: u32,
    image_md5: String,
    page_xml_md5: Option<String>,
}

impl UploadPage {
    /// Build a page and hash the referenced files.
    pub fn new(
        image: impl Into<PathBuf>,
        page_xml: Option<PathBuf>,
        page_nr: u32,
    ) -> Result<Self> {
        Self::with_checksums(image, page_xml, page_nr, None, None)
    }

    /// Build a page, hashing only the files whose checksum is not supplied.
    pub fn with_checksums(
        image: impl Into<PathBuf>,
        page_xml: Option<PathBuf>,
        page_nr: u32,
        image_md5: Option<String>,
        page_xml_md5: Option<String>,
    ) -> Result<Self> {
        let image = image.into();
        let image_md5 = match image_md5 {
            Some(sum) => sum,
            None => md5_file(&image)?,
        };
        let page_xml_md5 = match (&page_xml, page_xml_md5) {
            (_, Some(sum)) => Some(sum),
            (Some(path), None) => Some(md5_file(path)?),
            (None, None) => None,
        };

        Ok(Self {
            image,
            page_xml,
            page_nr,
            image_md5,
            page_xml_md5,
        })
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn page_xml(&self) -> Option<&Path> {
        self.page_xml.as_deref()
    }

    pub fn page_nr(&self) -> u32 {
        self.page_nr
    }

    /// Lowercase hex MD5 of the image.
    pub fn image_md5(&self) -> &str {
        &self.image_md5
    }

    /// Lowercase hex MD5 of the PAGE-XML file, if there is one.
    pub fn page_xml_md5(&self) -> Option<&str> {
        self.page_xml_md5.as_deref()
    }
}

/// Lowercase hex MD5 of a file's contents.
pub(crate) fn md5_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", md5::compute(bytes)))
}

/// Base name of a path, as sent to the service.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Entry of a document's page list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub page_id: Option<i64>,

    pub page_nr: u32,

    #[serde(default)]
    pub img_file_name: Option<String>,

    #[serde(default)]
    pub ts_list: TranscriptList,
}

impl Page {
    /// File name of the first (most recent) transcript of this page.
    pub fn transcript_file_name(&self) -> Option<&str> {
        self.ts_list
            .transcripts
            .first()
            .map(|t| t.file_name.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TranscriptList {
    #[serde(default)]
    pub transcripts: Vec<TranscriptRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRef {
    pub file_name: String,

    #[serde(default)]
    pub ts_id: Option<i64>,

    /// e.g. "NEW", "IN_PROGRESS", "DONE", "FINAL".
    #[serde(default)]
    pub status: Option<String>,
}

/// A server-side job, e.g. the one processing an upload.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Document the job works on, once the server has assigned one.
    pub doc_id: Option<i64>,
    /// e.g. "CREATED", "RUNNING", "FINISHED", "FAILED".
    pub state: String,
    pub job_type: Option<String>,
    pub description: Option<String>,
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

impl Job {
    /// FINISHED, FAILED or CANCELED.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state.as_str(), "FINISHED" | "FAILED" | "CANCELED")
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// The authenticated user's role in the collection.
    pub role: Option<String>,
    pub n_documents: Option<i64>,
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: i64,
    pub title: String,
    pub n_pages: Option<i64>,
    pub uploader: Option<String>,
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

/// State of an upload as reported by `GET uploads/{id}`.
#[derive(Debug, Clone)]
pub struct UploadStatus {
    pub upload_id: Option<i64>,
    /// Set once all pages are in and the processing job was queued.
    pub job_id: Option<String>,
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of the structure-creation call that opens an upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    pub md: serde_json::Map<String, serde_json::Value>,
    pub page_list: PageList,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageList {
    pub pages: Vec<PageDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub file_name: String,
    pub page_xml_name: Option<String>,
    pub page_nr: u32,
    #[serde(rename = "imgChecksum")]
    pub image_checksum: String,
    #[serde(rename = "pageXmlChecksum")]
    pub page_xml_checksum: Option<String>,
}

impl DocumentStructure {
    /// Describe `pages` under `title`. `title` always wins over a `title`
    /// key in `metadata`.
    pub fn new(
        title: &str,
        pages: &[UploadPage],
        metadata: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut md = metadata.clone();
        md.insert("title".into(), serde_json::Value::String(title.into()));

        let pages = pages
            .iter()
            .map(|page| PageDescriptor {
                file_name: file_name(page.image()),
                page_xml_name: page.page_xml().map(file_name),
                page_nr: page.page_nr(),
                image_checksum: page.image_md5().to_string(),
                page_xml_checksum: page.page_xml_md5().map(str::to_string),
            })
            .collect();

        Self {
            md,
            page_list: PageList { pages },
        }
    }
}

// ---------------------------------------------------------------------------
// Internal deserialization helpers (not part of the public API surface)
// ---------------------------------------------------------------------------

/// Pull a string out of a JSON value, or `""` if missing.
pub(crate) fn json_str(val: &serde_json::Value, key: &str) -> String {
    json_str_opt(val, key).unwrap_or_default()
}

pub(crate) fn json_str_opt(val: &serde_json::Value, key: &str) -> Option<String> {
    val.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Pull an integer id out of a JSON value. The service sends some ids as
/// numbers and others as numeric strings.
pub(crate) fn json_id(val: &serde_json::Value, key: &str) -> Option<i64> {
    match val.get(key)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Like [`json_id`], but keeps the id as text.
pub(crate) fn json_id_str(val: &serde_json::Value, key: &str) -> Option<String> {
    match val.get(key)? {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub(crate) fn job_from_value(val: serde_json::Value) -> Job {
    Job {
        id: json_id_str(&val, "jobId").unwrap_or_default(),
        doc_id: json_id(&val, "docId"),
        state: json_str(&val, "state"),
        job_type: json_str_opt(&val, "type"),
        description: json_str_opt(&val, "description"),
        raw: val,
    }
}

pub(crate) fn collection_from_value(val: serde_json::Value) -> Collection {
    Collection {
        id: json_id(&val, "colId").unwrap_or_default(),
        name: json_str(&val, "colName"),
        description: json_str_opt(&val, "description"),
        role: json_str_opt(&val, "role"),
        n_documents: json_id(&val, "nrOfDocuments"),
        raw: val,
    }
}

pub(crate) fn document_from_value(val: serde_json::Value) -> DocumentSummary {
    DocumentSummary {
        id: json_id(&val, "docId").unwrap_or_default(),
        title: json_str(&val, "title"),
        n_pages: json_id(&val, "nrOfPages"),
        uploader: json_str_opt(&val, "uploader"),
        raw: val,
    }
}

pub(crate) fn upload_status_from_value(val: serde_json::Value) -> UploadStatus {
    UploadStatus {
        upload_id: json_id(&val, "uploadId"),
        job_id: json_id_str(&val, "jobId"),
        raw: val,
    }
}
