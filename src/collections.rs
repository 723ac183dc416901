use crate::errors::Result;
use crate::gateway::{self, Gateway};
use crate::models::{collection_from_value, document_from_value, Collection, DocumentSummary, Page};

/// Filters and paging for [`Collections::list`].
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    pub index: u32,
    /// Page size; `0` lets the server decide.
    pub n_values: u32,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
    pub exclude_empty: bool,
    pub filter: Option<String>,
    pub role: Option<String>,
    pub user_id: Option<i64>,
}

/// Paging for [`Collections::documents`].
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub index: u32,
    pub n_values: u32,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
    pub is_deleted: bool,
}

/// Filters for [`Collections::pages`].
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Page range such as `"1-3,7"`; all pages when `None`.
    pub pages: Option<String>,
    /// Only pages whose latest transcript has this status.
    pub status: Option<String>,
    pub skip_pages_with_missing_status: bool,
}

/// Requests under `collections/`.
pub struct Collections<'a> {
    gateway: &'a mut Gateway,
}

impl<'a> Collections<'a> {
    pub(crate) fn new(gateway: &'a mut Gateway) -> Self {
        Self { gateway }
    }

    /// List the collections visible to the logged-in user.
    pub async fn list(&mut self, query: &CollectionQuery) -> Result<Vec<Collection>> {
        let params = [
            ("index", Some(query.index.to_string())),
            ("nValues", Some(query.n_values.to_string())),
            ("sortColumn", query.sort_column.clone()),
            ("sortDirection", query.sort_direction.clone()),
            ("excludeEmpty", Some(query.exclude_empty.to_string())),
            ("filter", query.filter.clone()),
            ("role", query.role.clone()),
            ("userid", query.user_id.map(|id| id.to_string())),
        ];
        let resp = self.gateway.get("collections", &params).await?;
        let values: Vec<serde_json::Value> = gateway::json(resp).await?;
        Ok(values.into_iter().map(collection_from_value).collect())
    }

    /// List the documents of a collection.
    pub async fn documents(
        &mut self,
        collection_id: i64,
        query: &DocumentQuery,
    ) -> Result<Vec<DocumentSummary>> {
        let params = [
            ("index", Some(query.index.to_string())),
            ("nValues", Some(query.n_values.to_string())),
            ("sortColumn", query.sort_column.clone()),
            ("sortDirection", query.sort_direction.clone()),
            ("isDeleted", Some(query.is_deleted.to_string())),
        ];
        let resp = self
            .gateway
            .get(&format!("collections/{collection_id}/list"), &params)
            .await?;
        let values: Vec<serde_json::Value> = gateway::json(resp).await?;
        Ok(values.into_iter().map(document_from_value).collect())
    }

    /// Metadata of a document, as returned by the server.
    pub async fn metadata(
        &mut self,
        collection_id: i64,
        document_id: i64,
    ) -> Result<serde_json::Value> {
        let resp = self
            .gateway
            .get(&format!("collections/{collection_id}/{document_id}/metadata"), &[])
            .await?;
        gateway::json(resp).await
    }

    /// The METS manifest of a document.
    pub async fn mets(&mut self, collection_id: i64, document_id: i64) -> Result<String> {
        let resp = self
            .gateway
            .get(&format!("collections/{collection_id}/{document_id}/mets"), &[])
            .await?;
        Ok(resp.text().await?)
    }

    /// The page list of a document.
    pub async fn pages(
        &mut self,
        collection_id: i64,
        document_id: i64,
        query: &PageQuery,
    ) -> Result<Vec<Page>> {
        let params = [
            (
                "skipPagesWithMissingStatus",
                Some(query.skip_pages_with_missing_status.to_string()),
            ),
            ("pages", query.pages.clone()),
            ("status", query.status.clone()),
        ];
        let resp = self
            .gateway
            .get(&format!("collections/{collection_id}/{document_id}/pages"), &params)
            .await?;
        gateway::json(resp).await
    }

    /// The current PAGE-XML transcript of one page.
    pub async fn transcript(
        &mut self,
        collection_id: i64,
        document_id: i64,
        page_nr: u32,
    ) -> Result<String> {
        let resp = self
            .gateway
            .get(
                &format!("collections/{collection_id}/{document_id}/{page_nr}/text"),
                &[],
            )
            .await?;
        Ok(resp.text().await?)
    }
}
