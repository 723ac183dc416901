use crate::errors::Result;
use crate::gateway::{self, Gateway};
use crate::models::{job_from_value, Job};

/// Filters and paging for [`Jobs::list`].
#[derive(Debug, Clone)]
pub struct JobQuery {
    pub user_id: Option<i64>,
    pub filter_by_user: Option<bool>,
    /// e.g. `"RUNNING"`.
    pub status: Option<String>,
    pub collection_id: Option<i64>,
    pub job_id: Option<String>,
    pub job_type: Option<String>,
    pub job_impl: Option<String>,
    pub index: u32,
    /// Defaults to 50.
    pub n_values: u32,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            filter_by_user: None,
            status: None,
            collection_id: None,
            job_id: None,
            job_type: None,
            job_impl: None,
            index: 0,
            n_values: 50,
            sort_column: None,
            sort_direction: None,
        }
    }
}

/// Requests under `jobs/`.
pub struct Jobs<'a> {
    gateway: &'a mut Gateway,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(gateway: &'a mut Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&mut self, query: &JobQuery) -> Result<Vec<Job>> {
        let params = [
            ("userid", query.user_id.map(|id| id.to_string())),
            ("filterByUser", query.filter_by_user.map(|b| b.to_string())),
            ("status", query.status.clone()),
            ("collId", query.collection_id.map(|id| id.to_string())),
            ("id", query.job_id.clone()),
            ("type", query.job_type.clone()),
            ("jobImpl", query.job_impl.clone()),
            ("index", Some(query.index.to_string())),
            ("nValues", Some(query.n_values.to_string())),
            ("sortColumn", query.sort_column.clone()),
            ("sortDirection", query.sort_direction.clone()),
        ];
        let resp = self.gateway.get("jobs/list", &params).await?;
        let values: Vec<serde_json::Value> = gateway::json(resp).await?;
        Ok(values.into_iter().map(job_from_value).collect())
    }

    /// Fetch a job by its identifier.
    pub async fn get(&mut self, job_id: &str) -> Result<Job> {
        let resp = self.gateway.get(&format!("jobs/{job_id}"), &[]).await?;
        let value: serde_json::Value = gateway::json(resp).await?;
        Ok(job_from_value(value))
    }
}
