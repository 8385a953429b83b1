use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{FilterSelection, JobId, JobMutation, JobPayload, JobPosting},
    error::ApiError,
    protocol::JobWriteBody,
};
use tracing::debug;
use url::Url;

pub mod error;

pub use error::ClientError;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote listing operations. Write calls discard the response body; callers
/// refresh the list instead of trusting a returned record.
#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn list_jobs(&self, filter: &FilterSelection) -> Result<Vec<JobPosting>, ClientError>;
    async fn get_job(&self, job_id: JobId) -> Result<JobPosting, ClientError>;
    async fn create_job(&self, payload: &JobPayload) -> Result<(), ClientError>;
    async fn update_job(&self, job_id: JobId, payload: &JobPayload) -> Result<(), ClientError>;
    async fn delete_job(&self, job_id: JobId) -> Result<(), ClientError>;

    async fn apply(&self, mutation: &JobMutation) -> Result<(), ClientError> {
        match mutation {
            JobMutation::Create(payload) => self.create_job(payload).await,
            JobMutation::Update(job_id, payload) => self.update_job(*job_id, payload).await,
            JobMutation::Delete(job_id) => self.delete_job(*job_id).await,
        }
    }
}

#[derive(Clone)]
pub struct JobsClient {
    http: Client,
    base_url: Url,
}

impl JobsClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(server_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, relative: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(relative)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }

    fn job_endpoint(&self, job_id: JobId) -> Result<Url, ClientError> {
        self.endpoint(&format!("jobs/{job_id}"))
    }
}

#[async_trait]
impl JobsApi for JobsClient {
    async fn list_jobs(&self, filter: &FilterSelection) -> Result<Vec<JobPosting>, ClientError> {
        let url = self.endpoint("jobs")?;
        debug!(%url, ?filter, "listing jobs");
        let response = self
            .http
            .get(url)
            .query(&filter.query_pairs())
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn get_job(&self, job_id: JobId) -> Result<JobPosting, ClientError> {
        let response = self.http.get(self.job_endpoint(job_id)?).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<(), ClientError> {
        let url = self.endpoint("jobs")?;
        debug!(%url, title = %payload.title, "creating job");
        let response = self
            .http
            .post(url)
            .json(&JobWriteBody { payload, id: None })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_job(&self, job_id: JobId, payload: &JobPayload) -> Result<(), ClientError> {
        let url = self.job_endpoint(job_id)?;
        debug!(%url, "updating job");
        let response = self
            .http
            .patch(url)
            .json(&JobWriteBody {
                payload,
                id: Some(job_id),
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_job(&self, job_id: JobId) -> Result<(), ClientError> {
        let url = self.job_endpoint(job_id)?;
        debug!(%url, "deleting job");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Parses the server URL and makes its path end in `/` so that relative
/// joins keep any path prefix (`http://host/api` + `jobs` -> `/api/jobs`).
fn normalize_base_url(server_url: &str) -> Result<Url, ClientError> {
    let mut base_url = Url::parse(server_url.trim()).map_err(|source| ClientError::InvalidBaseUrl {
        url: server_url.to_string(),
        source,
    })?;
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url)
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(error) => Err(ClientError::Api {
            status: status.as_u16(),
            error,
        }),
        Err(_) => Err(ClientError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
