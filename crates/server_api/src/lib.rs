use chrono::Utc;
use shared::{
    domain::{FilterSelection, JobId, JobPosting, DEFAULT_JOB_TYPE},
    error::{ApiError, ErrorCode},
    protocol::{CreateJobRequest, UpdateJobRequest},
};
use storage::{JobChanges, NewJob, Storage};
use tracing::{error, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_jobs(ctx: &ApiContext, filter: &FilterSelection) -> Result<Vec<JobPosting>, ApiError> {
    ctx.storage.list_jobs(filter).await.map_err(internal)
}

pub async fn get_job(ctx: &ApiContext, job_id: JobId) -> Result<JobPosting, ApiError> {
    ctx.storage
        .get_job(job_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| job_not_found(job_id))
}

/// Creates a posting. `title`, `company` and `location` are required;
/// `job_type` falls back to the default type and an absent or unparsable
/// `posting_date` falls back to now.
pub async fn create_job(ctx: &ApiContext, req: CreateJobRequest) -> Result<JobPosting, ApiError> {
    let title = required_field("title", req.title)?;
    let company = required_field("company", req.company)?;
    let location = required_field("location", req.location)?;

    let posting_date = req
        .posting_date
        .as_deref()
        .and_then(shared::domain::posting_date_format::parse)
        .unwrap_or_else(Utc::now);

    let created = ctx
        .storage
        .insert_job(NewJob {
            title,
            company,
            location,
            job_type: req.job_type.unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
            tags: req.tags.map(|tags| tags.into_tags()).unwrap_or_default(),
            posting_date,
        })
        .await
        .map_err(internal)?;
    info!(job_id = %created.id, title = %created.title, "job created");
    Ok(created)
}

/// Applies the fields present in `req`. Required fields may be omitted but
/// not blanked.
pub async fn update_job(
    ctx: &ApiContext,
    job_id: JobId,
    req: UpdateJobRequest,
) -> Result<JobPosting, ApiError> {
    let changes = JobChanges {
        title: req.title.map(|v| required_field("title", Some(v))).transpose()?,
        company: req
            .company
            .map(|v| required_field("company", Some(v)))
            .transpose()?,
        location: req
            .location
            .map(|v| required_field("location", Some(v)))
            .transpose()?,
        job_type: req.job_type,
        tags: req.tags.map(|tags| tags.into_tags()),
    };

    let updated = ctx
        .storage
        .update_job(job_id, changes)
        .await
        .map_err(internal)?
        .ok_or_else(|| job_not_found(job_id))?;
    info!(%job_id, "job updated");
    Ok(updated)
}

pub async fn delete_job(ctx: &ApiContext, job_id: JobId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_job(job_id).await.map_err(internal)?;
    if !removed {
        return Err(job_not_found(job_id));
    }
    info!(%job_id, "job deleted");
    Ok(())
}

fn required_field(name: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::validation(format!("missing required field: {name}"))),
    }
}

fn job_not_found(job_id: JobId) -> ApiError {
    ApiError::not_found(format!("job {job_id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "storage failure");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
