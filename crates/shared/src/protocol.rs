use serde::{Deserialize, Serialize};

use crate::{
    domain::{FilterSelection, JobId, JobPayload, SortOrder},
    tags::split_tags,
};

pub const JOBS_ROUTE: &str = "/jobs";

/// Query string of `GET /jobs`. Every key is optional on the server side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl ListJobsQuery {
    pub fn into_filter(self) -> FilterSelection {
        FilterSelection {
            job_type: self.job_type.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            tag: self.tag.unwrap_or_default(),
            sort: self
                .sort
                .as_deref()
                .map(SortOrder::from_query_value)
                .unwrap_or_default(),
        }
    }
}

/// Tags may arrive as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Text(String),
}

impl TagsField {
    /// List entries are split on the delimiter too, since tags are stored
    /// joined by it.
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsField::List(tags) => tags.iter().flat_map(|tag| split_tags(tag)).collect(),
            TagsField::Text(text) => split_tags(&text),
        }
    }
}

/// Body of `POST /jobs`. Fields are optional so that missing required
/// values surface as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub posting_date: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsField>,
}

/// Body of `PATCH /jobs/{id}`. Only present fields are applied; a body `id`
/// is accepted and ignored in favour of the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsField>,
}

/// JSON body written by clients: the payload fields, plus the id on updates.
#[derive(Debug, Clone, Serialize)]
pub struct JobWriteBody<'a> {
    #[serde(flatten)]
    pub payload: &'a JobPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobResponse {
    pub message: String,
}
