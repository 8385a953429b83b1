use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{FilterSelection, JobId, JobPosting, SortOrder};

const TAG_COLUMN_SEPARATOR: &str = ",";
const JOB_COLUMNS: &str = "id, title, company, location, job_type, tags, posting_date";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A posting about to be inserted; the id is assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub tags: Vec<String>,
    pub posting_date: DateTime<Utc>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.job_type.is_none()
            && self.tags.is_none()
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens a fresh database, so the
        // in-memory pool is pinned to one connection that never expires.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Lists postings matching `filter`. Empty filter fields do not constrain;
    /// `job_type` and `location` match exactly, `tag` matches as a
    /// case-insensitive substring of the stored tag text.
    pub async fn list_jobs(&self, filter: &FilterSelection) -> Result<Vec<JobPosting>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE 1 = 1"));
        if !filter.job_type.is_empty() {
            query.push(" AND job_type = ").push_bind(filter.job_type.clone());
        }
        if !filter.location.is_empty() {
            query.push(" AND location = ").push_bind(filter.location.clone());
        }
        if !filter.tag.is_empty() {
            query
                .push(" AND tags LIKE ")
                .push_bind(format!("%{}%", escape_like(&filter.tag)))
                .push(" ESCAPE '\\'");
        }
        query.push(match filter.sort {
            SortOrder::NewestFirst => " ORDER BY posting_date DESC, id DESC",
            SortOrder::OldestFirst => " ORDER BY posting_date ASC, id ASC",
        });

        let rows = query.build().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), ?filter, "listed jobs");
        rows.iter().map(posting_from_row).collect()
    }

    pub async fn get_job(&self, job_id: JobId) -> Result<Option<JobPosting>> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(job_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(posting_from_row).transpose()
    }

    pub async fn insert_job(&self, job: NewJob) -> Result<JobPosting> {
        let row = sqlx::query(&format!(
            "INSERT INTO jobs (title, company, location, job_type, tags, posting_date)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(encode_tags(&job.tags))
        .bind(encode_posting_date(&job.posting_date))
        .fetch_one(&self.pool)
        .await
        .context("failed to insert job")?;
        posting_from_row(&row)
    }

    /// Applies `changes` and returns the updated posting, or `None` when the
    /// id is unknown.
    pub async fn update_job(&self, job_id: JobId, changes: JobChanges) -> Result<Option<JobPosting>> {
        if changes.is_empty() {
            return self.get_job(job_id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE jobs SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(title) = changes.title {
                assignments.push("title = ").push_bind_unseparated(title);
            }
            if let Some(company) = changes.company {
                assignments.push("company = ").push_bind_unseparated(company);
            }
            if let Some(location) = changes.location {
                assignments.push("location = ").push_bind_unseparated(location);
            }
            if let Some(job_type) = changes.job_type {
                assignments.push("job_type = ").push_bind_unseparated(job_type);
            }
            if let Some(tags) = changes.tags {
                assignments
                    .push("tags = ")
                    .push_bind_unseparated(encode_tags(&tags));
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(job_id.0)
            .push(format!(" RETURNING {JOB_COLUMNS}"));

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to update job {job_id}"))?;
        row.as_ref().map(posting_from_row).transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_job(&self, job_id: JobId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(job_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_jobs(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn find_job_by_identity(
        &self,
        title: &str,
        company: &str,
        location: &str,
    ) -> Result<Option<JobId>> {
        let row = sqlx::query("SELECT id FROM jobs WHERE title = ? AND company = ? AND location = ? LIMIT 1")
            .bind(title)
            .bind(company)
            .bind(location)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| JobId(r.get::<i64, _>(0))))
    }
}

fn posting_from_row(row: &SqliteRow) -> Result<JobPosting> {
    let raw_date: String = row.try_get("posting_date")?;
    let posting_date = DateTime::parse_from_rfc3339(&raw_date)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid posting_date '{raw_date}': {err}"))?;
    let raw_tags: String = row.try_get("tags")?;

    Ok(JobPosting {
        id: JobId(row.try_get("id")?),
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        job_type: row.try_get("job_type")?,
        tags: decode_tags(&raw_tags),
        posting_date,
    })
}

fn encode_tags(tags: &[String]) -> String {
    tags.join(TAG_COLUMN_SEPARATOR)
}

fn decode_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(TAG_COLUMN_SEPARATOR).map(str::to_string).collect()
}

/// Fixed-width UTC text so that lexical order in SQL is chronological order.
fn encode_posting_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
