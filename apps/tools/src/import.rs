//! Loading scraped postings into storage.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shared::{
    domain::{posting_date_format, DEFAULT_JOB_TYPE},
    protocol::TagsField,
};
use storage::{NewJob, Storage};
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsField>,
    /// ISO date or relative text such as "3 days ago".
    #[serde(default, alias = "posting_date")]
    pub posted: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

pub fn parse_scraped(raw: &str) -> Result<Vec<ScrapedPosting>> {
    Ok(serde_json::from_str(raw)?)
}

/// Resolves a scraped `posted` value against `now`. Absolute dates win;
/// relative text counts months as 30 days. Anything unrecognized is `now`.
pub fn resolve_posted(posted: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = posted.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return now;
    };
    if let Some(parsed) = posting_date_format::parse(raw) {
        return parsed;
    }

    let text = raw.to_ascii_lowercase();
    let count = leading_number(&text);
    let days_back = if text.contains("today") || text.contains("just posted") {
        Some(0)
    } else if text.contains("yesterday") {
        Some(1)
    } else if text.contains("day") {
        Some(count.unwrap_or(0))
    } else if text.contains("week") {
        count.unwrap_or(1).checked_mul(7)
    } else if text.contains("month") {
        count.unwrap_or(1).checked_mul(30)
    } else {
        debug!(posted = raw, "unrecognized posted text; using current time");
        Some(0)
    };

    days_back
        .and_then(Duration::try_days)
        .and_then(|offset| now.checked_sub_signed(offset))
        .unwrap_or_else(|| {
            warn!(posted = raw, "posted offset out of range; using current time");
            now
        })
}

/// Digit runs too long for `i64` saturate so the caller's range checks reject them.
fn leading_number(text: &str) -> Option<i64> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|digits| !digits.is_empty())
        .map(|digits| digits.parse().unwrap_or(i64::MAX))
}

fn into_new_job(posting: ScrapedPosting, now: DateTime<Utc>) -> Option<NewJob> {
    let title = posting.title.trim().to_string();
    let company = posting.company.trim().to_string();
    let location = posting.location.trim().to_string();
    if title.is_empty() || company.is_empty() || location.is_empty() {
        return None;
    }

    let job_type = posting
        .job_type
        .map(|job_type| job_type.trim().to_string())
        .filter(|job_type| !job_type.is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string());
    let tags = posting.tags.map(TagsField::into_tags).unwrap_or_default();

    Some(NewJob {
        posting_date: resolve_posted(posting.posted.as_deref(), now),
        title,
        company,
        location,
        job_type,
        tags,
    })
}

/// Inserts each posting unless one with the same title, company and
/// location is already stored.
pub async fn import_postings(
    storage: &Storage,
    postings: Vec<ScrapedPosting>,
    now: DateTime<Utc>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for posting in postings {
        let Some(job) = into_new_job(posting, now) else {
            warn!("skipping scraped posting without title, company and location");
            report.invalid += 1;
            continue;
        };
        if let Some(existing) = storage
            .find_job_by_identity(&job.title, &job.company, &job.location)
            .await?
        {
            debug!(job_id = %existing, title = %job.title, "posting already stored");
            report.duplicates += 1;
            continue;
        }
        let stored = storage.insert_job(job).await?;
        debug!(job_id = %stored.id, "imported posting");
        report.imported += 1;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::FilterSelection;

    fn now() -> DateTime<Utc> {
        "2024-06-15T09:30:00Z".parse().expect("timestamp")
    }

    #[test]
    fn relative_posted_text_counts_back_from_now() {
        let now = now();
        assert_eq!(resolve_posted(Some("Today"), now), now);
        assert_eq!(resolve_posted(Some("Posted yesterday"), now), now - Duration::days(1));
        assert_eq!(resolve_posted(Some("5 days ago"), now), now - Duration::days(5));
        assert_eq!(resolve_posted(Some("30+ days ago"), now), now - Duration::days(30));
        assert_eq!(resolve_posted(Some("2 weeks ago"), now), now - Duration::days(14));
        assert_eq!(resolve_posted(Some("a month ago"), now), now - Duration::days(30));
        assert_eq!(resolve_posted(Some("3 months ago"), now), now - Duration::days(90));
    }

    #[test]
    fn absolute_and_unknown_posted_values() {
        let now = now();
        assert_eq!(
            resolve_posted(Some("2024-01-02"), now),
            "2024-01-02T00:00:00Z".parse::<DateTime<Utc>>().expect("timestamp")
        );
        assert_eq!(resolve_posted(Some("recently"), now), now);
        assert_eq!(resolve_posted(Some("   "), now), now);
        assert_eq!(resolve_posted(None, now), now);
    }

    #[test]
    fn out_of_range_offsets_fall_back_to_now() {
        let now = now();
        assert_eq!(resolve_posted(Some("999999999999999 days ago"), now), now);
        assert_eq!(resolve_posted(Some("9223372036854775807 weeks ago"), now), now);
        assert_eq!(resolve_posted(Some("99999999999999999999 months ago"), now), now);
    }

    #[test]
    fn scraped_tags_accept_list_or_text() {
        let postings = parse_scraped(
            r#"[
                {"title": "Actuary", "company": "Acme", "location": "NYC", "tags": ["SQL", " "]},
                {"title": "Analyst", "company": "Acme", "location": "NYC", "tags": "Excel, ,VBA"}
            ]"#,
        )
        .expect("valid json");

        let first = into_new_job(postings[0].clone(), now()).expect("complete posting");
        let second = into_new_job(postings[1].clone(), now()).expect("complete posting");
        assert_eq!(first.tags, vec!["SQL"]);
        assert_eq!(second.tags, vec!["Excel", "VBA"]);
        assert_eq!(first.job_type, DEFAULT_JOB_TYPE);
    }

    #[tokio::test]
    async fn import_skips_duplicates_and_incomplete_postings() {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        let postings = parse_scraped(
            r#"[
                {"title": "Actuary", "company": "Acme", "location": "NYC", "job_type": "Internship", "posted": "2 days ago"},
                {"title": "Actuary", "company": "Acme", "location": "NYC"},
                {"title": "", "company": "Acme", "location": "NYC"},
                {"title": "Analyst", "company": "Beta", "location": "Remote"}
            ]"#,
        )
        .expect("valid json");

        let report = import_postings(&storage, postings, now()).await.expect("import");
        assert_eq!(
            report,
            ImportReport {
                imported: 2,
                duplicates: 1,
                invalid: 1,
            }
        );

        let stored = storage
            .list_jobs(&FilterSelection::default())
            .await
            .expect("list");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].title, "Analyst");
        assert_eq!(stored[1].job_type, "Internship");
        assert_eq!(stored[1].posting_date, now() - Duration::days(2));
    }
}
