use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(JobId);

/// Job types offered by the filter and form pickers. Stored values are free-form.
pub const KNOWN_JOB_TYPES: [&str; 3] = ["Full-time", "Part-time", "Internship"];

pub const DEFAULT_JOB_TYPE: &str = "Full-time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "posting_date_desc")]
    NewestFirst,
    #[serde(rename = "posting_date_asc")]
    OldestFirst,
}

impl SortOrder {
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "posting_date_desc",
            SortOrder::OldestFirst => "posting_date_asc",
        }
    }

    /// Anything other than the ascending key sorts newest first.
    pub fn from_query_value(raw: &str) -> Self {
        if raw.trim() == "posting_date_asc" {
            SortOrder::OldestFirst
        } else {
            SortOrder::NewestFirst
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest First",
            SortOrder::OldestFirst => "Oldest First",
        }
    }
}

/// A persisted job listing as returned by the listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "posting_date_format")]
    pub posting_date: DateTime<Utc>,
}

impl JobPosting {
    pub fn payload(&self) -> JobPayload {
        JobPayload {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_type: self.job_type.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Field values submitted for creation or update. Never carries an id; the
/// target of an update travels in [`JobMutation::Update`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobPayload {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JobPayload {
    /// Names of required fields that are blank.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// The filter the listing is queried with. Empty strings leave a field unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub job_type: String,
    pub location: String,
    pub tag: String,
    pub sort: SortOrder,
}

impl FilterSelection {
    /// Query parameters in wire order. Empty values are kept so the server
    /// always sees all four keys.
    pub fn query_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("job_type", self.job_type.as_str()),
            ("location", self.location.as_str()),
            ("tag", self.tag.as_str()),
            ("sort", self.sort.as_query_value()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobMutation {
    Create(JobPayload),
    Update(JobId, JobPayload),
    Delete(JobId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update(JobId),
    Delete(JobId),
}

impl JobMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            JobMutation::Create(_) => MutationKind::Create,
            JobMutation::Update(id, _) => MutationKind::Update(*id),
            JobMutation::Delete(id) => MutationKind::Delete(*id),
        }
    }
}

impl MutationKind {
    pub fn verb(self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update(_) => "update",
            MutationKind::Delete(_) => "delete",
        }
    }
}

/// Posting dates are written as RFC 3339. Reading also accepts naive ISO
/// timestamps, bare dates and RFC 2822 (`Mon, 01 Jan 2024 00:00:00 GMT`),
/// all taken as UTC.
pub mod posting_date_format {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized posting date '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(parsed.and_utc());
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(parsed.and_utc());
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
        DateTime::parse_from_rfc2822(raw)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_pairs_keep_empty_values() {
        let filter = FilterSelection {
            job_type: "Internship".into(),
            ..FilterSelection::default()
        };
        assert_eq!(
            filter.query_pairs(),
            [
                ("job_type", "Internship"),
                ("location", ""),
                ("tag", ""),
                ("sort", "posting_date_desc"),
            ]
        );
    }

    #[test]
    fn sort_order_defaults_to_newest_and_tolerates_unknown_keys() {
        assert_eq!(SortOrder::default(), SortOrder::NewestFirst);
        assert_eq!(SortOrder::from_query_value("posting_date_asc"), SortOrder::OldestFirst);
        assert_eq!(SortOrder::from_query_value("bogus"), SortOrder::NewestFirst);
        assert_eq!(
            serde_json::to_string(&SortOrder::OldestFirst).expect("json"),
            "\"posting_date_asc\""
        );
    }

    #[test]
    fn posting_deserializes_from_naive_and_http_dates() {
        let naive: JobPosting = serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Analyst",
            "company": "Acme",
            "location": "Remote",
            "job_type": "Full-time",
            "tags": ["life"],
            "posting_date": "2024-03-05T10:30:00"
        }))
        .expect("naive timestamp");
        assert_eq!(naive.posting_date.to_rfc3339(), "2024-03-05T10:30:00+00:00");

        let http: JobPosting = serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "Analyst",
            "company": "Acme",
            "location": "Remote",
            "posting_date": "Tue, 05 Mar 2024 00:00:00 GMT"
        }))
        .expect("rfc2822 timestamp");
        assert_eq!(http.job_type, "");
        assert!(http.tags.is_empty());
        assert_eq!(http.posting_date.date_naive().to_string(), "2024-03-05");
    }

    #[test]
    fn missing_required_fields_ignores_whitespace_only_values() {
        let payload = JobPayload {
            title: "  ".into(),
            company: "Acme".into(),
            location: String::new(),
            ..JobPayload::default()
        };
        assert_eq!(payload.missing_required_fields(), vec!["title", "location"]);
    }
}
