use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::classifier::{self, LevelTag};

/// Application status of a posting. Only an external actor moves it;
/// the discovery pipeline always inserts `NotApplied`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "Not Applied")]
    NotApplied,
    Applied,
    Interviewed,
    Offer,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::NotApplied,
        JobStatus::Applied,
        JobStatus::Interviewed,
        JobStatus::Offer,
    ];

    /// The exact text stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::NotApplied => "Not Applied",
            JobStatus::Applied => "Applied",
            JobStatus::Interviewed => "Interviewed",
            JobStatus::Offer => "Offer",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    /// Exact match against the stored spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for JobStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of `job_applications`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct JobRow {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    #[sqlx(rename = "type")]
    pub job_type: String,
    pub url: String,
    pub date_added: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
}

impl JobRow {
    /// Level tags are derived from the title on every read, never stored.
    pub fn levels(&self) -> Vec<LevelTag> {
        classifier::levels(&self.title)
    }
}

/// A classified posting ready to be written. `date_added` and `status`
/// are assigned by the store on first insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub url: String,
    pub salary: Option<String>,
}

/// Wire shape of a posting in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobView {
    #[serde(rename = "ID")]
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "Type")]
    pub job_type: String,
    #[serde(rename = "URL")]
    pub url: String,
    pub date_added: DateTime<Utc>,
    pub status: JobStatus,
    pub levels: Vec<LevelTag>,
}

impl From<JobRow> for JobView {
    fn from(row: JobRow) -> Self {
        let levels = row.levels();
        JobView {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type,
            url: row.url,
            date_added: row.date_added,
            status: row.status,
            levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_stored_text() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_is_exact() {
        assert!("applied".parse::<JobStatus>().is_err());
        assert!("NotApplied".parse::<JobStatus>().is_err());
        assert_eq!(
            "Not Applied".parse::<JobStatus>().unwrap(),
            JobStatus::NotApplied
        );
    }

    #[test]
    fn test_status_defaults_to_not_applied() {
        assert_eq!(JobStatus::default(), JobStatus::NotApplied);
    }

    #[test]
    fn test_status_serializes_with_display_spelling() {
        let json = serde_json::to_string(&JobStatus::NotApplied).unwrap();
        assert_eq!(json, r#""Not Applied""#);
    }

    #[test]
    fn test_job_view_uses_wire_field_names() {
        let row = JobRow {
            id: 7,
            title: "Software Engineer Intern".to_string(),
            company: "Stripe".to_string(),
            location: "Remote".to_string(),
            salary: None,
            job_type: "Full-time".to_string(),
            url: "https://example.com/7".to_string(),
            date_added: Utc::now(),
            status: JobStatus::Applied,
        };

        let value = serde_json::to_value(JobView::from(row)).unwrap();
        assert_eq!(value["ID"], 7);
        assert_eq!(value["Type"], "Full-time");
        assert_eq!(value["URL"], "https://example.com/7");
        assert_eq!(value["Status"], "Applied");
        assert_eq!(value["Levels"], serde_json::json!(["Intern"]));
        assert!(value["DateAdded"].as_str().is_some());
    }
}
