use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Posts returned per request. There is no "load more"; only the first page is fetched.
pub const PAGE_LIMIT: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Field {
    Company,
    Position,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Position => "position",
        }
    }

    /// Plural used both for the endpoint path and alert text.
    pub fn plural(&self) -> &'static str {
        match self {
            Field::Company => "companies",
            Field::Position => "positions",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreateDate,
    InterviewDate,
    Views,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::CreateDate, SortKey::InterviewDate, SortKey::Views];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::CreateDate => "Create Date",
            SortKey::InterviewDate => "Interview Date",
            SortKey::Views => "Views",
        }
    }

    /// Cycles through the keys in menu order.
    pub fn next(&self) -> SortKey {
        let pos = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub company: Option<String>,
    pub position: Option<String>,
    pub create_date: Option<String>,
    pub interview_date: Option<String>,
    pub views: Option<i64>,
    pub status: Option<String>, // "applied", "interviewing", "offer", "rejected", ...
    pub notes: Option<String>,
    /// Everything else the API sends, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PostRecord {
    pub fn created_label(&self) -> String {
        date_label(self.create_date.as_deref())
    }

    pub fn interview_label(&self) -> String {
        date_label(self.interview_date.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub company: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "interviewDate", skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Renders an API date as `YYYY-MM-DD`, falling back to the raw text for unknown formats.
pub fn date_label(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }

    raw.to_string()
}
