use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::status::ApplicationStatus;
use crate::util::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Volunteer,
    Other,
}

/// Job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(default)]
    pub job_type: JobType,
    pub description: Option<String>,
    pub is_active: bool,
    pub expired_at: Option<NaiveDate>,
}

impl Vacancy {
    pub fn new(title: impl Into<String>) -> Self {
        Vacancy {
            id: None,
            title: title.into(),
            slug: String::new(),
            location: None,
            salary: None,
            job_type: JobType::FullTime,
            description: None,
            is_active: true,
            expired_at: None,
        }
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expired_at, Some(expired_at) if expired_at < today)
    }

    /// Derives slug and activity in one pass before the vacancy is written.
    pub fn prepare_for_save(&mut self, today: NaiveDate) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
        if self.is_expired(today) {
            self.is_active = false;
        }
    }
}

/// Candidate applying to a vacancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vacancy_id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Stored resume location, if one was uploaded
    pub resume: Option<String>,
    #[serde(default)]
    pub message: String,
    pub applied_at: Option<String>,
    #[serde(default)]
    pub is_reviewed: bool,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub status: ApplicationStatus,
}
