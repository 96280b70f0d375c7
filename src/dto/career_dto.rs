use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::career::JobType;
use crate::model::status::ApplicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VacancyInput {
    #[validate(length(min = 2, max = 255))]
    pub title: String,

    #[validate(length(max = 255))]
    pub slug: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 255))]
    pub salary: Option<String>,

    #[serde(default)]
    pub job_type: JobType,

    pub description: Option<String>,

    pub is_active: Option<bool>,

    pub expired_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplicationInput {
    #[validate(length(min = 2, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub phone: String,

    pub resume: Option<String>,

    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplicationStatusInput {
    pub status: ApplicationStatus,

    pub comments: Option<String>,

    pub is_reviewed: Option<bool>,
}
