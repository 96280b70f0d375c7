use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::util::slug::slugify;

/// A service offered by the business (e.g. lawn mowing, end-of-lease clean).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_popular: bool,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Service {
            id: None,
            slug: slugify(&name),
            name,
            description: String::new(),
            is_active: true,
            is_popular: false,
        }
    }

    /// Fills the slug from the name when blank.
    pub fn prepare_for_save(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
    }
}

/// The business itself. The first record is the default owner of new quotes
/// and supplies letterhead and payment details on generated documents.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Company {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub abn: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub bsb: Option<String>,
    pub reg_no: Option<String>,
}

impl Company {
    pub fn prepare_for_save(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
    }
}
