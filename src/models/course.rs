use mongodb::bson::{doc, DateTime, Document};
use serde::Deserialize;

use super::{non_blank, present};
use crate::error::ApiError;

/// POST /courses body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub title: Option<String>,
    pub faculty: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
}

impl CreateCourse {
    /// Validate and build the stored course. `noteCount` always starts at 0.
    pub fn into_document(self, now: DateTime) -> Result<Document, ApiError> {
        let mut missing = Vec::new();
        if !present(&self.title) {
            missing.push("title");
        }
        if !present(&self.faculty) {
            missing.push("faculty");
        }
        if !missing.is_empty() {
            return Err(ApiError::missing_fields(&missing));
        }

        Ok(doc! {
            "title": self.title,
            "faculty": self.faculty,
            "code": non_blank(self.code),
            "description": non_blank(self.description),
            "semester": non_blank(self.semester),
            "credits": self.credits,
            "noteCount": 0,
            "createdAt": now,
            "updatedAt": now,
        })
    }
}
