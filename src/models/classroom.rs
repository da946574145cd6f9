use mongodb::bson::{doc, DateTime, Document};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{non_blank, present};
use crate::error::ApiError;

static CLASS_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{6}$").expect("class code pattern compiles"));

/// Exactly six ASCII letters or digits
pub fn validate_class_code(code: &str) -> Result<(), ApiError> {
    if CLASS_CODE.is_match(code) {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "classCode must be exactly 6 letters or digits",
        ))
    }
}

/// POST /classrooms body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassroom {
    pub institution_type: Option<String>,
    pub institution_name: Option<String>,
    pub classroom_name: Option<String>,
    pub class_code: Option<String>,
    pub department: Option<String>,
    pub class_or_grade: Option<String>,
    pub section: Option<String>,
    pub capacity: Option<i32>,
}

impl CreateClassroom {
    /// Validate and build the stored classroom. `memberCount` always starts at 0.
    pub fn into_document(self, now: DateTime) -> Result<Document, ApiError> {
        let required = [
            ("institutionType", &self.institution_type),
            ("institutionName", &self.institution_name),
            ("classroomName", &self.classroom_name),
            ("classCode", &self.class_code),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| !present(value))
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::missing_fields(&missing));
        }

        let class_code = self.class_code.unwrap_or_default();
        validate_class_code(&class_code)?;

        Ok(doc! {
            "institutionType": self.institution_type,
            "institutionName": self.institution_name,
            "classroomName": self.classroom_name,
            "classCode": class_code,
            "department": non_blank(self.department),
            "classOrGrade": non_blank(self.class_or_grade),
            "section": non_blank(self.section),
            "capacity": self.capacity,
            "memberCount": 0,
            "createdAt": now,
            "updatedAt": now,
        })
    }
}

/// POST /classrooms/join body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassroom {
    pub class_code: Option<String>,
    pub display_name: Option<String>,
}

impl JoinClassroom {
    /// The code to look up; required
    pub fn class_code(&self) -> Result<&str, ApiError> {
        match self.class_code.as_deref() {
            Some(code) if !code.trim().is_empty() => Ok(code),
            _ => Err(ApiError::missing_fields(&["classCode"])),
        }
    }
}
