use mongodb::bson::{doc, Bson, DateTime, Document};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{non_blank, present};
use crate::error::ApiError;

/// One uploaded file on a note, in its stored shape
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub secure_url: String,
    pub public_id: Option<String>,
    pub original_filename: Option<String>,
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub bytes: Option<i64>,
    pub folder: Option<String>,
    pub relative_path: Option<String>,
}

impl Attachment {
    /// Read one raw attachment entry; `None` when it has no secure URL.
    ///
    /// Both camelCase and the upload provider's snake_case keys are accepted.
    pub fn from_json(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        Some(Self {
            secure_url: text(obj, &["secureUrl", "secure_url"])?,
            public_id: text(obj, &["publicId", "public_id"]),
            original_filename: text(obj, &["originalFilename", "original_filename"]),
            resource_type: text(obj, &["resourceType", "resource_type"]),
            format: text(obj, &["format"]),
            bytes: obj.get("bytes").and_then(byte_count),
            folder: text(obj, &["folder"]),
            relative_path: text(obj, &["relativePath", "relative_path"]),
        })
    }

    /// Fixed stored shape: every key present, absent values null
    pub fn to_document(&self) -> Document {
        doc! {
            "secureUrl": self.secure_url.clone(),
            "publicId": self.public_id.clone(),
            "originalFilename": self.original_filename.clone(),
            "resourceType": self.resource_type.clone(),
            "format": self.format.clone(),
            "bytes": self.bytes,
            "folder": self.folder.clone(),
            "relativePath": self.relative_path.clone(),
        }
    }
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Read a file size given as a whole number or a numeric string.
///
/// Fractional, negative or non-numeric values are dropped rather than rounded.
pub fn byte_count(value: &Value) -> Option<i64> {
    let count = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (count >= 0).then_some(count)
}

/// Keep only entries that carry a secure URL, normalized to the stored shape
pub fn normalize_attachments(raw: &[Value]) -> Vec<Attachment> {
    raw.iter().filter_map(Attachment::from_json).collect()
}

/// POST /notes body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub course_id: Option<String>,
    pub course_title: Option<String>,
    pub description: Option<String>,
    pub attachments: Option<Vec<Value>>,
    pub file_url: Option<String>,
    pub public_id: Option<String>,
    pub original_filename: Option<String>,
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub bytes: Option<Value>,
}

impl CreateNote {
    /// Validate and build the stored note.
    ///
    /// The top-level file fields mirror the first surviving attachment and
    /// fall back to the caller's own top-level values field by field.
    pub fn into_document(self, now: DateTime) -> Result<Document, ApiError> {
        let attachments = normalize_attachments(self.attachments.as_deref().unwrap_or_default());

        let mut missing = Vec::new();
        if !present(&self.title) {
            missing.push("title");
        }
        if !present(&self.subject) && !present(&self.course_id) && !present(&self.course_title) {
            missing.push("subject|courseId|courseTitle");
        }
        if attachments.is_empty() && !present(&self.file_url) {
            missing.push("attachments|fileUrl");
        }
        if !missing.is_empty() {
            return Err(ApiError::missing_fields(&missing));
        }

        let first = attachments.first();
        let file_url = first.map(|a| a.secure_url.clone()).or(non_blank(self.file_url));
        let public_id = first.and_then(|a| a.public_id.clone()).or(non_blank(self.public_id));
        let original_filename = first
            .and_then(|a| a.original_filename.clone())
            .or(non_blank(self.original_filename));
        let resource_type = first
            .and_then(|a| a.resource_type.clone())
            .or(non_blank(self.resource_type));
        let format = first.and_then(|a| a.format.clone()).or(non_blank(self.format));
        let bytes = first
            .and_then(|a| a.bytes)
            .or(self.bytes.as_ref().and_then(byte_count));

        let attachments: Vec<Bson> = attachments
            .iter()
            .map(|a| Bson::Document(a.to_document()))
            .collect();

        Ok(doc! {
            "title": self.title,
            "subject": non_blank(self.subject),
            "courseId": non_blank(self.course_id),
            "courseTitle": non_blank(self.course_title),
            "description": non_blank(self.description),
            "attachments": attachments,
            "fileUrl": file_url,
            "publicId": public_id,
            "originalFilename": original_filename,
            "resourceType": resource_type,
            "format": format,
            "bytes": bytes,
            "createdAt": now,
            "updatedAt": now,
        })
    }
}
