use mongodb::bson::{doc, Document};
use serde::Deserialize;

use super::{non_blank, present};
use crate::error::ApiError;

/// Fields a user update may not touch: the store id and the identity key
pub const USER_PROTECTED_FIELDS: &[&str] = &["_id", "uid"];

/// POST /users body; profile synced from the identity provider
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub uid: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "photoURL", alias = "photoUrl")]
    pub photo_url: Option<String>,
}

impl UpsertUser {
    /// Split into the identity filter and the `$set` document.
    ///
    /// Only provided profile fields are written, so an upsert never blanks
    /// out a field the caller left off.
    pub fn into_upsert(self) -> Result<(Document, Document), ApiError> {
        if !present(&self.uid) {
            return Err(ApiError::missing_fields(&["uid"]));
        }
        let uid = self.uid.unwrap_or_default();

        let mut set = doc! { "uid": uid.as_str() };
        if let Some(display_name) = non_blank(self.display_name) {
            set.insert("displayName", display_name);
        }
        if let Some(email) = non_blank(self.email) {
            set.insert("email", email);
        }
        if let Some(photo_url) = non_blank(self.photo_url) {
            set.insert("photoURL", photo_url);
        }

        Ok((doc! { "uid": uid }, set))
    }
}
