//! Request payloads for filing a report and creating an account.

use std::path::Path;

use civic_types::{Category, Location, Urgency};
use serde::Serialize;

use crate::ClientError;

/// A photo attached to a new report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Read an image from disk; the MIME type is `image/<extension>`.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ClientError::Config(format!("cannot read image {}: {e}", path.display())))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "jpeg".to_string());
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("post_image.{extension}"));
        Ok(Self {
            file_name,
            mime_type: format!("image/{extension}"),
            bytes,
        })
    }
}

/// A new problem report.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub location: Location,
    pub category: Category,
    pub urgency: Urgency,
    pub image: Option<ImageAttachment>,
}

/// Account registration form, in the backend's field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    /// Password confirmation; the backend checks it matches.
    pub password2: String,
}
