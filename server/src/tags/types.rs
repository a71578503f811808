//! Tag request types.

use serde::Deserialize;
use validator::Validate;

/// Body for both creating and renaming a tag.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TagRequest {
    #[validate(
        custom(function = "crate::util::not_blank", message = "Tag name is required"),
        length(max = 50, message = "Tag name must be at most 50 characters")
    )]
    pub name: String,
}
