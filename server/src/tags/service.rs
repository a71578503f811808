//! Tag service.
//!
//! Tag names are unique ignoring case.

use validator::Validate;

use super::types::TagRequest;
use crate::db::Tag;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{RepositoryError, Repositories};

/// Create a tag, or return the existing one whose name matches ignoring case.
pub async fn create_tag(repos: &Repositories, input: TagRequest) -> ServiceResult<Tag> {
    input.validate()?;

    if let Some(existing) = repos.tags.find_by_name(&input.name).await? {
        return Ok(existing);
    }

    match repos.tags.create(&input.name).await {
        Ok(tag) => Ok(tag),
        // Lost a race with a concurrent create of the same name.
        Err(RepositoryError::Conflict(_)) => repos
            .tags
            .find_by_name(&input.name)
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("tag {} vanished", input.name))),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_tags(repos: &Repositories) -> ServiceResult<Vec<Tag>> {
    Ok(repos.tags.list().await?)
}

pub async fn get_tag(repos: &Repositories, id: i64) -> ServiceResult<Tag> {
    repos
        .tags
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Tag"))
}

/// Rename a tag. Taking another tag's name is a validation failure.
pub async fn update_tag(repos: &Repositories, id: i64, input: TagRequest) -> ServiceResult<Tag> {
    get_tag(repos, id).await?;
    input.validate()?;

    match repos.tags.rename(id, &input.name).await {
        Ok(Some(tag)) => Ok(tag),
        Ok(None) => Err(ServiceError::NotFound("Tag")),
        Err(RepositoryError::Conflict(_)) => Err(ServiceError::Validation(format!(
            "A tag named '{}' already exists",
            input.name
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_tag(repos: &Repositories, id: i64) -> ServiceResult<()> {
    if !repos.tags.delete(id).await? {
        return Err(ServiceError::NotFound("Tag"));
    }
    Ok(())
}
