//! User service.

use std::collections::HashMap;
use std::str::FromStr;

use validator::Validate;

use super::types::{AssignRoleRequest, AuthorSummary, UpdateUserRequest, UserResponse};
use crate::db::User;
use crate::error::{ServiceError, ServiceResult};
use crate::permissions::{Actor, PermissionError, Role};
use crate::repository::Repositories;

/// Resolve author summaries for a set of user ids in one lookup.
pub async fn author_map(
    repos: &Repositories,
    ids: impl IntoIterator<Item = i64>,
) -> ServiceResult<HashMap<i64, AuthorSummary>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = repos.users.find_by_ids(&ids).await?;
    Ok(users
        .iter()
        .map(|user| (user.id, AuthorSummary::from(user)))
        .collect())
}

/// Fail with `Unauthorized` when the token outlived the actor's account.
pub async fn require_account(repos: &Repositories, actor: &Actor) -> ServiceResult<()> {
    if repos.users.find_by_id(actor.id).await?.is_none() {
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

async fn with_roles(repos: &Repositories, users: Vec<User>) -> ServiceResult<Vec<UserResponse>> {
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    let mut roles: HashMap<i64, Vec<Role>> = HashMap::new();
    for (user_id, role) in repos.users.roles_for_users(&ids).await? {
        roles.entry(user_id).or_default().push(role);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let user_roles = roles.remove(&user.id).unwrap_or_default();
            UserResponse::new(user, user_roles)
        })
        .collect())
}

async fn load(repos: &Repositories, id: i64) -> ServiceResult<User> {
    repos
        .users
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}

pub async fn list_users(repos: &Repositories) -> ServiceResult<Vec<UserResponse>> {
    let users = repos.users.list().await?;
    with_roles(repos, users).await
}

pub async fn get_user(repos: &Repositories, id: i64) -> ServiceResult<UserResponse> {
    let user = load(repos, id).await?;
    let roles = repos.users.roles_for(id).await?;
    Ok(UserResponse::new(user, roles))
}

/// Update username and email. Allowed for the user themself or an Admin.
pub async fn update_user(
    repos: &Repositories,
    actor: &Actor,
    id: i64,
    input: UpdateUserRequest,
) -> ServiceResult<UserResponse> {
    load(repos, id).await?;

    if actor.id != id && actor.role != Role::Admin {
        return Err(PermissionError::Forbidden.into());
    }

    input.validate()?;

    let user = repos
        .users
        .update_profile(id, &input.username, &input.email)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;
    let roles = repos.users.roles_for(id).await?;

    Ok(UserResponse::new(user, roles))
}

/// Delete a user along with their posts and comments.
pub async fn delete_user(repos: &Repositories, id: i64) -> ServiceResult<()> {
    if !repos.users.delete(id).await? {
        return Err(ServiceError::NotFound("User"));
    }
    Ok(())
}

/// Replace the user's roles with the named role.
pub async fn assign_role(
    repos: &Repositories,
    id: i64,
    input: AssignRoleRequest,
) -> ServiceResult<UserResponse> {
    let user = load(repos, id).await?;

    let role = Role::from_str(&input.role)
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    repos.users.set_role(id, role).await?;

    Ok(UserResponse::new(user, vec![role]))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(repos: &Repositories) -> (i64, i64) {
        let (admin, _) = repos
            .users
            .create_account("admin", "admin@example.com", "hash")
            .await
            .unwrap();
        let (user, _) = repos
            .users
            .create_account("user", "user@example.com", "hash")
            .await
            .unwrap();
        (admin.id, user.id)
    }

    fn update(username: &str, email: &str) -> UpdateUserRequest {
        UpdateUserRequest {
            username: username.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn test_user_can_update_self() {
        let repos = Repositories::in_memory();
        let (_, user_id) = seed(&repos).await;
        let actor = Actor::new(user_id, Role::User);

        let updated = update_user(&repos, &actor, user_id, update("renamed", "new@example.com"))
            .await
            .unwrap();

        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.roles, vec![Role::User]);
    }

    #[tokio::test]
    async fn test_user_cannot_update_others() {
        let repos = Repositories::in_memory();
        let (admin_id, user_id) = seed(&repos).await;

        let result = update_user(
            &repos,
            &Actor::new(user_id, Role::Moderator),
            admin_id,
            update("x", "bad"),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let result = update_user(
            &repos,
            &Actor::new(admin_id, Role::Admin),
            user_id,
            update("by-admin", "user@example.com"),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let repos = Repositories::in_memory();
        let (_, user_id) = seed(&repos).await;

        let result = update_user(
            &repos,
            &Actor::new(user_id, Role::User),
            user_id,
            update("user", "admin@example.com"),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_assign_role() {
        let repos = Repositories::in_memory();
        let (_, user_id) = seed(&repos).await;

        let updated = assign_role(
            &repos,
            user_id,
            AssignRoleRequest {
                role: "Moderator".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.roles, vec![Role::Moderator]);
        assert_eq!(get_user(&repos, user_id).await.unwrap().roles, vec![Role::Moderator]);

        let result = assign_role(
            &repos,
            user_id,
            AssignRoleRequest {
                role: "moderator".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = assign_role(&repos, 999, AssignRoleRequest::default()).await;
        assert!(matches!(result, Err(ServiceError::NotFound("User"))));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let repos = Repositories::in_memory();
        let (admin_id, user_id) = seed(&repos).await;

        let users = list_users(&repos).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, admin_id);
        assert_eq!(users[0].roles, vec![Role::Admin]);

        delete_user(&repos, user_id).await.unwrap();
        assert!(matches!(
            delete_user(&repos, user_id).await,
            Err(ServiceError::NotFound("User"))
        ));
        assert!(matches!(
            get_user(&repos, user_id).await,
            Err(ServiceError::NotFound("User"))
        ));
    }
}
