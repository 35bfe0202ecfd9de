//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::repositories::user::verify_secret;
use crate::db::{Store, User, UserChanges};
use crate::domain::{Actor, Forbidden};
use crate::services::user_service::{PasswordChange, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn require_user(&self, id: &str) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn get_user(&self, id: &str) -> Result<User, UserError> {
        self.require_user(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.user_repo().list().await?)
    }

    async fn update_user(
        &self,
        actor: &Actor,
        id: &str,
        changes: UserChanges,
    ) -> Result<User, UserError> {
        let target = self.require_user(id).await?;
        actor.ensure_can_modify(&target.id, "edit this account")?;

        if changes.role.is_some() {
            actor.ensure_admin("change account roles")?;
        }

        if let Some(email) = &changes.email
            && let Some(owner) = self.store.user_repo().find_id_by_email(email).await?
            && owner != target.id
        {
            return Err(UserError::Conflict("Email is already in use".to_string()));
        }

        let user = self
            .store
            .user_repo()
            .update(&target.id, changes)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        info!(user_id = %user.id, by = %actor.user_id, "User updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        actor: &Actor,
        id: &str,
        change: PasswordChange,
    ) -> Result<(), UserError> {
        if !actor.owns(id) {
            return Err(Forbidden {
                action: "change this password",
            }
            .into());
        }

        if change.new_password != change.confirm_password {
            return Err(UserError::Validation(
                "New password and confirmation do not match".to_string(),
            ));
        }

        let current_hash = self
            .store
            .user_repo()
            .get_password_hash(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if !verify_secret(change.current_password, current_hash).await? {
            return Err(UserError::WrongPassword);
        }

        self.store
            .user_repo()
            .update_password(id, &change.new_password, &self.security)
            .await?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn delete_user(&self, actor: &Actor, id: &str) -> Result<(), UserError> {
        let target = self.require_user(id).await?;
        actor.ensure_can_modify(&target.id, "delete this account")?;

        if !self.store.user_repo().delete_cascade(&target.id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        info!(user_id = %target.id, by = %actor.user_id, "User deleted");
        Ok(())
    }
}
