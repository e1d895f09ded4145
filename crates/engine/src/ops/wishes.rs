//! Wish lifecycle helpers and collaborator lookups.
//!
//! Wishes belong to an external subsystem; the engine needs just enough of
//! their lifecycle to enforce ownership and status gates, and to keep the
//! denormalized enhancement mirrors honest.

use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    wishes::{self, Wish, WishStatus},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a wish owned by `owner_id`.
    pub async fn new_wish(&self, owner_id: &str, title: &str) -> ResultEngine<Uuid> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation(
                "wish title must not be empty".to_string(),
            ));
        }

        let wish = Wish::new(owner_id, title.to_string());
        let wish_id = wish.id;
        wishes::ActiveModel::from(&wish).insert(&self.database).await?;
        Ok(wish_id)
    }

    pub async fn wish(&self, wish_id: Uuid) -> ResultEngine<Wish> {
        let model = wishes::Entity::find_by_id(wish_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(wish_id.to_string()))?;
        Wish::try_from(model)
    }

    /// Collaborator lookup: status of a wish.
    pub async fn wish_status(&self, wish_id: Uuid) -> ResultEngine<WishStatus> {
        Ok(self.wish(wish_id).await?.status)
    }

    /// Collaborator lookup: whether `user_id` owns the wish.
    pub async fn is_owner(&self, user_id: &str, wish_id: Uuid) -> ResultEngine<bool> {
        Ok(self.wish(wish_id).await?.owner_id == user_id)
    }

    /// Mark a wish completed. Completed wishes reject further enhancements.
    pub async fn complete_wish(&self, wish_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let wish = self.require_wish_tx(&db_tx, wish_id).await?;
            if wish.owner_id != user_id {
                return Err(EngineError::KeyNotFound(wish_id.to_string()));
            }
            let update = wishes::ActiveModel {
                id: ActiveValue::Set(wish_id.to_string()),
                status: ActiveValue::Set(WishStatus::Completed.as_str().to_string()),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_wish_tx(
        &self,
        db_tx: &DatabaseTransaction,
        wish_id: Uuid,
    ) -> ResultEngine<Wish> {
        let model = wishes::Entity::find_by_id(wish_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(wish_id.to_string()))?;
        Wish::try_from(model)
    }
}
