//! The `Wish` entity.
//!
//! Wishes are owned by the user lifecycle; this subsystem only reads their
//! ownership and status, and maintains the denormalized `priority` and
//! `aura_tag` mirror columns. The mirrors must always equal the active
//! enhancement records; the coordinator updates both in one transaction.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, enhancements::AuraTag};

/// Baseline display priority of a wish that carries no priority enhancement.
pub const DEFAULT_PRIORITY: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishStatus {
    Active,
    Completed,
    Expired,
}

impl WishStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl TryFrom<&str> for WishStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::Validation(format!(
                "unknown wish status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Wish {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub status: WishStatus,
    /// Denormalized mirror of the active priority enhancement's level.
    pub priority: i32,
    /// Denormalized mirror of the active aura enhancement's tag.
    pub aura_tag: Option<AuraTag>,
    pub created_at: DateTime<Utc>,
}

impl Wish {
    pub fn new(owner_id: &str, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title,
            status: WishStatus::Active,
            priority: DEFAULT_PRIORITY,
            aura_tag: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wishes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub status: String,
    pub priority: i32,
    pub aura_tag: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enhancements::Entity")]
    Enhancements,
}

impl Related<super::enhancements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enhancements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wish> for ActiveModel {
    fn from(value: &Wish) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            title: ActiveValue::Set(value.title.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            priority: ActiveValue::Set(value.priority),
            aura_tag: ActiveValue::Set(value.aura_tag.map(|tag| tag.as_str().to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Wish {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::Validation("invalid wish id".to_string()))?;
        let status = WishStatus::try_from(model.status.as_str())?;
        let aura_tag = model
            .aura_tag
            .as_deref()
            .map(AuraTag::try_from)
            .transpose()?;
        Ok(Self {
            id,
            owner_id: model.owner_id,
            title: model.title,
            status,
            priority: model.priority,
            aura_tag,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wish_is_active_with_baseline_priority() {
        let wish = Wish::new("alice", "New bike".to_string());
        assert_eq!(wish.status, WishStatus::Active);
        assert_eq!(wish.priority, DEFAULT_PRIORITY);
        assert!(wish.aura_tag.is_none());
    }

    #[test]
    fn status_round_trips() {
        for status in [WishStatus::Active, WishStatus::Completed, WishStatus::Expired] {
            assert_eq!(WishStatus::try_from(status.as_str()).unwrap(), status);
        }
    }
}
