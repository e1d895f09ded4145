//! Enhancement primitives.
//!
//! An `Enhancement` is a purchased, non-fungible augmentation attached to a
//! wish: either a priority tier (levels 1-5) or a one-time aura tag. At most
//! one active row per `(wish_id, kind)` exists at any time; the unique index
//! in the schema backs the invariant.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementKind {
    Priority,
    Aura,
}

impl EnhancementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Aura => "aura",
        }
    }
}

impl TryFrom<&str> for EnhancementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "priority" => Ok(Self::Priority),
            "aura" => Ok(Self::Aura),
            other => Err(EngineError::Validation(format!(
                "unknown enhancement kind: {other}"
            ))),
        }
    }
}

/// Cosmetic tags a wish can carry, chosen from a fixed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraTag {
    Romantic,
    Gaming,
    Adventure,
    Cozy,
    Mystic,
}

impl AuraTag {
    pub const ALL: [AuraTag; 5] = [
        Self::Romantic,
        Self::Gaming,
        Self::Adventure,
        Self::Cozy,
        Self::Mystic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Romantic => "romantic",
            Self::Gaming => "gaming",
            Self::Adventure => "adventure",
            Self::Cozy => "cozy",
            Self::Mystic => "mystic",
        }
    }
}

impl TryFrom<&str> for AuraTag {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "romantic" => Ok(Self::Romantic),
            "gaming" => Ok(Self::Gaming),
            "adventure" => Ok(Self::Adventure),
            "cozy" => Ok(Self::Cozy),
            "mystic" => Ok(Self::Mystic),
            other => Err(EngineError::Validation(format!(
                "unknown aura tag: {other}"
            ))),
        }
    }
}

/// One applied augmentation on a wish.
///
/// `cost` is the mana paid at application time and never changes afterwards,
/// even if the catalog schedule does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub id: Uuid,
    pub wish_id: Uuid,
    pub kind: EnhancementKind,
    pub level: Option<i32>,
    pub aura_tag: Option<AuraTag>,
    pub cost: i64,
    pub applied_by: String,
    pub applied_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

impl Enhancement {
    pub fn new(
        wish_id: Uuid,
        kind: EnhancementKind,
        level: Option<i32>,
        aura_tag: Option<AuraTag>,
        cost: i64,
        applied_by: &str,
        metadata: serde_json::Value,
    ) -> ResultEngine<Self> {
        if cost < 0 {
            return Err(EngineError::Validation("cost must be >= 0".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            wish_id,
            kind,
            level,
            aura_tag,
            cost,
            applied_by: applied_by.to_string(),
            applied_at: Utc::now(),
            metadata,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enhancements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub wish_id: String,
    pub kind: String,
    pub level: Option<i32>,
    pub aura_tag: Option<String>,
    pub cost: i64,
    pub applied_by: String,
    pub applied_at: DateTimeUtc,
    pub metadata: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wishes::Entity",
        from = "Column::WishId",
        to = "super::wishes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wishes,
}

impl Related<super::wishes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Enhancement> for ActiveModel {
    fn from(value: &Enhancement) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            wish_id: ActiveValue::Set(value.wish_id.to_string()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            level: ActiveValue::Set(value.level),
            aura_tag: ActiveValue::Set(value.aura_tag.map(|tag| tag.as_str().to_string())),
            cost: ActiveValue::Set(value.cost),
            applied_by: ActiveValue::Set(value.applied_by.clone()),
            applied_at: ActiveValue::Set(value.applied_at),
            metadata: ActiveValue::Set(Some(value.metadata.clone())),
        }
    }
}

impl TryFrom<Model> for Enhancement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::Validation("invalid enhancement id".to_string()))?;
        let wish_id = Uuid::parse_str(&model.wish_id)
            .map_err(|_| EngineError::Validation("invalid wish id".to_string()))?;
        let kind = EnhancementKind::try_from(model.kind.as_str())?;
        let aura_tag = model
            .aura_tag
            .as_deref()
            .map(AuraTag::try_from)
            .transpose()?;
        Ok(Self {
            id,
            wish_id,
            kind,
            level: model.level,
            aura_tag,
            cost: model.cost,
            applied_by: model.applied_by,
            applied_at: model.applied_at,
            metadata: model.metadata.unwrap_or(serde_json::Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        for kind in [EnhancementKind::Priority, EnhancementKind::Aura] {
            assert_eq!(EnhancementKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = EnhancementKind::try_from("sparkle").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn aura_tag_round_trips() {
        for tag in AuraTag::ALL {
            assert_eq!(AuraTag::try_from(tag.as_str()).unwrap(), tag);
        }
    }

    #[test]
    fn model_round_trips() {
        let enhancement = Enhancement::new(
            Uuid::new_v4(),
            EnhancementKind::Aura,
            None,
            Some(AuraTag::Romantic),
            50,
            "alice",
            serde_json::json!({"context": "birthday"}),
        )
        .unwrap();
        let model_id = enhancement.id.to_string();
        let active = ActiveModel::from(&enhancement);
        assert_eq!(active.id, ActiveValue::Set(model_id));
        assert_eq!(active.kind, ActiveValue::Set("aura".to_string()));
        assert_eq!(active.aura_tag, ActiveValue::Set(Some("romantic".to_string())));
    }
}
