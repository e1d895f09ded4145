//! Ledger entry primitives.
//!
//! A `LedgerEntry` is an immutable, append-only record of a single balance
//! change: direction, amount, the balance before and after, and optional
//! typed metadata. Entries are never updated or deleted; they are the sole
//! audit trail for the mana ledger.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    enhancements::{AuraTag, EnhancementKind},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::Validation(format!(
                "unknown ledger direction: {other}"
            ))),
        }
    }
}

/// Typed metadata attached to a ledger entry.
///
/// Known shapes get their own variant; `Note` stays open-ended for audit
/// annotations with no fixed schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerMetadata {
    EnhancementApplied {
        wish_id: Uuid,
        kind: EnhancementKind,
        level: Option<i32>,
        aura_tag: Option<AuraTag>,
        previous_level: Option<i32>,
    },
    LegacyMigration {
        source: String,
        legacy_amount: i64,
        rate: i64,
    },
    Note {
        note: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub direction: Direction,
    pub amount: i64,
    pub reason: String,
    pub related_enhancement_id: Option<Uuid>,
    pub balance_before: i64,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<LedgerMetadata>,
}

impl LedgerEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        direction: Direction,
        amount: i64,
        reason: &str,
        related_enhancement_id: Option<Uuid>,
        balance_before: i64,
        balance_after: i64,
        metadata: Option<LedgerMetadata>,
    ) -> ResultEngine<Self> {
        if amount <= 0 {
            return Err(EngineError::Validation("amount must be > 0".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            direction,
            amount,
            reason: reason.to_string(),
            related_enhancement_id,
            balance_before,
            balance_after,
            created_at: Utc::now(),
            metadata,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub direction: String,
    pub amount: i64,
    pub reason: String,
    pub related_enhancement_id: Option<String>,
    pub balance_before: i64,
    pub balance_after: i64,
    pub created_at: DateTimeUtc,
    pub metadata: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::UserId",
        to = "super::accounts::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&LedgerEntry> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &LedgerEntry) -> Result<Self, Self::Error> {
        let metadata = value
            .metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| {
                EngineError::Validation(format!("invalid ledger metadata: {err}"))
            })?;
        Ok(Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            direction: ActiveValue::Set(value.direction.as_str().to_string()),
            amount: ActiveValue::Set(value.amount),
            reason: ActiveValue::Set(value.reason.clone()),
            related_enhancement_id: ActiveValue::Set(
                value.related_enhancement_id.map(|id| id.to_string()),
            ),
            balance_before: ActiveValue::Set(value.balance_before),
            balance_after: ActiveValue::Set(value.balance_after),
            created_at: ActiveValue::Set(value.created_at),
            metadata: ActiveValue::Set(metadata),
        })
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::Validation("invalid ledger entry id".to_string()))?;
        let direction = Direction::try_from(model.direction.as_str())?;
        let related_enhancement_id = model
            .related_enhancement_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| EngineError::Validation("invalid enhancement id".to_string()))?;
        let metadata = model
            .metadata
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| {
                EngineError::Validation(format!("invalid ledger metadata: {err}"))
            })?;
        Ok(Self {
            id,
            user_id: model.user_id,
            direction,
            amount: model.amount,
            reason: model.reason,
            related_enhancement_id,
            balance_before: model.balance_before,
            balance_after: model.balance_after,
            created_at: model.created_at,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [0, -10] {
            let err = LedgerEntry::new(
                "alice",
                Direction::Debit,
                amount,
                "enhancement:priority",
                None,
                40,
                40 - amount,
                None,
            )
            .unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let metadata = LedgerMetadata::EnhancementApplied {
            wish_id: Uuid::new_v4(),
            kind: EnhancementKind::Priority,
            level: Some(3),
            aura_tag: None,
            previous_level: Some(1),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["type"], "enhancement_applied");
        let parsed: LedgerMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn entry_round_trips_through_model() {
        let entry = LedgerEntry::new(
            "alice",
            Direction::Credit,
            100,
            "activity:streak",
            None,
            0,
            100,
            Some(LedgerMetadata::Note {
                note: "weekly streak".to_string(),
            }),
        )
        .unwrap();
        let active = ActiveModel::try_from(&entry).unwrap();
        let model = Model {
            id: match active.id {
                ActiveValue::Set(id) => id,
                _ => unreachable!(),
            },
            user_id: entry.user_id.clone(),
            direction: "credit".to_string(),
            amount: 100,
            reason: entry.reason.clone(),
            related_enhancement_id: None,
            balance_before: 0,
            balance_after: 100,
            created_at: entry.created_at,
            metadata: Some(serde_json::to_value(entry.metadata.clone().unwrap()).unwrap()),
        };
        let parsed = LedgerEntry::try_from(model).unwrap();
        assert_eq!(parsed, entry);
    }
}
