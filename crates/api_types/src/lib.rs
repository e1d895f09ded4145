use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementKind {
    Priority,
    Aura,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraTag {
    Romantic,
    Gaming,
    Adventure,
    Cozy,
    Mystic,
}

pub mod enhancement {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApplyEnhancement {
        pub wish_id: Uuid,
        /// Acting user; identity is established by an external collaborator.
        pub user_id: String,
        pub kind: EnhancementKind,
        pub level: Option<i32>,
        pub aura_tag: Option<AuraTag>,
        /// Free-form audit context stored on the enhancement record.
        pub context: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnhancementView {
        pub id: Uuid,
        pub wish_id: Uuid,
        pub kind: EnhancementKind,
        pub level: Option<i32>,
        pub aura_tag: Option<AuraTag>,
        pub cost: i64,
        pub applied_by: String,
        pub applied_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApplyEnhancementResponse {
        pub enhancement: EnhancementView,
        pub remaining_balance: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VerdictView {
        pub is_valid: bool,
        pub can_apply: bool,
        pub cost: Option<i64>,
        pub errors: Vec<String>,
        pub current_level: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EnhancementListResponse {
        pub enhancements: Vec<EnhancementView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub user_id: String,
        pub balance: i64,
    }

    /// Activity reward credit, posted by collaborator systems.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GrantMana {
        pub user_id: String,
        pub amount: i64,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ManaStatsResponse {
        pub user_id: String,
        pub balance: i64,
        pub total_earned: i64,
        pub total_spent: i64,
    }
}

pub mod wish {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WishNew {
        pub owner_id: String,
        pub title: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WishCreated {
        pub id: Uuid,
    }
}

pub mod costs {
    use super::*;
    use std::collections::BTreeMap;

    /// Read-only cost schedule for client display.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostScheduleResponse {
        pub schedule: BTreeMap<String, i64>,
        pub balance_ceiling: i64,
    }
}
