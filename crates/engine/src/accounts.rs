//! The mana account entity.
//!
//! One row per user. Accounts are created and destroyed by the external user
//! lifecycle; engine operations only mutate `balance`, and only through the
//! atomic primitives in `ops::balances`. The schema carries a
//! `CHECK (balance >= 0)` so a negative balance can never be committed.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub user_id: String,
    pub balance: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            balance: model.balance,
        }
    }
}
