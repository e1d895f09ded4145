//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{
    enhancements::{AuraTag, EnhancementKind},
    ledger_entries::LedgerMetadata,
};

/// Apply an enhancement to a wish.
#[derive(Clone, Debug)]
pub struct ApplyEnhancementCmd {
    pub wish_id: Uuid,
    pub user_id: String,
    pub kind: EnhancementKind,
    pub level: Option<i32>,
    pub aura_tag: Option<AuraTag>,
    /// Free-form audit context recorded on the enhancement row.
    pub context: Option<String>,
}

impl ApplyEnhancementCmd {
    #[must_use]
    pub fn new(wish_id: Uuid, user_id: impl Into<String>, kind: EnhancementKind) -> Self {
        Self {
            wish_id,
            user_id: user_id.into(),
            kind,
            level: None,
            aura_tag: None,
            context: None,
        }
    }

    #[must_use]
    pub fn priority(wish_id: Uuid, user_id: impl Into<String>, level: i32) -> Self {
        Self::new(wish_id, user_id, EnhancementKind::Priority).level(level)
    }

    #[must_use]
    pub fn aura(wish_id: Uuid, user_id: impl Into<String>, tag: AuraTag) -> Self {
        Self::new(wish_id, user_id, EnhancementKind::Aura).aura_tag(tag)
    }

    #[must_use]
    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn aura_tag(mut self, tag: AuraTag) -> Self {
        self.aura_tag = Some(tag);
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Credit mana to an account.
#[derive(Clone, Debug)]
pub struct CreditCmd {
    pub user_id: String,
    pub amount: i64,
    pub reason: String,
    pub metadata: Option<LedgerMetadata>,
}

impl CreditCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: i64, reason: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            reason: reason.into(),
            metadata: None,
        }
    }

    #[must_use]
    pub fn metadata(mut self, metadata: LedgerMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Debit mana from an account.
#[derive(Clone, Debug)]
pub struct DebitCmd {
    pub user_id: String,
    pub amount: i64,
    pub reason: String,
    pub metadata: Option<LedgerMetadata>,
}

impl DebitCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: i64, reason: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            reason: reason.into(),
            metadata: None,
        }
    }

    #[must_use]
    pub fn metadata(mut self, metadata: LedgerMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
