//! One-time legacy "star points" to mana migration.
//!
//! The single permitted currency conversion: one-directional, once per
//! account. The guard is a ledger scan on the migration reason inside the
//! same transaction as the credit, so a second attempt can never slip in
//! between check and write.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine,
    audit::AuditEvent,
    ledger_entries::{self, Direction, LedgerMetadata},
};

use super::{Engine, with_tx};

pub(super) const LEGACY_MIGRATION_REASON: &str = "legacy_migration";

/// Conversion rate: ten legacy star points buy one mana, remainder dropped.
pub const LEGACY_POINTS_PER_MANA: i64 = 10;

impl Engine {
    /// Convert a legacy star-point balance into mana, once per account.
    ///
    /// Returns the new balance. Fails with a validation error when the
    /// account was already migrated or the points convert to zero mana.
    pub async fn migrate_legacy_points(
        &self,
        user_id: &str,
        legacy_points: i64,
        source: &str,
    ) -> ResultEngine<i64> {
        if legacy_points <= 0 {
            return Err(EngineError::Validation(
                "legacy_points must be > 0".to_string(),
            ));
        }
        let mana = legacy_points / LEGACY_POINTS_PER_MANA;
        if mana == 0 {
            return Err(EngineError::Validation(format!(
                "{legacy_points} legacy points convert to zero mana"
            )));
        }

        let new_balance = with_tx!(self, |db_tx| {
            let prior = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::UserId.eq(user_id))
                .filter(ledger_entries::Column::Reason.eq(LEGACY_MIGRATION_REASON))
                .one(&db_tx)
                .await?;
            if prior.is_some() {
                return Err(EngineError::Validation(
                    "legacy balance already migrated".to_string(),
                ));
            }

            self.credit_in_tx(
                &db_tx,
                user_id,
                mana,
                LEGACY_MIGRATION_REASON,
                None,
                Some(LedgerMetadata::LegacyMigration {
                    source: source.to_string(),
                    legacy_amount: legacy_points,
                    rate: LEGACY_POINTS_PER_MANA,
                }),
            )
            .await
        })?;

        self.invalidate_user_caches(user_id);
        self.audit.record(AuditEvent::BalanceChanged {
            user_id: user_id.to_string(),
            direction: Direction::Credit,
            amount: mana,
            balance_after: new_balance,
            reason: LEGACY_MIGRATION_REASON.to_string(),
        });
        Ok(new_balance)
    }
}
