//! The transaction coordinator for enhancement purchases.
//!
//! `apply_enhancement` composes validate, debit, supersede, insert and the
//! denormalized wish update as one database transaction: every step succeeds
//! or none is observable. Cache invalidation and the audit event run after
//! commit and are best-effort; their failure cannot roll back the ledger.

use std::time::Duration;

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    ApplyEnhancementCmd, EngineError, ResultEngine,
    audit::AuditEvent,
    cache::keys,
    costs,
    enhancements::{self, AuraTag, Enhancement, EnhancementKind},
    ledger_entries::LedgerMetadata,
    validator::{self, EnhancementRequest, Verdict, WishContext},
    wishes::{self, DEFAULT_PRIORITY, Wish},
};

use super::{Engine, with_tx};

const ENHANCEMENT_LIST_TTL: Duration = Duration::from_secs(120);

/// Result of a committed enhancement purchase.
#[derive(Clone, Debug)]
pub struct AppliedEnhancement {
    pub enhancement: Enhancement,
    pub remaining_balance: i64,
}

impl Engine {
    /// Purchase and attach an enhancement to a wish.
    ///
    /// Runs the whole validate-debit-write sequence inside one transaction,
    /// bounded by the configured timeout. On timeout the transaction is
    /// dropped and the store rolls it back, leaving no partial state.
    pub async fn apply_enhancement(
        &self,
        cmd: ApplyEnhancementCmd,
    ) -> ResultEngine<AppliedEnhancement> {
        let attempt = async {
            with_tx!(self, |db_tx| {
                self.apply_enhancement_in_tx(&db_tx, &cmd).await
            })
        };
        let applied = tokio::time::timeout(self.tx_timeout, attempt)
            .await
            .map_err(|_| {
                EngineError::Unavailable("enhancement transaction timed out".to_string())
            })??;

        // Post-commit, best-effort signals.
        self.invalidate_user_caches(&cmd.user_id);
        self.cache.invalidate(&keys::wish_enhancements(cmd.wish_id));
        self.audit.record(AuditEvent::EnhancementApplied {
            wish_id: cmd.wish_id,
            user_id: cmd.user_id.clone(),
            kind: cmd.kind,
            cost: applied.enhancement.cost,
            remaining_balance: applied.remaining_balance,
        });
        Ok(applied)
    }

    async fn apply_enhancement_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &ApplyEnhancementCmd,
    ) -> ResultEngine<AppliedEnhancement> {
        // Re-validate against fresh state: the caller's pre-check was
        // advisory. Balance is left to the conditional debit below.
        let wish = self.require_wish_tx(db_tx, cmd.wish_id).await?;
        let existing = load_enhancements(db_tx, cmd.wish_id).await?;
        let context = wish_context(&wish, &existing);
        let request = EnhancementRequest {
            user_id: cmd.user_id.clone(),
            kind: cmd.kind,
            level: cmd.level,
            aura_tag: cmd.aura_tag,
        };
        let verdict = validator::validate(&request, &context, None);
        if !verdict.is_valid {
            return Err(EngineError::Validation(verdict.errors.join("; ")));
        }

        let cost = costs::cost_of(cmd.kind, cmd.level, cmd.aura_tag)?;
        let enhancement = Enhancement::new(
            cmd.wish_id,
            cmd.kind,
            cmd.level,
            cmd.aura_tag,
            cost,
            &cmd.user_id,
            enhancement_metadata(cmd, verdict.current_level),
        )?;

        // Conditional debit first: if the balance does not cover the cost the
        // whole unit aborts before any enhancement state is touched.
        let remaining_balance = self
            .debit_in_tx(
                db_tx,
                &cmd.user_id,
                cost,
                &format!("enhancement:{}", cmd.kind.as_str()),
                Some(enhancement.id),
                Some(LedgerMetadata::EnhancementApplied {
                    wish_id: cmd.wish_id,
                    kind: cmd.kind,
                    level: cmd.level,
                    aura_tag: cmd.aura_tag,
                    previous_level: verdict.current_level,
                }),
            )
            .await?;

        // Supersede the prior record of the same kind instead of accumulating.
        if let Some(prior) = existing.iter().find(|e| e.kind == cmd.kind) {
            enhancements::Entity::delete_by_id(prior.id.to_string())
                .exec(db_tx)
                .await?;
        }

        enhancements::ActiveModel::from(&enhancement)
            .insert(db_tx)
            .await?;

        // Keep the denormalized mirror on the wish row in step.
        let mut wish_update = wishes::ActiveModel {
            id: ActiveValue::Set(cmd.wish_id.to_string()),
            ..Default::default()
        };
        match cmd.kind {
            EnhancementKind::Priority => {
                wish_update.priority = ActiveValue::Set(enhancement.level.unwrap_or(DEFAULT_PRIORITY));
            }
            EnhancementKind::Aura => {
                wish_update.aura_tag =
                    ActiveValue::Set(enhancement.aura_tag.map(|tag| tag.as_str().to_string()));
            }
        }
        wish_update.update(db_tx).await?;

        Ok(AppliedEnhancement {
            enhancement,
            remaining_balance,
        })
    }

    /// Active enhancements for a wish, through the read cache.
    pub async fn list_enhancements(&self, wish_id: Uuid) -> ResultEngine<Vec<Enhancement>> {
        let database = self.database.clone();
        self.cache
            .get_or_compute(
                &keys::wish_enhancements(wish_id),
                ENHANCEMENT_LIST_TTL,
                || async move { load_enhancements(&database, wish_id).await },
            )
            .await
    }

    /// Read-only verdict for UI pre-checks; touches nothing.
    pub async fn validate_enhancement(&self, cmd: &ApplyEnhancementCmd) -> ResultEngine<Verdict> {
        let wish = self.wish(cmd.wish_id).await?;
        let existing = load_enhancements(&self.database, cmd.wish_id).await?;
        let balance = self.balance(&cmd.user_id).await?;
        let request = EnhancementRequest {
            user_id: cmd.user_id.clone(),
            kind: cmd.kind,
            level: cmd.level,
            aura_tag: cmd.aura_tag,
        };
        Ok(validator::validate(
            &request,
            &wish_context(&wish, &existing),
            Some(balance),
        ))
    }

    /// Administrative override: detach an enhancement without a refund.
    ///
    /// The only path that removes an aura. Mirrors the coordinator's
    /// atomicity: row deletion and the denormalized reset commit together.
    pub async fn admin_remove_enhancement(
        &self,
        wish_id: Uuid,
        kind: EnhancementKind,
        removed_by: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_wish_tx(&db_tx, wish_id).await?;
            let existing = load_enhancements(&db_tx, wish_id).await?;
            let target = existing.iter().find(|e| e.kind == kind).ok_or_else(|| {
                EngineError::KeyNotFound(format!("{} enhancement on wish {wish_id}", kind.as_str()))
            })?;

            enhancements::Entity::delete_by_id(target.id.to_string())
                .exec(&db_tx)
                .await?;

            let mut wish_update = wishes::ActiveModel {
                id: ActiveValue::Set(wish_id.to_string()),
                ..Default::default()
            };
            match kind {
                EnhancementKind::Priority => {
                    wish_update.priority = ActiveValue::Set(DEFAULT_PRIORITY);
                }
                EnhancementKind::Aura => {
                    wish_update.aura_tag = ActiveValue::Set(None);
                }
            }
            wish_update.update(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;

        self.cache.invalidate(&keys::wish_enhancements(wish_id));
        self.cache.invalidate_prefix(keys::LEADERBOARD_PREFIX);
        self.audit.record(AuditEvent::EnhancementRemoved {
            wish_id,
            kind,
            removed_by: removed_by.to_string(),
        });
        Ok(())
    }
}

fn wish_context(wish: &Wish, existing: &[Enhancement]) -> WishContext {
    let current_level = existing
        .iter()
        .find(|e| e.kind == EnhancementKind::Priority)
        .and_then(|e| e.level);
    let current_aura: Option<AuraTag> = existing
        .iter()
        .find(|e| e.kind == EnhancementKind::Aura)
        .and_then(|e| e.aura_tag);
    WishContext {
        owner_id: wish.owner_id.clone(),
        status: wish.status,
        current_level,
        current_aura,
    }
}

fn enhancement_metadata(cmd: &ApplyEnhancementCmd, previous_level: Option<i32>) -> serde_json::Value {
    json!({
        "context": cmd.context,
        "previous_level": previous_level,
    })
}

async fn load_enhancements<C: ConnectionTrait>(
    conn: &C,
    wish_id: Uuid,
) -> ResultEngine<Vec<Enhancement>> {
    let models: Vec<enhancements::Model> = enhancements::Entity::find()
        .filter(enhancements::Column::WishId.eq(wish_id.to_string()))
        .all(conn)
        .await?;
    models.into_iter().map(Enhancement::try_from).collect()
}
