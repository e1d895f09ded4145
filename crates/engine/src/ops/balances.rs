//! The ledger store: atomic credit/debit primitives and balance reads.
//!
//! Both mutations are a single conditional `UPDATE ... RETURNING` against the
//! account row, never a read-then-write pair, so two concurrent debits can
//! never both pass a stale balance check. The ledger entry is appended in the
//! same transaction as the balance change.

use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CreditCmd, DebitCmd, EngineError, ResultEngine, accounts,
    audit::AuditEvent,
    cache::keys,
    costs::BALANCE_CEILING,
    ledger_entries::{self, Direction, LedgerEntry, LedgerMetadata},
};

use super::{Engine, with_tx};

const BALANCE_TTL: Duration = Duration::from_secs(30);
const STATS_TTL: Duration = Duration::from_secs(60);

/// Aggregate mana figures for one account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManaStats {
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
}

impl Engine {
    /// Current balance, straight from the store.
    pub async fn balance(&self, user_id: &str) -> ResultEngine<i64> {
        read_balance(&self.database, user_id).await
    }

    /// Current balance through the read cache.
    ///
    /// Committed mutations invalidate the cache key, so a read after a commit
    /// observes the new value; between invalidation and the next read the
    /// entry may be absent, never stale.
    pub async fn balance_cached(&self, user_id: &str) -> ResultEngine<i64> {
        let database = self.database.clone();
        let user_id_owned = user_id.to_string();
        self.cache
            .get_or_compute(&keys::balance(user_id), BALANCE_TTL, || async move {
                read_balance(&database, &user_id_owned).await
            })
            .await
    }

    /// Atomically add mana to an account, bounded by the balance ceiling.
    pub async fn credit(&self, cmd: CreditCmd) -> ResultEngine<i64> {
        require_positive(cmd.amount)?;
        let new_balance = with_tx!(self, |db_tx| {
            self.credit_in_tx(
                &db_tx,
                &cmd.user_id,
                cmd.amount,
                &cmd.reason,
                None,
                cmd.metadata.clone(),
            )
            .await
        })?;

        self.invalidate_user_caches(&cmd.user_id);
        self.audit.record(AuditEvent::BalanceChanged {
            user_id: cmd.user_id,
            direction: Direction::Credit,
            amount: cmd.amount,
            balance_after: new_balance,
            reason: cmd.reason,
        });
        Ok(new_balance)
    }

    /// Atomically remove mana from an account, conditioned on
    /// `balance >= amount` at commit time.
    pub async fn debit(&self, cmd: DebitCmd) -> ResultEngine<i64> {
        require_positive(cmd.amount)?;
        let new_balance = with_tx!(self, |db_tx| {
            self.debit_in_tx(
                &db_tx,
                &cmd.user_id,
                cmd.amount,
                &cmd.reason,
                None,
                cmd.metadata.clone(),
            )
            .await
        })?;

        self.invalidate_user_caches(&cmd.user_id);
        self.audit.record(AuditEvent::BalanceChanged {
            user_id: cmd.user_id,
            direction: Direction::Debit,
            amount: cmd.amount,
            balance_after: new_balance,
            reason: cmd.reason,
        });
        Ok(new_balance)
    }

    /// Balance plus lifetime earned/spent totals, through the read cache.
    pub async fn mana_stats(&self, user_id: &str) -> ResultEngine<ManaStats> {
        let database = self.database.clone();
        let user_id_owned = user_id.to_string();
        self.cache
            .get_or_compute(&keys::stats(user_id), STATS_TTL, || async move {
                let balance = read_balance(&database, &user_id_owned).await?;
                let total_earned =
                    sum_for_direction(&database, &user_id_owned, Direction::Credit).await?;
                let total_spent =
                    sum_for_direction(&database, &user_id_owned, Direction::Debit).await?;
                Ok(ManaStats {
                    balance,
                    total_earned,
                    total_spent,
                })
            })
            .await
    }

    /// Most recent ledger entries for an account, newest first.
    pub async fn ledger_history(&self, user_id: &str, limit: u64) -> ResultEngine<Vec<LedgerEntry>> {
        let models: Vec<ledger_entries::Model> = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UserId.eq(user_id))
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;

        models.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// Conditional increment plus ledger append, inside the caller's transaction.
    pub(super) async fn credit_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        amount: i64,
        reason: &str,
        related_enhancement_id: Option<Uuid>,
        metadata: Option<LedgerMetadata>,
    ) -> ResultEngine<i64> {
        let backend = db_tx.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "UPDATE accounts SET balance = balance + ? \
             WHERE user_id = ? AND balance + ? <= ? \
             RETURNING balance",
            vec![amount.into(), user_id.into(), amount.into(), BALANCE_CEILING.into()],
        );
        let row = db_tx.query_one(stmt).await?;

        let new_balance: i64 = match row {
            Some(row) => row
                .try_get("", "balance")
                .map_err(EngineError::Database)?,
            None => {
                // The update matched nothing: either the account is missing
                // or the ceiling would be exceeded. No mutation happened.
                let balance = read_balance(db_tx, user_id).await?;
                return Err(EngineError::BalanceCeilingExceeded(format!(
                    "crediting {amount} to balance {balance} would exceed the ceiling {BALANCE_CEILING}"
                )));
            }
        };

        let entry = LedgerEntry::new(
            user_id,
            Direction::Credit,
            amount,
            reason,
            related_enhancement_id,
            new_balance - amount,
            new_balance,
            metadata,
        )?;
        append_entry(db_tx, &entry).await?;
        Ok(new_balance)
    }

    /// Conditional decrement plus ledger append, inside the caller's transaction.
    pub(super) async fn debit_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        amount: i64,
        reason: &str,
        related_enhancement_id: Option<Uuid>,
        metadata: Option<LedgerMetadata>,
    ) -> ResultEngine<i64> {
        let backend = db_tx.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "UPDATE accounts SET balance = balance - ? \
             WHERE user_id = ? AND balance >= ? \
             RETURNING balance",
            vec![amount.into(), user_id.into(), amount.into()],
        );
        let row = db_tx.query_one(stmt).await?;

        let new_balance: i64 = match row {
            Some(row) => row
                .try_get("", "balance")
                .map_err(EngineError::Database)?,
            None => {
                let available = read_balance(db_tx, user_id).await?;
                return Err(EngineError::InsufficientBalance {
                    required: amount,
                    available,
                });
            }
        };

        let entry = LedgerEntry::new(
            user_id,
            Direction::Debit,
            amount,
            reason,
            related_enhancement_id,
            new_balance + amount,
            new_balance,
            metadata,
        )?;
        append_entry(db_tx, &entry).await?;
        Ok(new_balance)
    }

    /// Drops every cache entry a committed balance change could have staled.
    pub(super) fn invalidate_user_caches(&self, user_id: &str) {
        self.cache.invalidate(&keys::balance(user_id));
        self.cache.invalidate(&keys::stats(user_id));
        self.cache.invalidate_prefix(keys::LEADERBOARD_PREFIX);
    }
}

fn require_positive(amount: i64) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::Validation("amount must be > 0".to_string()));
    }
    Ok(())
}

async fn read_balance<C: ConnectionTrait>(conn: &C, user_id: &str) -> ResultEngine<i64> {
    let account = accounts::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(user_id.to_string()))?;
    Ok(account.balance)
}

async fn append_entry<C: ConnectionTrait>(conn: &C, entry: &LedgerEntry) -> ResultEngine<()> {
    ledger_entries::ActiveModel::try_from(entry)?
        .insert(conn)
        .await?;
    Ok(())
}

async fn sum_for_direction<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    direction: Direction,
) -> ResultEngine<i64> {
    let backend = conn.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "SELECT COALESCE(SUM(amount), 0) AS sum \
         FROM ledger_entries \
         WHERE user_id = ? AND direction = ?",
        vec![user_id.into(), direction.as_str().into()],
    );
    match conn.query_one(stmt).await? {
        Some(row) => row.try_get("", "sum").map_err(EngineError::Database),
        None => Ok(0),
    }
}
