//! Audit sink collaborator boundary.
//!
//! The ledger entry table is the durable record; the audit sink is a
//! structured observability hook on top of it and is never relied upon for
//! correctness. The default implementation emits `tracing` events.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    enhancements::EnhancementKind,
    ledger_entries::Direction,
};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    EnhancementApplied {
        wish_id: Uuid,
        user_id: String,
        kind: EnhancementKind,
        cost: i64,
        remaining_balance: i64,
    },
    EnhancementRemoved {
        wish_id: Uuid,
        kind: EnhancementKind,
        removed_by: String,
    },
    BalanceChanged {
        user_id: String,
        direction: Direction,
        amount: i64,
        balance_after: i64,
        reason: String,
    },
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: one structured log line per event.
#[derive(Debug, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(target: "audit", "{payload}"),
            Err(err) => tracing::warn!(target: "audit", "unserializable audit event: {err}"),
        }
    }
}
