pub use accounts::Account;
pub use audit::{AuditEvent, AuditSink, TracingAudit};
pub use cache::{Cache, keys as cache_keys};
pub use commands::{ApplyEnhancementCmd, CreditCmd, DebitCmd};
pub use costs::{
    AURA_COST, BALANCE_CEILING, MAX_PRIORITY_LEVEL, MIN_PRIORITY_LEVEL, PRIORITY_COSTS, cost_of,
    cost_schedule,
};
pub use enhancements::{AuraTag, Enhancement, EnhancementKind};
pub use error::EngineError;
pub use ledger_entries::{Direction, LedgerEntry, LedgerMetadata};
pub use ops::{AppliedEnhancement, Engine, EngineBuilder, LEGACY_POINTS_PER_MANA, ManaStats};
pub use validator::{EnhancementRequest, Verdict, WishContext, validate};
pub use wishes::{DEFAULT_PRIORITY, Wish, WishStatus};

mod accounts;
mod audit;
mod cache;
mod commands;
mod costs;
mod enhancements;
mod error;
mod ledger_entries;
mod ops;
mod validator;
mod wishes;

type ResultEngine<T> = Result<T, EngineError>;
