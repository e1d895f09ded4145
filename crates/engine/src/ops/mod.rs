use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    ResultEngine,
    audit::{AuditSink, TracingAudit},
    cache::Cache,
};

mod balances;
mod enhancements;
mod legacy;
mod wishes;

pub use balances::ManaStats;
pub use enhancements::AppliedEnhancement;
pub use legacy::LEGACY_POINTS_PER_MANA;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const DEFAULT_CACHE_CAPACITY: usize = 1024;
const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(5);

/// The ledger service.
///
/// Explicitly constructed and dependency-injected; holds no global state.
/// The database is the single authoritative store, the cache is a
/// best-effort accelerator, the audit sink an opaque collaborator.
pub struct Engine {
    database: DatabaseConnection,
    cache: Cache,
    audit: Arc<dyn AuditSink>,
    tx_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("cache", &self.cache)
            .field("tx_timeout", &self.tx_timeout)
            .finish_non_exhaustive()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache_capacity: usize,
    tx_timeout: Duration,
    audit: Option<Arc<dyn AuditSink>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            tx_timeout: DEFAULT_TX_TIMEOUT,
            audit: None,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> EngineBuilder {
        self.cache_capacity = capacity;
        self
    }

    /// Bound on a single coordinator transaction attempt.
    pub fn tx_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.tx_timeout = timeout;
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> EngineBuilder {
        self.audit = Some(audit);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            cache: Cache::new(self.cache_capacity),
            audit: self.audit.unwrap_or_else(|| Arc::new(TracingAudit)),
            tx_timeout: self.tx_timeout,
        })
    }
}
