//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for the mana ledger:
//!
//! - `accounts`: one balance row per user, `CHECK (balance >= 0)`
//! - `wishes`: wish records with denormalized `priority`/`aura_tag` mirrors
//! - `enhancements`: active augmentations, at most one per `(wish_id, kind)`
//! - `ledger_entries`: append-only audit trail of every balance change

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    UserId,
    Balance,
}

#[derive(Iden)]
enum Wishes {
    Table,
    Id,
    OwnerId,
    Title,
    Status,
    Priority,
    AuraTag,
    CreatedAt,
}

#[derive(Iden)]
enum Enhancements {
    Table,
    Id,
    WishId,
    Kind,
    Level,
    AuraTag,
    Cost,
    AppliedBy,
    AppliedAt,
    Metadata,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    UserId,
    Direction,
    Amount,
    Reason,
    RelatedEnhancementId,
    BalanceBefore,
    BalanceAfter,
    CreatedAt,
    Metadata,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Accounts::Balance).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Wishes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wishes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wishes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Wishes::OwnerId).string().not_null())
                    .col(ColumnDef::new(Wishes::Title).string().not_null())
                    .col(
                        ColumnDef::new(Wishes::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Wishes::Priority)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Wishes::AuraTag).string())
                    .col(ColumnDef::new(Wishes::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wishes-owner_id")
                    .table(Wishes::Table)
                    .col(Wishes::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Enhancements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Enhancements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enhancements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enhancements::WishId).string().not_null())
                    .col(ColumnDef::new(Enhancements::Kind).string().not_null())
                    .col(ColumnDef::new(Enhancements::Level).integer())
                    .col(ColumnDef::new(Enhancements::AuraTag).string())
                    .col(ColumnDef::new(Enhancements::Cost).big_integer().not_null())
                    .col(ColumnDef::new(Enhancements::AppliedBy).string().not_null())
                    .col(
                        ColumnDef::new(Enhancements::AppliedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enhancements::Metadata).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enhancements-wish_id")
                            .from(Enhancements::Table, Enhancements::WishId)
                            .to(Wishes::Table, Wishes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Backs the at-most-one-active-per-kind invariant.
        manager
            .create_index(
                Index::create()
                    .name("idx-enhancements-wish_id-kind-unique")
                    .table(Enhancements::Table)
                    .col(Enhancements::WishId)
                    .col(Enhancements::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::UserId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Direction).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Reason).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::RelatedEnhancementId).string())
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Metadata).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-user_id")
                            .from(LedgerEntries::Table, LedgerEntries::UserId)
                            .to(Accounts::Table, Accounts::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-user_id-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // The one-shot legacy migration guard filters on (user_id, reason).
        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-user_id-reason")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::Reason)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enhancements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wishes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
