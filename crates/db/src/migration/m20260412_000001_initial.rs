//! Initial database migration.
//!
//! Creates the six ledger relations with their uniqueness, foreign-key and
//! amount constraints, plus the indexes supporting lookup by owner, by
//! (card, category) pair and over the transaction log.
//!
//! Card and category totals are maintained by repository code inside the
//! same database transaction as each subcard change; there is deliberately
//! no balance trigger here.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CARDS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(TEMPLATES_SQL).await?;
        db.execute_unprepared(SUBCARDS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY,
    login           VARCHAR(30) NOT NULL,
    password_hash   TEXT NOT NULL,
    display_name    VARCHAR(50) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT users_login_unique UNIQUE (login)
);

CREATE INDEX idx_users_login ON users (login);
";

const CARDS_SQL: &str = r"
CREATE TABLE cards (
    id              UUID PRIMARY KEY,
    owner_id        UUID NOT NULL REFERENCES users(id),
    name            VARCHAR(100) NOT NULL,
    amount          NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active       BOOLEAN NOT NULL DEFAULT true,
    description     VARCHAR(300),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT cards_owner_name_unique UNIQUE (owner_id, name),
    CONSTRAINT cards_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_cards_owner ON cards (owner_id);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id              UUID PRIMARY KEY,
    owner_id        UUID NOT NULL REFERENCES users(id),
    name            VARCHAR(50) NOT NULL,
    amount          NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active       BOOLEAN NOT NULL DEFAULT true,
    description     VARCHAR(300),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT categories_owner_name_unique UNIQUE (owner_id, name),
    CONSTRAINT categories_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_categories_owner ON categories (owner_id);
";

const TEMPLATES_SQL: &str = r"
CREATE TABLE templates (
    id              UUID PRIMARY KEY,
    owner_id        UUID NOT NULL REFERENCES users(id),
    percents        JSONB NOT NULL,
    description     VARCHAR(300),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_templates_owner ON templates (owner_id);
";

const SUBCARDS_SQL: &str = r"
CREATE TABLE subcards (
    id              UUID PRIMARY KEY,
    card_id         UUID NOT NULL REFERENCES cards(id),
    category_id     UUID NOT NULL REFERENCES categories(id),
    amount          NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description     VARCHAR(300),
    is_active       BOOLEAN NOT NULL DEFAULT true,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- One cell per (card, category), reused across soft-delete cycles
    CONSTRAINT subcards_card_category_unique UNIQUE (card_id, category_id),
    CONSTRAINT subcards_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_subcards_category ON subcards (category_id);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  UUID PRIMARY KEY,
    occurred_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
    card_id_from        UUID REFERENCES cards(id),
    category_id_from    UUID REFERENCES categories(id),
    card_id_to          UUID REFERENCES cards(id),
    category_id_to      UUID REFERENCES categories(id),
    amount              NUMERIC(19, 4) NOT NULL,
    description         TEXT,

    CONSTRAINT transactions_amount_positive CHECK (amount > 0),
    -- Endpoints are whole cells or absent, never half a coordinate
    CONSTRAINT transactions_from_pair_complete
        CHECK ((card_id_from IS NULL) = (category_id_from IS NULL)),
    CONSTRAINT transactions_to_pair_complete
        CHECK ((card_id_to IS NULL) = (category_id_to IS NULL)),
    -- Money cannot move from outside to outside
    CONSTRAINT transactions_has_endpoint
        CHECK (card_id_from IS NOT NULL OR card_id_to IS NOT NULL)
);

CREATE INDEX idx_transactions_card_from ON transactions (card_id_from);
CREATE INDEX idx_transactions_card_to ON transactions (card_id_to);
CREATE INDEX idx_transactions_category_from ON transactions (category_id_from);
CREATE INDEX idx_transactions_category_to ON transactions (category_id_to);
CREATE INDEX idx_transactions_occurred_at ON transactions (occurred_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS subcards;
DROP TABLE IF EXISTS templates;
DROP TABLE IF EXISTS categories;
DROP TABLE IF EXISTS cards;
DROP TABLE IF EXISTS users;
";
