//! Initial database migration.
//!
//! Creates the enums, member tables, the transaction ledger and the invoice
//! snapshot tables.

use sea_orm_migration::prelude::*;

/// Creates the BrokerDesk schema.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MEMBERS
        // ============================================================
        db.execute_unprepared(USER_ROLES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PERMISSIONS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(INSURANCE_COMPANIES_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: INVOICES
        // ============================================================
        db.execute_unprepared(USER_INVOICES_SQL).await?;
        db.execute_unprepared(COMPANY_INVOICES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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

const ENUMS_SQL: &str = r"
CREATE TYPE user_status AS ENUM ('registered', 'verified', 'accepted', 'deleted');

-- Per-domain access levels
CREATE TYPE user_access AS ENUM ('SR', 'AR', 'ARW');
CREATE TYPE transaction_access AS ENUM ('SRW', 'AR', 'ARW');
CREATE TYPE invoice_access AS ENUM ('SR', 'AR', 'ARW');
";

const USER_ROLES_SQL: &str = r"
CREATE TABLE user_roles (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(10) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    email_token VARCHAR(64) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    name VARCHAR(10) NOT NULL,
    role_id BIGINT REFERENCES user_roles(id),
    status user_status NOT NULL DEFAULT 'registered',
    plate_fee BIGINT NOT NULL DEFAULT 0 CHECK (plate_fee >= 0),
    contract_fee NUMERIC(5, 2) NOT NULL DEFAULT 0
        CHECK (contract_fee >= 0 AND contract_fee <= 100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_status ON users(status);
CREATE INDEX idx_users_role ON users(role_id);
";

const PERMISSIONS_SQL: &str = r"
CREATE TABLE permissions (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    user_level user_access NOT NULL DEFAULT 'SR',
    transaction_level transaction_access NOT NULL DEFAULT 'SRW',
    invoice_level invoice_access NOT NULL DEFAULT 'SR',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INSURANCE_COMPANIES_SQL: &str = r"
CREATE TABLE insurance_companies (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(10) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    insurance_company_id BIGINT NOT NULL REFERENCES insurance_companies(id),
    vehicle_id VARCHAR(10) NOT NULL,
    vehicle_model VARCHAR(10) NOT NULL,
    date DATE NOT NULL,
    price BIGINT NOT NULL,
    memo VARCHAR(10) NOT NULL DEFAULT '',
    canceled BOOLEAN NOT NULL DEFAULT false,
    cancel_fee BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transactions_date ON transactions(date);
CREATE INDEX idx_transactions_user_date ON transactions(user_id, date);
CREATE INDEX idx_transactions_company ON transactions(insurance_company_id);
";

const USER_INVOICES_SQL: &str = r"
CREATE TABLE user_invoices (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    contract_fee NUMERIC(5, 2) NOT NULL,
    plate_fee BIGINT NOT NULL,
    transaction_count BIGINT NOT NULL,
    canceled_transaction_count BIGINT NOT NULL,
    revenue BIGINT NOT NULL,
    cancel_fee BIGINT NOT NULL,
    total_revenue BIGINT NOT NULL,
    total_contract_fee BIGINT NOT NULL,
    first_vat BIGINT NOT NULL,
    first_income BIGINT NOT NULL,
    second_vat BIGINT NOT NULL,
    second_income BIGINT NOT NULL,
    income BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    UNIQUE(user_id, year, month)
);

CREATE TABLE user_invoice_extras (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    name VARCHAR(15) NOT NULL,
    price BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    UNIQUE(user_id, year, month, name)
);
";

const COMPANY_INVOICES_SQL: &str = r"
CREATE TABLE company_invoices (
    id BIGSERIAL PRIMARY KEY,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    revenue BIGINT NOT NULL,
    plate_fee BIGINT NOT NULL,
    employee_salary BIGINT NOT NULL,
    rental_fee BIGINT NOT NULL,
    maintenance_fee BIGINT NOT NULL,
    income BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    UNIQUE(year, month)
);

CREATE TABLE company_invoice_extras (
    id BIGSERIAL PRIMARY KEY,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    name VARCHAR(15) NOT NULL,
    price BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    UNIQUE(year, month, name)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: touch_updated_at
-- Keeps updated_at current on every row update
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_user_roles_updated_at BEFORE UPDATE ON user_roles
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_permissions_updated_at BEFORE UPDATE ON permissions
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_insurance_companies_updated_at BEFORE UPDATE ON insurance_companies
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_transactions_updated_at BEFORE UPDATE ON transactions
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_user_invoice_extras_updated_at BEFORE UPDATE ON user_invoice_extras
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_company_invoice_extras_updated_at BEFORE UPDATE ON company_invoice_extras
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================
DROP TABLE IF EXISTS company_invoice_extras CASCADE;
DROP TABLE IF EXISTS company_invoices CASCADE;
DROP TABLE IF EXISTS user_invoice_extras CASCADE;
DROP TABLE IF EXISTS user_invoices CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS insurance_companies CASCADE;
DROP TABLE IF EXISTS permissions CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS user_roles CASCADE;

DROP FUNCTION IF EXISTS touch_updated_at();

DROP TYPE IF EXISTS invoice_access;
DROP TYPE IF EXISTS transaction_access;
DROP TYPE IF EXISTS user_access;
DROP TYPE IF EXISTS user_status;
";
