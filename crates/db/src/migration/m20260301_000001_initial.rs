//! Initial database migration.
//!
//! Creates master data, voucher, journal and treasury tables. Enumerated
//! columns are `VARCHAR` with `CHECK` constraints so the string-backed
//! entity enums map onto them directly.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;
        db.execute_unprepared(THIRD_PARTIES_SQL).await?;
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 2: VOUCHERS
        // ============================================================
        db.execute_unprepared(VOUCHER_TYPES_SQL).await?;
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_LINES_SQL).await?;
        db.execute_unprepared(VOUCHER_STATUS_HISTORY_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;
        db.execute_unprepared(JOURNAL_SEQUENCES_SQL).await?;
        db.execute_unprepared(VOUCHER_JOURNAL_FK_SQL).await?;

        // ============================================================
        // PART 4: TREASURY
        // ============================================================
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTION_STATUS_HISTORY_SQL).await?;

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

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    allows_entries BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const THIRD_PARTIES_SQL: &str = r"
CREATE TABLE third_parties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    tax_id VARCHAR(50),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_third_parties_tax_id ON third_parties(tax_id) WHERE tax_id IS NOT NULL;
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_period_dates CHECK (end_date >= start_date),
    CONSTRAINT chk_period_status CHECK (status IN ('open', 'closed'))
);

CREATE INDEX idx_fiscal_periods_dates ON fiscal_periods(start_date, end_date);
";

const VOUCHER_TYPES_SQL: &str = r"
CREATE TABLE voucher_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    current_consecutive BIGINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_consecutive_non_negative CHECK (current_consecutive >= 0)
);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_type_id UUID NOT NULL REFERENCES voucher_types(id),
    consecutive BIGINT NOT NULL,
    voucher_number VARCHAR(30) NOT NULL UNIQUE,
    date DATE NOT NULL,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id),
    third_party_id UUID REFERENCES third_parties(id),
    description TEXT,
    total_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL DEFAULT 'DRAFT',
    journal_entry_id UUID,
    created_by UUID NOT NULL,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    cancelled_by UUID,
    cancelled_at TIMESTAMPTZ,
    cancellation_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_voucher_type_consecutive UNIQUE (voucher_type_id, consecutive),
    CONSTRAINT chk_voucher_status CHECK (status IN ('DRAFT', 'VALIDATED', 'APPROVED', 'CANCELLED')),
    CONSTRAINT chk_voucher_balanced CHECK (status = 'DRAFT' OR total_debit = total_credit),
    CONSTRAINT chk_voucher_journal CHECK (status <> 'APPROVED' OR journal_entry_id IS NOT NULL)
);

CREATE INDEX idx_vouchers_status ON vouchers(status);
CREATE INDEX idx_vouchers_date ON vouchers(date DESC);
CREATE INDEX idx_vouchers_fiscal_period ON vouchers(fiscal_period_id);
";

const VOUCHER_LINES_SQL: &str = r"
CREATE TABLE voucher_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_id UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    third_party_id UUID REFERENCES third_parties(id),
    description TEXT,
    debit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_voucher_line_number UNIQUE (voucher_id, line_number),
    CONSTRAINT chk_voucher_line_number CHECK (line_number > 0),
    CONSTRAINT chk_voucher_line_one_side CHECK (
        (debit_amount > 0 AND credit_amount = 0) OR (credit_amount > 0 AND debit_amount = 0)
    )
);
";

const VOUCHER_STATUS_HISTORY_SQL: &str = r"
-- No foreign key: rows outlive a deleted draft.
CREATE TABLE voucher_status_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_id UUID NOT NULL,
    previous_status VARCHAR(20),
    new_status VARCHAR(20) NOT NULL,
    actor_id UUID NOT NULL,
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_voucher_history_voucher ON voucher_status_history(voucher_id, created_at);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_number VARCHAR(20) NOT NULL UNIQUE,
    entry_date DATE NOT NULL,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id),
    description TEXT,
    source_document_type VARCHAR(30) NOT NULL DEFAULT 'voucher',
    source_document_id UUID NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'posted',
    total_debit NUMERIC(19, 4) NOT NULL,
    total_credit NUMERIC(19, 4) NOT NULL,
    reverses_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_journal_status CHECK (status = 'posted'),
    CONSTRAINT chk_journal_balanced CHECK (total_debit = total_credit)
);

CREATE INDEX idx_journal_entries_source ON journal_entries(source_document_type, source_document_id);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    order_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    third_party_id UUID REFERENCES third_parties(id),
    description TEXT,
    debit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_journal_line_order UNIQUE (journal_entry_id, order_number),
    CONSTRAINT chk_journal_line_one_side CHECK (
        (debit_amount > 0 AND credit_amount = 0) OR (credit_amount > 0 AND debit_amount = 0)
    )
);

CREATE INDEX idx_journal_lines_account ON journal_entry_lines(account_id);
";

const JOURNAL_SEQUENCES_SQL: &str = r"
CREATE TABLE journal_sequences (
    year INTEGER PRIMARY KEY,
    last_value BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_sequence_non_negative CHECK (last_value >= 0)
);
";

const VOUCHER_JOURNAL_FK_SQL: &str = r"
ALTER TABLE vouchers
    ADD CONSTRAINT fk_vouchers_journal_entry
    FOREIGN KEY (journal_entry_id) REFERENCES journal_entries(id);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_number VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    gl_account_id UUID NOT NULL UNIQUE REFERENCES chart_of_accounts(id),
    currency CHAR(3) NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    allow_overdraft BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_bank_currency_format CHECK (currency ~ '^[A-Z]{3}$')
);
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    transaction_type VARCHAR(20) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    allow_overdraft BOOLEAN NOT NULL DEFAULT false,
    running_balance NUMERIC(19, 4),
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    transaction_date DATE NOT NULL,
    description TEXT,
    reference VARCHAR(100),
    journal_entry_id UUID REFERENCES journal_entries(id) ON DELETE RESTRICT,
    document_type VARCHAR(30),
    document_id UUID,
    created_by UUID NOT NULL,
    confirmed_by UUID,
    confirmed_at TIMESTAMPTZ,
    voided_by UUID,
    voided_at TIMESTAMPTZ,
    void_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_bank_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_bank_transaction_type CHECK (
        transaction_type IN ('deposit', 'withdrawal', 'transfer', 'payment', 'receipt')
    ),
    CONSTRAINT chk_bank_transaction_status CHECK (status IN ('pending', 'cleared', 'voided')),
    CONSTRAINT chk_cleared_has_running_balance CHECK (
        status <> 'cleared' OR running_balance IS NOT NULL
    )
);

CREATE INDEX idx_bank_transactions_account ON bank_transactions(bank_account_id, created_at);
CREATE INDEX idx_bank_transactions_journal ON bank_transactions(journal_entry_id)
    WHERE journal_entry_id IS NOT NULL;
";

const BANK_TRANSACTION_STATUS_HISTORY_SQL: &str = r"
CREATE TABLE bank_transaction_status_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_transaction_id UUID NOT NULL REFERENCES bank_transactions(id),
    previous_status VARCHAR(20),
    new_status VARCHAR(20) NOT NULL,
    actor_id UUID NOT NULL,
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bank_history_transaction
    ON bank_transaction_status_history(bank_transaction_id, created_at);
";

const TRIGGERS_SQL: &str = r"
-- Journal entries and their lines are immutable once written
CREATE OR REPLACE FUNCTION prevent_journal_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'journal entries are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_journal_entries_immutable
    BEFORE UPDATE ON journal_entries
    FOR EACH ROW EXECUTE FUNCTION prevent_journal_mutation();

CREATE TRIGGER trg_journal_entry_lines_immutable
    BEFORE UPDATE OR DELETE ON journal_entry_lines
    FOR EACH ROW EXECUTE FUNCTION prevent_journal_mutation();

-- Status history is append-only
CREATE OR REPLACE FUNCTION prevent_history_update()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'status history is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_voucher_history_append_only
    BEFORE UPDATE OR DELETE ON voucher_status_history
    FOR EACH ROW EXECUTE FUNCTION prevent_history_update();

CREATE TRIGGER trg_bank_history_append_only
    BEFORE UPDATE OR DELETE ON bank_transaction_status_history
    FOR EACH ROW EXECUTE FUNCTION prevent_history_update();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS bank_transaction_status_history CASCADE;
DROP TABLE IF EXISTS bank_transactions CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS journal_sequences CASCADE;
DROP TABLE IF EXISTS journal_entry_lines CASCADE;
DROP TABLE IF EXISTS voucher_status_history CASCADE;
DROP TABLE IF EXISTS voucher_lines CASCADE;
DROP TABLE IF EXISTS vouchers CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS voucher_types CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS third_parties CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;
DROP FUNCTION IF EXISTS prevent_journal_mutation() CASCADE;
DROP FUNCTION IF EXISTS prevent_history_update() CASCADE;
";
