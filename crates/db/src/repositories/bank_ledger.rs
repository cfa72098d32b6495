//! Bank transaction ledger.
//!
//! Every balance change happens with the bank account row locked
//! (`SELECT ... FOR UPDATE`) and in the same transaction as the bank
//! transaction row that causes it, so `current_balance` always equals the sum
//! of cleared signed amounts. Writes are retried on lock conflicts.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tracing::info;
use uuid::Uuid;

use ledgersync_core::treasury::{
    BankError, BankTransactionStatus, BankTransactionType, RetryPolicy, apply_movement,
    ensure_confirmable, ensure_voidable, reverse_movement, validate_amount,
};
use ledgersync_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    bank_accounts, bank_transaction_status_history, bank_transactions,
    sea_orm_active_enums::{BankTransactionStatus as DbStatus, BankTransactionType as DbType},
};
use crate::lock::{bank_db_error, retry_on_lock_conflict};

/// Document type recorded on opening balance deposits.
pub const DOCUMENT_OPENING_BALANCE: &str = "opening_balance";

/// Input for opening a bank account.
#[derive(Debug, Clone)]
pub struct OpenBankAccountInput {
    /// Unique account number.
    pub account_number: String,
    /// Display name.
    pub name: String,
    /// Chart of accounts node bound to this account.
    pub gl_account_id: Uuid,
    /// ISO currency code.
    pub currency: String,
    /// Posted as a cleared deposit when positive.
    pub opening_balance: Decimal,
    /// Date of the opening deposit.
    pub opening_date: NaiveDate,
    /// Allow this account's balance to go negative.
    pub allow_overdraft: bool,
    /// Actor opening the account.
    pub created_by: Uuid,
}

/// Input for creating a bank transaction.
#[derive(Debug, Clone)]
pub struct CreateBankTransactionInput {
    /// Target account.
    pub bank_account_id: Uuid,
    /// Movement kind; the sign follows from it.
    pub transaction_type: BankTransactionType,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Value date.
    pub transaction_date: NaiveDate,
    /// Optional description.
    pub description: Option<String>,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Create cleared (balance applied now) instead of pending.
    pub cleared: bool,
    /// Allow a negative balance for this transaction only.
    pub allow_overdraft: bool,
    /// Originating journal entry, for system-generated transactions.
    pub journal_entry_id: Option<Uuid>,
    /// Provenance type, e.g. `journal_entry`.
    pub document_type: Option<String>,
    /// Provenance ID.
    pub document_id: Option<Uuid>,
    /// Actor creating the transaction.
    pub created_by: Uuid,
}

/// Filter options for listing bank transactions.
#[derive(Debug, Clone, Default)]
pub struct BankTransactionFilter {
    /// Filter by account.
    pub bank_account_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<BankTransactionStatus>,
    /// Filter by movement kind.
    pub transaction_type: Option<BankTransactionType>,
    /// Filter by originating journal entry.
    pub journal_entry_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

impl BankTransactionFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(id) = self.bank_account_id {
            condition = condition.add(bank_transactions::Column::BankAccountId.eq(id));
        }
        if let Some(status) = self.status {
            condition = condition.add(bank_transactions::Column::Status.eq(DbStatus::from(status)));
        }
        if let Some(kind) = self.transaction_type {
            condition =
                condition.add(bank_transactions::Column::TransactionType.eq(DbType::from(kind)));
        }
        if let Some(id) = self.journal_entry_id {
            condition = condition.add(bank_transactions::Column::JournalEntryId.eq(id));
        }
        if let Some(from) = self.date_from {
            condition = condition.add(bank_transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = self.date_to {
            condition = condition.add(bank_transactions::Column::TransactionDate.lte(to));
        }
        condition
    }
}

/// Bank transaction ledger repository.
#[derive(Debug, Clone)]
pub struct BankLedgerRepository {
    db: DatabaseConnection,
    policy: RetryPolicy,
    allow_overdraft: bool,
}

impl BankLedgerRepository {
    /// Creates a new bank ledger repository.
    ///
    /// `allow_overdraft` permits negative balances on every account.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: RetryPolicy, allow_overdraft: bool) -> Self {
        Self {
            db,
            policy,
            allow_overdraft,
        }
    }

    /// Opens a bank account bound to one GL account.
    ///
    /// The account starts at zero; a positive opening balance is posted as
    /// a cleared deposit in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Duplicate` if the account number or GL account is
    /// already in use, `BankError::InvalidAmount` for a negative opening
    /// balance.
    pub async fn open_account(
        &self,
        input: OpenBankAccountInput,
    ) -> Result<bank_accounts::Model, BankError> {
        if input.opening_balance < Decimal::ZERO {
            return Err(BankError::InvalidAmount(input.opening_balance));
        }
        if input.opening_balance > Decimal::ZERO {
            validate_amount(input.opening_balance)?;
        }

        let duplicate = bank_accounts::Entity::find()
            .filter(
                Condition::any()
                    .add(bank_accounts::Column::AccountNumber.eq(input.account_number.as_str()))
                    .add(bank_accounts::Column::GlAccountId.eq(input.gl_account_id)),
            )
            .one(&self.db)
            .await
            .map_err(bank_db_error)?;
        if let Some(existing) = duplicate {
            let what = if existing.account_number == input.account_number {
                format!("account number {}", input.account_number)
            } else {
                format!("GL account {}", input.gl_account_id)
            };
            return Err(BankError::Duplicate(what));
        }

        let txn = self.db.begin().await.map_err(bank_db_error)?;
        let now: DateTimeWithTimeZone = Utc::now().into();

        let account = bank_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_number: Set(input.account_number),
            name: Set(input.name),
            gl_account_id: Set(input.gl_account_id),
            currency: Set(input.currency),
            current_balance: Set(Decimal::ZERO),
            allow_overdraft: Set(input.allow_overdraft),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(bank_db_error)?;

        let account = if input.opening_balance > Decimal::ZERO {
            let deposit = CreateBankTransactionInput {
                bank_account_id: account.id,
                transaction_type: BankTransactionType::Deposit,
                amount: input.opening_balance,
                transaction_date: input.opening_date,
                description: Some("Opening balance".to_string()),
                reference: None,
                cleared: true,
                allow_overdraft: false,
                journal_entry_id: None,
                document_type: Some(DOCUMENT_OPENING_BALANCE.to_string()),
                document_id: Some(account.id),
                created_by: input.created_by,
            };
            Self::insert_transaction(&txn, &deposit, true, self.allow_overdraft).await?;
            Self::find_account(&txn, account.id).await?
        } else {
            account
        };

        txn.commit().await.map_err(bank_db_error)?;

        info!(
            bank_account_id = %account.id,
            account_number = %account.account_number,
            gl_account_id = %account.gl_account_id,
            opening_balance = %account.current_balance,
            "Bank account opened"
        );

        Ok(account)
    }

    /// Gets a bank account by ID.
    ///
    /// # Errors
    ///
    /// Returns `BankError::BankAccountNotFound` if it does not exist.
    pub async fn get_bank_account(&self, id: Uuid) -> Result<bank_accounts::Model, BankError> {
        Self::find_account(&self.db, id).await
    }

    /// Gets a bank transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `BankError::TransactionNotFound` if it does not exist.
    pub async fn get_bank_transaction(
        &self,
        id: Uuid,
    ) -> Result<bank_transactions::Model, BankError> {
        bank_transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(bank_db_error)?
            .ok_or(BankError::TransactionNotFound(id))
    }

    /// Creates a pending or cleared bank transaction in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `AccountInactive`, `InsufficientFunds` or `InvalidAmount`
    /// before any write, or `ConcurrencyExhausted` after repeated lock
    /// conflicts.
    pub async fn create_bank_transaction(
        &self,
        input: CreateBankTransactionInput,
    ) -> Result<bank_transactions::Model, BankError> {
        let input = &input;
        let tx = retry_on_lock_conflict(&self.policy, "create_bank_transaction", move || async move {
            let txn = self.db.begin().await.map_err(bank_db_error)?;
            let tx =
                Self::insert_transaction(&txn, input, input.cleared, self.allow_overdraft).await?;
            txn.commit().await.map_err(bank_db_error)?;
            Ok(tx)
        })
        .await?;

        info!(
            bank_transaction_id = %tx.id,
            bank_account_id = %tx.bank_account_id,
            transaction_type = ?tx.transaction_type,
            amount = %tx.amount,
            status = ?tx.status,
            "Bank transaction created"
        );

        Ok(tx)
    }

    /// Creates a cleared transaction inside the caller's transaction.
    ///
    /// Each attempt runs in its own savepoint, so a failure leaves the
    /// caller's transaction usable.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_bank_transaction`].
    pub async fn create_cleared_within<C>(
        &self,
        conn: &C,
        input: &CreateBankTransactionInput,
    ) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        retry_on_lock_conflict(&self.policy, "create_cleared", move || async move {
            let savepoint = conn.begin().await.map_err(bank_db_error)?;
            let tx = Self::insert_transaction(&savepoint, input, true, self.allow_overdraft).await?;
            savepoint.commit().await.map_err(bank_db_error)?;
            Ok(tx)
        })
        .await
    }

    /// Moves a pending transaction to cleared and applies it to the balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` unless the transaction is pending,
    /// `InsufficientFunds` if the account cannot cover it.
    pub async fn confirm_bank_transaction(
        &self,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<bank_transactions::Model, BankError> {
        let tx = retry_on_lock_conflict(&self.policy, "confirm_bank_transaction", move || async move {
            let txn = self.db.begin().await.map_err(bank_db_error)?;
            let tx = self.confirm_row(&txn, id, actor_id).await?;
            txn.commit().await.map_err(bank_db_error)?;
            Ok(tx)
        })
        .await?;

        info!(
            bank_transaction_id = %tx.id,
            bank_account_id = %tx.bank_account_id,
            running_balance = ?tx.running_balance,
            "Bank transaction confirmed"
        );

        Ok(tx)
    }

    /// Voids a transaction, reversing its balance effect if it was cleared.
    ///
    /// # Errors
    ///
    /// Returns `VoidReasonRequired` for a blank reason, `AlreadyVoided` on a
    /// second void.
    pub async fn void_bank_transaction(
        &self,
        id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<bank_transactions::Model, BankError> {
        let tx = retry_on_lock_conflict(&self.policy, "void_bank_transaction", move || async move {
            let txn = self.db.begin().await.map_err(bank_db_error)?;
            let tx = Self::void_row(&txn, id, actor_id, reason).await?;
            txn.commit().await.map_err(bank_db_error)?;
            Ok(tx)
        })
        .await?;

        info!(
            bank_transaction_id = %tx.id,
            bank_account_id = %tx.bank_account_id,
            "Bank transaction voided"
        );

        Ok(tx)
    }

    /// Voids a transaction inside the caller's transaction, one savepoint
    /// per attempt.
    ///
    /// # Errors
    ///
    /// Same as [`Self::void_bank_transaction`].
    pub async fn void_within<C>(
        &self,
        conn: &C,
        id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        retry_on_lock_conflict(&self.policy, "void_bank_transaction", move || async move {
            let savepoint = conn.begin().await.map_err(bank_db_error)?;
            let tx = Self::void_row(&savepoint, id, actor_id, reason).await?;
            savepoint.commit().await.map_err(bank_db_error)?;
            Ok(tx)
        })
        .await
    }

    /// Lists bank transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Database` if the query fails.
    pub async fn list_bank_transactions(
        &self,
        filter: &BankTransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<bank_transactions::Model>, BankError> {
        let query = bank_transactions::Entity::find().filter(filter.condition());

        let total = query.clone().count(&self.db).await.map_err(bank_db_error)?;
        let data = query
            .order_by_desc(bank_transactions::Column::TransactionDate)
            .order_by_desc(bank_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(bank_db_error)?;

        Ok(PageResponse::for_request(data, page, total))
    }

    /// Status history of a bank transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `BankError::TransactionNotFound` if the transaction does not exist.
    pub async fn get_transaction_history(
        &self,
        id: Uuid,
    ) -> Result<Vec<bank_transaction_status_history::Model>, BankError> {
        self.get_bank_transaction(id).await?;

        bank_transaction_status_history::Entity::find()
            .filter(bank_transaction_status_history::Column::BankTransactionId.eq(id))
            .order_by_asc(bank_transaction_status_history::Column::CreatedAt)
            .order_by_asc(bank_transaction_status_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(bank_db_error)
    }

    async fn find_account<C>(conn: &C, id: Uuid) -> Result<bank_accounts::Model, BankError>
    where
        C: ConnectionTrait,
    {
        bank_accounts::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(bank_db_error)?
            .ok_or(BankError::BankAccountNotFound(id))
    }

    async fn lock_account<C>(conn: &C, id: Uuid) -> Result<bank_accounts::Model, BankError>
    where
        C: ConnectionTrait,
    {
        bank_accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(bank_db_error)?
            .ok_or(BankError::BankAccountNotFound(id))
    }

    async fn lock_transaction<C>(conn: &C, id: Uuid) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait,
    {
        bank_transactions::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(bank_db_error)?
            .ok_or(BankError::TransactionNotFound(id))
    }

    async fn set_balance<C>(
        conn: &C,
        account: bank_accounts::Model,
        balance: Decimal,
        now: DateTimeWithTimeZone,
    ) -> Result<(), BankError>
    where
        C: ConnectionTrait,
    {
        let mut active: bank_accounts::ActiveModel = account.into();
        active.current_balance = Set(balance);
        active.updated_at = Set(now);
        active.update(conn).await.map_err(bank_db_error)?;
        Ok(())
    }

    /// Inserts a transaction; when `cleared`, applies it to the locked account.
    async fn insert_transaction<C>(
        conn: &C,
        input: &CreateBankTransactionInput,
        cleared: bool,
        config_overdraft: bool,
    ) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait,
    {
        validate_amount(input.amount)?;

        let account = Self::lock_account(conn, input.bank_account_id).await?;
        if !account.is_active {
            return Err(BankError::AccountInactive(account.id));
        }

        let running_balance = if cleared {
            let allow = input.allow_overdraft || account.allow_overdraft || config_overdraft;
            Some(apply_movement(
                account.id,
                account.current_balance,
                input.transaction_type,
                input.amount,
                allow,
            )?)
        } else {
            None
        };
        let status = if cleared {
            BankTransactionStatus::Cleared
        } else {
            BankTransactionStatus::Pending
        };

        let now: DateTimeWithTimeZone = Utc::now().into();
        let tx = bank_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            bank_account_id: Set(account.id),
            transaction_type: Set(input.transaction_type.into()),
            amount: Set(input.amount),
            allow_overdraft: Set(input.allow_overdraft),
            running_balance: Set(running_balance),
            status: Set(status.into()),
            transaction_date: Set(input.transaction_date),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            journal_entry_id: Set(input.journal_entry_id),
            document_type: Set(input.document_type.clone()),
            document_id: Set(input.document_id),
            created_by: Set(input.created_by),
            confirmed_by: Set(cleared.then_some(input.created_by)),
            confirmed_at: Set(cleared.then_some(now)),
            voided_by: Set(None),
            voided_at: Set(None),
            void_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(bank_db_error)?;

        if let Some(balance) = running_balance {
            Self::set_balance(conn, account, balance, now).await?;
        }

        record_history(conn, tx.id, None, status, input.created_by, None).await?;

        Ok(tx)
    }

    async fn confirm_row<C>(
        &self,
        conn: &C,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait,
    {
        let tx = Self::lock_transaction(conn, id).await?;
        let status: BankTransactionStatus = tx.status.into();
        ensure_confirmable(status)?;

        let account = Self::lock_account(conn, tx.bank_account_id).await?;
        if !account.is_active {
            return Err(BankError::AccountInactive(account.id));
        }

        let balance = apply_movement(
            account.id,
            account.current_balance,
            tx.transaction_type.into(),
            tx.amount,
            tx.allow_overdraft || account.allow_overdraft || self.allow_overdraft,
        )?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut active: bank_transactions::ActiveModel = tx.into();
        active.status = Set(BankTransactionStatus::Cleared.into());
        active.running_balance = Set(Some(balance));
        active.confirmed_by = Set(Some(actor_id));
        active.confirmed_at = Set(Some(now));
        active.updated_at = Set(now);
        let tx = active.update(conn).await.map_err(bank_db_error)?;

        Self::set_balance(conn, account, balance, now).await?;
        record_history(conn, id, Some(status), BankTransactionStatus::Cleared, actor_id, None)
            .await?;

        Ok(tx)
    }

    async fn void_row<C>(
        conn: &C,
        id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<bank_transactions::Model, BankError>
    where
        C: ConnectionTrait,
    {
        let tx = Self::lock_transaction(conn, id).await?;
        let status: BankTransactionStatus = tx.status.into();
        let reverse = ensure_voidable(id, status, reason)?;
        let reason = reason.trim().to_string();
        let now: DateTimeWithTimeZone = Utc::now().into();

        if reverse {
            let account = Self::lock_account(conn, tx.bank_account_id).await?;
            let balance = reverse_movement(
                account.id,
                account.current_balance,
                tx.transaction_type.into(),
                tx.amount,
            )?;
            Self::set_balance(conn, account, balance, now).await?;
        }

        let mut active: bank_transactions::ActiveModel = tx.into();
        active.status = Set(BankTransactionStatus::Voided.into());
        active.voided_by = Set(Some(actor_id));
        active.voided_at = Set(Some(now));
        active.void_reason = Set(Some(reason.clone()));
        active.updated_at = Set(now);
        let tx = active.update(conn).await.map_err(bank_db_error)?;

        record_history(
            conn,
            id,
            Some(status),
            BankTransactionStatus::Voided,
            actor_id,
            Some(reason),
        )
        .await?;

        Ok(tx)
    }
}

async fn record_history<C>(
    conn: &C,
    bank_transaction_id: Uuid,
    previous_status: Option<BankTransactionStatus>,
    new_status: BankTransactionStatus,
    actor_id: Uuid,
    comment: Option<String>,
) -> Result<(), BankError>
where
    C: ConnectionTrait,
{
    bank_transaction_status_history::ActiveModel {
        id: Set(Uuid::now_v7()),
        bank_transaction_id: Set(bank_transaction_id),
        previous_status: Set(previous_status.map(Into::into)),
        new_status: Set(new_status.into()),
        actor_id: Set(actor_id),
        comment: Set(comment),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(bank_db_error)?;
    Ok(())
}
