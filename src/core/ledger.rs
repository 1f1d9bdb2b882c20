//! Coin ledger: balances, daily-claim dates, streaks and robbery cooldowns.
//!
//! [`Ledger`] is the storage seam the economy talks to. [`DbLedger`] implements
//! it on top of a `SeaORM` connection. Accounts are created on first lookup with
//! [`STARTING_BALANCE`] coins.
//!
//! Balance changes are applied as a single `UPDATE accounts SET balance =
//! balance + delta` statement, guarded so a debit never takes a balance below
//! zero. Transfers run both sides inside one database transaction, and a
//! daily claim writes its streak, credit and claim date in one guarded update.

use crate::{
    core::session::UserId,
    entities::{Account, AccountColumn, account},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, instrument};

/// Coins a new account starts with.
pub const STARTING_BALANCE: i64 = 1000;
/// Longest streak that still counts.
pub const MAX_STREAK: i32 = 61;
/// Coins granted per streak day.
pub const STREAK_BONUS_PER_DAY: i64 = 5;
/// Largest streak bonus.
pub const MAX_STREAK_BONUS: i64 = 300;

/// One scoreboard row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standing {
    /// Account owner
    pub user: UserId,
    /// Current balance
    pub balance: i64,
}

/// Storage for everything the economy persists per user.
///
/// Every lookup creates the account when it does not exist yet. Storage
/// failures surface as [`Error::LedgerUnavailable`].
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance.
    async fn get_balance(&self, user: UserId) -> Result<i64>;

    /// Overwrites the balance.
    async fn set_balance(&self, user: UserId, balance: i64) -> Result<()>;

    /// Adds `delta` to the balance and returns the new balance.
    ///
    /// A debit larger than the balance fails with [`Error::InsufficientFunds`]
    /// and changes nothing.
    async fn adjust_balance(&self, user: UserId, delta: i64) -> Result<i64>;

    /// Moves `amount` from `from` to `to` atomically and returns both new
    /// balances.
    async fn transfer(&self, from: UserId, to: UserId, amount: i64) -> Result<(i64, i64)>;

    /// Whether the daily reward can be claimed on `today`.
    async fn get_daily(&self, user: UserId, today: NaiveDate) -> Result<bool>;

    /// Records a daily claim on `today`.
    async fn set_daily(&self, user: UserId, today: NaiveDate) -> Result<()>;

    /// Extends or resets the streak for a claim on `today` and returns the
    /// streak bonus.
    async fn update_streak_and_get_bonus(&self, user: UserId, today: NaiveDate) -> Result<i64>;

    /// Claims the daily reward for `today` as one unit: updates the streak,
    /// credits `base` plus the streak bonus and records the claim date.
    /// Returns the bonus and the new balance.
    ///
    /// A second claim on the same day fails with [`Error::DailyAlreadyClaimed`]
    /// and changes nothing.
    async fn claim_daily(&self, user: UserId, today: NaiveDate, base: i64) -> Result<(i64, i64)>;

    /// Whether the user may rob on `today`, plus the stored eligibility date.
    async fn can_rob(&self, user: UserId, today: NaiveDate) -> Result<(bool, Option<NaiveDate>)>;

    /// Blocks robbing for `days` days from `today` and returns the first
    /// eligible date.
    async fn set_robbing_timeout(
        &self,
        user: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<NaiveDate>;

    /// Richest accounts first.
    async fn leaderboard(&self, limit: u64) -> Result<Vec<Standing>>;

    /// Number of accounts.
    async fn account_count(&self) -> Result<u64>;
}

/// Streak bonus for a streak of `streak` days.
#[must_use]
pub fn streak_bonus(streak: i32) -> i64 {
    (i64::from(streak) * STREAK_BONUS_PER_DAY).min(MAX_STREAK_BONUS)
}

/// Streak after a claim on `today`: one more than before when yesterday was
/// claimed, otherwise back to zero.
fn next_streak(account: &account::Model, today: NaiveDate) -> i32 {
    let consecutive = account
        .last_daily
        .and_then(|last| last.succ_opt())
        .is_some_and(|next| next == today);
    if consecutive {
        (account.daily_streak + 1).min(MAX_STREAK)
    } else {
        0
    }
}

fn key(user: UserId) -> Result<i64> {
    i64::try_from(user).map_err(|_| Error::InvalidUser { user })
}

fn new_account(id: i64) -> account::ActiveModel {
    account::ActiveModel {
        id: Set(id),
        balance: Set(STARTING_BALANCE),
        last_daily: Set(None),
        daily_streak: Set(0),
        next_robbery: Set(None),
    }
}

/// Loads the account, inserting a fresh one first if it does not exist.
async fn ensure_account<C: ConnectionTrait>(db: &C, user: UserId) -> Result<account::Model> {
    let id = key(user)?;
    if let Some(existing) = Account::find_by_id(id).one(db).await? {
        return Ok(existing);
    }

    Account::insert(new_account(id))
        .on_conflict(
            OnConflict::column(AccountColumn::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    info!(user, balance = STARTING_BALANCE, "Created account");

    Account::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::from(DbErr::RecordNotFound(format!("account {user}"))))
}

/// Applies `delta` in one statement. Debits only match rows that can afford them.
async fn apply_delta<C: ConnectionTrait>(
    db: &C,
    account: &account::Model,
    delta: i64,
) -> Result<i64> {
    let mut update = Account::update_many()
        .col_expr(
            AccountColumn::Balance,
            Expr::col(AccountColumn::Balance).add(delta),
        )
        .filter(AccountColumn::Id.eq(account.id));
    if delta < 0 {
        update = update.filter(AccountColumn::Balance.gte(-delta));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::InsufficientFunds {
            balance: account.balance,
            required: -delta,
        });
    }

    Account::find_by_id(account.id)
        .one(db)
        .await?
        .map(|updated| updated.balance)
        .ok_or_else(|| Error::from(DbErr::RecordNotFound(format!("account {}", account.id))))
}

/// [`Ledger`] backed by a `SeaORM` database connection.
#[derive(Debug)]
pub struct DbLedger {
    db: DatabaseConnection,
}

impl DbLedger {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Ledger for DbLedger {
    #[instrument(skip(self))]
    async fn get_balance(&self, user: UserId) -> Result<i64> {
        let account = ensure_account(&self.db, user).await?;
        debug!(balance = account.balance, "Fetched balance");
        Ok(account.balance)
    }

    #[instrument(skip(self))]
    async fn set_balance(&self, user: UserId, balance: i64) -> Result<()> {
        let account = ensure_account(&self.db, user).await?;
        let mut active: account::ActiveModel = account.into();
        active.balance = Set(balance.max(0));
        active.update(&self.db).await?;
        info!("Set balance");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn adjust_balance(&self, user: UserId, delta: i64) -> Result<i64> {
        let txn = self.db.begin().await?;
        let account = ensure_account(&txn, user).await?;
        let balance = apply_delta(&txn, &account, delta).await?;
        txn.commit().await?;
        info!(balance, "Adjusted balance");
        Ok(balance)
    }

    #[instrument(skip(self))]
    async fn transfer(&self, from: UserId, to: UserId, amount: i64) -> Result<(i64, i64)> {
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }
        if from == to {
            return Err(Error::SelfTransferDenied);
        }

        // Dropping the transaction without commit rolls both sides back.
        let txn = self.db.begin().await?;
        let sender = ensure_account(&txn, from).await?;
        let recipient = ensure_account(&txn, to).await?;
        let sender_balance = apply_delta(&txn, &sender, -amount).await?;
        let recipient_balance = apply_delta(&txn, &recipient, amount).await?;
        txn.commit().await?;

        info!(sender_balance, recipient_balance, "Transferred coins");
        Ok((sender_balance, recipient_balance))
    }

    #[instrument(skip(self))]
    async fn get_daily(&self, user: UserId, today: NaiveDate) -> Result<bool> {
        let account = ensure_account(&self.db, user).await?;
        Ok(account.last_daily.is_none_or(|last| last < today))
    }

    #[instrument(skip(self))]
    async fn set_daily(&self, user: UserId, today: NaiveDate) -> Result<()> {
        let account = ensure_account(&self.db, user).await?;
        let mut active: account::ActiveModel = account.into();
        active.last_daily = Set(Some(today));
        active.update(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_streak_and_get_bonus(&self, user: UserId, today: NaiveDate) -> Result<i64> {
        let account = ensure_account(&self.db, user).await?;
        let streak = next_streak(&account, today);

        let mut active: account::ActiveModel = account.into();
        active.daily_streak = Set(streak);
        active.update(&self.db).await?;

        let bonus = streak_bonus(streak);
        debug!(streak, bonus, "Updated streak");
        Ok(bonus)
    }

    #[instrument(skip(self))]
    async fn claim_daily(&self, user: UserId, today: NaiveDate, base: i64) -> Result<(i64, i64)> {
        let txn = self.db.begin().await?;
        let account = ensure_account(&txn, user).await?;
        let streak = next_streak(&account, today);
        let bonus = streak_bonus(streak);

        // Matches only while `today` is unclaimed, so a racing claim updates no row.
        let result = Account::update_many()
            .col_expr(
                AccountColumn::Balance,
                Expr::col(AccountColumn::Balance).add(base + bonus),
            )
            .col_expr(AccountColumn::DailyStreak, Expr::value(streak))
            .col_expr(AccountColumn::LastDaily, Expr::value(today))
            .filter(AccountColumn::Id.eq(account.id))
            .filter(
                Condition::any()
                    .add(AccountColumn::LastDaily.is_null())
                    .add(AccountColumn::LastDaily.lt(today)),
            )
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            debug!("Daily reward already claimed");
            return Err(Error::DailyAlreadyClaimed);
        }

        let balance = Account::find_by_id(account.id)
            .one(&txn)
            .await?
            .map(|updated| updated.balance)
            .ok_or_else(|| Error::from(DbErr::RecordNotFound(format!("account {user}"))))?;
        txn.commit().await?;

        info!(streak, bonus, balance, "Claimed daily reward");
        Ok((bonus, balance))
    }

    #[instrument(skip(self))]
    async fn can_rob(&self, user: UserId, today: NaiveDate) -> Result<(bool, Option<NaiveDate>)> {
        let account = ensure_account(&self.db, user).await?;
        Ok(match account.next_robbery {
            None => (true, None),
            Some(next) => (today >= next, Some(next)),
        })
    }

    #[instrument(skip(self))]
    async fn set_robbing_timeout(
        &self,
        user: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<NaiveDate> {
        let next = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        let account = ensure_account(&self.db, user).await?;
        let mut active: account::ActiveModel = account.into();
        active.next_robbery = Set(Some(next));
        active.update(&self.db).await?;
        info!(%next, "Set robbery cooldown");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: u64) -> Result<Vec<Standing>> {
        let accounts = Account::find()
            .order_by_desc(AccountColumn::Balance)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(accounts
            .into_iter()
            .filter_map(|account| {
                u64::try_from(account.id).ok().map(|user| Standing {
                    user,
                    balance: account.balance,
                })
            })
            .collect())
    }

    async fn account_count(&self) -> Result<u64> {
        Account::find().count(&self.db).await.map_err(Into::into)
    }
}
