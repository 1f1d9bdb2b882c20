//! Shared test utilities for `CoinBuddy`.
//!
//! In-memory databases, a fixed clock and a scripted [`Notifier`] that plays
//! the part of a Discord user.

use crate::{
    config::GameSettings,
    core::{
        economy::{Clock, Economy},
        ledger::DbLedger,
        notifier::{Choice, GameView, Notifier},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Seed used for every test economy.
pub const TEST_SEED: u64 = 42;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A ledger over a fresh in-memory database.
pub async fn setup_test_ledger() -> Result<DbLedger> {
    Ok(DbLedger::new(setup_test_db().await?))
}

/// An economy with default game settings, a seeded random source and a clock
/// stuck on `today`.
pub async fn setup_test_economy(today: NaiveDate) -> Result<Economy> {
    setup_test_economy_with(today, GameSettings::default()).await
}

/// Like [`setup_test_economy`] with custom game settings.
pub async fn setup_test_economy_with(today: NaiveDate, settings: GameSettings) -> Result<Economy> {
    let ledger = setup_test_ledger().await?;
    Ok(Economy::new(Arc::new(ledger), settings)
        .with_seed(TEST_SEED)
        .with_clock(fixed_clock(today)))
}

/// A clock that always returns `today`.
pub fn fixed_clock(today: NaiveDate) -> Clock {
    Arc::new(move || today)
}

/// Shorthand for a calendar date. Panics on an invalid date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Scripted,
    Pending,
    Failing,
}

/// A [`Notifier`] that records every view and answers from a fixed script.
///
/// Once the script runs out, `await_choice` never returns, like a player who
/// walked away.
#[derive(Debug)]
pub struct ScriptedNotifier {
    choices: Mutex<VecDeque<Choice>>,
    views: Mutex<Vec<GameView>>,
    behaviour: Behaviour,
}

impl ScriptedNotifier {
    /// Answers with `choices` in order.
    pub fn new(choices: &[Choice]) -> Self {
        Self::with_behaviour(choices, Behaviour::Scripted)
    }

    /// Never answers.
    pub fn pending() -> Self {
        Self::with_behaviour(&[], Behaviour::Pending)
    }

    /// Fails on the first view.
    pub fn failing() -> Self {
        Self::with_behaviour(&[], Behaviour::Failing)
    }

    fn with_behaviour(choices: &[Choice], behaviour: Behaviour) -> Self {
        Self {
            choices: Mutex::new(choices.iter().copied().collect()),
            views: Mutex::new(Vec::new()),
            behaviour,
        }
    }

    /// Views presented so far.
    pub fn views(&self) -> Vec<GameView> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn present(&self, view: GameView) -> Result<()> {
        if self.behaviour == Behaviour::Failing {
            return Err(Error::Io(std::io::Error::other("channel closed")));
        }
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
        Ok(())
    }

    async fn await_choice(&self, _allowed: &[Choice]) -> Result<Choice> {
        let next = if self.behaviour == Behaviour::Pending {
            None
        } else {
            self.choices
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
        };
        match next {
            Some(choice) => Ok(choice),
            None => std::future::pending().await,
        }
    }
}
