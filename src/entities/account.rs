//! Account entity - one row per Discord user taking part in the economy.
//!
//! Rows are created lazily the first time a user's balance, daily reward or
//! robbery cooldown is looked up, and are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Current coin balance, never negative
    pub balance: i64,
    /// Date of the last claimed daily reward, None if never claimed
    pub last_daily: Option<Date>,
    /// Consecutive daily claims, capped at 61
    pub daily_streak: i32,
    /// First date the user may rob again, None if never robbed
    pub next_robbery: Option<Date>,
}

/// Accounts have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
