//! The economy: balances, daily rewards, transfers and robberies.
//!
//! [`Economy`] owns the ledger handle, the busy-user registry, the random
//! source and the clock. Every command goes through it; the game drivers live
//! in [`crate::core::play`].

use crate::config::GameSettings;
use crate::core::{
    ledger::{Ledger, Standing},
    robbery::{
        self, BANK_COOLDOWN_DAYS, BANK_ROB_MIN_ACTOR, BANK_ROB_REWARD, BankRobOutcome,
        PLAYER_COOLDOWN_DAYS, PLAYER_ROB_MIN_ACTOR, PLAYER_ROB_MIN_TARGET, PlayerRobOutcome,
    },
    session::{SessionRegistry, UserId},
};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument};

/// Base coins for a daily claim.
pub const DAILY_BASE: i64 = 300;

/// Number of players shown on the scoreboard.
pub const SCOREBOARD_SIZE: u64 = 10;

/// Source of "today" for daily claims and robbery cooldowns.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Result of checking a raw bet against a balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetCheck {
    /// The bet parsed as an integer of at least 1
    pub valid: bool,
    /// The bet does not exceed the balance
    pub enough: bool,
}

/// A successful daily claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyReward {
    /// Fixed part of the reward
    pub base: i64,
    /// Streak bonus on top
    pub bonus: i64,
    /// Balance after the claim
    pub balance: i64,
}

impl DailyReward {
    /// Total coins credited.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.base + self.bonus
    }
}

/// Who is being robbed when robbing a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobTarget {
    /// Target user
    pub user: UserId,
    /// The target is a bot account
    pub is_bot: bool,
}

/// What happened during a robbery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heist {
    /// Another player was robbed
    Player {
        /// Victim
        target: UserId,
        /// Roll result
        outcome: PlayerRobOutcome,
        /// Victim balance afterwards
        target_balance: i64,
    },
    /// The bank was robbed
    Bank(BankRobOutcome),
}

/// Outcome of a robbery attempt that passed every check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobberyReport {
    /// What happened
    pub heist: Heist,
    /// Robber balance afterwards
    pub balance: i64,
    /// First day the robber may rob again
    pub cooldown_until: NaiveDate,
}

/// Snapshot for the admin status command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EconomyStatus {
    /// Users inside a game or robbery right now
    pub active_sessions: usize,
    /// Accounts in the ledger
    pub accounts: u64,
}

/// Parses a bet: an integer of at least 1.
#[must_use]
pub fn parse_bet(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|bet| *bet >= 1)
}

/// Entry point for everything that touches balances.
pub struct Economy {
    ledger: Arc<dyn Ledger>,
    sessions: SessionRegistry,
    rng: Mutex<StdRng>,
    clock: Clock,
    settings: GameSettings,
}

impl Economy {
    /// Creates an economy with an entropy-seeded random source and the local date as clock.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, settings: GameSettings) -> Self {
        Self {
            ledger,
            sessions: SessionRegistry::new(),
            rng: Mutex::new(StdRng::from_entropy()),
            clock: Arc::new(|| chrono::Local::now().date_naive()),
            settings,
        }
    }

    /// Replaces the random source with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Busy-user registry.
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Ledger handle.
    #[must_use]
    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Game timings.
    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Today according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Runs `f` with the shared random source. Never hold the result across an await.
    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Current balance, opening an account on first contact.
    pub async fn balance(&self, user: UserId) -> Result<i64> {
        self.ledger.get_balance(user).await
    }

    /// Balance of another member. Bots never get an account.
    pub async fn balance_of(&self, user: UserId, is_bot: bool) -> Result<i64> {
        if is_bot {
            return Err(Error::BotTargetDenied);
        }
        self.ledger.get_balance(user).await
    }

    /// Checks whether `user` may bet `raw_bet`. Both flags are computed independently.
    pub async fn can_play(&self, user: UserId, raw_bet: &str) -> Result<BetCheck> {
        let balance = self.ledger.get_balance(user).await?;
        let bet = parse_bet(raw_bet);
        Ok(BetCheck {
            valid: bet.is_some(),
            enough: bet.is_some_and(|bet| bet <= balance),
        })
    }

    /// Parses and checks a bet, turning a failed check into the matching error.
    pub async fn check_bet(&self, user: UserId, raw_bet: &str) -> Result<i64> {
        let Some(bet) = parse_bet(raw_bet) else {
            return Err(Error::InvalidBet {
                input: raw_bet.to_string(),
            });
        };
        let balance = self.ledger.get_balance(user).await?;
        if bet > balance {
            return Err(Error::InsufficientFunds {
                balance,
                required: bet,
            });
        }
        Ok(bet)
    }

    /// Claims the daily reward.
    ///
    /// The date check, streak, credit and claim date are written together, so
    /// two claims racing on the same day credit once.
    #[instrument(skip(self))]
    pub async fn claim_daily(&self, user: UserId) -> Result<DailyReward> {
        let (bonus, balance) = self
            .ledger
            .claim_daily(user, self.today(), DAILY_BASE)
            .await?;
        info!(user, bonus, balance, "daily reward claimed");
        Ok(DailyReward {
            base: DAILY_BASE,
            bonus,
            balance,
        })
    }

    /// Sends coins from one player to another.
    ///
    /// Returns both balances afterwards. The sender must not be inside a game,
    /// and the recipient must not be either.
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        from: UserId,
        to: UserId,
        to_is_bot: bool,
        amount: i64,
    ) -> Result<(i64, i64)> {
        if from == to {
            return Err(Error::SelfTransferDenied);
        }
        if to_is_bot {
            return Err(Error::BotTargetDenied);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }
        if self.sessions.is_active(to) {
            debug!(to, "recipient is busy");
            return Err(Error::SessionBusy { user: to });
        }
        let _sender = self.sessions.try_enter(from)?;
        let balances = self.ledger.transfer(from, to, amount).await?;
        info!(from, to, amount, "coins sent");
        Ok(balances)
    }

    /// Robs `target`, or the bank when there is no target.
    ///
    /// The actor's session is held from the cooldown check to the cooldown
    /// write. The cooldown is only set once every check passed; a rejected
    /// attempt leaves balances and cooldown untouched.
    #[instrument(skip(self))]
    pub async fn rob(&self, actor: UserId, target: Option<RobTarget>) -> Result<RobberyReport> {
        let _actor = self.sessions.try_enter(actor)?;
        let today = self.today();
        let (eligible, next) = self.ledger.can_rob(actor, today).await?;
        if !eligible {
            return Err(Error::RobberyCooldown {
                until: next.unwrap_or(today),
            });
        }

        let actor_balance = self.ledger.get_balance(actor).await?;
        match target {
            Some(target) => self.rob_player(actor, actor_balance, target, today).await,
            None => self.rob_bank(actor, actor_balance, today).await,
        }
    }

    async fn rob_player(
        &self,
        actor: UserId,
        actor_balance: i64,
        target: RobTarget,
        today: NaiveDate,
    ) -> Result<RobberyReport> {
        if target.is_bot {
            return Err(Error::BotTargetDenied);
        }
        if target.user == actor {
            return Err(Error::SelfTargetDenied);
        }
        let _target = self.sessions.try_enter(target.user)?;

        if actor_balance < PLAYER_ROB_MIN_ACTOR {
            return Err(Error::InsufficientFunds {
                balance: actor_balance,
                required: PLAYER_ROB_MIN_ACTOR,
            });
        }
        let target_balance = self.ledger.get_balance(target.user).await?;
        if target_balance < PLAYER_ROB_MIN_TARGET {
            return Err(Error::TargetTooPoor {
                balance: target_balance,
                required: PLAYER_ROB_MIN_TARGET,
            });
        }

        let outcome =
            self.with_rng(|rng| robbery::roll_player(actor_balance, target_balance, rng));
        let (balance, target_balance) = match outcome {
            PlayerRobOutcome::Success { amount } => {
                let (target_balance, balance) =
                    self.ledger.transfer(target.user, actor, amount).await?;
                (balance, target_balance)
            }
            PlayerRobOutcome::Caught { penalty } => {
                (self.ledger.adjust_balance(actor, -penalty).await?, target_balance)
            }
        };
        let cooldown_until = self
            .ledger
            .set_robbing_timeout(actor, today, PLAYER_COOLDOWN_DAYS)
            .await?;
        info!(actor, target = target.user, ?outcome, "player robbed");

        Ok(RobberyReport {
            heist: Heist::Player {
                target: target.user,
                outcome,
                target_balance,
            },
            balance,
            cooldown_until,
        })
    }

    async fn rob_bank(
        &self,
        actor: UserId,
        actor_balance: i64,
        today: NaiveDate,
    ) -> Result<RobberyReport> {
        if actor_balance < BANK_ROB_MIN_ACTOR {
            return Err(Error::InsufficientFunds {
                balance: actor_balance,
                required: BANK_ROB_MIN_ACTOR,
            });
        }

        let outcome = self.with_rng(|rng| robbery::roll_bank(actor_balance, rng));
        let delta = match outcome {
            BankRobOutcome::Success => BANK_ROB_REWARD,
            BankRobOutcome::Caught { penalty, .. } => -penalty,
        };
        let balance = self.ledger.adjust_balance(actor, delta).await?;
        let cooldown_until = self
            .ledger
            .set_robbing_timeout(actor, today, BANK_COOLDOWN_DAYS)
            .await?;
        info!(actor, delta, "bank robbed");

        Ok(RobberyReport {
            heist: Heist::Bank(outcome),
            balance,
            cooldown_until,
        })
    }

    /// Richest players, best first.
    pub async fn scoreboard(&self) -> Result<Vec<Standing>> {
        self.ledger.leaderboard(SCOREBOARD_SIZE).await
    }

    /// Active sessions and account count.
    pub async fn status(&self) -> Result<EconomyStatus> {
        Ok(EconomyStatus {
            active_sessions: self.sessions.len(),
            accounts: self.ledger.account_count().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Days;

    fn player(user: UserId) -> Option<RobTarget> {
        Some(RobTarget {
            user,
            is_bot: false,
        })
    }

    #[test]
    fn test_parse_bet() {
        assert_eq!(parse_bet("25"), Some(25));
        assert_eq!(parse_bet(" 7 "), Some(7));
        assert_eq!(parse_bet("0"), None);
        assert_eq!(parse_bet("-5"), None);
        assert_eq!(parse_bet("ten"), None);
        assert_eq!(parse_bet(""), None);
    }

    #[tokio::test]
    async fn test_can_play_reports_both_flags() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;

        let check = economy.can_play(1, "1000").await?;
        assert_eq!(check, BetCheck { valid: true, enough: true });
        let check = economy.can_play(1, "1001").await?;
        assert_eq!(check, BetCheck { valid: true, enough: false });
        assert!(!economy.can_play(1, "lots").await?.valid);

        assert!(matches!(
            economy.check_bet(1, "lots").await,
            Err(Error::InvalidBet { .. })
        ));
        assert!(matches!(
            economy.check_bet(1, "1001").await,
            Err(Error::InsufficientFunds {
                balance: 1000,
                required: 1001
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_claim_once_per_day() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;

        let reward = economy.claim_daily(1).await?;
        assert_eq!(reward.total(), 300);
        assert_eq!(reward.balance, 1300);

        assert!(matches!(
            economy.claim_daily(1).await,
            Err(Error::DailyAlreadyClaimed)
        ));
        assert_eq!(economy.balance(1).await?, 1300);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_daily_claims_credit_once() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;

        let (first, second) = tokio::join!(economy.claim_daily(1), economy.claim_daily(1));
        assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
        assert!(
            matches!(first, Err(Error::DailyAlreadyClaimed))
                || matches!(second, Err(Error::DailyAlreadyClaimed))
        );
        assert_eq!(economy.balance(1).await?, 1300);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_streak_across_days() -> Result<()> {
        let ledger: Arc<dyn Ledger> = Arc::new(setup_test_ledger().await?);
        let day = |n: u64| date(2024, 5, 10).checked_add_days(Days::new(n)).unwrap();

        for (offset, expected_bonus) in [(0, 0), (1, 5), (2, 10), (4, 0)] {
            let economy = Economy::new(Arc::clone(&ledger), GameSettings::default())
                .with_clock(fixed_clock(day(offset)));
            let reward = economy.claim_daily(1).await?;
            assert_eq!(reward.bonus, expected_bonus, "day +{offset}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_send_rules() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;

        assert_eq!(economy.send(1, 2, false, 400).await?, (600, 1400));
        assert!(matches!(
            economy.send(1, 1, false, 10).await,
            Err(Error::SelfTransferDenied)
        ));
        assert!(matches!(
            economy.send(1, 2, false, 0).await,
            Err(Error::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            economy.send(1, 3, true, 10).await,
            Err(Error::BotTargetDenied)
        ));
        assert!(matches!(
            economy.send(1, 2, false, 601).await,
            Err(Error::InsufficientFunds { .. })
        ));

        let _playing = economy.sessions().try_enter(2)?;
        assert!(matches!(
            economy.send(1, 2, false, 10).await,
            Err(Error::SessionBusy { user: 2 })
        ));
        assert_eq!(economy.balance(1).await?, 600);
        assert_eq!(economy.balance(2).await?, 1400);
        assert!(!economy.sessions().is_active(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_cannot_send_while_in_a_game() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;
        let playing = economy.sessions().try_enter(1)?;

        assert!(matches!(
            economy.send(1, 2, false, 100).await,
            Err(Error::SessionBusy { user: 1 })
        ));
        assert_eq!(economy.balance(1).await?, 1000);
        assert_eq!(economy.balance(2).await?, 1000);

        drop(playing);
        assert_eq!(economy.send(1, 2, false, 100).await?, (900, 1100));
        Ok(())
    }

    #[tokio::test]
    async fn test_bot_balance_lookup_opens_no_account() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;

        assert!(matches!(
            economy.balance_of(7, true).await,
            Err(Error::BotTargetDenied)
        ));
        assert_eq!(economy.status().await?.accounts, 0);
        assert_eq!(economy.balance_of(2, false).await?, 1000);
        Ok(())
    }

    #[tokio::test]
    async fn test_rob_player_moves_coins_and_sets_cooldown() -> Result<()> {
        let today = date(2024, 5, 10);
        let economy = setup_test_economy(today).await?;
        economy.ledger().set_balance(1, 400).await?;
        economy.ledger().set_balance(2, 1000).await?;

        let report = economy.rob(1, player(2)).await?;
        let Heist::Player {
            outcome,
            target_balance,
            ..
        } = report.heist
        else {
            panic!("expected a player robbery");
        };
        match outcome {
            PlayerRobOutcome::Success { amount } => {
                assert_eq!(amount, 250);
                assert_eq!(report.balance, 650);
                assert_eq!(target_balance, 750);
            }
            PlayerRobOutcome::Caught { penalty } => {
                assert_eq!(penalty, 40);
                assert_eq!(report.balance, 360);
                assert_eq!(target_balance, 1000);
            }
        }
        assert_eq!(report.cooldown_until, date(2024, 5, 12));
        assert!(economy.sessions().is_empty());

        assert!(matches!(
            economy.rob(1, player(2)).await,
            Err(Error::RobberyCooldown { until }) if until == date(2024, 5, 12)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_robbery_changes_nothing() -> Result<()> {
        let today = date(2024, 5, 10);
        let economy = setup_test_economy(today).await?;
        economy.ledger().set_balance(1, 200).await?;

        assert!(matches!(
            economy.rob(1, player(2)).await,
            Err(Error::InsufficientFunds {
                balance: 200,
                required: 250
            })
        ));
        assert_eq!(economy.balance(1).await?, 200);
        assert_eq!(economy.balance(2).await?, 1000);
        assert_eq!(economy.ledger().can_rob(1, today).await?, (true, None));

        economy.ledger().set_balance(1, 1000).await?;
        economy.ledger().set_balance(2, 499).await?;
        assert!(matches!(
            economy.rob(1, player(2)).await,
            Err(Error::TargetTooPoor { balance: 499, .. })
        ));
        assert!(matches!(
            economy.rob(1, player(1)).await,
            Err(Error::SelfTargetDenied)
        ));
        assert!(matches!(
            economy
                .rob(1, Some(RobTarget { user: 3, is_bot: true }))
                .await,
            Err(Error::BotTargetDenied)
        ));
        assert_eq!(economy.ledger().can_rob(1, today).await?, (true, None));
        Ok(())
    }

    #[tokio::test]
    async fn test_cannot_rob_a_player_in_a_game() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;
        let _playing = economy.sessions().try_enter(2)?;

        assert!(matches!(
            economy.rob(1, player(2)).await,
            Err(Error::SessionBusy { user: 2 })
        ));
        assert!(!economy.sessions().is_active(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_busy_robber_is_rejected_before_cooldown_check() -> Result<()> {
        let today = date(2024, 5, 10);
        let economy = setup_test_economy(today).await?;
        economy.ledger().set_robbing_timeout(1, today, 2).await?;
        let _playing = economy.sessions().try_enter(1)?;

        assert!(matches!(
            economy.rob(1, None).await,
            Err(Error::SessionBusy { user: 1 })
        ));
        assert_eq!(economy.balance(1).await?, 1000);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_robberies_run_once() -> Result<()> {
        let today = date(2024, 5, 10);
        let economy = setup_test_economy(today).await?;

        let (first, second) = tokio::join!(economy.rob(1, None), economy.rob(1, None));
        assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
        assert!(
            matches!(first, Err(Error::SessionBusy { user: 1 }))
                || matches!(second, Err(Error::SessionBusy { user: 1 }))
        );

        let report = first.or(second)?;
        assert_eq!(economy.balance(1).await?, report.balance);
        assert!(matches!(
            economy.rob(1, None).await,
            Err(Error::RobberyCooldown { until }) if until == report.cooldown_until
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rob_bank() -> Result<()> {
        let today = date(2024, 5, 10);
        let economy = setup_test_economy(today).await?;
        economy.ledger().set_balance(1, 299).await?;
        assert!(matches!(
            economy.rob(1, None).await,
            Err(Error::InsufficientFunds { required: 300, .. })
        ));

        economy.ledger().set_balance(1, 4000).await?;
        let report = economy.rob(1, None).await?;
        match report.heist {
            Heist::Bank(BankRobOutcome::Success) => assert_eq!(report.balance, 11_000),
            Heist::Bank(BankRobOutcome::Caught { penalty, .. }) => {
                assert_eq!(penalty, 300);
                assert_eq!(report.balance, 3700);
            }
            Heist::Player { .. } => panic!("expected a bank robbery"),
        }
        assert_eq!(report.cooldown_until, date(2024, 5, 15));
        Ok(())
    }

    #[tokio::test]
    async fn test_scoreboard_and_status() -> Result<()> {
        let economy = setup_test_economy(date(2024, 5, 10)).await?;
        for user in 1..=12 {
            economy.ledger().set_balance(user, 100 * i64::try_from(user).unwrap()).await?;
        }
        let top = economy.scoreboard().await?;
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], Standing { user: 12, balance: 1200 });

        let _guard = economy.sessions().try_enter(5)?;
        let status = economy.status().await?;
        assert_eq!(status.active_sessions, 1);
        assert_eq!(status.accounts, 12);
        Ok(())
    }
}
