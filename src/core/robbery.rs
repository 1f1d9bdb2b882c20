//! Robbery rules: robbing another player or robbing the bank.
//!
//! This module only decides outcomes and amounts. Balance updates, cooldowns
//! and the busy-user checks happen in [`crate::core::economy::Economy::rob`].

use rand::Rng;
use rand::seq::SliceRandom;

/// Minimum balance the robber needs before robbing a player.
pub const PLAYER_ROB_MIN_ACTOR: i64 = 250;
/// Minimum balance a player must hold to be robbed.
pub const PLAYER_ROB_MIN_TARGET: i64 = 500;
/// Minimum balance needed to rob the bank.
pub const BANK_ROB_MIN_ACTOR: i64 = 300;
/// Flat reward for a successful bank robbery.
pub const BANK_ROB_REWARD: i64 = 7000;
/// Days of cooldown after robbing a player.
pub const PLAYER_COOLDOWN_DAYS: u32 = 2;
/// Days of cooldown after robbing the bank.
pub const BANK_COOLDOWN_DAYS: u32 = 5;

/// Stories told when a bank robbery fails. `{money}` is replaced by the penalty.
pub const BANK_CAUGHT: [&str; 9] = [
    "Your pistol slipped out of your hand as you tried to draw it. Someone picked it up and called the police.\n\nYou have to pay a fine of {money} :coin:.",
    "You weren't paying attention and the clerk had all the time in the world to trigger the silent alarm.\n\nThe police arrested you and fined you {money} :coin:.",
    "You wanted to take a hostage for a smooth getaway, but grabbed an off-duty police officer who arrested you on the spot.\n\nYour fine is {money} :coin:.",
    "You were so sure of yourself, but your intel was thin and you walked straight into the alarm system.\n\nYour fine is {money} :coin:.",
    "You did rob the bank, but the cameras identified you.\n\nThey found you quickly and fined you {money} :coin:.",
    "You threatened the staff with your weapon until they noticed it was a water pistol.\n\nYour fine is {money} :coin:.",
    "You and your accomplice were so nervous during the handover that you punched each other in the face, giving the police plenty of time to catch you.\n\nYour fine is {money} :coin:.",
    "You showed up full of confidence, but unfortunately you just tried to rob the police.\n\nYour fine is {money} :coin:.",
    "Heading home after a successful job, you got robbed by another robber. When you reported it to the police you got a fine of {money} :coin: and they got a new robber to chase.",
];

/// Result of rolling a player robbery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerRobOutcome {
    /// `amount` moves from the target to the robber
    Success {
        /// Coins stolen
        amount: i64,
    },
    /// The robber pays `penalty`, which nobody receives
    Caught {
        /// Coins lost
        penalty: i64,
    },
}

/// Result of rolling a bank robbery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankRobOutcome {
    /// The robber gains [`BANK_ROB_REWARD`]
    Success,
    /// The robber pays `penalty`
    Caught {
        /// Coins lost
        penalty: i64,
        /// Story to tell, still containing the `{money}` placeholder
        story: &'static str,
    },
}

/// Loot for a successful player robbery: 5% of the target, between 250 and 2500.
#[must_use]
pub fn player_loot(target_balance: i64) -> i64 {
    (target_balance * 5 / 100).clamp(250, 2500)
}

/// Penalty for a failed player robbery: 10% of the robber, at most 4000.
#[must_use]
pub fn player_penalty(actor_balance: i64) -> i64 {
    (actor_balance / 10).clamp(0, 4000)
}

/// Penalty for a failed bank robbery: 7.5% of the robber, between 300 and 5000.
#[must_use]
pub fn bank_penalty(actor_balance: i64) -> i64 {
    (actor_balance * 75 / 1000).clamp(300, 5000)
}

/// Rolls a player robbery. Succeeds when a draw from 0 to 10 is below 3.
pub fn roll_player<R: Rng + ?Sized>(
    actor_balance: i64,
    target_balance: i64,
    rng: &mut R,
) -> PlayerRobOutcome {
    if rng.gen_range(0..=10) < 3 {
        PlayerRobOutcome::Success {
            amount: player_loot(target_balance),
        }
    } else {
        PlayerRobOutcome::Caught {
            penalty: player_penalty(actor_balance),
        }
    }
}

/// Rolls a bank robbery. Succeeds when a draw from 0 to 10 is below 2.
pub fn roll_bank<R: Rng + ?Sized>(actor_balance: i64, rng: &mut R) -> BankRobOutcome {
    if rng.gen_range(0..=10) < 2 {
        return BankRobOutcome::Success;
    }
    let story = BANK_CAUGHT.choose(rng).copied().unwrap_or(BANK_CAUGHT[0]);
    BankRobOutcome::Caught {
        penalty: bank_penalty(actor_balance),
        story,
    }
}

/// Fills the penalty into a bank robbery story.
#[must_use]
pub fn tell_story(story: &str, penalty: i64) -> String {
    story.replace("{money}", &penalty.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_player_loot_bounds() {
        assert_eq!(player_loot(1000), 250);
        assert_eq!(player_loot(10_000), 500);
        assert_eq!(player_loot(1_000_000), 2500);
    }

    #[test]
    fn test_penalty_bounds() {
        assert_eq!(player_penalty(400), 40);
        assert_eq!(player_penalty(100_000), 4000);
        assert_eq!(bank_penalty(300), 300);
        assert_eq!(bank_penalty(20_000), 1500);
        assert_eq!(bank_penalty(1_000_000), 5000);
    }

    #[test]
    fn test_player_roll_rates() {
        let mut rng = StdRng::seed_from_u64(5);
        let rolls = 11_000;
        let successes = (0..rolls)
            .filter(|_| {
                matches!(
                    roll_player(400, 1000, &mut rng),
                    PlayerRobOutcome::Success { amount: 250 }
                )
            })
            .count();
        // 3 of 11 outcomes succeed
        assert!((2700..=3300).contains(&successes), "successes = {successes}");
    }

    #[test]
    fn test_bank_roll_outcomes() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut successes = 0;
        for _ in 0..11_000 {
            match roll_bank(1000, &mut rng) {
                BankRobOutcome::Success => successes += 1,
                BankRobOutcome::Caught { penalty, story } => {
                    assert_eq!(penalty, 300);
                    assert!(BANK_CAUGHT.contains(&story));
                }
            }
        }
        // 2 of 11 outcomes succeed
        assert!((1700..=2300).contains(&successes), "successes = {successes}");
    }

    #[test]
    fn test_stories_name_the_penalty() {
        for story in BANK_CAUGHT {
            let told = tell_story(story, 1234);
            assert!(told.contains("1234"));
            assert!(!told.contains("{money}"));
        }
    }
}
