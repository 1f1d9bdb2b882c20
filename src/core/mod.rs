//! Game rules, the ledger and the orchestration that ties them together.
//!
//! Nothing in here knows about Discord. The bot layer talks to [`economy::Economy`]
//! and renders the views it receives through a [`notifier::Notifier`].

pub mod blackjack;
pub mod cards;
pub mod economy;
pub mod higher_lower;
pub mod ledger;
pub mod notifier;
pub mod play;
pub mod robbery;
pub mod roulette;
pub mod session;
