//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;

pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
