//! SeaORM entity definitions for the cardsync database schema.

pub mod card;
pub mod prelude;
