//! Common re-exports for convenient entity usage.

pub use super::card::{
    ActiveModel as CardActiveModel, Column as CardColumn, Entity as Card, Model as CardModel,
};
