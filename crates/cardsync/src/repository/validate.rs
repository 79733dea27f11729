//! Field constraints for card records.
//!
//! These mirror the column widths in the schema migration so that an
//! oversized value is rejected as invalid input instead of surfacing as a
//! backend-specific database error (SQLite would silently accept it).

use sea_orm::ActiveValue;

use crate::entity::card::ActiveModel;

use super::errors::{RepositoryError, Result};

pub const MAX_EXTERNAL_ID_LEN: usize = 128;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_NUMBER_LEN: usize = 32;
pub const MAX_RARITY_LEN: usize = 64;
pub const MAX_CARD_TYPE_LEN: usize = 64;
pub const MAX_SET_NAME_LEN: usize = 200;

/// Validate a card before it is written.
///
/// # Errors
/// Returns `RepositoryError::InvalidInput` naming the first offending field.
pub fn validate_card(model: &ActiveModel) -> Result<()> {
    let external_id = required_active_value("external_id", &model.external_id)?;
    require_non_blank("external_id", &external_id)?;
    check_len("external_id", &external_id, MAX_EXTERNAL_ID_LEN)?;

    let name = required_active_value("name", &model.name)?;
    require_non_blank("name", &name)?;
    check_len("name", &name, MAX_NAME_LEN)?;

    check_optional_len("number", &model.number, MAX_NUMBER_LEN)?;
    check_optional_len("rarity", &model.rarity, MAX_RARITY_LEN)?;
    check_optional_len("card_type", &model.card_type, MAX_CARD_TYPE_LEN)?;
    check_optional_len("set_name", &model.set_name, MAX_SET_NAME_LEN)?;

    Ok(())
}

pub(crate) fn required_active_value<T: Clone + Into<sea_orm::Value>>(
    field: &str,
    value: &ActiveValue<T>,
) -> Result<T> {
    match value {
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => Ok(value.clone()),
        ActiveValue::NotSet => Err(RepositoryError::invalid(format!(
            "Missing required field: {}",
            field
        ))),
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RepositoryError::invalid(format!("{} is required", field)));
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(RepositoryError::invalid(format!(
            "{} is {} characters long (max {})",
            field, len, max
        )));
    }
    Ok(())
}

fn check_optional_len(field: &str, value: &ActiveValue<Option<String>>, max: usize) -> Result<()> {
    match value {
        ActiveValue::Set(Some(v)) | ActiveValue::Unchanged(Some(v)) => check_len(field, v, max),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Set;

    fn valid_card() -> ActiveModel {
        ActiveModel {
            external_id: Set("fl-1".to_string()),
            name: Set("Ember Drake".to_string()),
            rarity: Set(Some("Rare".to_string())),
            ..Default::default()
        }
    }

    fn invalid_message(model: &ActiveModel) -> String {
        match validate_card(model) {
            Err(RepositoryError::InvalidInput { message }) => message,
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn accepts_minimal_card() {
        validate_card(&valid_card()).expect("card should validate");
    }

    #[test]
    fn rejects_missing_external_id() {
        let mut card = valid_card();
        card.external_id = ActiveValue::NotSet;
        assert!(invalid_message(&card).contains("external_id"));
    }

    #[test]
    fn rejects_blank_external_id() {
        let mut card = valid_card();
        card.external_id = Set("   ".to_string());
        assert_eq!(invalid_message(&card), "external_id is required");
    }

    #[test]
    fn rejects_blank_name() {
        let mut card = valid_card();
        card.name = Set(String::new());
        assert_eq!(invalid_message(&card), "name is required");
    }

    #[test]
    fn rejects_oversized_name() {
        let mut card = valid_card();
        card.name = Set("x".repeat(MAX_NAME_LEN + 1));
        let message = invalid_message(&card);
        assert!(message.contains("name"));
        assert!(message.contains("max 200"));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut card = valid_card();
        card.rarity = Set(Some("é".repeat(MAX_RARITY_LEN)));
        validate_card(&card).expect("64 two-byte chars fit a 64 char column");
    }

    #[test]
    fn rejects_oversized_optional_field() {
        let mut card = valid_card();
        card.number = Set(Some("9".repeat(MAX_NUMBER_LEN + 1)));
        assert!(invalid_message(&card).starts_with("number"));
    }
}
