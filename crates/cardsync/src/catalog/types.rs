//! Catalog API data types.
//!
//! Items are foreign input. Each field is read on its own, and a field with
//! the wrong shape is treated as absent so that one bad value never rejects
//! a whole page.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Image URLs attached to a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardImages {
    pub small: Option<String>,
    pub large: Option<String>,
}

/// A raw card as returned inside a catalog page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteCardItem {
    /// Catalog identifier, normalized to a string.
    pub id: Option<String>,
    pub name: Option<String>,
    /// Collector number, normalized to a string.
    pub number: Option<String>,
    pub rarity: Option<String>,
    pub card_type: Option<String>,
    pub effect: Option<String>,
    pub description: Option<String>,
    pub images: Option<CardImages>,
    pub image_url: Option<String>,
    pub set_name: Option<String>,
    /// Energy cost descriptor exactly as sent.
    pub energy_cost: Option<Value>,
    /// Every field without a dedicated slot above.
    pub extra: Map<String, Value>,
}

const KNOWN_FIELDS: &[&str] = &[
    "id",
    "name",
    "number",
    "rarity",
    "type",
    "effect",
    "description",
    "images",
    "imageUrl",
    "set",
    "energyCost",
    "cost",
];

impl RemoteCardItem {
    /// Read an item from an arbitrary JSON value. Never fails.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let energy_cost = fields
            .get("energyCost")
            .filter(|v| !v.is_null())
            .or_else(|| fields.get("cost").filter(|v| !v.is_null()))
            .cloned();

        let item = Self {
            id: fields.get("id").and_then(scalar_string),
            name: fields.get("name").and_then(text),
            number: fields.get("number").and_then(scalar_string),
            rarity: fields.get("rarity").and_then(text),
            card_type: fields.get("type").and_then(text),
            effect: fields.get("effect").and_then(text),
            description: fields.get("description").and_then(text),
            images: fields.get("images").and_then(images),
            image_url: fields.get("imageUrl").and_then(text),
            set_name: fields.get("set").and_then(set_name),
            energy_cost,
            extra: Map::new(),
        };

        fields.retain(|key, _| !KNOWN_FIELDS.contains(&key.as_str()));
        Self {
            extra: fields,
            ..item
        }
    }

    /// Name for display: the name, else the id, else `<unknown>`. Blank values are skipped.
    #[must_use]
    pub fn display_name(&self) -> String {
        let non_blank = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());
        non_blank(&self.name)
            .or_else(|| non_blank(&self.id))
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}

impl<'de> Deserialize<'de> for RemoteCardItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn images(value: &Value) -> Option<CardImages> {
    let obj = value.as_object()?;
    Some(CardImages {
        small: obj.get("small").and_then(text),
        large: obj.get("large").and_then(text),
    })
}

fn set_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("name").and_then(text),
        _ => None,
    }
}

/// One page of the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardPage {
    pub data: Vec<RemoteCardItem>,
    /// Total number of matching items, when the API reports it.
    #[serde(
        default,
        rename = "totalCount",
        deserialize_with = "lenient_total_count"
    )]
    pub total_count: Option<usize>,
}

fn lenient_total_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|n| usize::try_from(n).ok()))
}

/// Filter applied to every page request of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    /// Match cards by name.
    pub name: Option<String>,
}

impl CardFilter {
    /// No filter: the whole catalog.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to cards matching `name`.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}
