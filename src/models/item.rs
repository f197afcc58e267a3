use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::patch::Patch;
use super::validation::{check_length, check_text, not_null, Validate, ValidationErrors};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Apply the supplied fields of `patch`; `updated_at` moves to `at`
    /// unless the stored stamp is already later.
    pub fn apply(mut self, patch: UpdateItem, at: DateTime<Utc>) -> Self {
        self.name = patch.name.apply_required(self.name);
        self.description = patch.description.apply_optional(self.description);
        self.price = patch.price.apply_required(self.price);
        self.quantity = patch.quantity.apply_required(self.quantity);
        self.is_available = patch.is_available.apply_required(self.is_available);
        self.updated_at = at.max(self.updated_at);
        self
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

impl Validate for CreateItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &self.name, NAME_MAX);
        if let Some(description) = &self.description {
            check_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        check_price(&mut errors, self.price);
        check_quantity(&mut errors, self.quantity);
        errors.into_result()
    }
}

/// Partial update; only keys present in the payload are applied.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateItem {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub price: Patch<Decimal>,
    pub quantity: Patch<i64>,
    pub is_available: Patch<bool>,
}

impl Validate for UpdateItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match &self.name {
            Patch::Null => not_null(&mut errors, "name"),
            Patch::Value(name) => check_text(&mut errors, "name", name, NAME_MAX),
            Patch::Absent => {}
        }
        if let Patch::Value(description) = &self.description {
            check_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        match self.price {
            Patch::Null => not_null(&mut errors, "price"),
            Patch::Value(price) => check_price(&mut errors, price),
            Patch::Absent => {}
        }
        match self.quantity {
            Patch::Null => not_null(&mut errors, "quantity"),
            Patch::Value(quantity) => check_quantity(&mut errors, quantity),
            Patch::Absent => {}
        }
        if self.is_available.is_null() {
            not_null(&mut errors, "is_available");
        }
        errors.into_result()
    }
}

fn check_price(errors: &mut ValidationErrors, price: Decimal) {
    if price.is_sign_negative() && !price.is_zero() {
        errors.push("price", "price must not be negative");
    }
}

fn check_quantity(errors: &mut ValidationErrors, quantity: i64) {
    if quantity < 0 {
        errors.push("quantity", "quantity must not be negative");
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ItemListQuery {
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ItemSearchQuery {
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStats {
    pub total_items: i64,
    pub available_items: i64,
    pub unavailable_items: i64,
}

impl ItemStats {
    pub fn from_counts(total: i64, available: i64) -> Self {
        Self {
            total_items: total,
            available_items: available,
            unavailable_items: total - available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn sample() -> Item {
        let at = Utc::now();
        Item {
            id: 1,
            name: "Laptop".to_string(),
            description: Some("14 inch".to_string()),
            price: Decimal::from_str("999.99").unwrap(),
            quantity: 3,
            is_available: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn create_defaults() {
        let input: CreateItem = serde_json::from_str(r#"{"name":"Pen","price":1.5}"#).unwrap();
        assert_eq!(input.quantity, 0);
        assert!(input.is_available);
        assert!(input.description.is_none());
        assert_eq!(input.price, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn create_rejects_missing_price() {
        let result: Result<CreateItem, _> = serde_json::from_str(r#"{"name":"Pen"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_validation_collects_every_field() {
        let input: CreateItem =
            serde_json::from_str(r#"{"name":"  ","price":-1,"quantity":-2}"#).unwrap();
        let errors = input.validate().unwrap_err();
        let fields: Vec<_> = errors.fields().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "price", "quantity"]);
    }

    #[test]
    fn zero_price_is_allowed() {
        let input: CreateItem = serde_json::from_str(r#"{"name":"Free","price":"0"}"#).unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_rejects_null_on_required_field() {
        let patch: UpdateItem = serde_json::from_str(r#"{"name":null}"#).unwrap();
        let errors = patch.validate().unwrap_err();
        assert_eq!(errors.fields()[0].field, "name");
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let item = sample();
        let later = item.updated_at + Duration::seconds(5);
        let patch: UpdateItem =
            serde_json::from_str(r#"{"quantity":10,"description":null,"unknown":1}"#).unwrap();

        let updated = item.clone().apply(patch, later);
        assert_eq!(updated.quantity, 10);
        assert_eq!(updated.description, None);
        assert_eq!(updated.name, item.name);
        assert_eq!(updated.price, item.price);
        assert_eq!(updated.created_at, item.created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[test]
    fn apply_never_moves_updated_at_backwards() {
        let item = sample();
        let earlier = item.updated_at - Duration::seconds(60);
        let updated = item.clone().apply(UpdateItem::default(), earlier);
        assert_eq!(updated.updated_at, item.updated_at);
    }

    #[test]
    fn stats_split() {
        let stats = ItemStats::from_counts(5, 3);
        assert_eq!(stats.unavailable_items, 2);
    }
}
