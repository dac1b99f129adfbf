use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{Cart, CartLine, CartProduct};
use crate::pricing::format_price;

use super::{ModelValidationError, ValidationResult};

const MAX_ITEM_NAME_CHARS: usize = 120;

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub total: u64,
    pub formatted_total: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItem {
    pub product_id: u64,
    #[serde(deserialize_with = "deserialize_item_name")]
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    /// Validates the items and folds them into a cart, merging repeated
    /// products. A repeated product must carry the same price and name.
    pub fn into_cart(self) -> ValidationResult<Cart> {
        if self.user_id == Uuid::nil() {
            return Err(ModelValidationError::InvalidUserId);
        }
        if self.items.is_empty() {
            return Err(ModelValidationError::EmptyOrder);
        }

        let mut cart = Cart::new();
        for item in self.items {
            if item.quantity == 0 {
                return Err(ModelValidationError::InvalidQuantity);
            }
            ensure_valid_item_name(&item.name)?;

            if let Some(line) = cart.line(item.product_id)
                && (line.product.unit_price != item.unit_price || line.product.name != item.name)
            {
                tracing::debug!(
                    product_id = item.product_id,
                    "Order rejected: repeated product with different price or name"
                );
                return Err(ModelValidationError::ConflictingItem(item.product_id));
            }

            cart.add_or_increment(
                CartProduct {
                    id: item.product_id,
                    name: item.name,
                    unit_price: item.unit_price,
                },
                item.quantity,
            );
        }
        Ok(cart)
    }

    pub fn place(self) -> ValidationResult<Order> {
        let user_id = self.user_id;
        let cart = self.into_cart()?;
        let total = cart.total();

        Ok(Order {
            id: Uuid::new_v4(),
            user_id,
            lines: cart.into_lines(),
            total,
            formatted_total: format_price(total),
            created_at: Utc::now(),
        })
    }
}

fn deserialize_item_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(de::Error::custom("item name must not be empty"));
    }
    Ok(trimmed)
}

fn ensure_valid_item_name(value: &str) -> ValidationResult<()> {
    let len = value.chars().count();
    if len == 0 || len > MAX_ITEM_NAME_CHARS || value.chars().any(char::is_control) {
        return Err(ModelValidationError::InvalidItemName);
    }
    Ok(())
}
