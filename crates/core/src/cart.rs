//! Shopping cart state and its reducer.
//!
//! [`CartState`] is only ever changed by [`reduce`], which takes the current
//! state and a [`CartAction`] and returns the next state. Derived fields
//! (`total`, `item_count`) are recomputed from the line items after every
//! action, including when a snapshot is deserialized, so they cannot drift.
//!
//! This module performs no I/O. Persistence and change notification are the
//! job of the owning store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalogue::Product;
use crate::types::ProductId;

/// Errors produced when an action violates a cart constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity outside the accepted range for the action.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A quantity or money total no longer fits its numeric type.
    #[error("cart total out of range")]
    Overflow,
}

/// Identity of a line item: two additions with the same key merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    /// Create a line key.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        size: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.into(),
            color: color.into(),
        }
    }
}

/// One product/size/color combination in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Snapshot of the product taken when it was added.
    pub product: Product,
    pub quantity: u32,
    pub selected_size: String,
    pub selected_color: String,
}

impl CartLineItem {
    /// Returns true if this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && self.selected_size == key.size
            && self.selected_color == key.color
    }

    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product.id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }

    /// `product.price * quantity`, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Wire shape of a persisted cart. Derived fields are accepted but ignored;
/// lines are normalised by [`CartState::from_items`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartSnapshot {
    #[serde(default)]
    items: Vec<CartLineItem>,
}

impl TryFrom<CartSnapshot> for CartState {
    type Error = CartError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        Self::from_items(snapshot.items)
    }
}

/// The cart: line items plus their derived aggregates.
///
/// Serializes as `{ items, total, itemCount }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CartSnapshot")]
pub struct CartState {
    items: Vec<CartLineItem>,
    total: Decimal,
    item_count: u32,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from line items, computing the derived fields.
    ///
    /// Zero-quantity lines are dropped and lines sharing an identity key are
    /// merged into the first of them, so every key appears at most once.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if a merged quantity, the item count or
    /// the total does not fit.
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, CartError> {
        let mut lines: Vec<CartLineItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            let key = item.key();
            if let Some(line) = lines.iter_mut().find(|line| line.matches(&key)) {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CartError::Overflow)?;
            } else {
                lines.push(item);
            }
        }

        let mut total = Decimal::ZERO;
        let mut item_count: u32 = 0;
        for line in &lines {
            total = line
                .line_total()
                .and_then(|amount| total.checked_add(amount))
                .ok_or(CartError::Overflow)?;
            item_count = item_count
                .checked_add(line.quantity)
                .ok_or(CartError::Overflow)?;
        }

        Ok(Self {
            items: lines,
            total,
            item_count,
        })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of `product.price * quantity` over all lines.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line with the given identity.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.matches(key))
    }
}

/// Everything that can happen to a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `quantity` units of a product in the given size and color.
    Add {
        product: Box<Product>,
        size: String,
        color: String,
        quantity: u32,
    },
    /// Remove a line. Absent lines are ignored.
    Remove(LineKey),
    /// Set a line's quantity. Zero or negative removes the line.
    UpdateQuantity { key: LineKey, quantity: i64 },
    /// Empty the cart.
    Clear,
    /// Replace the cart with a restored snapshot.
    Load(CartState),
}

impl CartAction {
    /// Add a single unit.
    #[must_use]
    pub fn add(product: Product, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self::Add {
            product: Box::new(product),
            size: size.into(),
            color: color.into(),
            quantity: 1,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove(_) => "remove",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::Clear => "clear",
            Self::Load(_) => "load",
        }
    }
}

/// Apply an action to a cart, returning the next state.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] when `Add` is given a quantity of
/// zero, or `UpdateQuantity` a quantity larger than `u32::MAX`, and
/// [`CartError::Overflow`] when the resulting quantities or total do not
/// fit. The input state is left untouched on error.
pub fn reduce(state: &CartState, action: CartAction) -> Result<CartState, CartError> {
    match action {
        CartAction::Add {
            product,
            size,
            color,
            quantity,
        } => {
            if quantity == 0 {
                return Err(CartError::InvalidQuantity(0));
            }
            // An existing line with the same key absorbs the new one
            let mut items = state.items.clone();
            items.push(CartLineItem {
                product: *product,
                quantity,
                selected_size: size,
                selected_color: color,
            });
            CartState::from_items(items)
        }
        CartAction::Remove(key) => {
            let items = state
                .items
                .iter()
                .filter(|item| !item.matches(&key))
                .cloned()
                .collect();
            CartState::from_items(items)
        }
        CartAction::UpdateQuantity { key, quantity } => {
            if quantity <= 0 {
                return reduce(state, CartAction::Remove(key));
            }
            let quantity =
                u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
            let items = state
                .items
                .iter()
                .map(|item| {
                    if item.matches(&key) {
                        CartLineItem {
                            quantity,
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect();
            CartState::from_items(items)
        }
        CartAction::Clear => Ok(CartState::new()),
        CartAction::Load(snapshot) => CartState::from_items(snapshot.items),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::product;

    fn add(state: &CartState, p: &Product, size: &str, color: &str, quantity: u32) -> CartState {
        reduce(
            state,
            CartAction::Add {
                product: Box::new(p.clone()),
                size: size.to_string(),
                color: color.to_string(),
                quantity,
            },
        )
        .unwrap()
    }

    fn assert_invariants(state: &CartState) {
        let total: Decimal = state
            .items()
            .iter()
            .map(|i| i.product.price * Decimal::from(i.quantity))
            .sum();
        let count: u32 = state.items().iter().map(|i| i.quantity).sum();
        assert_eq!(state.total(), total);
        assert_eq!(state.item_count(), count);
    }

    #[test]
    fn test_add_then_merge_then_remove_scenario() {
        let a = product("a", 2500);
        let state = add(&CartState::new(), &a, "M", "Black", 1);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.total(), Decimal::new(2500, 2));
        assert_eq!(state.item_count(), 1);

        let state = add(&state, &a, "M", "Black", 2);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity, 3);
        assert_eq!(state.total(), Decimal::new(7500, 2));
        assert_eq!(state.item_count(), 3);

        let state = reduce(&state, CartAction::Remove(LineKey::new("a", "M", "Black"))).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.total(), Decimal::ZERO);
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_different_size_or_color_is_a_new_line() {
        let a = product("a", 1000);
        let state = add(&CartState::new(), &a, "M", "Black", 1);
        let state = add(&state, &a, "L", "Black", 1);
        let state = add(&state, &a, "M", "White", 1);
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.item_count(), 3);
        assert_invariants(&state);
    }

    #[test]
    fn test_add_zero_quantity_is_rejected() {
        let state = CartState::new();
        let result = reduce(
            &state,
            CartAction::Add {
                product: Box::new(product("a", 100)),
                size: "M".to_string(),
                color: "Black".to_string(),
                quantity: 0,
            },
        );
        assert_eq!(result, Err(CartError::InvalidQuantity(0)));
    }

    #[test]
    fn test_update_quantity_replaces() {
        let a = product("a", 1999);
        let state = add(&CartState::new(), &a, "S", "Red", 4);
        let key = LineKey::new("a", "S", "Red");
        let state = reduce(&state, CartAction::UpdateQuantity { key, quantity: 2 }).unwrap();
        assert_eq!(state.items()[0].quantity, 2);
        assert_eq!(state.total(), Decimal::new(3998, 2));
        assert_invariants(&state);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let a = product("a", 1999);
        let b = product("b", 500);
        let state = add(&CartState::new(), &a, "S", "Red", 4);
        let state = add(&state, &b, "S", "Red", 1);

        let zero = reduce(
            &state,
            CartAction::UpdateQuantity {
                key: LineKey::new("a", "S", "Red"),
                quantity: 0,
            },
        )
        .unwrap();
        assert_eq!(zero.items().len(), 1);
        assert!(zero.line(&LineKey::new("a", "S", "Red")).is_none());

        let negative = reduce(
            &state,
            CartAction::UpdateQuantity {
                key: LineKey::new("b", "S", "Red"),
                quantity: -3,
            },
        )
        .unwrap();
        assert_eq!(negative.items().len(), 1);
        assert_eq!(negative.total(), Decimal::new(7996, 2));
    }

    #[test]
    fn test_update_quantity_too_large_is_rejected() {
        let a = product("a", 100);
        let state = add(&CartState::new(), &a, "S", "Red", 1);
        let result = reduce(
            &state,
            CartAction::UpdateQuantity {
                key: LineKey::new("a", "S", "Red"),
                quantity: i64::from(u32::MAX) + 1,
            },
        );
        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));
    }

    #[test]
    fn test_update_absent_line_is_noop() {
        let a = product("a", 100);
        let state = add(&CartState::new(), &a, "S", "Red", 1);
        let next = reduce(
            &state,
            CartAction::UpdateQuantity {
                key: LineKey::new("zzz", "S", "Red"),
                quantity: 9,
            },
        )
        .unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_remove_absent_is_idempotent() {
        let a = product("a", 100);
        let state = add(&CartState::new(), &a, "S", "Red", 1);
        let key = LineKey::new("a", "XL", "Red");
        let once = reduce(&state, CartAction::Remove(key.clone())).unwrap();
        let twice = reduce(&once, CartAction::Remove(key)).unwrap();
        assert_eq!(once, state);
        assert_eq!(twice, state);
    }

    #[test]
    fn test_clear_always_empties() {
        let a = product("a", 100);
        let b = product("b", 250);
        let state = add(&CartState::new(), &a, "S", "Red", 3);
        let state = add(&state, &b, "M", "Blue", 2);
        let cleared = reduce(&state, CartAction::Clear).unwrap();
        assert_eq!(cleared, CartState::new());
        assert_eq!(cleared.total(), Decimal::ZERO);
        assert_eq!(cleared.item_count(), 0);
    }

    #[test]
    fn test_invariants_hold_across_action_sequence() {
        let products = [product("a", 1234), product("b", 99), product("c", 45_000)];
        let sizes = ["S", "M"];
        let mut state = CartState::new();
        for step in 0_usize..60 {
            let p = &products[step % products.len()];
            let size = sizes[step % sizes.len()];
            let action = match step % 4 {
                0 | 1 => CartAction::Add {
                    product: Box::new(p.clone()),
                    size: size.to_string(),
                    color: "Black".to_string(),
                    quantity: u32::try_from(step % 3 + 1).unwrap(),
                },
                2 => CartAction::UpdateQuantity {
                    key: LineKey::new(p.id.clone(), size, "Black"),
                    quantity: i64::try_from(step % 5).unwrap() - 1,
                },
                _ => CartAction::Remove(LineKey::new(p.id.clone(), size, "Black")),
            };
            state = reduce(&state, action).unwrap();
            assert_invariants(&state);
        }
    }

    #[test]
    fn test_serialized_shape() {
        let a = product("a", 1000);
        let state = add(&CartState::new(), &a, "M", "Black", 2);
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("items").is_some());
        assert_eq!(json["itemCount"], 2);
        assert_eq!(json["items"][0]["selectedSize"], "M");
        assert_eq!(json["items"][0]["selectedColor"], "Black");
    }

    #[test]
    fn test_snapshot_roundtrip_is_equal() {
        let a = product("a", 1000);
        let b = product("b", 350);
        let state = add(&CartState::new(), &a, "M", "Black", 2);
        let state = add(&state, &b, "L", "Navy", 1);
        let json = serde_json::to_string(&state).unwrap();
        let restored: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_deserialize_recomputes_drifted_totals() {
        let a = product("a", 1000);
        let state = add(&CartState::new(), &a, "M", "Black", 2);
        let mut json = serde_json::to_value(&state).unwrap();
        json["total"] = serde_json::json!("999.99");
        json["itemCount"] = serde_json::json!(42);
        let restored: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.total(), Decimal::new(2000, 2));
        assert_eq!(restored.item_count(), 2);
    }

    #[test]
    fn test_load_replaces_state() {
        let a = product("a", 1000);
        let snapshot = add(&CartState::new(), &a, "M", "Black", 2);
        let other = add(&CartState::new(), &product("z", 1), "S", "Red", 1);
        let loaded = reduce(&other, CartAction::Load(snapshot.clone())).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_add_overflowing_total_is_rejected() {
        let mut pricey = product("a", 1);
        pricey.price = Decimal::MAX;
        let state = add(&CartState::new(), &pricey, "M", "Black", 1);

        let result = reduce(
            &state,
            CartAction::Add {
                product: Box::new(pricey),
                size: "M".to_string(),
                color: "Black".to_string(),
                quantity: 1,
            },
        );
        assert_eq!(result, Err(CartError::Overflow));
        assert_eq!(state.item_count(), 1);
    }

    #[test]
    fn test_merged_quantity_overflow_is_rejected() {
        let a = product("a", 1);
        let state = add(&CartState::new(), &a, "M", "Black", u32::MAX);
        let result = reduce(&state, CartAction::add(a, "M", "Black"));
        assert_eq!(result, Err(CartError::Overflow));
    }

    #[test]
    fn test_deserialize_normalises_lines() {
        let line = |quantity: u32| {
            serde_json::json!({
                "product": product("a", 1000),
                "quantity": quantity,
                "selectedSize": "M",
                "selectedColor": "Black",
            })
        };
        let other = serde_json::json!({
            "product": product("b", 500),
            "quantity": 0,
            "selectedSize": "S",
            "selectedColor": "Red",
        });
        let json = serde_json::json!({ "items": [line(0), line(1), other, line(2)] });

        let restored: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.items().len(), 1);
        assert_eq!(restored.items()[0].quantity, 3);
        assert_eq!(restored.item_count(), 3);
        assert_eq!(restored.total(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_deserialize_overflowing_snapshot_is_an_error() {
        let mut pricey = product("a", 1);
        pricey.price = Decimal::MAX;
        let json = serde_json::json!({
            "items": [{
                "product": pricey,
                "quantity": 2,
                "selectedSize": "M",
                "selectedColor": "Black",
            }]
        });
        assert!(serde_json::from_value::<CartState>(json).is_err());
    }
}
