//! Shopping cart state.
//!
//! The cart holds product lines (at most one per product), an optional
//! shipping selection, and derives its count and totals on every read.
//!
//! Every mutation rewrites the full line list to storage under
//! [`CART_STORAGE_KEY`]. A failed write is logged and otherwise ignored: the
//! in-memory cart stays authoritative. The shipping selection lives in memory
//! only.
//!
//! The id of an order placed from these lines but not yet finalized is kept
//! under [`PENDING_ORDER_KEY`], so a later run can finish that order and still
//! empty the cart.

mod storage;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

use shopfront_core::{CartItem, OrderId, Price, Product, ProductId, ShippingOption};
use tracing::{debug, warn};

use crate::api::OrderLine;
use crate::error::add_breadcrumb;

/// Storage key the cart lines are persisted under.
pub const CART_STORAGE_KEY: &str = "shoppingCart";

/// Storage key of the order placed from the cart and awaiting finalization.
pub const PENDING_ORDER_KEY: &str = "pendingOrder";

/// The cart, backed by a [`CartStorage`].
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<CartItem>,
    selected_shipping: Option<ShippingOption>,
    pending_order: Option<OrderId>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Rehydrate the cart from `storage`.
    ///
    /// Missing, unreadable, or malformed data yields an empty cart.
    pub fn open(storage: S) -> Self {
        let items = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => parse_lines(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read stored cart, starting empty");
                Vec::new()
            }
        };

        let pending_order = match storage.load(PENDING_ORDER_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "Stored pending order is malformed, ignoring it");
                None
            }),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "Failed to read stored pending order");
                None
            }
        };

        debug!(lines = items.len(), pending_order = ?pending_order, "Cart loaded");

        Self {
            items,
            selected_shipping: None,
            pending_order,
            storage,
        }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product, or appends a new line.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.add_units(product, 1);
    }

    /// Add `quantity` units of `product` with a single write.
    ///
    /// Zero is a no-op.
    pub fn add_units(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => {
                let mut line = CartItem::new(product.clone());
                line.quantity = quantity;
                self.items.push(line);
            }
        }

        let (product_id, quantity) = (product.id.to_string(), quantity.to_string());
        add_breadcrumb(
            "cart",
            "Added product",
            Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
        );
        self.persist();
    }

    /// Drop the line for `id`, if any.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.items.retain(|item| item.product_id() != id);

        let product_id = id.to_string();
        add_breadcrumb("cart", "Removed product", Some(&[("product_id", product_id.as_str())]));
        self.persist();
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Zero or below removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }

        if let Some(line) = self.line_mut(id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        let (product_id, quantity) = (id.to_string(), quantity.to_string());
        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
        );
        self.persist();
    }

    /// Empty the cart, forget the shipping selection and the pending order.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.selected_shipping = None;

        add_breadcrumb("cart", "Cleared cart", None);
        self.persist();
        self.set_pending_order(None);
    }

    /// The order placed from these lines that still awaits finalization.
    #[must_use]
    pub const fn pending_order(&self) -> Option<OrderId> {
        self.pending_order
    }

    /// Remember (or forget) the order placed from these lines.
    pub fn set_pending_order(&mut self, order_id: Option<OrderId>) {
        if self.pending_order == order_id {
            return;
        }
        self.pending_order = order_id;

        let result = serde_json::to_string(&order_id)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.save(PENDING_ORDER_KEY, &raw));
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist pending order");
        }
    }

    /// Choose a shipping option, or clear the choice with `None`.
    pub fn select_shipping_option(&mut self, option: Option<ShippingOption>) {
        self.selected_shipping = option;
    }

    /// Sum of unit price times quantity over all lines. Excludes shipping.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Cart total plus the selected shipping price.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        let shipping = self
            .selected_shipping
            .as_ref()
            .map_or(Price::ZERO, |option| option.price);
        self.cart_total() + shipping
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn selected_shipping(&self) -> Option<&ShippingOption> {
        self.selected_shipping.as_ref()
    }

    /// The `{productId, price, quantity}` lines an order is created from.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.items.iter().map(OrderLine::from).collect()
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying storage.
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.product_id() == id)
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.items)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.save(CART_STORAGE_KEY, &raw));

        if let Err(err) = result {
            warn!(error = %err, lines = self.items.len(), "Failed to persist cart");
            let error = err.to_string();
            add_breadcrumb("cart", "Cart not persisted", Some(&[("error", error.as_str())]));
        }
    }
}

/// Decode stored lines, dropping empty rows and merging duplicate products.
fn parse_lines(raw: &str) -> Vec<CartItem> {
    let parsed: Vec<CartItem> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(error = %err, "Stored cart is malformed, starting empty");
            return Vec::new();
        }
    };

    let mut items: Vec<CartItem> = Vec::with_capacity(parsed.len());
    for item in parsed.into_iter().filter(|item| item.quantity > 0) {
        match items.iter_mut().find(|line| line.product_id() == item.product_id()) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => items.push(item),
        }
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::{Category, ShippingOptionId};

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            url_image: None,
            category: Category {
                id: None,
                name: "Misc".to_string(),
            },
        }
    }

    fn shipping(cents: i64) -> ShippingOption {
        ShippingOption {
            id: ShippingOptionId::new(1),
            name: "PAC".to_string(),
            price: Price::from_cents(cents),
            delivery_time: 5,
        }
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::open(MemoryStorage::new())
    }

    fn quantities<S: CartStorage>(cart: &CartStore<S>) -> Vec<(i64, u32)> {
        let mut lines: Vec<_> = cart
            .items()
            .iter()
            .map(|item| (item.product_id().as_i64(), item.quantity))
            .collect();
        lines.sort_unstable();
        lines
    }

    #[test]
    fn test_repeated_adds_keep_one_line_per_product() {
        let mut cart = store();
        for id in [1, 2, 1, 3, 1, 2] {
            cart.add_to_cart(&product(id, 100));
        }

        assert_eq!(quantities(&cart), vec![(1, 3), (2, 2), (3, 1)]);
        assert_eq!(cart.cart_count(), 6);
    }

    #[test]
    fn test_add_units_writes_once() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        let writes = cart.storage().writes();

        cart.add_units(&product(1, 100), 5);
        cart.add_units(&product(2, 200), 0);

        assert_eq!(quantities(&cart), vec![(1, 6)]);
        assert_eq!(cart.storage().writes(), writes + 1);

        let reopened = CartStore::open(cart.storage().clone());
        assert_eq!(quantities(&reopened), vec![(1, 6)]);
    }

    #[test]
    fn test_pending_order_survives_reopen_until_cleared() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        cart.set_pending_order(Some(OrderId::new(42)));
        assert_eq!(cart.storage().get(PENDING_ORDER_KEY), Some("42"));

        let mut reopened = CartStore::open(cart.storage().clone());
        assert_eq!(reopened.pending_order(), Some(OrderId::new(42)));

        reopened.clear_cart();
        assert_eq!(reopened.pending_order(), None);
        assert_eq!(reopened.storage().get(PENDING_ORDER_KEY), Some("null"));
        assert_eq!(CartStore::open(reopened.storage().clone()).pending_order(), None);
    }

    #[test]
    fn test_malformed_pending_order_is_ignored() {
        let cart = CartStore::open(MemoryStorage::with_value(PENDING_ORDER_KEY, "{oops"));
        assert_eq!(cart.pending_order(), None);
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let mut a = store();
        let mut b = store();
        for cart in [&mut a, &mut b] {
            cart.add_to_cart(&product(1, 100));
            cart.add_to_cart(&product(2, 200));
        }

        a.update_quantity(ProductId::new(1), 0);
        b.remove_from_cart(ProductId::new(1));

        assert_eq!(a.items(), b.items());
        assert_eq!(a.storage().get(CART_STORAGE_KEY), b.storage().get(CART_STORAGE_KEY));
    }

    #[test]
    fn test_negative_quantity_removes_line() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        cart.update_quantity(ProductId::new(1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_exact_value() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        cart.add_to_cart(&product(1, 100));

        cart.update_quantity(ProductId::new(1), 5);
        assert_eq!(quantities(&cart), vec![(1, 5)]);

        cart.update_quantity(ProductId::new(9), 4);
        assert_eq!(quantities(&cart), vec![(1, 5)]);
    }

    #[test]
    fn test_cart_total_scenario() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 1000));
        cart.add_to_cart(&product(1, 1000));
        cart.add_to_cart(&product(2, 550));

        assert_eq!(cart.cart_total(), Price::from_cents(2550));
        assert_eq!(cart.cart_total().to_string(), "R$ 25,50");
    }

    #[test]
    fn test_totals_track_mutations() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 1000));
        assert_eq!(cart.cart_total(), Price::from_cents(1000));

        cart.update_quantity(ProductId::new(1), 4);
        assert_eq!(cart.cart_total(), Price::from_cents(4000));

        cart.select_shipping_option(Some(shipping(1590)));
        assert_eq!(cart.cart_total(), Price::from_cents(4000));
        assert_eq!(cart.grand_total(), Price::from_cents(5590));

        cart.remove_from_cart(ProductId::new(1));
        assert_eq!(cart.cart_total(), Price::ZERO);
        assert_eq!(cart.cart_count(), 0);
    }

    #[test]
    fn test_clear_cart_resets_lines_and_shipping() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        cart.select_shipping_option(Some(shipping(990)));

        cart.clear_cart();

        assert!(cart.is_empty());
        assert!(cart.selected_shipping().is_none());
        assert_eq!(cart.storage().get(CART_STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_select_shipping_none_clears() {
        let mut cart = store();
        cart.select_shipping_option(Some(shipping(990)));
        cart.select_shipping_option(None);
        assert!(cart.selected_shipping().is_none());
    }

    #[test]
    fn test_rehydrate_round_trip() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 1000));
        cart.add_to_cart(&product(2, 550));
        cart.add_to_cart(&product(1, 1000));
        cart.select_shipping_option(Some(shipping(990)));

        let raw = cart.storage().get(CART_STORAGE_KEY).unwrap().to_string();
        let reopened = CartStore::open(MemoryStorage::with_value(CART_STORAGE_KEY, &raw));

        assert_eq!(quantities(&reopened), quantities(&cart));
        assert_eq!(reopened.cart_total(), cart.cart_total());
        // Shipping is not persisted.
        assert!(reopened.selected_shipping().is_none());
    }

    #[test]
    fn test_malformed_storage_yields_empty_cart() {
        for raw in ["not json", "{\"id\":1}", "[{\"id\":1,\"quantity\":-2}]", ""] {
            let cart = CartStore::open(MemoryStorage::with_value(CART_STORAGE_KEY, raw));
            assert!(cart.is_empty(), "expected empty cart for {raw:?}");
        }
    }

    #[test]
    fn test_rehydrate_drops_empty_rows_and_merges_duplicates() {
        let line = |id: i64, quantity: u32| {
            let mut item = CartItem::new(product(id, 100));
            item.quantity = quantity;
            item
        };
        let raw = serde_json::to_string(&[line(1, 2), line(2, 0), line(1, 3)]).unwrap();

        let cart = CartStore::open(MemoryStorage::with_value(CART_STORAGE_KEY, &raw));
        assert_eq!(quantities(&cart), vec![(1, 5)]);
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut cart = store();
        cart.add_to_cart(&product(1, 100));
        cart.storage_mut().set_fail_writes(true);

        cart.add_to_cart(&product(2, 200));
        cart.update_quantity(ProductId::new(1), 3);

        assert_eq!(quantities(&cart), vec![(1, 3), (2, 1)]);
        let stored: Vec<CartItem> =
            serde_json::from_str(cart.storage().get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, 1);
    }

    #[test]
    fn test_order_lines_projection() {
        let mut cart = store();
        cart.add_to_cart(&product(7, 1250));
        cart.add_to_cart(&product(7, 1250));

        let lines = cart.order_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, ProductId::new(7));
        assert_eq!(lines[0].price, Price::from_cents(1250));
        assert_eq!(lines[0].quantity, 2);
    }
}
