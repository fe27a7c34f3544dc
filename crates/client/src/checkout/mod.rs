//! Checkout: turning the cart into a finalized order.
//!
//! The backend offers no transaction spanning the three calls involved, so
//! the flow is a fixed sequence of named steps:
//!
//! ```text
//! place_order      POST /orders                       -> OrderCreated
//! complete_order   PUT  /orders/{id}/address/{addr}   -> AddressAssigned
//!                  PUT  /orders/{id}/status           -> Finalized
//! ```
//!
//! Steps run strictly one after another. A failure after the order exists is
//! reported as [`CheckoutError::Incomplete`] and leaves a [`CheckoutProgress`]
//! that [`CheckoutFlow::resume`] continues from, without creating a second
//! order. The cart is cleared only once every step has succeeded.

mod gateway;
pub mod shipping;

pub use gateway::{OrderGateway, ShippingGateway};
pub use shipping::quote_shipping;

use std::fmt;

use shopfront_core::{Address, AddressId, Order, OrderId, OrderStatus, PostalCodeError};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{CreateOrderRequest, Envelope};
use crate::cart::{CartStorage, CartStore};
use crate::error::add_breadcrumb;

/// Furthest step a checkout has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    /// The draft order exists on the backend.
    OrderCreated,
    /// A delivery address is attached to the order.
    AddressAssigned,
    /// The order reached its final status.
    Finalized,
}

impl CheckoutStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "order created",
            Self::AddressAssigned => "address assigned",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the checkout flow.
///
/// Three families: local validation (nothing was sent), remote failure before
/// an order existed, and partial completion of an existing order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Register a delivery address before checking out.")]
    NoAddress,

    #[error("Address #{0} is not in your address book.")]
    UnknownAddress(AddressId),

    #[error("Invalid postal code: {0}")]
    InvalidPostalCode(#[from] PostalCodeError),

    /// Order creation failed. Nothing exists server-side.
    #[error("Order not created: {message}")]
    OrderNotCreated { status: u16, message: String },

    /// Data needed to start checkout could not be loaded.
    #[error("{message}")]
    LoadFailed { status: u16, message: String },

    /// The order exists but a later step failed. `step` is the furthest
    /// step that did complete.
    #[error("Order #{order_id} was created but is incomplete (last step: {step}): {message}")]
    Incomplete {
        order_id: OrderId,
        step: CheckoutStep,
        status: u16,
        message: String,
    },
}

impl CheckoutError {
    /// Whether an order was created but left unfinished.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }

    /// The order this error concerns, when one exists.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Incomplete { order_id, .. } => Some(*order_id),
            _ => None,
        }
    }
}

/// Where an order stands in the checkout sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutProgress {
    order: Order,
    step: CheckoutStep,
    address_id: Option<AddressId>,
    /// Placed from the local cart in this session.
    from_cart: bool,
}

impl CheckoutProgress {
    fn created(order: Order) -> Self {
        Self {
            order,
            step: CheckoutStep::OrderCreated,
            address_id: None,
            from_cart: true,
        }
    }

    /// Progress for a draft order created earlier, e.g. one found in the
    /// order history. `None` when the order is no longer a draft.
    ///
    /// Completing such an order empties the cart only if the cart recorded it
    /// as its pending order.
    #[must_use]
    pub fn for_pending_order(order: Order) -> Option<Self> {
        if !order.status.is_draft() {
            return None;
        }

        let address_id = order.address.as_ref().and_then(|address| address.id());
        let step = if address_id.is_some() {
            CheckoutStep::AddressAssigned
        } else {
            CheckoutStep::OrderCreated
        };

        Some(Self {
            order,
            step,
            address_id,
            from_cart: false,
        })
    }

    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order.id
    }

    /// The latest copy of the order returned by the backend.
    #[must_use]
    pub const fn order(&self) -> &Order {
        &self.order
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.step == CheckoutStep::Finalized
    }

    fn needs_address(&self, address_id: AddressId) -> bool {
        self.step < CheckoutStep::AddressAssigned || self.address_id != Some(address_id)
    }

    fn incomplete<T>(&self, envelope: Envelope<T>) -> CheckoutError {
        CheckoutError::Incomplete {
            order_id: self.order.id,
            step: self.step,
            status: envelope.status,
            message: envelope.message,
        }
    }
}

/// Order and address book loaded for completing a draft order.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub order: Order,
    pub addresses: Vec<Address>,
}

impl CheckoutContext {
    /// Resumable progress for the loaded order, if it is still a draft.
    #[must_use]
    pub fn progress(&self) -> Option<CheckoutProgress> {
        CheckoutProgress::for_pending_order(self.order.clone())
    }
}

/// Drives an order from cart submission to its final status.
#[derive(Debug, Clone)]
pub struct CheckoutFlow<G> {
    gateway: G,
    final_status: OrderStatus,
}

impl<G: OrderGateway> CheckoutFlow<G> {
    /// A flow that finalizes orders as [`OrderStatus::Concluded`].
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            final_status: OrderStatus::Concluded,
        }
    }

    /// Request `status` as the final step instead.
    #[must_use]
    pub const fn with_final_status(mut self, status: OrderStatus) -> Self {
        self.final_status = status;
        self
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Create the draft order from the cart lines.
    ///
    /// The cart is left untouched either way.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] without any remote call, or
    /// [`CheckoutError::OrderNotCreated`] when the backend refuses.
    #[instrument(skip_all, fields(lines = cart.items().len()))]
    pub async fn place_order<S: CartStorage>(
        &self,
        cart: &CartStore<S>,
    ) -> Result<CheckoutProgress, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = CreateOrderRequest::from_cart(cart.items(), None);
        let response = self.gateway.create_order(&request).await;

        match response.into_result() {
            Ok(order) => {
                info!(order_id = %order.id, "Draft order created");
                let order_id = order.id.to_string();
                add_breadcrumb("checkout", "Order created", Some(&[("order_id", order_id.as_str())]));
                Ok(CheckoutProgress::created(order))
            }
            Err(failure) => {
                warn!(status = failure.status, message = %failure.message, "Order creation failed");
                Err(CheckoutError::OrderNotCreated {
                    status: failure.status,
                    message: failure.message,
                })
            }
        }
    }

    /// Run the steps `progress` has not completed yet: attach `address_id`,
    /// then request the final status. On success the cart the order was
    /// placed from is cleared, whether it was placed in this run or recorded
    /// by the cart as pending in an earlier one.
    ///
    /// The status call is only issued after the address call succeeded.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Incomplete`] naming the order when either call fails.
    /// `progress` records how far the order got.
    #[instrument(skip_all, fields(order_id = %progress.order_id(), address_id = %address_id))]
    pub async fn complete_order<S: CartStorage>(
        &self,
        cart: &mut CartStore<S>,
        progress: &mut CheckoutProgress,
        address_id: AddressId,
    ) -> Result<Order, CheckoutError> {
        let order_id = progress.order_id();
        if progress.from_cart {
            cart.set_pending_order(Some(order_id));
        }

        if progress.needs_address(address_id) {
            let response = self.gateway.update_order_address(order_id, address_id).await;
            let order = self.step_result(progress, response)?;
            progress.order = order;
            progress.step = CheckoutStep::AddressAssigned;
            progress.address_id = Some(address_id);
            info!(step = %progress.step, "Checkout step completed");
        }

        if !progress.is_finalized() {
            let response = self.gateway.update_order_status(order_id, self.final_status).await;
            let order = self.step_result(progress, response)?;
            progress.order = order;
            progress.step = CheckoutStep::Finalized;
            info!(step = %progress.step, status = %self.final_status, "Checkout step completed");
        }

        if progress.from_cart || cart.pending_order() == Some(order_id) {
            cart.clear_cart();
        }
        let order_id = order_id.to_string();
        add_breadcrumb("checkout", "Order finalized", Some(&[("order_id", order_id.as_str())]));

        Ok(progress.order.clone())
    }

    /// Place an order from the cart and complete it in one go.
    ///
    /// Address preconditions are checked before any remote call.
    ///
    /// # Errors
    ///
    /// Any [`CheckoutError`]; see [`CheckoutError::is_partial`] to tell an
    /// unfinished order from one that was never created.
    pub async fn checkout<S: CartStorage>(
        &self,
        cart: &mut CartStore<S>,
        addresses: &[Address],
        address_id: AddressId,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if addresses.is_empty() {
            return Err(CheckoutError::NoAddress);
        }
        if !addresses.iter().any(|address| address.id == Some(address_id)) {
            return Err(CheckoutError::UnknownAddress(address_id));
        }

        let mut progress = self.place_order(cart).await?;
        self.complete_order(cart, &mut progress, address_id).await
    }

    /// Retry the steps a failed checkout left undone.
    ///
    /// # Errors
    ///
    /// As [`CheckoutFlow::complete_order`].
    pub async fn resume<S: CartStorage>(
        &self,
        cart: &mut CartStore<S>,
        progress: &mut CheckoutProgress,
        address_id: AddressId,
    ) -> Result<Order, CheckoutError> {
        info!(order_id = %progress.order_id(), step = %progress.step(), "Resuming checkout");
        self.complete_order(cart, progress, address_id).await
    }

    /// Load an order and the address book together.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::LoadFailed`] if either call fails, or
    /// [`CheckoutError::NoAddress`] when the address book is empty.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn prepare(&self, order_id: OrderId) -> Result<CheckoutContext, CheckoutError> {
        let (order, addresses) =
            tokio::join!(self.gateway.find_order(order_id), self.gateway.find_addresses());

        let order = order.into_result().map_err(load_failed)?;
        let addresses = addresses.into_result().map_err(load_failed)?;

        if addresses.is_empty() {
            return Err(CheckoutError::NoAddress);
        }

        Ok(CheckoutContext { order, addresses })
    }

    fn step_result(
        &self,
        progress: &CheckoutProgress,
        response: Envelope<Order>,
    ) -> Result<Order, CheckoutError> {
        let err = match response {
            Envelope {
                success: true,
                data: Some(order),
                ..
            } => return Ok(order),
            Envelope {
                success: true,
                status,
                ..
            } => progress.incomplete(Envelope::<()>::failure(
                status,
                "The backend returned no order.",
            )),
            failure => progress.incomplete(failure),
        };

        error!(
            order_id = %progress.order_id(),
            step = %progress.step(),
            final_status = %self.final_status,
            error = %err,
            "Checkout left an incomplete order"
        );
        Err(err)
    }
}

fn load_failed(failure: Envelope<()>) -> CheckoutError {
    CheckoutError::LoadFailed {
        status: failure.status,
        message: failure.message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use shopfront_core::{
        AddressRef, Category, PostalCode, Price, Product, ProductId, ShippingOption,
        ShippingOptionId,
    };

    use super::*;
    use crate::cart::MemoryStorage;

    const ORDER_ID: i64 = 42;
    const ADDRESS_ID: i64 = 7;

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<String>>,
        create_failures: AtomicU32,
        address_failures: AtomicU32,
        status_failures: AtomicU32,
        empty_status_responses: AtomicU32,
        addresses: Vec<Address>,
    }

    impl FakeGateway {
        fn with_addresses() -> Self {
            Self {
                addresses: vec![address(ADDRESS_ID)],
                ..Self::default()
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn order(status: OrderStatus, address: Option<AddressId>) -> Order {
        Order {
            id: OrderId::new(ORDER_ID),
            date: Some("2024-05-01T10:00:00".to_string()),
            status,
            user: None,
            address: address.map(AddressRef::Id),
            items: Vec::new(),
        }
    }

    fn address(id: i64) -> Address {
        Address {
            id: Some(AddressId::new(id)),
            zip_code: "01310-100".to_string(),
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            ..Address::default()
        }
    }

    impl OrderGateway for FakeGateway {
        async fn create_order(&self, request: &CreateOrderRequest) -> Envelope<Order> {
            self.record(format!("create {}", request.items.len()));
            if take_failure(&self.create_failures) {
                return Envelope::failure(400, "Cart is empty");
            }
            Envelope::ok(201, "Order created.", order(OrderStatus::Pending, None))
        }

        async fn update_order_address(&self, id: OrderId, address_id: AddressId) -> Envelope<Order> {
            self.record(format!("address {id} {address_id}"));
            if take_failure(&self.address_failures) {
                return Envelope::failure(500, "Could not update the order address.");
            }
            Envelope::ok(200, "Order address updated.", order(OrderStatus::Pending, Some(address_id)))
        }

        async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Envelope<Order> {
            self.record(format!("status {id} {status}"));
            if take_failure(&self.status_failures) {
                return Envelope::failure(503, "Could not update the order status.");
            }
            if take_failure(&self.empty_status_responses) {
                return Envelope {
                    status: 204,
                    success: true,
                    message: "Order status updated.".to_string(),
                    data: None,
                };
            }
            Envelope::ok(
                200,
                "Order status updated.",
                order(status, Some(AddressId::new(ADDRESS_ID))),
            )
        }

        async fn find_order(&self, id: OrderId) -> Envelope<Order> {
            self.record(format!("find {id}"));
            Envelope::ok(200, "Order loaded.", order(OrderStatus::Pending, None))
        }

        async fn find_addresses(&self) -> Envelope<Vec<Address>> {
            self.record("addresses".to_string());
            Envelope::ok(200, "Addresses loaded.", self.addresses.clone())
        }
    }

    impl ShippingGateway for FakeGateway {
        async fn calculate_shipping(&self, cep: &PostalCode) -> Envelope<Vec<ShippingOption>> {
            self.record(format!("shipping {}", cep.as_str()));
            Envelope::ok(200, "Shipping calculated.", vec![shipping_option(2190)])
        }
    }

    fn shipping_option(cents: i64) -> ShippingOption {
        ShippingOption {
            id: ShippingOptionId::new(1),
            name: "SEDEX".to_string(),
            price: Price::from_cents(cents),
            delivery_time: 2,
        }
    }

    fn filled_cart() -> CartStore<MemoryStorage> {
        let mut cart = CartStore::open(MemoryStorage::new());
        for (id, cents) in [(1, 1000), (1, 1000), (2, 550)] {
            cart.add_to_cart(&Product {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                description: String::new(),
                price: Price::from_cents(cents),
                url_image: None,
                category: Category {
                    id: None,
                    name: "Misc".to_string(),
                },
            });
        }
        cart.select_shipping_option(Some(shipping_option(1500)));
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_issues_no_calls() {
        let flow = CheckoutFlow::new(FakeGateway::with_addresses());
        let mut cart = CartStore::open(MemoryStorage::new());

        let err = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let err = flow.place_order(&cart).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(flow.gateway().calls().is_empty());
    }

    #[tokio::test]
    async fn test_address_preconditions_checked_before_any_call() {
        let flow = CheckoutFlow::new(FakeGateway::default());
        let mut cart = filled_cart();

        let err = flow
            .checkout(&mut cart, &[], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoAddress));

        let err = flow
            .checkout(&mut cart, &[address(3)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownAddress(id) if id.as_i64() == ADDRESS_ID));

        assert!(flow.gateway().calls().is_empty());
        assert_eq!(cart.cart_count(), 3);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_cart_and_stops() {
        let gateway = FakeGateway::with_addresses();
        gateway.create_failures.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();

        let err = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();

        assert!(!err.is_partial());
        assert!(
            matches!(&err, CheckoutError::OrderNotCreated { status: 400, message } if message == "Cart is empty")
        );
        assert_eq!(flow.gateway().calls(), vec!["create 2"]);
        assert_eq!(cart.cart_count(), 3);
        assert!(cart.selected_shipping().is_some());
    }

    #[tokio::test]
    async fn test_address_failure_reports_partial_and_skips_finalize() {
        let gateway = FakeGateway::with_addresses();
        gateway.address_failures.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();

        let err = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();

        assert!(err.is_partial());
        assert_eq!(err.order_id(), Some(OrderId::new(ORDER_ID)));
        assert!(matches!(
            err,
            CheckoutError::Incomplete {
                step: CheckoutStep::OrderCreated,
                status: 500,
                ..
            }
        ));
        assert!(err.to_string().contains("#42"));

        assert_eq!(flow.gateway().calls(), vec!["create 2", "address 42 7"]);
        assert_eq!(cart.cart_count(), 3);
        assert!(cart.selected_shipping().is_some());
    }

    #[tokio::test]
    async fn test_successful_checkout_clears_cart_and_shipping() {
        let flow = CheckoutFlow::new(FakeGateway::with_addresses());
        let mut cart = filled_cart();

        let order = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Concluded);
        assert_eq!(
            flow.gateway().calls(),
            vec!["create 2", "address 42 7", "status 42 Concluído"]
        );
        assert!(cart.is_empty());
        assert!(cart.selected_shipping().is_none());
        assert_eq!(cart.storage().get(crate::cart::CART_STORAGE_KEY), Some("[]"));
    }

    #[tokio::test]
    async fn test_resume_after_failed_finalize_only_finalizes() {
        let gateway = FakeGateway::with_addresses();
        gateway.status_failures.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();
        let address_id = AddressId::new(ADDRESS_ID);

        let mut progress = flow.place_order(&cart).await.unwrap();
        let err = flow
            .complete_order(&mut cart, &mut progress, address_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Incomplete {
                step: CheckoutStep::AddressAssigned,
                status: 503,
                ..
            }
        ));
        assert_eq!(progress.step(), CheckoutStep::AddressAssigned);
        assert!(!cart.is_empty());

        let order = flow.resume(&mut cart, &mut progress, address_id).await.unwrap();

        assert_eq!(order.status, OrderStatus::Concluded);
        assert!(progress.is_finalized());
        assert!(cart.is_empty());
        assert_eq!(
            flow.gateway().calls(),
            vec![
                "create 2",
                "address 42 7",
                "status 42 Concluído",
                "status 42 Concluído"
            ]
        );
    }

    #[tokio::test]
    async fn test_resume_with_other_address_reassigns() {
        let gateway = FakeGateway::with_addresses();
        gateway.status_failures.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();

        let mut progress = flow.place_order(&cart).await.unwrap();
        flow.complete_order(&mut cart, &mut progress, AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();
        flow.resume(&mut cart, &mut progress, AddressId::new(8))
            .await
            .unwrap();

        let calls = flow.gateway().calls();
        assert_eq!(calls[3..], ["address 42 8", "status 42 Concluído"]);
    }

    #[tokio::test]
    async fn test_unrelated_draft_from_history_leaves_cart() {
        let flow = CheckoutFlow::new(FakeGateway::with_addresses());
        let mut cart = filled_cart();
        assert_eq!(cart.pending_order(), None);

        assert!(CheckoutProgress::for_pending_order(order(OrderStatus::Paid, None)).is_none());

        let mut progress = CheckoutProgress::for_pending_order(order(
            OrderStatus::Pending,
            Some(AddressId::new(ADDRESS_ID)),
        ))
        .unwrap();
        assert_eq!(progress.step(), CheckoutStep::AddressAssigned);

        flow.resume(&mut cart, &mut progress, AddressId::new(ADDRESS_ID))
            .await
            .unwrap();
        assert_eq!(flow.gateway().calls(), vec!["status 42 Concluído"]);
        assert_eq!(cart.cart_count(), 3);
    }

    #[tokio::test]
    async fn test_finishing_pending_order_later_empties_its_cart() {
        let gateway = FakeGateway::with_addresses();
        gateway.address_failures.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();
        let address_id = AddressId::new(ADDRESS_ID);

        let err = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], address_id)
            .await
            .unwrap_err();
        assert!(err.is_partial());
        assert_eq!(cart.pending_order(), Some(OrderId::new(ORDER_ID)));

        // A later run starts from what was stored.
        let mut cart = CartStore::open(cart.storage().clone());
        assert_eq!(cart.pending_order(), Some(OrderId::new(ORDER_ID)));
        assert_eq!(cart.cart_count(), 3);

        let context = flow.prepare(OrderId::new(ORDER_ID)).await.unwrap();
        let mut progress = context.progress().unwrap();
        let order = flow.resume(&mut cart, &mut progress, address_id).await.unwrap();

        assert_eq!(order.status, OrderStatus::Concluded);
        assert!(cart.is_empty());
        assert_eq!(cart.pending_order(), None);
        assert_eq!(cart.storage().get(crate::cart::CART_STORAGE_KEY), Some("[]"));
    }

    #[tokio::test]
    async fn test_success_without_order_is_incomplete() {
        let gateway = FakeGateway::with_addresses();
        gateway.empty_status_responses.store(1, Ordering::SeqCst);
        let flow = CheckoutFlow::new(gateway);
        let mut cart = filled_cart();

        let err = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            CheckoutError::Incomplete {
                step: CheckoutStep::AddressAssigned,
                status: 204,
                message,
                ..
            } if message == "The backend returned no order."
        ));
        assert_eq!(cart.cart_count(), 3);
        assert_eq!(cart.pending_order(), Some(OrderId::new(ORDER_ID)));
    }

    #[tokio::test]
    async fn test_custom_final_status() {
        let flow = CheckoutFlow::new(FakeGateway::with_addresses())
            .with_final_status(OrderStatus::AwaitingPayment);
        let mut cart = filled_cart();

        let order = flow
            .checkout(&mut cart, &[address(ADDRESS_ID)], AddressId::new(ADDRESS_ID))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_prepare_loads_order_and_addresses() {
        let flow = CheckoutFlow::new(FakeGateway::with_addresses());
        let context = flow.prepare(OrderId::new(ORDER_ID)).await.unwrap();

        assert_eq!(context.order.id, OrderId::new(ORDER_ID));
        assert_eq!(context.addresses.len(), 1);
        assert!(context.progress().is_some());

        let mut calls = flow.gateway().calls();
        calls.sort();
        assert_eq!(calls, vec!["addresses", "find 42"]);
    }

    #[tokio::test]
    async fn test_prepare_without_addresses() {
        let flow = CheckoutFlow::new(FakeGateway::default());
        let err = flow.prepare(OrderId::new(ORDER_ID)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NoAddress));
    }

    #[tokio::test]
    async fn test_invalid_cep_issues_no_call_and_keeps_selection() {
        let gateway = FakeGateway::default();
        let mut cart = filled_cart();

        let err = quote_shipping(&gateway, &mut cart, "0131").await.unwrap_err();

        assert!(matches!(err, CheckoutError::InvalidPostalCode(_)));
        assert!(gateway.calls().is_empty());
        assert!(cart.selected_shipping().is_some());
    }

    #[tokio::test]
    async fn test_quote_clears_selection_and_requests_digits() {
        let gateway = FakeGateway::default();
        let mut cart = filled_cart();

        let response = quote_shipping(&gateway, &mut cart, "01310-100").await.unwrap();

        assert!(response.success);
        assert_eq!(response.data.unwrap().len(), 1);
        assert!(cart.selected_shipping().is_none());
        assert_eq!(gateway.calls(), vec!["shipping 01310100"]);
    }
}
