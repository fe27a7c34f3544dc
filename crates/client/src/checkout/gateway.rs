//! Remote operations the checkout flow depends on.
//!
//! [`ApiClient`] is the production implementation. Tests substitute
//! in-memory fakes.

use std::future::Future;

use shopfront_core::{Address, AddressId, Order, OrderId, OrderStatus, PostalCode, ShippingOption};

use crate::api::{ApiClient, CreateOrderRequest, Envelope};

/// Order and address-book calls used during checkout.
pub trait OrderGateway {
    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Envelope<Order>> + Send;

    fn update_order_address(
        &self,
        id: OrderId,
        address_id: AddressId,
    ) -> impl Future<Output = Envelope<Order>> + Send;

    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Envelope<Order>> + Send;

    fn find_order(&self, id: OrderId) -> impl Future<Output = Envelope<Order>> + Send;

    fn find_addresses(&self) -> impl Future<Output = Envelope<Vec<Address>>> + Send;
}

/// Shipping quote lookup.
pub trait ShippingGateway {
    fn calculate_shipping(
        &self,
        cep: &PostalCode,
    ) -> impl Future<Output = Envelope<Vec<ShippingOption>>> + Send;
}

impl OrderGateway for ApiClient {
    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Envelope<Order>> + Send {
        Self::create_order(self, request)
    }

    fn update_order_address(
        &self,
        id: OrderId,
        address_id: AddressId,
    ) -> impl Future<Output = Envelope<Order>> + Send {
        Self::update_order_address(self, id, address_id)
    }

    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Envelope<Order>> + Send {
        Self::update_order_status(self, id, status)
    }

    fn find_order(&self, id: OrderId) -> impl Future<Output = Envelope<Order>> + Send {
        Self::find_order(self, id)
    }

    fn find_addresses(&self) -> impl Future<Output = Envelope<Vec<Address>>> + Send {
        Self::find_addresses(self)
    }
}

impl ShippingGateway for ApiClient {
    fn calculate_shipping(
        &self,
        cep: &PostalCode,
    ) -> impl Future<Output = Envelope<Vec<ShippingOption>>> + Send {
        Self::calculate_shipping(self, cep)
    }
}
