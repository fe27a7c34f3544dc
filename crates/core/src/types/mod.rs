//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! resource shapes returned by the storefront backend.

pub mod address;
pub mod catalog;
pub mod id;
pub mod order;
pub mod postal_code;
pub mod price;
pub mod status;
pub mod user;

pub use address::Address;
pub use catalog::{CartItem, Category, Product, ShippingOption};
pub use id::*;
pub use order::{AddressRef, Order, OrderItem, OrderOwner};
pub use postal_code::{PostalCode, PostalCodeError};
pub use price::Price;
pub use status::*;
pub use user::{Authority, User};
