//! Order payload shapes.
//!
//! Orders are created and stored by the backend. The client reads them and
//! asks for transitions; it never stores a total, [`Order::total`] is always
//! recomputed from the items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::id::{AddressId, OrderId, ProductId, UserId};
use super::price::Price;
use super::status::OrderStatus;

/// One line of an order, priced at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Owner of an order. The backend sends either a bare id or a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderOwner {
    Id(UserId),
    Summary {
        id: UserId,
        #[serde(default)]
        username: Option<String>,
    },
}

impl OrderOwner {
    #[must_use]
    pub const fn id(&self) -> UserId {
        match self {
            Self::Id(id) | Self::Summary { id, .. } => *id,
        }
    }

    /// Username, when the backend embedded it.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Summary { username, .. } => username.as_deref(),
        }
    }
}

/// Delivery address attached to an order, by id or embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressRef {
    Id(AddressId),
    Embedded(Box<Address>),
}

impl AddressRef {
    /// The referenced address id, if the backend supplied one.
    #[must_use]
    pub fn id(&self) -> Option<AddressId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Embedded(address) => address.id,
        }
    }
}

/// An order resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressRef>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of price times quantity over all items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Calendar day the order was placed, when the backend sent a parseable date.
    #[must_use]
    pub fn placed_on(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?;
        NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Whether a delivery address has been assigned.
    #[must_use]
    pub const fn has_address(&self) -> bool {
        self.address.is_some()
    }
}
