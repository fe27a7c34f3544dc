//! Status enums for orders and user permissions.
//!
//! Wire values follow the storefront backend, which speaks Portuguese
//! (`AGUARDANDO_PAGAMENTO`, `ENTREGUE`, ...). The Rust names are English.
//! The customer-side final status is the mixed-case `Concluído`, unlike the
//! upper-case admin statuses.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// ```text
/// Pending (draft, created from cart)
///    -> address assigned (no status change)
///    -> Concluded (checkout finalized)
/// AwaitingPayment / Paid / InTransit / Delivered / Canceled
///    -> set one at a time from the admin panel
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Created from the cart, not yet confirmed.
    #[default]
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "AGUARDANDO_PAGAMENTO")]
    AwaitingPayment,
    #[serde(rename = "PAGO")]
    Paid,
    #[serde(rename = "EM_TRANSPORTE")]
    InTransit,
    #[serde(rename = "ENTREGUE")]
    Delivered,
    #[serde(rename = "CANCELADO")]
    Canceled,
    /// Checkout finished by the customer.
    #[serde(rename = "Concluído", alias = "CONCLUIDO", alias = "CONCLUÍDO")]
    Concluded,
}

impl OrderStatus {
    /// Statuses an administrator may set from the order panel.
    pub const ADMIN_CHOICES: [Self; 5] = [
        Self::AwaitingPayment,
        Self::Paid,
        Self::Canceled,
        Self::InTransit,
        Self::Delivered,
    ];

    /// The backend's wire value for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::AwaitingPayment => "AGUARDANDO_PAGAMENTO",
            Self::Paid => "PAGO",
            Self::InTransit => "EM_TRANSPORTE",
            Self::Delivered => "ENTREGUE",
            Self::Canceled => "CANCELADO",
            Self::Concluded => "Concluído",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingPayment => "awaiting payment",
            Self::Paid => "paid",
            Self::InTransit => "in transit",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
            Self::Concluded => "concluded",
        }
    }

    /// Whether the order is still a draft that checkout can complete.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether no further customer-driven transition is expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled | Self::Concluded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "PENDENTE" | "PENDING" => Ok(Self::Pending),
            "AGUARDANDO_PAGAMENTO" | "AWAITING_PAYMENT" => Ok(Self::AwaitingPayment),
            "PAGO" | "PAID" => Ok(Self::Paid),
            "EM_TRANSPORTE" | "IN_TRANSIT" => Ok(Self::InTransit),
            "ENTREGUE" | "DELIVERED" => Ok(Self::Delivered),
            "CANCELADO" | "CANCELED" | "CANCELLED" => Ok(Self::Canceled),
            "CONCLUIDO" | "CONCLUÍDO" | "CONCLUDED" => Ok(Self::Concluded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// User permission role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Access to the admin panel (all orders, user permissions).
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    /// Regular customer.
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    /// The backend's authority string for this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::User => "ROLE_USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ROLE_ADMIN" | "ADMIN" => Ok(Self::Admin),
            "ROLE_USER" | "USER" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
