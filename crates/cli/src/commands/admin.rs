//! Administrative commands: every order, status edits, user permissions.
//!
//! # Usage
//!
//! ```bash
//! # Every order in the store
//! shop admin orders
//!
//! # Mark order 42 as paid
//! shop admin set-status 42 PAGO
//!
//! # Grant the admin role to user 3
//! shop admin grant 3 --role ROLE_ADMIN --role ROLE_USER
//! ```

use shopfront_client::session::Shopfront;
use shopfront_core::{OrderId, OrderStatus, Role, UserId};

use crate::error::CliError;
use crate::output;

pub async fn orders(session: &Shopfront) -> Result<(), CliError> {
    let orders = session.api().find_all_orders().await.into_result()?;
    output::orders(&orders);
    Ok(())
}

/// Apply a single status transition from the admin choices.
pub async fn set_status(
    session: &Shopfront,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), CliError> {
    check_admin_status(status)?;

    let order = session
        .api()
        .update_order_status(id, status)
        .await
        .into_result()?;

    tracing::info!(order_id = %id, status = %status, "Order status set");
    output::order(&order);
    Ok(())
}

pub async fn users(session: &Shopfront) -> Result<(), CliError> {
    let users = session.api().find_users().await.into_result()?;
    output::users(&users);
    Ok(())
}

/// Replace the roles granted to a user.
pub async fn grant(session: &Shopfront, id: UserId, roles: &[Role]) -> Result<(), CliError> {
    if roles.is_empty() {
        return Err(CliError::Invalid("Give at least one --role.".to_string()));
    }

    let user = session
        .api()
        .update_authorities(id, roles)
        .await
        .into_result()?;
    output::users(std::slice::from_ref(&user));
    Ok(())
}

fn check_admin_status(status: OrderStatus) -> Result<(), CliError> {
    if OrderStatus::ADMIN_CHOICES.contains(&status) {
        Ok(())
    } else {
        let choices: Vec<&str> = OrderStatus::ADMIN_CHOICES
            .iter()
            .map(OrderStatus::as_str)
            .collect();
        Err(CliError::Invalid(format!(
            "Status {status} cannot be set here. Choose one of: {}",
            choices.join(", ")
        )))
    }
}
