//! Catalog browsing.

use shopfront_client::session::Shopfront;
use shopfront_core::ProductId;

use crate::error::CliError;
use crate::output;

pub async fn list(session: &Shopfront) -> Result<(), CliError> {
    let products = session.api().list_products().await.into_result()?;
    output::products(&products);
    Ok(())
}

pub async fn show(session: &Shopfront, id: ProductId) -> Result<(), CliError> {
    let product = session.api().find_product(id).await.into_result()?;
    output::product(&product);
    Ok(())
}
