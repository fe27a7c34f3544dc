//! Terminal rendering of command results.

#![allow(clippy::print_stdout)]

use shopfront_client::cart::{CartStorage, CartStore};
use shopfront_core::{Address, Order, Product, ShippingOption, User};

pub fn message(text: &str) {
    println!("{text}");
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for product in products {
        println!(
            "{:>5}  {:<40} {:>14}  [{}]",
            product.id, product.name, product.price, product.category.name
        );
    }
}

pub fn product(product: &Product) {
    println!("#{} {}", product.id, product.name);
    println!("  Price:    {}", product.price);
    println!("  Category: {}", product.category.name);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    if let Some(image) = &product.url_image {
        println!("  Image:    {image}");
    }
}

pub fn cart<S: CartStorage>(cart: &CartStore<S>) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>5}  {:<40} {:>3} x {:>12} = {:>14}",
            item.product_id(),
            item.product.name,
            item.quantity,
            item.unit_price(),
            item.line_total()
        );
    }
    println!("Items:    {}", cart.cart_count());
    println!("Subtotal: {}", cart.cart_total());
    if let Some(option) = cart.selected_shipping() {
        println!("Shipping: {} ({})", option.price, option.name);
        println!("Total:    {}", cart.grand_total());
    }
}

pub fn shipping_options(options: &[ShippingOption]) {
    if options.is_empty() {
        println!("No shipping options for this postal code.");
        return;
    }
    for option in options {
        println!(
            "{:>5}  {:<24} {:>12}  {} business day(s)",
            option.id, option.name, option.price, option.delivery_time
        );
    }
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders.");
        return;
    }
    for order in orders {
        let date = order
            .placed_on()
            .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string());
        println!(
            "#{:<6} {:<10} {:<22} {:>3} item(s) {:>14}",
            order.id,
            date,
            order.status.label(),
            order.item_count(),
            order.total()
        );
    }
}

pub fn order(order: &Order) {
    println!("Order #{} ({})", order.id, order.status.label());
    for item in &order.items {
        println!(
            "  product {:>5}  {:>3} x {:>12} = {:>14}",
            item.product_id,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    println!("  Total: {}", order.total());
    match order.address.as_ref().and_then(|address| address.id()) {
        Some(id) => println!("  Delivery address: #{id}"),
        None if order.has_address() => println!("  Delivery address: assigned"),
        None => println!("  Delivery address: none"),
    }
}

pub fn addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        println!("No addresses registered.");
        return;
    }
    for address in addresses {
        let id = address.id.map_or_else(|| "-".to_string(), |id| id.to_string());
        let cep = address
            .postal_code()
            .map_or_else(|_| address.zip_code.clone(), |cep| cep.formatted());
        println!(
            "{:>5}  {}  ({} {}/{})",
            id,
            address.label(),
            cep,
            address.city,
            address.state
        );
    }
}

pub fn users(users: &[User]) {
    for user in users {
        let roles: Vec<&str> = user.roles().iter().map(|role| role.as_str()).collect();
        println!(
            "{:>5}  {:<20} {:<32} {}",
            user.id,
            user.username,
            user.email,
            roles.join(", ")
        );
    }
}
