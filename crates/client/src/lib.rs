//! Shopfront client library.
//!
//! Everything a storefront front end needs on top of the REST backend:
//!
//! - [`api`] - data access, one module per backend resource, every call
//!   answered with an [`api::Envelope`]
//! - [`cart`] - the persisted shopping cart
//! - [`checkout`] - the multi-step order flow and shipping quotes
//! - [`session`] - a ready-made bundle of client and cart built from config

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
