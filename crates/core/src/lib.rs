//! Rocket Shoes Core - Shared cart domain types.
//!
//! This crate provides the types used across all Rocket Shoes components:
//! - `cart` - Cart store, catalog client, persistence and notifications
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure transformations - no I/O, no
//! storage access, no HTTP clients. Every cart mutation is expressed here as a
//! function from one [`Cart`] value to the next; the store decides when to
//! commit it.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices, products, stock and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
