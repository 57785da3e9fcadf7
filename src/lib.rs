//! Inventory command server.
//!
//! A line-oriented TCP service managing categories, products and a
//! transactional stock ledger. Two wire dialects share the socket (a
//! key-value form used by the desktop frontend and a legacy pipe form);
//! both are decoded in [`protocol`], routed by [`services::dispatch`]
//! and served by [`server`]. Persistence sits behind the
//! [`store::InventoryStore`] trait with in-memory and sea-orm backends.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod models;
pub mod protocol;
pub mod server;
pub mod services;
pub mod store;
