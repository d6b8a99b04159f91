//! Tonggwan Core - Domain types
//!
//! This crate contains the fundamental types used across Tonggwan:
//! - `Currency`: Type-safe currency codes
//! - `RiskLevel`: Ordered customs risk grading
//! - `ShipmentDeclaration`: Validated evaluation input

pub mod currency;
pub mod risk;
pub mod shipment;

pub use currency::{Currency, CurrencyError};
pub use risk::RiskLevel;
pub use shipment::{DeclarationError, RecipientType, ShipmentDeclaration, ShippingMethod};
