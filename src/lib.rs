//! Certificate key-list organization: fingerprint-ordered flat lists,
//! issuer hierarchies and rule-based classification.

pub mod adapters;
pub mod config;
pub mod core;
