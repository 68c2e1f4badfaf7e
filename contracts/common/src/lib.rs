//! Shared pieces of the halving-farm contract suite.
//!
//! The farm asks a single question of this crate before any privileged
//! mutation: does the caller hold a sufficient [`AdminTier`]? Tier state lives
//! in the calling contract's own storage, so each deployment carries its own
//! independent admin set.

#![no_std]

pub mod admin_tiers;

pub use admin_tiers::AdminTier;
