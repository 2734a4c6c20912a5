//! Meal planning from a biometric profile, practitioner documents and
//! per-slot food lists.

pub mod catalog;
pub mod completion;
pub mod config;
pub mod energy;
pub mod error;
pub mod guidelines;
pub mod matcher;
pub mod models;
pub mod planner;
pub mod pool_import;
pub mod portions;
pub mod reconcile;
pub mod rules;
pub mod selector;
pub mod shopping;
