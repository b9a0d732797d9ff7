// src/lib.rs

//! Listing reconciliation library.
//!
//! Parses captured listing lines, classifies seller codes, groups records by
//! title and code number, and alerts on conflicts and empty codes that have
//! not been alerted before.

pub mod alert;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
