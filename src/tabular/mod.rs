//! Tabular data handling
//!
//! Turns raw tables from the record store (sequences of string cells, first
//! row usually a header) into typed, order-preserving row mappings, resolves
//! loosely named columns against canonical names, and applies the coercion
//! fallback policy shared by aggregation and bulk import.

pub mod coerce;
pub mod columns;
pub mod normalize;
