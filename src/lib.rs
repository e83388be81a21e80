//! Tabular data viewer engine: load a dataset, filter, sort, page through
//! it, and export the visible rows as a spreadsheet.

pub mod config;
pub mod data;
pub mod error;
pub mod remote;
pub mod source;
