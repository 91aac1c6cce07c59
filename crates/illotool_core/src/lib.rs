pub mod analysis;
pub mod catalog;
pub mod colors;
pub mod config;
pub mod error;
pub mod identifier;
pub mod mapping;
pub mod runtime;
pub mod store;
pub mod sync;
