//! Link shortener: a concurrency-safe link store, a short code generator,
//! and the HTTP layer that drives them.

pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod model;
pub mod persistence;
pub mod route;
pub mod service;
pub mod store;

pub use error::{PersistenceError, ShortenError, StoreError};
pub use generator::{CodeGenerator, RandomCodeGenerator};
pub use model::Link;
pub use store::LinkStore;
