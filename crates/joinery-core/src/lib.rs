pub mod ast;
pub use ast::SqlAst;

pub mod clause;

pub mod cursor;

pub mod driver;
pub use driver::Driver;

mod error;
pub use error::Error;

pub mod request;
pub use request::{Context, Selection};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Joinery's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
