//! Compiles nested field selections into SQL, runs the statements, and
//! reassembles the rows into nested results.
//!
//! ```no_run
//! # async fn run(driver: impl joinery::Driver) -> joinery::Result<()> {
//! use joinery::{
//!     schema::{Field, ObjectType, TableConfig},
//!     CancellationToken, Context, Executor, Schema, Selection,
//! };
//!
//! let schema = Schema::builder()
//!     .object(ObjectType::new("Query").field(Field::object("product", "Product")))
//!     .object(
//!         ObjectType::new("Product")
//!             .table(TableConfig::new("products").unique_key("id"))
//!             .field(Field::scalar("id"))
//!             .field(Field::scalar("name")),
//!     )
//!     .build()?;
//!
//! let executor = Executor::builder().schema(schema).build(driver)?;
//!
//! let request = Selection::new("product").fields(["name"]);
//! let product = executor
//!     .execute(&request, &Context::empty(), &CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod connection;

mod convert;

pub mod executor;
pub use executor::{Builder, Executor};

mod hydrate;

mod planner;

mod shape;

pub use joinery_core::{
    ast, bail, clause, cursor, driver, err, request, schema, stmt, Context, Driver, Error,
    Result, Schema, Selection, SqlAst,
};
pub use joinery_sql::Flavor;
pub use tokio_util::sync::CancellationToken;
