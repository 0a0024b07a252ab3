use super::Executor;
use joinery_core::{Driver, Error, Result, Schema};
use joinery_sql::Flavor;

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    schema: Option<Schema>,
    flavor: Flavor,
    minify_aliases: bool,
}

impl Builder {
    pub fn schema(&mut self, schema: Schema) -> &mut Self {
        self.schema = Some(schema);
        self
    }

    /// The SQL dialect to compile for. Defaults to PostgreSQL.
    pub fn flavor(&mut self, flavor: Flavor) -> &mut Self {
        self.flavor = flavor;
        self
    }

    /// Replace field-derived table and column aliases with short generated
    /// ones, keeping statements small for deeply nested requests.
    pub fn minify_aliases(&mut self, minify: bool) -> &mut Self {
        self.minify_aliases = minify;
        self
    }

    pub fn build(&mut self, driver: impl Driver) -> Result<Executor> {
        let Some(schema) = self.schema.take() else {
            return Err(Error::invalid_configuration(
                "an executor needs a schema; call `Builder::schema` first",
            ));
        };

        Ok(Executor {
            schema: Arc::new(schema),
            driver: Arc::new(driver),
            flavor: self.flavor,
            minify_aliases: self.minify_aliases,
        })
    }
}
