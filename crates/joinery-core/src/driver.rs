use crate::{async_trait, stmt::Params, stmt::RowStream};

use std::fmt::{self, Debug};

/// A compiled statement: SQL text plus its out-of-band parameters.
#[derive(Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Params,
}

/// The database execution primitive.
///
/// Implementations run a compiled statement and hand back its rows. Errors
/// should be reported with [`Error::driver`](crate::Error::driver) so they
/// reach the caller unchanged.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    async fn query(&self, query: &Query) -> crate::Result<RowStream>;
}

impl Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .finish()
    }
}
