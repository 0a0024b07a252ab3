mod arguments;
pub use arguments::Arguments;

mod connection;
pub use connection::{Connection, Edge, PageInfo};

mod params;
pub use params::Params;

mod row;
pub use row::Row;

mod row_stream;
pub use row_stream::RowStream;

mod value;
pub use value::{Key, Value};

mod value_serde;
