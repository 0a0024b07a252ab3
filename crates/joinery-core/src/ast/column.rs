use super::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A column of the table
    Name(String),

    /// A SQL expression, already expanded against the table alias
    Expression(String),
}

#[derive(Debug, Clone)]
pub struct Column {
    pub source: ColumnSource,
    pub field_name: String,
    pub alias: String,

    /// Part of the identity used to fold rows into objects
    pub is_id: bool,

    /// Alias of the table to select from, when not the parent table
    pub from_table: Option<String>,

    pub location: Location,
}

/// A multi-column unique key folded into one value.
#[derive(Debug, Clone)]
pub struct Composite {
    pub columns: Vec<String>,
    pub field_name: String,
    pub alias: String,
    pub is_id: bool,
    pub location: Location,
}

/// A field producing no SQL.
#[derive(Debug, Clone)]
pub struct Noop {
    pub field_name: String,
    pub location: Location,
}

impl Column {
    pub fn new(
        column: impl Into<String>,
        field_name: impl Into<String>,
        alias: impl Into<String>,
        location: Location,
    ) -> Column {
        Column {
            source: ColumnSource::Name(column.into()),
            field_name: field_name.into(),
            alias: alias.into(),
            is_id: false,
            from_table: None,
            location,
        }
    }

    pub fn expression(
        sql: impl Into<String>,
        field_name: impl Into<String>,
        alias: impl Into<String>,
        location: Location,
    ) -> Column {
        Column {
            source: ColumnSource::Expression(sql.into()),
            ..Column::new(String::new(), field_name, alias, location)
        }
    }

    pub fn identity(mut self) -> Column {
        self.is_id = true;
        self
    }

    pub fn from_table(mut self, alias: impl Into<String>) -> Column {
        self.from_table = Some(alias.into());
        self
    }
}

impl Composite {
    pub fn new(columns: Vec<String>, alias: impl Into<String>, location: Location) -> Composite {
        Composite {
            field_name: columns.join("#"),
            columns,
            alias: alias.into(),
            is_id: true,
            location,
        }
    }
}
