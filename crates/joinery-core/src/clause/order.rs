/// Sort direction of one ordering column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flip(self) -> Direction {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderColumn {
    pub column: String,
    pub direction: Direction,
}

/// An ordered list of columns; earlier columns take precedence.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderBy {
    pub columns: Vec<OrderColumn>,
}

impl OrderBy {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builds an [`OrderBy`]:
///
/// ```
/// # use joinery_core::clause::OrderByBuilder;
/// let mut order = OrderByBuilder::new();
/// order.by("name").then_by_descending("id");
/// assert_eq!(order.build().columns.len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct OrderByBuilder {
    columns: Vec<OrderColumn>,
}

impl OrderByBuilder {
    pub fn new() -> OrderByBuilder {
        OrderByBuilder::default()
    }

    pub fn by(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Asc)
    }

    pub fn by_descending(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Desc)
    }

    pub fn then_by(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Asc)
    }

    pub fn then_by_descending(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Desc)
    }

    fn push(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.columns.push(OrderColumn {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn build(self) -> OrderBy {
        OrderBy {
            columns: self.columns,
        }
    }
}
