//! Describes how the flat rows of one statement fold into nested objects.

use joinery_core::{
    ast::{Node, NodeId},
    Error, Result, SqlAst,
};

use indexmap::IndexMap;

/// Shape of the objects produced by one table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Shape {
    pub(crate) fields: Vec<(String, ShapeField)>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShapeField {
    /// A column of the flat row
    Column {
        alias: String,

        /// Rows with equal identity columns fold into one object
        is_id: bool,
    },

    /// A joined table
    Nested { shape: Shape, many: bool },
}

/// Shapes of every statement root of a request: the root table and each
/// batch boundary. Computed once per request and shared by the batch
/// planner's tasks.
#[derive(Debug, Default)]
pub(crate) struct Shapes {
    shapes: IndexMap<NodeId, Shape>,
}

impl Shapes {
    pub(crate) fn new(ast: &SqlAst) -> Result<Shapes> {
        let mut shapes = Shapes::default();

        if let Some(root) = ast.table(ast.root()) {
            if root.join.is_some() {
                return Err(Error::invalid_configuration(format!(
                    "`{}` is a root field and cannot declare a join",
                    root.location
                )));
            }

            shapes.collect(ast, ast.root())?;
        }

        Ok(shapes)
    }

    pub(crate) fn get(&self, node: NodeId) -> Option<&Shape> {
        self.shapes.get(&node)
    }

    fn collect(&mut self, ast: &SqlAst, node: NodeId) -> Result<()> {
        let shape = Shape::of(ast, node, "")?;
        self.shapes.insert(node, shape);

        for batch in batches_below(ast, node) {
            self.collect(ast, batch)?;
        }

        Ok(())
    }
}

impl Shape {
    fn of(ast: &SqlAst, node: NodeId, prefix: &str) -> Result<Shape> {
        let mut shape = Shape { fields: vec![] };

        for child in ast.children(node) {
            match &ast[*child] {
                Node::Column(column) => {
                    let alias = format!("{prefix}{}", column.alias);
                    shape.column(&column.field_name, alias, column.is_id);
                }
                Node::Composite(composite) => {
                    shape.column(
                        &composite.field_name,
                        format!("{prefix}{}", composite.alias),
                        composite.is_id,
                    );
                }
                Node::Table(table) => {
                    if let Some((_, parent_key)) = table.batch_keys() {
                        // Batch results are attached later, correlated on
                        // the parent key.
                        shape.column(
                            &parent_key.field_name,
                            format!("{prefix}{}", parent_key.alias),
                            false,
                        );
                        continue;
                    }

                    let prefix = format!("{prefix}{}__", table.alias);
                    let nested = Shape::of(ast, *child, &prefix)?;
                    shape.fields.push((
                        table.field_name.clone(),
                        ShapeField::Nested {
                            shape: nested,
                            many: table.grab_many,
                        },
                    ));
                }
                Node::Noop(_) => {}
            }
        }

        if !shape.fields.iter().any(|(_, field)| field.is_id()) {
            return Err(Error::invalid_configuration(format!(
                "`{}` selects no identity column",
                ast[node].location()
            )));
        }

        Ok(shape)
    }

    fn column(&mut self, name: &str, alias: String, is_id: bool) {
        let existing = self.fields.iter_mut().find(|(field, _)| field == name);

        match existing {
            // A field requested under the name of a key column resolves to
            // the same value; keep it as identity if either is.
            Some((_, ShapeField::Column { is_id: existing, .. })) => *existing |= is_id,
            Some(_) => {}
            None => self
                .fields
                .push((name.to_string(), ShapeField::Column { alias, is_id })),
        }
    }

    /// Aliases of the identity columns.
    pub(crate) fn identity(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|(_, field)| match field {
            ShapeField::Column { alias, is_id: true } => Some(alias.as_str()),
            _ => None,
        })
    }
}

impl ShapeField {
    fn is_id(&self) -> bool {
        matches!(self, ShapeField::Column { is_id: true, .. })
    }
}

/// The nearest batch boundaries below `node`.
fn batches_below(ast: &SqlAst, node: NodeId) -> Vec<NodeId> {
    let mut batches = vec![];

    for (child, table) in ast.child_tables(node) {
        if table.is_batch() {
            batches.push(child);
        } else {
            batches.extend(batches_below(ast, child));
        }
    }

    batches
}
