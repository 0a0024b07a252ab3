use crate::stmt::{Arguments, Value};

use std::{any::Any, fmt, sync::Arc};

/// One node of the requested field tree.
///
/// The tree is produced by the request language's parser and is read-only
/// while planning.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Arguments,
    pub selections: Vec<Selection>,
}

impl Selection {
    pub fn new(name: impl Into<String>) -> Selection {
        Selection {
            name: name.into(),
            alias: None,
            arguments: Arguments::new(),
            selections: vec![],
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Selection {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Selection {
        self.arguments.insert(name, value);
        self
    }

    /// Adds a child selection.
    pub fn select(mut self, child: Selection) -> Selection {
        self.selections.push(child);
        self
    }

    /// Adds leaf child selections by name.
    pub fn fields<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Selection {
        self.selections.extend(names.into_iter().map(Selection::new));
        self
    }

    /// The key this field appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A per-request value handed to every schema delegate, typically carrying
/// the authenticated user or tenant.
#[derive(Clone, Default)]
pub struct Context {
    value: Option<Arc<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Context {
        Context {
            value: Some(Arc::new(value)),
        }
    }

    pub fn empty() -> Context {
        Context::default()
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.as_deref()?.downcast_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("set", &self.value.is_some())
            .finish()
    }
}
