use std::fmt;

/// Path of response keys leading to a node, e.g. `Query.product.variants`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Location {
    path: Vec<String>,
}

impl Location {
    pub fn from_path<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Location {
        Location {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// The location of a child field.
    pub fn join(&self, key: &str) -> Location {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Location { path }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join("."))
    }
}
