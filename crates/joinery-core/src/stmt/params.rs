use super::Value;

use indexmap::IndexMap;

/// Out-of-band statement parameters, ordered by first use.
///
/// Every value that reaches a compiled statement goes through here; SQL text
/// never embeds a value. The position of a parameter (1-based) is what
/// positional placeholders such as `$1` refer to, and its name is what named
/// placeholders refer to.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    values: IndexMap<String, Value>,
}

impl Params {
    pub fn new() -> Params {
        Params::default()
    }

    /// Adds an anonymous parameter, returning its 1-based position.
    pub fn push(&mut self, value: Value) -> usize {
        let name = format!("p{}", self.values.len() + 1);
        self.push_named(&name, value)
    }

    /// Adds a parameter under `name`, returning its 1-based position. If the
    /// name is taken a numeric suffix is appended.
    pub fn push_named(&mut self, name: &str, value: Value) -> usize {
        let mut unique = name.to_string();
        let mut suffix = 1;
        while self.values.contains_key(&unique) {
            unique = format!("{name}_{suffix}");
            suffix += 1;
        }

        self.values.insert(unique, value);
        self.values.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The parameter at a 1-based position.
    pub fn at(&self, position: usize) -> Option<&Value> {
        self.values.get_index(position.checked_sub(1)?).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
