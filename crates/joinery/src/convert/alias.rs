use std::collections::HashSet;

/// Hands out table and column aliases that are unique within one request.
#[derive(Debug)]
pub(super) struct Namespace {
    /// Generate short aliases instead of deriving them from field names
    minify: bool,

    used: HashSet<String>,

    /// Next minified alias
    next: usize,
}

/// Aliases the compiler relies on.
const RESERVED: &[&str] = &["temp"];

impl Namespace {
    pub(super) fn new(minify: bool) -> Namespace {
        Namespace {
            minify,
            used: RESERVED.iter().map(|name| name.to_string()).collect(),
            next: 0,
        }
    }

    /// Alias for a table, derived from `name` unless minifying.
    pub(super) fn table(&mut self, name: &str) -> String {
        if self.minify {
            return self.generate();
        }

        let name = if name.is_empty() { "t" } else { name };
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }

        let mut suffix = 1;
        loop {
            let candidate = format!("{name}_{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Alias for a column. Columns are prefixed by their table's path, so
    /// only minified aliases need to be unique.
    pub(super) fn column(&mut self, name: &str) -> String {
        if self.minify {
            self.generate()
        } else {
            name.to_string()
        }
    }

    /// `a`, `b`, ..., `z`, `ba`, `bb`, ...
    fn generate(&mut self) -> String {
        loop {
            let mut n = self.next;
            self.next += 1;

            let mut alias = vec![];
            loop {
                alias.push(b'a' + (n % 26) as u8);
                n /= 26;
                if n == 0 {
                    break;
                }
            }
            alias.reverse();

            let alias = String::from_utf8_lossy(&alias).into_owned();
            if self.used.insert(alias.clone()) {
                return alias;
            }
        }
    }
}
