use joinery::{driver::Query, stmt::Value};
use std::sync::{Arc, Mutex};

/// The statements a [`ScriptedDriver`](crate::ScriptedDriver) received, in
/// the order they reached it.
#[derive(Debug, Clone)]
pub struct ExecLog {
    queries: Arc<Mutex<Vec<Query>>>,
}

impl ExecLog {
    pub(crate) fn new(queries: Arc<Mutex<Vec<Query>>>) -> Self {
        Self { queries }
    }

    /// Get the number of logged statements
    pub fn len(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.lock().unwrap().is_empty()
    }

    /// SQL text of every logged statement
    pub fn sql(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|query| query.sql.clone())
            .collect()
    }

    /// Count statements whose SQL contains `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|query| query.sql.contains(needle))
            .count()
    }

    pub fn clear(&mut self) {
        self.queries.lock().unwrap().clear();
    }

    /// Remove and return the first statement from the log
    pub fn pop(&mut self) -> Option<Query> {
        let mut queries = self.queries.lock().unwrap();
        if queries.is_empty() {
            None
        } else {
            Some(queries.remove(0))
        }
    }

    /// Remove the first statement and return its parameter values
    pub fn pop_params(&mut self) -> Option<Vec<Value>> {
        self.pop()
            .map(|query| query.params.values().cloned().collect())
    }

    /// Escape hatch for custom assertions
    pub fn with_queries<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Query]) -> R,
    {
        let queries = self.queries.lock().unwrap();
        f(&queries)
    }
}
