use super::Value;

use serde::Serialize;

/// A page of results in cursor-connection form.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<Edge>,

    pub page_info: PageInfo,

    /// Total number of rows matching the relation, only known for offset
    /// pagination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub cursor: String,
    pub node: Value,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl Connection {
    /// A connection with no edges and no further pages.
    pub fn empty() -> Connection {
        Connection::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Value> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.edges.iter_mut().map(|edge| &mut edge.node)
    }
}
