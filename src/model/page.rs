use serde::{Deserialize, Serialize};

/// One page of a remote list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    /// Records in the current page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Cursor of the next page, absent on the last one.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> ListPage<T> {
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub workflow_count: usize,
    pub api_version: String,
}
