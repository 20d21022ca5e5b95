use serde::{Deserialize, Serialize};

/// A single candidate returned by the search backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Opaque backend identifier. Older backends don't send one.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
}

impl SearchResult {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        link: impl Into<String>,
    ) -> SearchResult {
        SearchResult {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            link: link.into(),
        }
    }
}

/// Body of a persistence call: the query that produced the accepted results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredQuery {
    pub query: String,
    pub results: Vec<SearchResult>,
}

impl StoredQuery {
    pub fn new(query: String, results: Vec<SearchResult>) -> StoredQuery {
        StoredQuery { query, results }
    }
}

#[test]
fn test_search_result_without_id() {
    let json = r#"{"title":"Ownership","summary":"Moves and borrows.","link":"https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html"}"#;
    let result: SearchResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.id, "");
    assert_eq!(result.title, "Ownership");
}
