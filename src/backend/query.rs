use std::fmt;

/// Attribute the remote service stamps on every document at creation.
pub const CREATED_AT: &str = "$createdAt";
/// Attribute the remote service refreshes on every document update.
pub const UPDATED_AT: &str = "$updatedAt";

/// A single query primitive understood by the remote document database.
///
/// Rendered with [`fmt::Display`] into the string form the REST API expects,
/// e.g. `equal("accountId", ["abc"])` or `limit(9)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Equal(String, Vec<String>),
    /// Full-text search; the term is passed through untouched
    Search(String, String),
    OrderDesc(String),
    OrderAsc(String),
    Limit(usize),
    /// Return documents that come after this document id
    CursorAfter(String),
}

impl Query {
    pub fn equal(attribute: &str, value: &str) -> Self {
        Query::Equal(attribute.to_string(), vec![value.to_string()])
    }

    pub fn search(attribute: &str, term: &str) -> Self {
        Query::Search(attribute.to_string(), term.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    pub fn limit(limit: usize) -> Self {
        Query::Limit(limit)
    }

    pub fn cursor_after(document_id: &str) -> Self {
        Query::CursorAfter(document_id.to_string())
    }
}

fn quoted(value: &str) -> String {
    // serde_json escapes quotes and control characters the same way the
    // server-side parser expects
    serde_json::Value::String(value.to_string()).to_string()
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Equal(attribute, values) => {
                let values: Vec<String> = values.iter().map(|v| quoted(v)).collect();
                write!(f, "equal({}, [{}])", quoted(attribute), values.join(","))
            }
            Query::Search(attribute, term) => {
                write!(f, "search({}, [{}])", quoted(attribute), quoted(term))
            }
            Query::OrderDesc(attribute) => write!(f, "orderDesc({})", quoted(attribute)),
            Query::OrderAsc(attribute) => write!(f, "orderAsc({})", quoted(attribute)),
            Query::Limit(limit) => write!(f, "limit({limit})"),
            Query::CursorAfter(id) => write!(f, "cursorAfter({})", quoted(id)),
        }
    }
}
