//! Query filters over JSON documents.
//!
//! A [`Filter`] is a conjunction of clauses over dotted field paths.
//! Path segments that cross an array fan out over its elements, so
//! `"redemptions.user"` matches a document whose `redemptions` array
//! contains any object with a matching `user` field.

use serde_json::Value;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Options controlling `find` results.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Field path and direction to sort by.
    pub sort: Option<(String, SortOrder)>,
    /// Number of matching documents to skip.
    pub skip: usize,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Create options with no sort, skip, or limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort ascending by a field path.
    pub fn sort_asc(mut self, path: impl Into<String>) -> Self {
        self.sort = Some((path.into(), SortOrder::Asc));
        self
    }

    /// Sort descending by a field path.
    pub fn sort_desc(mut self, path: impl Into<String>) -> Self {
        self.sort = Some((path.into(), SortOrder::Desc));
        self
    }

    /// Skip the first `n` matching documents.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Return at most `n` documents.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// A single filter condition.
#[derive(Debug, Clone)]
enum Cond {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Lt(Value),
    Exists(bool),
    Contains(Value),
}

#[derive(Debug, Clone)]
struct Clause {
    path: String,
    cond: Cond,
}

/// A conjunction of conditions over document fields.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `path` to equal `value`.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Eq(value.into()),
        });
        self
    }

    /// Require `path` to differ from `value` (or be absent).
    pub fn ne(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Ne(value.into()),
        });
        self
    }

    /// Require `path` to be strictly greater than `value`.
    pub fn gt(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Gt(value.into()),
        });
        self
    }

    /// Require `path` to be strictly less than `value`.
    pub fn lt(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Lt(value.into()),
        });
        self
    }

    /// Require `path` to be present (or absent) and non-null.
    pub fn exists(mut self, path: impl Into<String>, present: bool) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Exists(present),
        });
        self
    }

    /// Require the array at `path` to contain `value`.
    pub fn contains(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            cond: Cond::Contains(value.into()),
        });
        self
    }

    /// Check whether a document satisfies every clause.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|clause| match_clause(clause, doc))
    }
}

fn match_clause(clause: &Clause, doc: &Value) -> bool {
    let resolved = resolve_path(doc, &clause.path);
    match &clause.cond {
        Cond::Eq(v) => resolved.iter().any(|r| *r == v),
        Cond::Ne(v) => !resolved.iter().any(|r| *r == v),
        Cond::Gt(v) => resolved.iter().any(|r| compare(r, v) == Some(std::cmp::Ordering::Greater)),
        Cond::Lt(v) => resolved.iter().any(|r| compare(r, v) == Some(std::cmp::Ordering::Less)),
        Cond::Exists(present) => {
            let found = resolved.iter().any(|r| !r.is_null());
            found == *present
        }
        Cond::Contains(v) => resolved.iter().any(|r| match r {
            Value::Array(items) => items.contains(v),
            _ => false,
        }),
    }
}

/// Resolve a dotted path, fanning out over arrays at intermediate segments.
fn resolve_path<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(v) = map.get(segment) {
                        next.push(v);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(map) = item {
                            if let Some(v) = map.get(segment) {
                                next.push(v);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

/// Order two JSON values if they are comparable (numbers or strings).
pub(crate) fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64()?;
            let y = y.as_f64()?;
            x.partial_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
