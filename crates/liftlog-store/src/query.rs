//! Filtered, ordered queries over a collection.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::{compare_values, values_equal, Document};
use crate::schema::{fields, Collection};

/// A single query predicate on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The field equals the value.
    Eq(String, Value),
    /// The field is an array containing the value.
    ArrayContains(String, Value),
    /// The field equals one of the values.
    In(String, Vec<Value>),
}

impl Filter {
    /// Check whether a document satisfies this predicate.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Eq(field, value) => doc.get(field).is_some_and(|v| values_equal(v, value)),
            Self::ArrayContains(field, value) => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.iter().any(|item| values_equal(item, value))),
            Self::In(field, values) => doc
                .get(field)
                .is_some_and(|v| values.iter().any(|value| values_equal(v, value))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A query against one collection.
///
/// Results are always in a deterministic order: by the `order_by` field when one
/// is given, with document ID as the tie-breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: Collection,
    filters: Vec<Filter>,
    order_by: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// Create a query returning every document in the collection.
    #[must_use]
    pub const fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Require `field == value`.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.into(), value.into()));
        self
    }

    /// Require the array at `field` to contain `value`.
    #[must_use]
    pub fn where_array_contains(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters
            .push(Filter::ArrayContains(field.into(), value.into()));
        self
    }

    /// Require `field` to equal one of `values`.
    #[must_use]
    pub fn where_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In(field.into(), values));
        self
    }

    /// Order results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Return at most `limit` documents.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The collection this query reads.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Check whether a document passes every filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Filter, sort and truncate a full scan of the collection.
    ///
    /// Store implementations call this with every document they hold for
    /// the collection.
    #[must_use]
    pub fn evaluate(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut results: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        results.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let by_field = self.order_by.as_ref().map_or(Ordering::Equal, |(field, dir)| {
            let ord = compare_values(
                a.get(field).unwrap_or(&Value::Null),
                b.get(field).unwrap_or(&Value::Null),
            );
            match dir {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
        by_field.then_with(|| {
            compare_values(
                a.get(fields::ID).unwrap_or(&Value::Null),
                b.get(fields::ID).unwrap_or(&Value::Null),
            )
        })
    }
}
