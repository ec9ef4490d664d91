//! Structural filters, sort specifications and the document query shape.
//!
//! A [`Filter`] is an optional predicate narrowing which documents an
//! operation applies to; absence of a filter means "match everything".
//! Filters are plain data — each backend interprets them through a
//! [`FilterVisitor`] (evaluation in the memory backend, translation to
//! native query syntax in the MongoDB backend).
//!
//! # Example
//!
//! ```ignore
//! use docpipe_core::filter::Filter;
//!
//! let active_adults = Filter::eq("status", "active").and(Filter::gt("age", 18));
//! ```

use bson::Bson;

use crate::error::DocPipeError;

/// Field comparison operators for filter predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String or array contains value.
    Contains,
}

/// A structural predicate over documents.
///
/// Combine predicates with the chainable [`and`](Filter::and),
/// [`or`](Filter::or) and [`not`](Filter::not) methods.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Logical AND of multiple predicates (all must match).
    And(Vec<Filter>),
    /// Logical OR of multiple predicates (any must match).
    Or(Vec<Filter>),
    /// Logical NOT of a predicate.
    Not(Box<Filter>),
    /// Checks whether a field is present (or absent).
    Exists(String, bool),
    /// Field comparison predicate.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Filter {
    fn field(field: impl Into<String>, op: FieldOp, value: impl Into<Bson>) -> Self {
        Filter::Field { field: field.into(), op, value: value.into() }
    }

    /// Matches documents where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Eq, value)
    }

    /// Matches documents where the field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Ne, value)
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Gt, value)
    }

    /// Matches documents where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Gte, value)
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Lt, value)
    }

    /// Matches documents where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Lte, value)
    }

    /// Matches documents where the field (string or array) contains the value.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, FieldOp::Contains, value)
    }

    /// Matches documents where the field is present.
    pub fn exists(field: impl Into<String>) -> Self {
        Filter::Exists(field.into(), true)
    }

    /// Matches documents where the field is absent.
    pub fn not_exists(field: impl Into<String>) -> Self {
        Filter::Exists(field.into(), false)
    }

    /// Combines this predicate with another using logical AND.
    ///
    /// If this predicate is already an AND, the other is appended to the
    /// list instead of nesting.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut list) => {
                list.push(other);
                Filter::And(list)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Combines this predicate with another using logical OR.
    ///
    /// If this predicate is already an OR, the other is appended to the
    /// list instead of nesting.
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut list) => {
                list.push(other);
                Filter::Or(list)
            }
            _ => Filter::Or(vec![self, other]),
        }
    }

    /// Negates this predicate.
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }
}

/// Sort direction for read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for read operations.
///
/// Absence of a sort means implementation-defined, stable-by-insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Asc }
    }

    /// Descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Desc }
    }
}

/// A read operation over a collection, already argument-checked.
///
/// Backends must apply the parts strictly in the order filter, then sort,
/// then skip, then take. Paging over an unmodified collection stays stable
/// across repeated reads only because every backend preserves that order.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Optional predicate; `None` matches everything.
    pub filter: Option<Filter>,
    /// Optional ordering; `None` leaves the backend's stable order.
    pub sort: Option<Sort>,
    /// Number of matching documents to pass over.
    pub skip: u64,
    /// Maximum number of documents to return; `None` returns the rest.
    pub take: Option<u64>,
}

/// Visitor over [`Filter`] trees.
///
/// Backends implement this once and get structural recursion through
/// [`visit_filter`](FilterVisitor::visit_filter).
pub trait FilterVisitor {
    /// Result of visiting a node.
    type Output;
    /// Error raised while visiting.
    type Error: Into<DocPipeError>;

    /// Visits a logical AND node.
    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error>;
    /// Visits a logical OR node.
    fn visit_or(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error>;
    /// Visits a negation node.
    fn visit_not(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error>;
    /// Visits a field-presence node.
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    /// Visits a field comparison node.
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    /// Dispatches on the node kind.
    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        match filter {
            Filter::And(filters) => self.visit_and(filters),
            Filter::Or(filters) => self.visit_or(filters),
            Filter::Not(filter) => self.visit_not(filter),
            Filter::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Filter::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
