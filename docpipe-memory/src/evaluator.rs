//! Filter evaluation against in-memory BSON documents.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use docpipe_core::{
    error::{DocPipeError, DocPipeResult},
    filter::{FieldOp, Filter, FilterVisitor},
};

/// Type-erased, comparable view of BSON values.
///
/// Normalizes all numeric types to f64 so filters compare across Int32,
/// Int64 and Double the way the query layer expects.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or any non-comparable BSON type.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Datetime value.
    DateTime(DateTime),
    /// Object id value.
    ObjectId(&'a ObjectId),
    /// String value.
    String(&'a str),
    /// Array of comparable values.
    Array(Vec<Comparable<'a>>),
    /// Nested document of comparable values.
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(f64::from(*value)),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => {
                Comparable::Array(arr.iter().map(Comparable::from).collect())
            }
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            _ => Comparable::Null,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a [`Filter`] against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    /// Returns whether the document satisfies the filter.
    pub(crate) fn matches(document: &'a Document, filter: &Filter) -> DocPipeResult<bool> {
        DocumentEvaluator { document }.visit_filter(filter)
    }
}

impl FilterVisitor for DocumentEvaluator<'_> {
    type Output = bool;
    type Error = DocPipeError;

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if self.visit_filter(filter)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_filter(filter)?)
    }

    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error> {
        Ok(self.document.get(field).is_some() == should_exist)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            // A missing field matches nothing, negated operators included.
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    },
                    None => false,
                }
            }
            FieldOp::Contains => match (&left, &right) {
                (Comparable::Array(items), single) => {
                    items.iter().any(|item| item == single)
                }
                (Comparable::String(haystack), Comparable::String(needle)) => {
                    haystack.contains(*needle)
                }
                _ => false,
            },
        })
    }
}

/// Compares two documents on one field for sorting; missing fields sort as
/// null (first ascending, last descending).
pub(crate) fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let left = a.get(field).map(Comparable::from);
    let right = b.get(field).map(Comparable::from);

    match (left, right) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn gadget() -> Document {
        doc! { "name": "widget", "size": 4, "tags": ["a", "b"] }
    }

    fn matches(filter: Filter) -> bool {
        DocumentEvaluator::matches(&gadget(), &filter).unwrap()
    }

    #[test]
    fn eq_and_ne_compare_values() {
        assert!(matches(Filter::eq("name", "widget")));
        assert!(!matches(Filter::eq("name", "gizmo")));
        assert!(matches(Filter::ne("size", 5)));
    }

    #[test]
    fn ordering_operators_normalize_numbers() {
        assert!(matches(Filter::gt("size", 3)));
        assert!(matches(Filter::gte("size", 4.0)));
        assert!(matches(Filter::lt("size", 10_i64)));
        assert!(!matches(Filter::lte("size", 3)));
    }

    #[test]
    fn contains_checks_arrays_and_strings() {
        assert!(matches(Filter::contains("tags", "a")));
        assert!(!matches(Filter::contains("tags", "z")));
        assert!(matches(Filter::contains("name", "idge")));
    }

    #[test]
    fn logical_combinators_compose() {
        assert!(matches(Filter::eq("name", "widget").and(Filter::gt("size", 1))));
        assert!(matches(Filter::eq("name", "gizmo").or(Filter::eq("size", 4))));
        assert!(matches(Filter::eq("size", 9).not()));
    }

    #[test]
    fn exists_checks_field_presence() {
        assert!(matches(Filter::exists("tags")));
        assert!(matches(Filter::not_exists("color")));
        assert!(!matches(Filter::exists("color")));
    }

    #[test]
    fn missing_fields_match_nothing() {
        assert!(!matches(Filter::eq("color", "red")));
        assert!(!matches(Filter::ne("color", "red")));
    }
}
