//! Filter translation from the docpipe AST to MongoDB query documents.

use bson::{Bson, Document, doc};

use docpipe_core::{
    error::DocPipeError,
    filter::{FieldOp, Filter, FilterVisitor},
};

/// Translates [`Filter`] trees into MongoDB's native BSON query syntax.
pub(crate) struct MongoFilterTranslator;

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = DocPipeError;

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": filters
                .iter()
                .map(|filter| self.visit_filter(filter))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": filters
                .iter()
                .map(|filter| self.visit_filter(filter))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        // $nor over one clause: the server rejects a bare top-level $not.
        Ok(doc! {
            "$nor": [self.visit_filter(filter)?],
        })
    }

    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": format!(".*{}.*", regex_escape(s)) },
                    _ => doc! { "$elemMatch": { "$eq": value } },
                },
            }
        })
    }
}

/// Escapes regex metacharacters so a contains filter matches literally.
fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(filter: Filter) -> Document {
        MongoFilterTranslator.visit_filter(&filter).unwrap()
    }

    #[test]
    fn comparisons_become_operator_documents() {
        assert_eq!(translate(Filter::eq("name", "a")), doc! { "name": { "$eq": "a" } });
        assert_eq!(translate(Filter::gt("size", 4)), doc! { "size": { "$gt": 4 } });
        assert_eq!(translate(Filter::lte("size", 4)), doc! { "size": { "$lte": 4 } });
    }

    #[test]
    fn logical_nodes_nest_their_clauses() {
        assert_eq!(
            translate(Filter::eq("a", 1).and(Filter::eq("b", 2))),
            doc! { "$and": [
                { "a": { "$eq": 1 } },
                { "b": { "$eq": 2 } },
            ] }
        );
        assert_eq!(
            translate(Filter::eq("a", 1).not()),
            doc! { "$nor": [ { "a": { "$eq": 1 } } ] }
        );
    }

    #[test]
    fn string_contains_uses_an_escaped_regex() {
        assert_eq!(
            translate(Filter::contains("name", "a.b")),
            doc! { "name": { "$regex": ".*a\\.b.*" } }
        );
    }

    #[test]
    fn exists_maps_directly() {
        assert_eq!(
            translate(Filter::not_exists("color")),
            doc! { "color": { "$exists": false } }
        );
    }
}
