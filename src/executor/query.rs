use super::{ExecutionContext, Executor};
use crate::core::{Document, Result};
use crate::evaluator::{EvaluationContext, compare_values};
use crate::parser::ast::{Projection, SelectStmt, Statement};
use crate::storage::Record;
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub struct SelectExecutor;

impl Executor for SelectExecutor {
    fn name(&self) -> &'static str {
        "SELECT"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Select(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::Select(select) = stmt else {
            unreachable!();
        };

        self.execute_select(select, ctx)
    }
}

impl SelectExecutor {
    fn execute_select(&self, select: &SelectStmt, ctx: &ExecutionContext<'_>) -> Result<Vec<Document>> {
        let class = ctx.catalog.get(&select.class_name)?;

        let mut matched: Vec<&Record> = Vec::new();
        for record in class.records() {
            let keep = match &select.selection {
                Some(condition) => EvaluationContext::new(&record.fields).matches(condition)?,
                None => true,
            };
            if keep {
                matched.push(record);
            }
        }

        if !select.order_by.is_empty() {
            // Stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                for key in &select.order_by {
                    let ordering = compare_fields(a.fields.get(&key.field), b.fields.get(&key.field));
                    let ordering = if key.descending { ordering.reverse() } else { ordering };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let limit = select.limit.unwrap_or(usize::MAX);
        let documents = matched
            .into_iter()
            .skip(select.offset)
            .take(limit)
            .map(|record| match &select.projection {
                Projection::Wildcard => class.to_document(record),
                Projection::Fields(fields) => {
                    let mut map = Map::with_capacity(fields.len());
                    for field in fields {
                        let value = record.fields.get(&field.name).cloned().unwrap_or(Value::Null);
                        map.insert(field.output_name().to_string(), value);
                    }
                    Document::from(map)
                }
            })
            .collect();

        Ok(documents)
    }
}

/// Missing and null values sort first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}
