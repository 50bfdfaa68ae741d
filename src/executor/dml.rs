use super::{ExecutionContext, Executor};
use crate::core::{Document, Result};
use crate::parser::ast::{InsertStmt, Statement};
use serde_json::Map;

pub struct InsertExecutor;

impl Executor for InsertExecutor {
    fn name(&self) -> &'static str {
        "INSERT"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Insert(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::Insert(insert) = stmt else {
            unreachable!();
        };

        self.execute_insert(insert, ctx)
    }
}

impl InsertExecutor {
    fn execute_insert(&self, insert: &InsertStmt, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let class = ctx.catalog.get_mut(&insert.class_name)?;

        let inserted: Vec<Document> = insert
            .rows
            .iter()
            .map(|row| {
                let fields: Map<_, _> = insert.fields.iter().cloned().zip(row.iter().cloned()).collect();
                class.insert(fields)
            })
            .collect();

        ctx.catalog.persist(&insert.class_name)?;
        Ok(inserted)
    }
}
