use super::{ExecutionContext, Executor};
use crate::core::{Document, Result};
use crate::evaluator::EvaluationContext;
use crate::parser::ast::{DeleteStmt, Statement};

pub struct DeleteExecutor;

impl Executor for DeleteExecutor {
    fn name(&self) -> &'static str {
        "DELETE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Delete(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::Delete(delete) = stmt else {
            unreachable!();
        };

        self.execute_delete(delete, ctx)
    }
}

impl DeleteExecutor {
    fn execute_delete(&self, delete: &DeleteStmt, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let class = ctx.catalog.get_mut(&delete.class_name)?;

        let deleted = class.remove_where(|record| match &delete.selection {
            Some(condition) => EvaluationContext::new(&record.fields).matches(condition),
            None => Ok(true),
        })?;

        if deleted > 0 {
            ctx.catalog.persist(&delete.class_name)?;
        }
        Ok(vec![Document::scalar("count", deleted)])
    }
}
