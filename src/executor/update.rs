use super::{ExecutionContext, Executor};
use crate::core::{Document, Result};
use crate::evaluator::EvaluationContext;
use crate::parser::ast::{Statement, UpdateStmt};

pub struct UpdateExecutor;

impl Executor for UpdateExecutor {
    fn name(&self) -> &'static str {
        "UPDATE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Update(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::Update(update) = stmt else {
            unreachable!();
        };

        self.execute_update(update, ctx)
    }
}

impl UpdateExecutor {
    fn execute_update(&self, update: &UpdateStmt, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let class = ctx.catalog.get_mut(&update.class_name)?;

        // Decide every match before the first assignment lands
        let matched = class.evaluate_all(|record| match &update.selection {
            Some(condition) => EvaluationContext::new(&record.fields).matches(condition),
            None => Ok(true),
        })?;

        let mut updated = 0usize;
        for (record, is_match) in class.records_mut().zip(matched) {
            if !is_match {
                continue;
            }

            for assignment in &update.assignments {
                record
                    .fields
                    .insert(assignment.field.clone(), assignment.value.clone());
            }
            updated += 1;
        }

        if updated > 0 {
            ctx.catalog.persist(&update.class_name)?;
        }
        Ok(vec![Document::scalar("count", updated)])
    }
}
