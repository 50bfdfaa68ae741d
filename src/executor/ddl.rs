use super::{ExecutionContext, Executor};
use crate::core::{Document, Result};
use crate::parser::ast::Statement;

pub struct CreateClassExecutor;

impl Executor for CreateClassExecutor {
    fn name(&self) -> &'static str {
        "CREATE_CLASS"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::CreateClass(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::CreateClass(create) = stmt else {
            unreachable!();
        };

        ctx.catalog
            .create_class(&create.class_name, create.fields.clone(), create.if_not_exists)?;
        Ok(Vec::new())
    }
}

pub struct DropClassExecutor;

impl Executor for DropClassExecutor {
    fn name(&self) -> &'static str {
        "DROP_CLASS"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::DropClass(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        let Statement::DropClass(drop) = stmt else {
            unreachable!();
        };

        ctx.catalog.drop_class(&drop.class_name, drop.if_exists)?;
        Ok(Vec::new())
    }
}
