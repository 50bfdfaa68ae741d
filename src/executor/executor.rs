use super::ExecutionContext;
use crate::core::{DbError, Document, Result};
use crate::parser::ast::Statement;

pub trait Executor {
    /// Executor name, for debug logging
    fn name(&self) -> &'static str;

    fn can_handle(&self, stmt: &Statement) -> bool;
    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>>;
}

pub struct ExecutorPipeline {
    executors: Vec<Box<dyn Executor>>,
}

impl ExecutorPipeline {
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    /// Pipeline with every built-in executor registered.
    pub fn with_default_executors() -> Self {
        use super::ddl::{CreateClassExecutor, DropClassExecutor};
        use super::delete::DeleteExecutor;
        use super::dml::InsertExecutor;
        use super::query::SelectExecutor;
        use super::update::UpdateExecutor;

        let mut pipeline = Self::new();
        pipeline.register(Box::new(CreateClassExecutor));
        pipeline.register(Box::new(DropClassExecutor));
        pipeline.register(Box::new(InsertExecutor));
        pipeline.register(Box::new(SelectExecutor));
        pipeline.register(Box::new(UpdateExecutor));
        pipeline.register(Box::new(DeleteExecutor));
        pipeline
    }

    pub fn register(&mut self, executor: Box<dyn Executor>) {
        self.executors.push(executor);
    }

    pub fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Document>> {
        for executor in &self.executors {
            if executor.can_handle(stmt) {
                tracing::debug!(executor = executor.name(), "dispatching statement");
                return executor.execute(stmt, ctx);
            }
        }

        Err(DbError::ExecutorNotFound(stmt.verb().to_string()))
    }

    pub fn list_executors(&self) -> Vec<&'static str> {
        self.executors.iter().map(|e| e.name()).collect()
    }
}

impl Default for ExecutorPipeline {
    fn default() -> Self {
        Self::with_default_executors()
    }
}
