use crate::connection::{ConnectionDescriptor, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use crate::core::{DbError, Document, Result};
use crate::executor::{ExecutionContext, ExecutorPipeline};
use crate::parser::SqlParserAdapter;
use crate::storage::Catalog;
use std::path::{MAIN_SEPARATOR, Path};
use tracing::{debug, info};

/// Embedded, file-backed document store
///
/// One instance owns one store directory. Every mutating statement is
/// written through to the class files before `execute` returns.
pub struct DocumentDb {
    parser: SqlParserAdapter,
    /// `None` once the database has been closed
    catalog: Option<Catalog>,
    executor_pipeline: ExecutorPipeline,
    descriptor: ConnectionDescriptor,
}

impl DocumentDb {
    /// Open the store described by `descriptor`.
    ///
    /// The directory must already exist and must end with a path separator.
    pub fn open(descriptor: &ConnectionDescriptor) -> Result<Self> {
        let directory = &descriptor.directory;
        if !(directory.ends_with(MAIN_SEPARATOR) || directory.ends_with('/')) {
            return Err(DbError::StorageError(format!(
                "Storage path '{}' must end with a path separator",
                directory
            )));
        }
        if !Path::new(directory).is_dir() {
            return Err(DbError::StorageError(format!(
                "Cannot open local storage '{}': directory does not exist",
                directory
            )));
        }
        if descriptor.username != DEFAULT_USERNAME || descriptor.password != DEFAULT_PASSWORD {
            return Err(DbError::AuthError(descriptor.username.clone()));
        }

        let catalog = Catalog::open(directory)?;
        info!(url = %descriptor, classes = catalog.class_names().len(), "opened document store");

        Ok(Self {
            parser: SqlParserAdapter::new(),
            catalog: Some(catalog),
            executor_pipeline: ExecutorPipeline::with_default_executors(),
            descriptor: descriptor.clone(),
        })
    }

    /// Open from a `plocal:<dir> [user password]` connection string.
    pub fn open_url(url: &str) -> Result<Self> {
        let descriptor = ConnectionDescriptor::parse(url).map_err(DbError::StorageError)?;
        Self::open(&descriptor)
    }

    /// Parse and run one statement.
    pub fn execute(&mut self, sql: &str) -> Result<Vec<Document>> {
        let catalog = self
            .catalog
            .as_mut()
            .ok_or_else(|| DbError::ExecutionError("Database is closed".into()))?;

        let stmt = self.parser.parse(sql)?;
        debug!(verb = stmt.verb(), "executing statement");

        let mut ctx = ExecutionContext::new(catalog);
        self.executor_pipeline.execute(&stmt, &mut ctx)
    }

    /// Release the in-memory catalog. All writes are already on disk.
    pub fn close(&mut self) {
        if self.catalog.take().is_some() {
            info!(url = %self.descriptor, "closed document store");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.catalog.is_none()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(|c| c.class_names())
            .unwrap_or_default()
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }
}

impl Drop for DocumentDb {
    fn drop(&mut self) {
        self.close();
    }
}
