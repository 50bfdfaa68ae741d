use crate::storage::Catalog;

pub struct ExecutionContext<'a> {
    pub catalog: &'a mut Catalog,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        Self { catalog }
    }
}
