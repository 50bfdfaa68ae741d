use serde_json::Value;

/// Root statement type
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateClass(CreateClassStmt),
    DropClass(DropClassStmt),
    Insert(InsertStmt),
    Select(SelectStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    /// Parsed, but no document-store command corresponds to it.
    Unrouted { verb: String },
}

impl Statement {
    /// Command verb, used in diagnostics and executor lookup errors.
    pub fn verb(&self) -> &str {
        match self {
            Statement::CreateClass(_) => "CREATE",
            Statement::DropClass(_) => "DROP",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Unrouted { verb } => verb,
        }
    }
}

/// CREATE TABLE statement; creates a class
#[derive(Debug, Clone, PartialEq)]
pub struct CreateClassStmt {
    pub class_name: String,
    /// Declared column names. Documents stay schemaless.
    pub fields: Vec<String>,
    pub if_not_exists: bool,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropClassStmt {
    pub class_name: String,
    pub if_exists: bool,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub class_name: String,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub projection: Projection,
    pub class_name: String,
    pub selection: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`: the whole record including `@rid` and `@class`
    Wildcard,
    Fields(Vec<ProjectedField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedField {
    pub name: String,
    pub alias: Option<String>,
}

impl ProjectedField {
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub field: String,
    pub descending: bool,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub class_name: String,
    pub assignments: Vec<Assignment>,
    pub selection: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub class_name: String,
    pub selection: Option<Expr>,
}

/// Filter expression over document fields
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(String),
    Literal(Value),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}
