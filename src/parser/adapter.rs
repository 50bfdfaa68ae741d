// ============================================================================
// src/parser/adapter.rs - sqlparser AST -> document-store statements
// ============================================================================

use crate::core::{DbError, Result};
use crate::parser::ast::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use sqlparser::ast as sql_ast;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

lazy_static! {
    /// `SELECT FROM x` is the document-store shorthand for `SELECT * FROM x`.
    static ref SELECT_FROM_SHORTHAND: Regex = Regex::new(r"(?i)^\s*select\s+from\b").unwrap();
}

pub struct SqlParserAdapter {
    dialect: PostgreSqlDialect,
}

impl SqlParserAdapter {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    /// Parse exactly one statement.
    pub fn parse(&self, sql: &str) -> Result<Statement> {
        let normalized = SELECT_FROM_SHORTHAND.replace(sql, "SELECT * FROM");

        let mut external_stmts = Parser::parse_sql(&self.dialect, &normalized)
            .map_err(|e| DbError::ParseError(e.to_string()))?;

        if external_stmts.len() != 1 {
            return Err(DbError::ParseError(format!(
                "Expected a single statement, got {}",
                external_stmts.len()
            )));
        }

        let stmt = external_stmts.remove(0);
        self.convert_statement(stmt, &normalized)
    }

    fn convert_statement(&self, stmt: sql_ast::Statement, sql: &str) -> Result<Statement> {
        match stmt {
            sql_ast::Statement::CreateTable(create) => {
                Ok(Statement::CreateClass(self.convert_create_table(create)?))
            }
            sql_ast::Statement::Drop {
                object_type,
                names,
                if_exists,
                ..
            } => match object_type {
                sql_ast::ObjectType::Table => {
                    Ok(Statement::DropClass(self.convert_drop_table(names, if_exists)?))
                }
                _ => Ok(Statement::Unrouted {
                    verb: command_verb(sql),
                }),
            },
            sql_ast::Statement::Insert(insert) => Ok(Statement::Insert(self.convert_insert(insert)?)),
            sql_ast::Statement::Query(query) => Ok(Statement::Select(self.convert_query(*query)?)),
            sql_ast::Statement::Delete(delete) => Ok(Statement::Delete(self.convert_delete(delete)?)),
            sql_ast::Statement::Update {
                table,
                assignments,
                selection,
                ..
            } => Ok(Statement::Update(
                self.convert_update(table, assignments, selection)?,
            )),
            _ => Ok(Statement::Unrouted {
                verb: command_verb(sql),
            }),
        }
    }

    fn convert_create_table(&self, create: sql_ast::CreateTable) -> Result<CreateClassStmt> {
        let class_name = extract_class_name(&create.name)?;
        let fields = create.columns.into_iter().map(|col| col.name.value).collect();

        Ok(CreateClassStmt {
            class_name,
            fields,
            if_not_exists: create.if_not_exists,
        })
    }

    fn convert_drop_table(
        &self,
        names: Vec<sql_ast::ObjectName>,
        if_exists: bool,
    ) -> Result<DropClassStmt> {
        if names.len() != 1 {
            return Err(DbError::ParseError("Only single class DROP supported".into()));
        }

        Ok(DropClassStmt {
            class_name: extract_class_name(&names[0])?,
            if_exists,
        })
    }

    fn convert_insert(&self, insert: sql_ast::Insert) -> Result<InsertStmt> {
        let class_name = unquote(&insert.table.to_string());

        if insert.columns.is_empty() {
            return Err(DbError::ParseError(format!(
                "INSERT INTO {} requires a field list",
                class_name
            )));
        }
        let fields: Vec<String> = insert.columns.into_iter().map(|id| id.value).collect();

        let Some(source) = insert.source else {
            return Err(DbError::ParseError("INSERT requires a VALUES clause".into()));
        };
        let sql_ast::SetExpr::Values(vals) = *source.body else {
            return Err(DbError::ParseError("Only VALUES clause supported".into()));
        };

        let rows = vals
            .rows
            .into_iter()
            .map(|row| {
                if row.len() != fields.len() {
                    return Err(DbError::ParseError(format!(
                        "Expected {} values, got {}",
                        fields.len(),
                        row.len()
                    )));
                }
                row.into_iter()
                    .map(|expr| self.convert_literal(expr))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InsertStmt {
            class_name,
            fields,
            rows,
        })
    }

    fn convert_query(&self, query: sql_ast::Query) -> Result<SelectStmt> {
        let sql_ast::SetExpr::Select(select) = *query.body else {
            return Err(DbError::ParseError("Only SELECT queries supported".into()));
        };
        let select = *select;

        if select.distinct.is_some() {
            return Err(DbError::ParseError("DISTINCT is not supported".into()));
        }
        let grouped = match &select.group_by {
            sql_ast::GroupByExpr::All(_) => true,
            sql_ast::GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
        };
        if grouped {
            return Err(DbError::ParseError("GROUP BY is not supported".into()));
        }
        if select.having.is_some() {
            return Err(DbError::ParseError("HAVING is not supported".into()));
        }

        let projection = self.convert_projection(select.projection)?;

        let mut from = select.from;
        if from.len() != 1 {
            return Err(DbError::ParseError(
                "SELECT requires exactly one class in FROM".into(),
            ));
        }
        let table = from.remove(0);
        if !table.joins.is_empty() {
            return Err(DbError::ParseError("JOIN is not supported".into()));
        }
        let class_name = match table.relation {
            sql_ast::TableFactor::Table { name, .. } => extract_class_name(&name)?,
            _ => {
                return Err(DbError::ParseError(
                    "Complex class references not supported".into(),
                ));
            }
        };

        let selection = select.selection.map(|expr| self.convert_expr(expr)).transpose()?;
        let order_by = self.convert_order_by(query.order_by)?;
        let (limit, offset) = self.convert_limit_clause(&query.limit_clause)?;

        Ok(SelectStmt {
            projection,
            class_name,
            selection,
            order_by,
            limit,
            offset,
        })
    }

    fn convert_projection(&self, items: Vec<sql_ast::SelectItem>) -> Result<Projection> {
        if items.len() == 1 && matches!(items[0], sql_ast::SelectItem::Wildcard(_)) {
            return Ok(Projection::Wildcard);
        }

        let fields = items
            .into_iter()
            .map(|item| match item {
                sql_ast::SelectItem::UnnamedExpr(sql_ast::Expr::Identifier(ident)) => {
                    Ok(ProjectedField {
                        name: ident.value,
                        alias: None,
                    })
                }
                sql_ast::SelectItem::ExprWithAlias {
                    expr: sql_ast::Expr::Identifier(ident),
                    alias,
                } => Ok(ProjectedField {
                    name: ident.value,
                    alias: Some(alias.value),
                }),
                other => Err(DbError::ParseError(format!(
                    "Unsupported projection: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Projection::Fields(fields))
    }

    fn convert_order_by(&self, order_by: Option<sql_ast::OrderBy>) -> Result<Vec<OrderByExpr>> {
        let Some(order_by) = order_by else {
            return Ok(Vec::new());
        };

        match order_by.kind {
            sql_ast::OrderByKind::Expressions(exprs) => exprs
                .into_iter()
                .map(|order| {
                    let field = match order.expr {
                        sql_ast::Expr::Identifier(ident) => ident.value,
                        other => {
                            return Err(DbError::ParseError(format!(
                                "ORDER BY supports field names only, got: {}",
                                other
                            )));
                        }
                    };
                    let descending = order.options.asc.map(|asc| !asc).unwrap_or(false);
                    Ok(OrderByExpr { field, descending })
                })
                .collect(),
            sql_ast::OrderByKind::All(_) => {
                Err(DbError::ParseError("ORDER BY ALL not supported".into()))
            }
        }
    }

    /// `(limit, offset)`; a missing offset is zero.
    fn convert_limit_clause(
        &self,
        limit_clause: &Option<sql_ast::LimitClause>,
    ) -> Result<(Option<usize>, usize)> {
        let Some(clause) = limit_clause else {
            return Ok((None, 0));
        };

        let (limit, offset) = match clause {
            sql_ast::LimitClause::LimitOffset { limit, offset, .. } => {
                (limit.as_ref(), offset.as_ref().map(|o| &o.value))
            }
            sql_ast::LimitClause::OffsetCommaLimit { offset, limit } => (Some(limit), Some(offset)),
        };

        let limit = limit.map(|expr| row_count(expr, "LIMIT")).transpose()?;
        let offset = offset.map(|expr| row_count(expr, "OFFSET")).transpose()?;
        Ok((limit, offset.unwrap_or(0)))
    }

    fn convert_update(
        &self,
        table: sql_ast::TableWithJoins,
        assignments: Vec<sql_ast::Assignment>,
        selection: Option<sql_ast::Expr>,
    ) -> Result<UpdateStmt> {
        let class_name = match table.relation {
            sql_ast::TableFactor::Table { name, .. } => extract_class_name(&name)?,
            _ => {
                return Err(DbError::ParseError(
                    "Complex class references not supported in UPDATE".into(),
                ));
            }
        };

        let assignments = assignments
            .into_iter()
            .map(|assign| {
                let field = match assign.target {
                    sql_ast::AssignmentTarget::ColumnName(col_name) if col_name.0.len() == 1 => {
                        unquote(&col_name.0[0].to_string())
                    }
                    _ => {
                        return Err(DbError::ParseError(
                            "Only simple field names supported in UPDATE".into(),
                        ));
                    }
                };
                let value = self.convert_literal(assign.value)?;
                Ok(Assignment { field, value })
            })
            .collect::<Result<Vec<_>>>()?;

        let selection = selection.map(|expr| self.convert_expr(expr)).transpose()?;

        Ok(UpdateStmt {
            class_name,
            assignments,
            selection,
        })
    }

    fn convert_delete(&self, delete: sql_ast::Delete) -> Result<DeleteStmt> {
        let tables = match delete.from {
            sql_ast::FromTable::WithFromKeyword(tables) => tables,
            sql_ast::FromTable::WithoutKeyword(tables) => tables,
        };

        let class_name = match tables.first().map(|t| &t.relation) {
            Some(sql_ast::TableFactor::Table { name, .. }) => extract_class_name(name)?,
            Some(_) => {
                return Err(DbError::ParseError(
                    "Complex class references not supported in DELETE".into(),
                ));
            }
            None => return Err(DbError::ParseError("DELETE requires a class name".into())),
        };

        let selection = delete
            .selection
            .map(|expr| self.convert_expr(expr))
            .transpose()?;

        Ok(DeleteStmt {
            class_name,
            selection,
        })
    }

    fn convert_expr(&self, expr: sql_ast::Expr) -> Result<Expr> {
        match expr {
            sql_ast::Expr::Identifier(ident) => Ok(Expr::Field(ident.value)),
            sql_ast::Expr::Nested(inner) => self.convert_expr(*inner),
            sql_ast::Expr::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert_expr(*inner)?),
                negated: false,
            }),
            sql_ast::Expr::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert_expr(*inner)?),
                negated: true,
            }),
            sql_ast::Expr::UnaryOp {
                op: sql_ast::UnaryOperator::Not,
                expr,
            } => Ok(Expr::Not(Box::new(self.convert_expr(*expr)?))),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
                left: Box::new(self.convert_expr(*left)?),
                op: convert_binary_op(&op)?,
                right: Box::new(self.convert_expr(*right)?),
            }),
            literal @ (sql_ast::Expr::Value(_) | sql_ast::Expr::UnaryOp { .. }) => {
                Ok(Expr::Literal(self.convert_literal(literal)?))
            }
            other => Err(DbError::ParseError(format!(
                "Unsupported expression: {}",
                other
            ))),
        }
    }

    fn convert_literal(&self, expr: sql_ast::Expr) -> Result<Value> {
        match expr {
            sql_ast::Expr::Value(val) => convert_value(&val.value),
            sql_ast::Expr::UnaryOp {
                op: sql_ast::UnaryOperator::Minus,
                expr,
            } => match self.convert_literal(*expr)? {
                Value::Number(n) => negate(&n),
                other => Err(DbError::TypeMismatch(format!("Cannot negate {}", other))),
            },
            sql_ast::Expr::UnaryOp {
                op: sql_ast::UnaryOperator::Plus,
                expr,
            } => self.convert_literal(*expr),
            other => Err(DbError::ParseError(format!(
                "Expected a literal value, got: {}",
                other
            ))),
        }
    }
}

impl Default for SqlParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_value(val: &sql_ast::Value) -> Result<Value> {
    match val {
        sql_ast::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::from(i))
            } else if let Some(f) = n.parse::<f64>().ok().and_then(Number::from_f64) {
                Ok(Value::Number(f))
            } else {
                Err(DbError::TypeMismatch(format!("Invalid number: {}", n)))
            }
        }
        sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
            Ok(Value::String(s.clone()))
        }
        sql_ast::Value::Boolean(b) => Ok(Value::Bool(*b)),
        sql_ast::Value::Null => Ok(Value::Null),
        other => Err(DbError::ParseError(format!("Unsupported value: {}", other))),
    }
}

fn negate(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(-i));
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(-f))
        .map(Value::Number)
        .ok_or_else(|| DbError::TypeMismatch(format!("Cannot negate {}", n)))
}

fn row_count(expr: &sql_ast::Expr, clause: &str) -> Result<usize> {
    match expr {
        sql_ast::Expr::Value(value_with_span) => match &value_with_span.value {
            sql_ast::Value::Number(n, _) => n
                .parse::<usize>()
                .map_err(|_| DbError::ParseError(format!("Invalid {} value: {}", clause, n))),
            other => Err(DbError::ParseError(format!(
                "Only numeric {} supported, got: {}",
                clause, other
            ))),
        },
        _ => Err(DbError::ParseError(format!("Only numeric {} supported", clause))),
    }
}

fn convert_binary_op(op: &sql_ast::BinaryOperator) -> Result<BinaryOp> {
    use sql_ast::BinaryOperator as SqlOp;

    match op {
        SqlOp::Eq => Ok(BinaryOp::Eq),
        SqlOp::NotEq => Ok(BinaryOp::NotEq),
        SqlOp::Lt => Ok(BinaryOp::Lt),
        SqlOp::LtEq => Ok(BinaryOp::LtEq),
        SqlOp::Gt => Ok(BinaryOp::Gt),
        SqlOp::GtEq => Ok(BinaryOp::GtEq),
        SqlOp::And => Ok(BinaryOp::And),
        SqlOp::Or => Ok(BinaryOp::Or),
        _ => Err(DbError::ParseError(format!(
            "Unsupported binary operator: {}",
            op
        ))),
    }
}

fn extract_class_name(name: &sql_ast::ObjectName) -> Result<String> {
    name.0
        .last()
        .map(|ident| unquote(&ident.to_string()))
        .ok_or_else(|| DbError::ParseError("Invalid class name".into()))
}

fn unquote(name: &str) -> String {
    name.trim_matches('"').to_string()
}

/// First word of the statement text, upper-cased.
fn command_verb(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

// ============================================================================
// TESTS
// ============================================================================
