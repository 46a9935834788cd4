use crate::frontend::ast;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SemanticError {
    #[error("Undeclared variable '{var_name}' in statement {statement}")]
    UndeclaredVariable { var_name: String, statement: usize },

    #[error("Duplicate declaration of '{var_name}' in statement {statement}")]
    DuplicateDeclaration { var_name: String, statement: usize },

    #[error("Variable '{var_name}' is read before it is assigned, in statement {statement}")]
    UninitializedRead { var_name: String, statement: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub ty: ast::Type,
    pub initialized: bool,
}

// Σ : Identifier → Symbol
pub type SymbolTable = HashMap<String, Symbol>;

/// Checks declarations and reads in program order. Every error is collected, and on
/// success the resulting symbol table is returned.
pub fn check(program: &ast::Program) -> Result<SymbolTable, Vec<SemanticError>> {
    let mut errors = Vec::new();
    let mut symbols = SymbolTable::new();

    // Statements are numbered from 1 in error messages
    for (index, stmt) in program.statements.iter().enumerate() {
        check_statement(stmt, index + 1, &mut symbols, &mut errors);
    }

    if errors.is_empty() {
        Ok(symbols)
    } else {
        Err(errors)
    }
}

fn check_statement(
    stmt: &ast::Statement,
    statement: usize,
    symbols: &mut SymbolTable,
    errors: &mut Vec<SemanticError>,
) {
    match stmt {
        ast::Statement::Declare { ty, var_name } => {
            if symbols.contains_key(var_name) {
                errors.push(SemanticError::DuplicateDeclaration {
                    var_name: var_name.clone(),
                    statement,
                });
            } else {
                symbols.insert(var_name.clone(), Symbol { ty: *ty, initialized: false });
            }
        }

        ast::Statement::Assign { var_name, value } => {
            check_expr(value, statement, symbols, errors);
            match symbols.get_mut(var_name) {
                Some(symbol) => symbol.initialized = true,
                None => errors.push(SemanticError::UndeclaredVariable {
                    var_name: var_name.clone(),
                    statement,
                }),
            }
        }

        ast::Statement::Return { expr } => {
            check_expr(expr, statement, symbols, errors);
        }
    }
}

fn check_expr(
    expr: &ast::Expr,
    statement: usize,
    symbols: &SymbolTable,
    errors: &mut Vec<SemanticError>,
) {
    match expr {
        ast::Expr::IntLit { .. } => {}

        ast::Expr::Variable { name } => match symbols.get(name) {
            None => errors.push(SemanticError::UndeclaredVariable {
                var_name: name.clone(),
                statement,
            }),
            Some(symbol) if !symbol.initialized => errors.push(SemanticError::UninitializedRead {
                var_name: name.clone(),
                statement,
            }),
            Some(_) => {}
        },

        ast::Expr::Binary { left, right, .. } => {
            check_expr(left, statement, symbols, errors);
            check_expr(right, statement, symbols, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser;
    use pretty_assertions::assert_eq;

    fn check_source(source: &str) -> Result<SymbolTable, Vec<SemanticError>> {
        check(&parser::parse(source).unwrap())
    }

    #[test]
    fn test_declared_variables_are_typed() {
        let symbols = check_source("int a; int b; a = 1; b = a + 2; return b;").unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols["a"], Symbol { ty: ast::Type::Int, initialized: true });
    }

    #[test]
    fn test_self_reference_before_assignment() {
        let errors = check_source("int a; a = a + 1;").unwrap_err();
        assert_eq!(
            errors,
            vec![SemanticError::UninitializedRead { var_name: "a".to_string(), statement: 2 }]
        );
    }

    #[test]
    fn test_collects_every_error() {
        let errors = check_source("int a; int a; b = 1; return c;").unwrap_err();
        assert_eq!(
            errors,
            vec![
                SemanticError::DuplicateDeclaration { var_name: "a".to_string(), statement: 2 },
                SemanticError::UndeclaredVariable { var_name: "b".to_string(), statement: 3 },
                SemanticError::UndeclaredVariable { var_name: "c".to_string(), statement: 4 },
            ]
        );
    }

    #[test]
    fn test_use_before_declaration() {
        let errors = check_source("a = 1; int a;").unwrap_err();
        assert_eq!(
            errors,
            vec![SemanticError::UndeclaredVariable { var_name: "a".to_string(), statement: 1 }]
        );
    }
}
