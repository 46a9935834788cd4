use crate::frontend::ast;
use chumsky::prelude::*;
use chumsky::Parser;

const KEYWORDS: [&str; 2] = ["int", "return"];

pub fn parse(source_code: &str) -> Result<ast::Program, Vec<Simple<'_, char>>> {
    parser()
        .parse(source_code)
        .into_result()
}

fn binary(left: ast::Expr, (op, right): (ast::BinaryOp, ast::Expr)) -> ast::Expr {
    ast::Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn parser<'src>() -> impl Parser<'src, &'src str, ast::Program, extra::Err<Simple<'src, char>>> {
    // Every atom is '.padded()' so whitespace and newlines between tokens are ignored.
    let ident = text::ident()
        .try_map(|s: &str, span| {
            if KEYWORDS.contains(&s) {
                Err(Simple::new(None, span))
            } else {
                Ok(s.to_string())
            }
        })
        .padded();

    let int_lit = text::int(10)
        .try_map(|s: &str, span| s.parse::<i32>().map_err(|_| Simple::new(None, span)))
        .padded();

    /*
     * Expression Parser
     * expr   := term (('+' | '-') term)*
     * term   := factor ('*' factor)*
     * factor := '(' expr ')' | ident | int
     */
    let expr = recursive(|expr| {
        let factor = int_lit
            .map(|value| ast::Expr::IntLit { value })
            .or(ident.clone().map(|name| ast::Expr::Variable { name }))
            .or(expr.delimited_by(just('(').padded(), just(')').padded()));

        let mul_op = just('*').padded().to(ast::BinaryOp::Mul);
        let term = factor.clone().foldl(mul_op.then(factor).repeated(), binary);

        let add_op = just('+').padded().to(ast::BinaryOp::Add)
            .or(just('-').padded().to(ast::BinaryOp::Sub));
        term.clone().foldl(add_op.then(term).repeated(), binary)
    });

    /*
     * Statement Parser
     * 'int a' | 'a = expr' | 'return expr', each terminated by ';'
     */
    let declare = text::keyword("int").padded()
        .ignore_then(ident.clone())
        .map(|var_name| ast::Statement::Declare { ty: ast::Type::Int, var_name });

    let return_stmt = text::keyword("return").padded()
        .ignore_then(expr.clone())
        .map(|expr| ast::Statement::Return { expr });

    let assign = ident
        .then_ignore(just('=').padded())
        .then(expr)
        .map(|(var_name, value)| ast::Statement::Assign { var_name, value });

    declare
        .or(return_stmt)
        .or(assign)
        .then_ignore(just(';').padded())
        .repeated()
        .collect::<Vec<_>>()
        .map(|statements| ast::Program { statements })
        .padded()
        .then_ignore(end())
}
