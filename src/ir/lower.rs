use crate::frontend::ast;
use crate::ir::{BinOp, Instruction, Temps, Value, Variable};

struct Context<'a> {
    instructions: Vec<Instruction>,
    temps: &'a mut Temps,
}

impl<'a> Context<'a> {
    fn new(temps: &'a mut Temps) -> Self {
        Self {
            instructions: Vec::new(),
            temps,
        }
    }

    fn emit_instr(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }
}

/// Lowers a checked program to three-address code. Temporaries are minted from `temps`,
/// so the backend can keep drawing from the same counter afterwards.
pub fn lower(prog: &ast::Program, temps: &mut Temps) -> Vec<Instruction> {
    let mut ctx = Context::new(temps);

    for stmt in &prog.statements {
        lower_statement(&mut ctx, stmt);
    }

    ctx.instructions
}

fn lower_statement(ctx: &mut Context, stmt: &ast::Statement) {
    match stmt {
        // Declarations only feed the symbol table
        ast::Statement::Declare { .. } => {}

        ast::Statement::Assign { var_name, value } => {
            let from = lower_expression(ctx, value);
            ctx.emit_instr(Instruction::mov(Variable::named(var_name.as_str()), from));
        }

        ast::Statement::Return { expr } => {
            let value = lower_expression(ctx, expr);
            ctx.emit_instr(Instruction::ret(value));
        }
    }
}

fn lower_expression(ctx: &mut Context, expr: &ast::Expr) -> Value {
    match expr {
        ast::Expr::IntLit { value } => Value::Immediate(*value),

        ast::Expr::Variable { name } => Value::var(name.as_str()),

        ast::Expr::Binary { op, left, right } => {
            let lhs = lower_expression(ctx, left);
            let rhs = lower_expression(ctx, right);

            let ir_op = match op {
                ast::BinaryOp::Add => BinOp::Add,
                ast::BinaryOp::Sub => BinOp::Sub,
                ast::BinaryOp::Mul => BinOp::Mul,
            };

            let dest = ctx.temps.fresh();
            ctx.emit_instr(Instruction::binary(ir_op, dest.clone(), lhs, rhs));
            Value::Variable(dest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser;
    use pretty_assertions::assert_eq;

    fn lower_source(source: &str) -> Vec<String> {
        let program = parser::parse(source).unwrap();
        lower(&program, &mut Temps::new())
            .iter()
            .map(|instr| instr.to_string())
            .collect()
    }

    #[test]
    fn test_temporaries_follow_evaluation_order() {
        let ir = lower_source("int r; r = a * b - (3 + b) * (c - a); return r;");
        assert_eq!(
            ir,
            vec![
                "(MUL, $0, a, b)",
                "(ADD, $1, 3, b)",
                "(SUB, $2, c, a)",
                "(MUL, $3, $1, $2)",
                "(SUB, $4, $0, $3)",
                "(MOV, r, $4)",
                "(RET, r)",
            ]
        );
    }

    #[test]
    fn test_leaves_emit_no_instructions() {
        assert_eq!(lower_source("int a; a = 5; return 7;"), vec!["(MOV, a, 5)", "(RET, 7)"]);
    }

    #[test]
    fn test_counter_continues_across_calls() {
        let mut temps = Temps::new();
        let program = parser::parse("x = 1 + 2;").unwrap();
        lower(&program, &mut temps);
        assert_eq!(temps.fresh(), Variable::named("$1"));
    }
}
