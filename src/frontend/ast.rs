#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declare { ty: Type, var_name: String },
    Assign { var_name: String, value: Expr },
    Return { expr: Expr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit { value: i32 },
    Variable { name: String },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
}
