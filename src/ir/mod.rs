pub mod lower;

use std::fmt;

/// A named storage location. Source identifiers and minted temporaries share this type;
/// two variables with the same name are the same location.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Variable {
    name: String,
}

impl Variable {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Variable(Variable),
    Immediate(i32),
}

impl Value {
    pub fn var(name: impl Into<String>) -> Self {
        Value::Variable(Variable::named(name))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Value::Variable(var) => Some(var),
            Value::Immediate(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

impl BinOp {
    /// Folds two constants the way the target's 32-bit registers would.
    pub fn apply(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Move { result: Variable, from: Value },
    Binary { op: BinOp, result: Variable, lhs: Value, rhs: Value },
    Return { value: Value },
}

impl Instruction {
    pub fn mov(result: Variable, from: Value) -> Self {
        Instruction::Move { result, from }
    }

    pub fn binary(op: BinOp, result: Variable, lhs: Value, rhs: Value) -> Self {
        Instruction::Binary { op, result, lhs, rhs }
    }

    pub fn ret(value: Value) -> Self {
        Instruction::Return { value }
    }

    /// Operands read by this instruction, left to right.
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Move { from, .. } => vec![from],
            Instruction::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::Return { value } => vec![value],
        }
    }
}

/// Mints temporaries. The front end and the normalizer draw from the same counter so
/// the names never collide; `$` cannot start a source identifier.
#[derive(Debug, Clone, Default)]
pub struct Temps {
    next: usize,
}

impl Temps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Variable {
        let var = Variable::named(format!("${}", self.next));
        self.next += 1;
        var
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(var) => write!(f, "{}", var),
            Value::Immediate(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            BinOp::Add => "ADD",
            BinOp::Sub => "SUB",
            BinOp::Mul => "MUL",
        };
        write!(f, "{}", kind)
    }
}

// (KIND, operands...)
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Move { result, from } => write!(f, "(MOV, {}, {})", result, from),
            Instruction::Binary { op, result, lhs, rhs } => {
                write!(f, "({}, {}, {}, {})", op, result, lhs, rhs)
            }
            Instruction::Return { value } => write!(f, "(RET, {})", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temps_are_sequential() {
        let mut temps = Temps::new();
        assert_eq!(temps.fresh(), Variable::named("$0"));
        assert_eq!(temps.fresh(), Variable::named("$1"));
    }

    #[test]
    fn test_fold_wraps_like_i32() {
        assert_eq!(BinOp::Add.apply(i32::MAX, 1), i32::MIN);
        assert_eq!(BinOp::Sub.apply(3, 10), -7);
        assert_eq!(BinOp::Mul.apply(-4, 6), -24);
    }

    #[test]
    fn test_display_matches_trace_format() {
        let add = Instruction::binary(BinOp::Add, Variable::named("$0"), Value::var("a"), Value::Immediate(3));
        assert_eq!(add.to_string(), "(ADD, $0, a, 3)");
        assert_eq!(Instruction::ret(Value::var("result")).to_string(), "(RET, result)");
    }
}
