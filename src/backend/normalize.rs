use std::collections::HashSet;

use crate::ir::{BinOp, Instruction, Temps, Value, Variable};
use log::{debug, trace};

/// Rewrites the IR so every remaining immediate sits where RV32 can encode it:
/// `add`/`sub` take an immediate on the right only, `mul` takes none.
///
/// Constant operations are folded, and everything after the first return is dropped.
/// Temporaries minted here never reuse a name that appears anywhere in `instructions`,
/// whatever state `temps` is in.
pub fn normalize(instructions: &[Instruction], temps: &mut Temps) -> Vec<Instruction> {
    let mut normalized = Vec::with_capacity(instructions.len());
    let mut fresh = FreshTemps { temps, taken: names_in(instructions) };

    for (index, instr) in instructions.iter().enumerate() {
        match instr {
            Instruction::Return { .. } => {
                normalized.push(instr.clone());
                let dropped = instructions.len() - index - 1;
                if dropped > 0 {
                    debug!("dropping {} unreachable instruction(s) after {}", dropped, instr);
                }
                break;
            }

            Instruction::Move { .. } => normalized.push(instr.clone()),

            Instruction::Binary { op, result, lhs, rhs } => {
                let before = normalized.len();
                normalize_binary(*op, result, lhs, rhs, &mut fresh, &mut normalized);
                trace!("{} => {:?}", instr, &normalized[before..]);
            }
        }
    }

    normalized
}

fn names_in(instructions: &[Instruction]) -> HashSet<Variable> {
    let mut names = HashSet::new();
    for instr in instructions {
        match instr {
            Instruction::Move { result, .. } | Instruction::Binary { result, .. } => {
                names.insert(result.clone());
            }
            Instruction::Return { .. } => {}
        }
        names.extend(instr.operands().into_iter().filter_map(Value::as_variable).cloned());
    }
    names
}

struct FreshTemps<'a> {
    temps: &'a mut Temps,
    taken: HashSet<Variable>,
}

impl FreshTemps<'_> {
    fn next(&mut self) -> Variable {
        loop {
            let temp = self.temps.fresh();
            if self.taken.insert(temp.clone()) {
                return temp;
            }
            trace!("skipping {}, already used by the input", temp);
        }
    }
}

fn normalize_binary(
    op: BinOp,
    result: &Variable,
    lhs: &Value,
    rhs: &Value,
    fresh: &mut FreshTemps<'_>,
    out: &mut Vec<Instruction>,
) {
    match (lhs, rhs) {
        (Value::Immediate(a), Value::Immediate(b)) => {
            out.push(Instruction::mov(result.clone(), Value::Immediate(op.apply(*a, *b))));
        }

        (Value::Immediate(_), Value::Variable(_)) => match op {
            // Commutes, so the immediate moves into the legal right-hand slot
            BinOp::Add => {
                out.push(Instruction::binary(op, result.clone(), rhs.clone(), lhs.clone()));
            }

            BinOp::Sub => {
                let dest = Value::Variable(result.clone());
                out.push(Instruction::mov(result.clone(), lhs.clone()));
                out.push(Instruction::binary(op, result.clone(), dest, rhs.clone()));
            }

            // `result` may name the same location as `rhs`, so it cannot hold the constant
            BinOp::Mul => {
                let temp = fresh.next();
                out.push(Instruction::mov(temp.clone(), lhs.clone()));
                out.push(Instruction::binary(op, result.clone(), Value::Variable(temp), rhs.clone()));
            }
        },

        (Value::Variable(_), Value::Immediate(_)) => match op {
            BinOp::Add | BinOp::Sub => {
                out.push(Instruction::binary(op, result.clone(), lhs.clone(), rhs.clone()));
            }

            BinOp::Mul => {
                let temp = fresh.next();
                out.push(Instruction::mov(temp.clone(), rhs.clone()));
                out.push(Instruction::binary(op, result.clone(), lhs.clone(), Value::Variable(temp)));
            }
        },

        (Value::Variable(_), Value::Variable(_)) => {
            out.push(Instruction::binary(op, result.clone(), lhs.clone(), rhs.clone()));
        }
    }
}
