use std::collections::HashMap;
use crate::ir::{Instruction, Variable};

// Variable → number of operand reads still ahead of the emitter
pub type UseCounts = HashMap<Variable, usize>;

/// Counts every read of every variable. The input is straight-line code, so the total
/// number of reads is exactly the number the allocator will observe before a value dies.
pub fn count_uses(instructions: &[Instruction]) -> UseCounts {
    let mut counts = UseCounts::new();

    for instr in instructions {
        for operand in instr.operands() {
            if let Some(var) = operand.as_variable() {
                *counts.entry(var.clone()).or_insert(0) += 1;
            }
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinOp, Value};

    #[test]
    fn test_simple_liveness() {
        // x = 10; y = x + x; return y
        let x = Variable::named("x");
        let y = Variable::named("y");
        let counts = count_uses(&[
            Instruction::mov(x.clone(), Value::Immediate(10)),
            Instruction::binary(BinOp::Add, y.clone(), Value::var("x"), Value::var("x")),
            Instruction::ret(Value::var("y")),
        ]);

        assert_eq!(counts.get(&x), Some(&2));
        assert_eq!(counts.get(&y), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_results_and_immediates_are_not_reads() {
        let counts = count_uses(&[
            Instruction::mov(Variable::named("a"), Value::Immediate(1)),
            Instruction::binary(BinOp::Sub, Variable::named("b"), Value::var("c"), Value::Immediate(4)),
        ]);

        assert!(!counts.contains_key(&Variable::named("a")));
        assert!(!counts.contains_key(&Variable::named("b")));
        assert_eq!(counts.get(&Variable::named("c")), Some(&1));
    }
}
