//! Reference-counting register allocator.
//!
//! Registers are handed out from a LIFO pool and bound to a variable until its last read
//! has been consumed. There is no spill path: running out of registers is fatal.

use std::collections::HashMap;
use crate::backend::liveness::UseCounts;
use crate::ir::Variable;
use log::trace;
use thiserror::Error;

pub type Register = &'static str;

pub const REGISTERS: [Register; 7] = ["t0", "t1", "t2", "t3", "t4", "t5", "t6"];

pub const RETURN_REGISTER: Register = "a0";

#[derive(Error, Debug, PartialEq)]
pub enum RegAllocError {
    #[error("no free register for '{0}', all {1} registers are live")]
    OutOfRegisters(Variable, usize),

    #[error("'{0}' is not bound to a register")]
    Unbound(Variable),
}

pub struct RegisterAllocator {
    /// Unassigned registers, popped from the back
    free: Vec<Register>,

    /// Live variable → register; never maps two variables to one register
    bindings: HashMap<Variable, Register>,

    /// Reads left per variable
    remaining: UseCounts,

    capacity: usize,
}

impl RegisterAllocator {
    pub fn new(remaining: UseCounts) -> Self {
        Self::with_registers(&REGISTERS, remaining)
    }

    /// Pool is filled in order, so the last register listed is the first handed out.
    pub fn with_registers(registers: &[Register], remaining: UseCounts) -> Self {
        Self {
            free: registers.to_vec(),
            bindings: HashMap::new(),
            remaining,
            capacity: registers.len(),
        }
    }

    /// Returns the register bound to `var`, binding a free one if it has none.
    pub fn reserve(&mut self, var: &Variable) -> Result<Register, RegAllocError> {
        if let Some(reg) = self.bindings.get(var) {
            return Ok(*reg);
        }

        let reg = self.free
            .pop()
            .ok_or_else(|| RegAllocError::OutOfRegisters(var.clone(), self.capacity))?;
        trace!("bind {} -> {}", var, reg);
        self.bindings.insert(var.clone(), reg);
        Ok(reg)
    }

    /// Register of an operand. Operands must already be bound by an earlier definition.
    pub fn lookup(&self, var: &Variable) -> Result<Register, RegAllocError> {
        self.bindings
            .get(var)
            .copied()
            .ok_or_else(|| RegAllocError::Unbound(var.clone()))
    }

    /// Consumes one read of `var`. On its last read the register returns to the pool.
    pub fn release(&mut self, var: &Variable) -> Result<(), RegAllocError> {
        let reg = self.lookup(var)?;
        let count = match self.remaining.get_mut(var) {
            Some(count) if *count > 0 => count,
            _ => return Err(RegAllocError::Unbound(var.clone())),
        };

        *count -= 1;
        if *count == 0 {
            self.unbind(var, reg);
        }
        Ok(())
    }

    /// Frees the register of a just-written variable that nothing reads afterwards.
    pub fn retire_if_dead(&mut self, var: &Variable) {
        if self.remaining_uses(var) == 0 {
            if let Some(reg) = self.bindings.get(var).copied() {
                self.unbind(var, reg);
            }
        }
    }

    pub fn remaining_uses(&self, var: &Variable) -> usize {
        self.remaining.get(var).copied().unwrap_or(0)
    }

    fn unbind(&mut self, var: &Variable, reg: Register) {
        trace!("free {} <- {}", reg, var);
        self.bindings.remove(var);
        self.free.push(reg);
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.bindings.len()
    }

    /// Bindings are injective, every bound variable still has reads left, and every
    /// register is either bound or free exactly once.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let injective = self.bindings.values().all(|reg| seen.insert(*reg));
        let bound_are_live = self.bindings.keys().all(|var| self.remaining_uses(var) > 0);
        let disjoint = self.free.iter().all(|reg| seen.insert(*reg));
        injective && bound_are_live && disjoint && seen.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(name: &str) -> Variable {
        Variable::named(name)
    }

    fn counts(entries: &[(&str, usize)]) -> UseCounts {
        entries.iter().map(|(name, n)| (v(name), *n)).collect()
    }

    #[test]
    fn test_pool_is_lifo() {
        let mut alloc = RegisterAllocator::new(counts(&[("a", 1), ("b", 1)]));
        assert_eq!(alloc.reserve(&v("a")).unwrap(), "t6");
        assert_eq!(alloc.reserve(&v("b")).unwrap(), "t5");
        assert!(alloc.is_consistent());
    }

    #[test]
    fn test_reserve_is_idempotent_for_bound_variable() {
        let mut alloc = RegisterAllocator::new(counts(&[("a", 2)]));
        let first = alloc.reserve(&v("a")).unwrap();
        assert_eq!(alloc.reserve(&v("a")).unwrap(), first);
        assert_eq!(alloc.live_count(), 1);
    }

    #[test]
    fn test_last_release_frees_register_for_reuse() {
        let mut alloc = RegisterAllocator::new(counts(&[("a", 2), ("b", 1)]));
        let reg = alloc.reserve(&v("a")).unwrap();

        alloc.release(&v("a")).unwrap();
        assert_eq!(alloc.lookup(&v("a")), Ok(reg));

        alloc.release(&v("a")).unwrap();
        assert_eq!(alloc.lookup(&v("a")), Err(RegAllocError::Unbound(v("a"))));
        assert_eq!(alloc.reserve(&v("b")).unwrap(), reg);
        assert!(alloc.is_consistent());
    }

    #[test]
    fn test_eighth_live_variable_exhausts_pool() {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut alloc = RegisterAllocator::new(names.iter().map(|n| (v(n), 1)).collect());

        for name in &names[..7] {
            alloc.reserve(&v(name)).unwrap();
            assert!(alloc.is_consistent());
        }

        assert_eq!(alloc.reserve(&v("h")), Err(RegAllocError::OutOfRegisters(v("h"), 7)));
        assert_eq!(alloc.live_count(), 7);
    }

    #[test]
    fn test_release_of_unbound_variable_is_an_error() {
        let mut alloc = RegisterAllocator::new(counts(&[("a", 1)]));
        assert_eq!(alloc.release(&v("a")), Err(RegAllocError::Unbound(v("a"))));
        assert_eq!(alloc.lookup(&v("zz")), Err(RegAllocError::Unbound(v("zz"))));
    }

    #[test]
    fn test_dead_result_is_retired() {
        let mut alloc = RegisterAllocator::new(UseCounts::new());
        let reg = alloc.reserve(&v("unused")).unwrap();
        alloc.retire_if_dead(&v("unused"));

        assert_eq!(alloc.live_count(), 0);
        assert_eq!(alloc.reserve(&v("other")).unwrap(), reg);
    }

    #[test]
    fn test_custom_pool() {
        let mut alloc = RegisterAllocator::with_registers(&["s1", "s2"], counts(&[("a", 1)]));
        assert_eq!(alloc.reserve(&v("a")).unwrap(), "s2");
        assert!(alloc.is_consistent());
    }
}
