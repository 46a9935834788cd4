pub mod asm;
pub mod generator;
pub mod liveness;
pub mod normalize;
pub mod regalloc;

use crate::ir::{Instruction, Temps};
use log::debug;
use regalloc::{RegAllocError, RegisterAllocator};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CodegenError {
    #[error("instruction {0} has no RV32 encoding")]
    IllegalShape(String),

    #[error("register allocation failed at {instruction}")]
    Allocation {
        instruction: String,
        #[source]
        source: RegAllocError,
    },
}

/// Normalizes `instructions`, counts variable reads and emits the assembly listing.
///
/// `temps` is the counter state left by the front end; fresh temporaries continue from it.
/// Each call works on its own copy, so repeated runs over the same input are identical.
pub fn generate(instructions: &[Instruction], temps: &Temps) -> Result<String, CodegenError> {
    let mut temps = temps.clone();
    let normalized = normalize::normalize(instructions, &mut temps);
    debug!("normalized {} IR instruction(s) into {}", instructions.len(), normalized.len());

    let uses = liveness::count_uses(&normalized);
    let mut allocator = RegisterAllocator::new(uses);
    let lines = generator::generate(&normalized, &mut allocator)?;

    let mut output = String::new();
    for line in &lines {
        output.push_str(&line.to_string());
        output.push('\n');
    }
    Ok(output)
}
