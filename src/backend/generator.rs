use crate::backend::asm::{AsmLine, Mnemonic, Operand};
use crate::backend::regalloc::{RegAllocError, RegisterAllocator, RETURN_REGISTER};
use crate::backend::CodegenError;
use crate::ir::{BinOp, Instruction, Value};
use log::trace;

/// Emits one line per normalized instruction after a `.text` header, driving `allocator`
/// as it goes. Stops at the first instruction that cannot be emitted.
pub fn generate(
    instructions: &[Instruction],
    allocator: &mut RegisterAllocator,
) -> Result<Vec<AsmLine>, CodegenError> {
    let mut output = Vec::with_capacity(instructions.len() + 1);
    output.push(AsmLine::Section(".text"));

    for instr in instructions {
        let line = emit(instr, allocator)?;
        trace!("{}", line);
        output.push(line);
    }

    Ok(output)
}

fn at(instr: &Instruction) -> impl Fn(RegAllocError) -> CodegenError + '_ {
    move |source| CodegenError::Allocation {
        instruction: instr.to_string(),
        source,
    }
}

/*
 * Operands are released (rhs first) before the result is reserved, so a result can
 * take over the register of an operand that has just died.
 */
fn emit(instr: &Instruction, alloc: &mut RegisterAllocator) -> Result<AsmLine, CodegenError> {
    let err = at(instr);

    match instr {
        Instruction::Return { value: Value::Variable(var) } => {
            let rs = alloc.lookup(var).map_err(&err)?;
            alloc.release(var).map_err(&err)?;
            Ok(AsmLine::instr(Mnemonic::Mv, RETURN_REGISTER, vec![Operand::Reg(rs)], instr))
        }

        Instruction::Return { value: Value::Immediate(k) } => {
            Ok(AsmLine::instr(Mnemonic::Li, RETURN_REGISTER, vec![Operand::Imm(*k)], instr))
        }

        Instruction::Move { result, from: Value::Immediate(k) } => {
            let rd = alloc.reserve(result).map_err(&err)?;
            alloc.retire_if_dead(result);
            Ok(AsmLine::instr(Mnemonic::Li, rd, vec![Operand::Imm(*k)], instr))
        }

        Instruction::Move { result, from: Value::Variable(src) } => {
            let rs = alloc.lookup(src).map_err(&err)?;
            alloc.release(src).map_err(&err)?;
            let rd = alloc.reserve(result).map_err(&err)?;
            alloc.retire_if_dead(result);
            Ok(AsmLine::instr(Mnemonic::Mv, rd, vec![Operand::Reg(rs)], instr))
        }

        Instruction::Binary { op, result, lhs: Value::Variable(lhs), rhs: Value::Variable(rhs) } => {
            let rs2 = alloc.lookup(rhs).map_err(&err)?;
            let rs1 = alloc.lookup(lhs).map_err(&err)?;
            alloc.release(rhs).map_err(&err)?;
            alloc.release(lhs).map_err(&err)?;
            let rd = alloc.reserve(result).map_err(&err)?;
            alloc.retire_if_dead(result);

            let mnemonic = match op {
                BinOp::Add => Mnemonic::Add,
                BinOp::Sub => Mnemonic::Sub,
                BinOp::Mul => Mnemonic::Mul,
            };
            Ok(AsmLine::instr(mnemonic, rd, vec![Operand::Reg(rs1), Operand::Reg(rs2)], instr))
        }

        Instruction::Binary {
            op: op @ (BinOp::Add | BinOp::Sub),
            result,
            lhs: Value::Variable(lhs),
            rhs: Value::Immediate(k),
        } => {
            let rs1 = alloc.lookup(lhs).map_err(&err)?;
            alloc.release(lhs).map_err(&err)?;
            let rd = alloc.reserve(result).map_err(&err)?;
            alloc.retire_if_dead(result);

            let mnemonic = if *op == BinOp::Add { Mnemonic::Addi } else { Mnemonic::Subi };
            Ok(AsmLine::instr(mnemonic, rd, vec![Operand::Reg(rs1), Operand::Imm(*k)], instr))
        }

        // Immediate on the left, or any immediate on a multiply: normalization missed it
        Instruction::Binary { .. } => Err(CodegenError::IllegalShape(instr.to_string())),
    }
}
