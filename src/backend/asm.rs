use std::fmt;
use crate::backend::regalloc::Register;
use crate::ir::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Li,
    Mv,
    Add,
    Addi,
    Sub,
    // pseudo-instruction, not in base RV32I
    Subi,
    Mul,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(Register),
    Imm(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Section(&'static str),
    Instr {
        mnemonic: Mnemonic,
        dest: Register,
        operands: Vec<Operand>,
        /// IR instruction this line was generated from
        trace: String,
    },
}

impl AsmLine {
    pub fn instr(mnemonic: Mnemonic, dest: Register, operands: Vec<Operand>, source: &Instruction) -> Self {
        AsmLine::Instr {
            mnemonic,
            dest,
            operands,
            trace: source.to_string(),
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mnemonic::Li => "li",
            Mnemonic::Mv => "mv",
            Mnemonic::Add => "add",
            Mnemonic::Addi => "addi",
            Mnemonic::Sub => "sub",
            Mnemonic::Subi => "subi",
            Mnemonic::Mul => "mul",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(value) => write!(f, "{}", value),
        }
    }
}

// \tmnemonic dest, src1, src2\t\t#  (IR)
impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Section(name) => write!(f, "{}", name),
            AsmLine::Instr { mnemonic, dest, operands, trace } => {
                write!(f, "\t{} {}", mnemonic, dest)?;
                for operand in operands {
                    write!(f, ", {}", operand)?;
                }
                write!(f, "\t\t#  {}", trace)
            }
        }
    }
}
