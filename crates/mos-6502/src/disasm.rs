//! Instruction fetch and disassembly.

use std::fmt;

use emu_core::Bus;

use crate::addressing::Mode;
use crate::opcodes::{Opcode, decode};

/// One instruction as it sits in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode byte.
    pub pc: u16,
    pub opcode: u8,
    pub entry: &'static Opcode,
    /// Operand bytes; only the first `entry.mode.operand_len()` are valid.
    pub operand: [u8; 2],
}

impl Instruction {
    /// Fetch the opcode at `pc` and as many operand bytes as its mode needs.
    pub fn fetch<B: Bus>(bus: &mut B, pc: u16) -> Self {
        let opcode = bus.read(pc);
        let entry = decode(opcode);
        let mut operand = [0; 2];
        for (i, byte) in (1..=entry.mode.operand_len()).zip(operand.iter_mut()) {
            *byte = bus.read(pc.wrapping_add(i));
        }
        Self {
            pc,
            opcode,
            entry,
            operand,
        }
    }

    /// Length in bytes, including the opcode.
    #[must_use]
    pub const fn byte_len(&self) -> u16 {
        self.entry.byte_len()
    }

    fn word(&self) -> u16 {
        u16::from_le_bytes(self.operand)
    }

    /// Branch target for relative instructions.
    fn relative_target(&self) -> u16 {
        let offset = i16::from(self.operand[0] as i8);
        self.pc.wrapping_add(2).wrapping_add_signed(offset)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entry.is_illegal() {
            return write!(f, ".db ${:02X}", self.opcode);
        }

        let name = self.entry.mnemonic.name();
        let zp = self.operand[0];
        match self.entry.mode {
            Mode::Implied => write!(f, "{name}"),
            Mode::Accumulator => write!(f, "{name} A"),
            Mode::Immediate => write!(f, "{name} #${zp:02X}"),
            Mode::ZeroPage => write!(f, "{name} ${zp:02X}"),
            Mode::ZeroPageX => write!(f, "{name} ${zp:02X},X"),
            Mode::ZeroPageY => write!(f, "{name} ${zp:02X},Y"),
            Mode::Relative => write!(f, "{name} ${:04X}", self.relative_target()),
            Mode::Absolute => write!(f, "{name} ${:04X}", self.word()),
            Mode::AbsoluteX => write!(f, "{name} ${:04X},X", self.word()),
            Mode::AbsoluteY => write!(f, "{name} ${:04X},Y", self.word()),
            Mode::Indirect => write!(f, "{name} (${:04X})", self.word()),
            Mode::IndexedIndirect => write!(f, "{name} (${zp:02X},X)"),
            Mode::IndirectIndexed => write!(f, "{name} (${zp:02X}),Y"),
        }
    }
}

/// Disassemble the instruction at `pc`. Returns its text and length.
pub fn disassemble<B: Bus>(bus: &mut B, pc: u16) -> (String, u16) {
    let instruction = Instruction::fetch(bus, pc);
    (instruction.to_string(), instruction.byte_len())
}
