//! Opcode decode table.
//!
//! One entry per opcode byte: mnemonic, addressing mode, base cycle count and
//! whether a page-crossing index costs an extra cycle. The 151 documented
//! NMOS opcodes are filled in; the other 105 bytes decode as
//! [`Mnemonic::Illegal`].

use std::fmt;

use crate::addressing::Mode;

/// Instruction mnemonics of the documented 6502 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Undocumented opcode byte.
    Illegal,
}

impl Mnemonic {
    /// Assembler name, e.g. `"LDA"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
            Mnemonic::Illegal => "???",
        }
    }

    /// Conditional branch instructions.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decode-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    /// Cycles taken when no page is crossed and no branch is taken.
    pub cycles: u8,
    /// Add one cycle when indexing crosses a page (read instructions only;
    /// stores and read-modify-write always pay it in `cycles`).
    pub page_penalty: bool,
}

impl Opcode {
    /// Instruction length in bytes, including the opcode.
    #[must_use]
    pub const fn byte_len(&self) -> u16 {
        1 + self.mode.operand_len()
    }

    #[must_use]
    pub const fn is_illegal(&self) -> bool {
        matches!(self.mnemonic, Mnemonic::Illegal)
    }
}

const ILLEGAL: Opcode = Opcode {
    mnemonic: Mnemonic::Illegal,
    mode: Mode::Implied,
    cycles: 2,
    page_penalty: false,
};

const fn op(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: false,
    }
}

/// Read instruction that pays an extra cycle on a page cross.
const fn read(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: true,
    }
}

#[allow(clippy::enum_glob_use)]
const fn build_table() -> [Opcode; 256] {
    use Mnemonic::*;
    use Mode::*;

    let mut t = [ILLEGAL; 256];
    t[0x00] = op(Brk, Implied, 7);
    t[0x01] = op(Ora, IndexedIndirect, 6);
    t[0x05] = op(Ora, ZeroPage, 3);
    t[0x06] = op(Asl, ZeroPage, 5);
    t[0x08] = op(Php, Implied, 3);
    t[0x09] = op(Ora, Immediate, 2);
    t[0x0A] = op(Asl, Accumulator, 2);
    t[0x0D] = op(Ora, Absolute, 4);
    t[0x0E] = op(Asl, Absolute, 6);
    t[0x10] = op(Bpl, Relative, 2);
    t[0x11] = read(Ora, IndirectIndexed, 5);
    t[0x15] = op(Ora, ZeroPageX, 4);
    t[0x16] = op(Asl, ZeroPageX, 6);
    t[0x18] = op(Clc, Implied, 2);
    t[0x19] = read(Ora, AbsoluteY, 4);
    t[0x1D] = read(Ora, AbsoluteX, 4);
    t[0x1E] = op(Asl, AbsoluteX, 7);
    t[0x20] = op(Jsr, Absolute, 6);
    t[0x21] = op(And, IndexedIndirect, 6);
    t[0x24] = op(Bit, ZeroPage, 3);
    t[0x25] = op(And, ZeroPage, 3);
    t[0x26] = op(Rol, ZeroPage, 5);
    t[0x28] = op(Plp, Implied, 4);
    t[0x29] = op(And, Immediate, 2);
    t[0x2A] = op(Rol, Accumulator, 2);
    t[0x2C] = op(Bit, Absolute, 4);
    t[0x2D] = op(And, Absolute, 4);
    t[0x2E] = op(Rol, Absolute, 6);
    t[0x30] = op(Bmi, Relative, 2);
    t[0x31] = read(And, IndirectIndexed, 5);
    t[0x35] = op(And, ZeroPageX, 4);
    t[0x36] = op(Rol, ZeroPageX, 6);
    t[0x38] = op(Sec, Implied, 2);
    t[0x39] = read(And, AbsoluteY, 4);
    t[0x3D] = read(And, AbsoluteX, 4);
    t[0x3E] = op(Rol, AbsoluteX, 7);
    t[0x40] = op(Rti, Implied, 6);
    t[0x41] = op(Eor, IndexedIndirect, 6);
    t[0x45] = op(Eor, ZeroPage, 3);
    t[0x46] = op(Lsr, ZeroPage, 5);
    t[0x48] = op(Pha, Implied, 3);
    t[0x49] = op(Eor, Immediate, 2);
    t[0x4A] = op(Lsr, Accumulator, 2);
    t[0x4C] = op(Jmp, Absolute, 3);
    t[0x4D] = op(Eor, Absolute, 4);
    t[0x4E] = op(Lsr, Absolute, 6);
    t[0x50] = op(Bvc, Relative, 2);
    t[0x51] = read(Eor, IndirectIndexed, 5);
    t[0x55] = op(Eor, ZeroPageX, 4);
    t[0x56] = op(Lsr, ZeroPageX, 6);
    t[0x58] = op(Cli, Implied, 2);
    t[0x59] = read(Eor, AbsoluteY, 4);
    t[0x5D] = read(Eor, AbsoluteX, 4);
    t[0x5E] = op(Lsr, AbsoluteX, 7);
    t[0x60] = op(Rts, Implied, 6);
    t[0x61] = op(Adc, IndexedIndirect, 6);
    t[0x65] = op(Adc, ZeroPage, 3);
    t[0x66] = op(Ror, ZeroPage, 5);
    t[0x68] = op(Pla, Implied, 4);
    t[0x69] = op(Adc, Immediate, 2);
    t[0x6A] = op(Ror, Accumulator, 2);
    t[0x6C] = op(Jmp, Indirect, 5);
    t[0x6D] = op(Adc, Absolute, 4);
    t[0x6E] = op(Ror, Absolute, 6);
    t[0x70] = op(Bvs, Relative, 2);
    t[0x71] = read(Adc, IndirectIndexed, 5);
    t[0x75] = op(Adc, ZeroPageX, 4);
    t[0x76] = op(Ror, ZeroPageX, 6);
    t[0x78] = op(Sei, Implied, 2);
    t[0x79] = read(Adc, AbsoluteY, 4);
    t[0x7D] = read(Adc, AbsoluteX, 4);
    t[0x7E] = op(Ror, AbsoluteX, 7);
    t[0x81] = op(Sta, IndexedIndirect, 6);
    t[0x84] = op(Sty, ZeroPage, 3);
    t[0x85] = op(Sta, ZeroPage, 3);
    t[0x86] = op(Stx, ZeroPage, 3);
    t[0x88] = op(Dey, Implied, 2);
    t[0x8A] = op(Txa, Implied, 2);
    t[0x8C] = op(Sty, Absolute, 4);
    t[0x8D] = op(Sta, Absolute, 4);
    t[0x8E] = op(Stx, Absolute, 4);
    t[0x90] = op(Bcc, Relative, 2);
    t[0x91] = op(Sta, IndirectIndexed, 6);
    t[0x94] = op(Sty, ZeroPageX, 4);
    t[0x95] = op(Sta, ZeroPageX, 4);
    t[0x96] = op(Stx, ZeroPageY, 4);
    t[0x98] = op(Tya, Implied, 2);
    t[0x99] = op(Sta, AbsoluteY, 5);
    t[0x9A] = op(Txs, Implied, 2);
    t[0x9D] = op(Sta, AbsoluteX, 5);
    t[0xA0] = op(Ldy, Immediate, 2);
    t[0xA1] = op(Lda, IndexedIndirect, 6);
    t[0xA2] = op(Ldx, Immediate, 2);
    t[0xA4] = op(Ldy, ZeroPage, 3);
    t[0xA5] = op(Lda, ZeroPage, 3);
    t[0xA6] = op(Ldx, ZeroPage, 3);
    t[0xA8] = op(Tay, Implied, 2);
    t[0xA9] = op(Lda, Immediate, 2);
    t[0xAA] = op(Tax, Implied, 2);
    t[0xAC] = op(Ldy, Absolute, 4);
    t[0xAD] = op(Lda, Absolute, 4);
    t[0xAE] = op(Ldx, Absolute, 4);
    t[0xB0] = op(Bcs, Relative, 2);
    t[0xB1] = read(Lda, IndirectIndexed, 5);
    t[0xB4] = op(Ldy, ZeroPageX, 4);
    t[0xB5] = op(Lda, ZeroPageX, 4);
    t[0xB6] = op(Ldx, ZeroPageY, 4);
    t[0xB8] = op(Clv, Implied, 2);
    t[0xB9] = read(Lda, AbsoluteY, 4);
    t[0xBA] = op(Tsx, Implied, 2);
    t[0xBC] = read(Ldy, AbsoluteX, 4);
    t[0xBD] = read(Lda, AbsoluteX, 4);
    t[0xBE] = read(Ldx, AbsoluteY, 4);
    t[0xC0] = op(Cpy, Immediate, 2);
    t[0xC1] = op(Cmp, IndexedIndirect, 6);
    t[0xC4] = op(Cpy, ZeroPage, 3);
    t[0xC5] = op(Cmp, ZeroPage, 3);
    t[0xC6] = op(Dec, ZeroPage, 5);
    t[0xC8] = op(Iny, Implied, 2);
    t[0xC9] = op(Cmp, Immediate, 2);
    t[0xCA] = op(Dex, Implied, 2);
    t[0xCC] = op(Cpy, Absolute, 4);
    t[0xCD] = op(Cmp, Absolute, 4);
    t[0xCE] = op(Dec, Absolute, 6);
    t[0xD0] = op(Bne, Relative, 2);
    t[0xD1] = read(Cmp, IndirectIndexed, 5);
    t[0xD5] = op(Cmp, ZeroPageX, 4);
    t[0xD6] = op(Dec, ZeroPageX, 6);
    t[0xD8] = op(Cld, Implied, 2);
    t[0xD9] = read(Cmp, AbsoluteY, 4);
    t[0xDD] = read(Cmp, AbsoluteX, 4);
    t[0xDE] = op(Dec, AbsoluteX, 7);
    t[0xE0] = op(Cpx, Immediate, 2);
    t[0xE1] = op(Sbc, IndexedIndirect, 6);
    t[0xE4] = op(Cpx, ZeroPage, 3);
    t[0xE5] = op(Sbc, ZeroPage, 3);
    t[0xE6] = op(Inc, ZeroPage, 5);
    t[0xE8] = op(Inx, Implied, 2);
    t[0xE9] = op(Sbc, Immediate, 2);
    t[0xEA] = op(Nop, Implied, 2);
    t[0xEC] = op(Cpx, Absolute, 4);
    t[0xED] = op(Sbc, Absolute, 4);
    t[0xEE] = op(Inc, Absolute, 6);
    t[0xF0] = op(Beq, Relative, 2);
    t[0xF1] = read(Sbc, IndirectIndexed, 5);
    t[0xF5] = op(Sbc, ZeroPageX, 4);
    t[0xF6] = op(Inc, ZeroPageX, 6);
    t[0xF8] = op(Sed, Implied, 2);
    t[0xF9] = read(Sbc, AbsoluteY, 4);
    t[0xFD] = read(Sbc, AbsoluteX, 4);
    t[0xFE] = op(Inc, AbsoluteX, 7);
    t
}

/// The full 256-entry decode table, indexed by opcode byte.
pub static OPCODES: [Opcode; 256] = build_table();

/// Look up an opcode byte.
#[must_use]
pub fn decode(opcode: u8) -> &'static Opcode {
    &OPCODES[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn documented_opcode_count() {
        let documented = OPCODES.iter().filter(|o| !o.is_illegal()).count();
        assert_eq!(documented, 151);

        let mnemonics: HashSet<Mnemonic> = OPCODES
            .iter()
            .filter(|o| !o.is_illegal())
            .map(|o| o.mnemonic)
            .collect();
        assert_eq!(mnemonics.len(), 56);
    }

    #[test]
    fn known_entries() {
        let lda = decode(0xA9);
        assert_eq!(lda.mnemonic, Mnemonic::Lda);
        assert_eq!(lda.mode, Mode::Immediate);
        assert_eq!(lda.cycles, 2);
        assert_eq!(lda.byte_len(), 2);

        let jmp = decode(0x6C);
        assert_eq!((jmp.mnemonic, jmp.mode, jmp.cycles), (Mnemonic::Jmp, Mode::Indirect, 5));

        let sta = decode(0x9D);
        assert_eq!(sta.cycles, 5);
        assert!(!sta.page_penalty);

        let lda_absx = decode(0xBD);
        assert!(lda_absx.page_penalty);
    }

    #[test]
    fn unused_bytes_are_illegal() {
        for byte in [0x02, 0x03, 0x1A, 0x80, 0x9C, 0xFF] {
            assert!(decode(byte).is_illegal(), "${byte:02X}");
        }
    }

    #[test]
    fn page_penalty_only_on_indexed_reads() {
        for entry in OPCODES.iter().filter(|o| o.page_penalty) {
            assert!(matches!(
                entry.mode,
                Mode::AbsoluteX | Mode::AbsoluteY | Mode::IndirectIndexed
            ));
            assert!(!matches!(
                entry.mnemonic,
                Mnemonic::Sta | Mnemonic::Asl | Mnemonic::Inc | Mnemonic::Dec
            ));
        }
    }

    #[test]
    fn branches_use_relative_mode() {
        for entry in OPCODES.iter().filter(|o| o.mnemonic.is_branch()) {
            assert_eq!(entry.mode, Mode::Relative);
            assert_eq!(entry.cycles, 2);
        }
    }

    #[test]
    fn mnemonic_names() {
        assert_eq!(Mnemonic::Adc.to_string(), "ADC");
        assert_eq!(Mnemonic::Tya.name(), "TYA");
    }
}
