//! 6502 addressing modes.
//!
//! The 6502 has 13 addressing modes:
//! - Implied: No operand (e.g., CLC, RTS)
//! - Accumulator: Operates on A register (e.g., ASL A)
//! - Immediate: #$nn (literal value)
//! - Zero Page: $nn (8-bit address in page zero)
//! - Zero Page,X: $nn,X (8-bit address + X, wraps in page zero)
//! - Zero Page,Y: $nn,Y (8-bit address + Y, wraps in page zero)
//! - Relative: Branch offset (-128 to +127)
//! - Absolute: $nnnn (16-bit address)
//! - Absolute,X: $nnnn,X (16-bit address + X, may cross page)
//! - Absolute,Y: $nnnn,Y (16-bit address + Y, may cross page)
//! - Indirect: ($nnnn) (JMP only, buggy page boundary behavior)
//! - Indexed Indirect: ($nn,X) (pointer in zero page indexed by X)
//! - Indirect Indexed: ($nn),Y (zero page pointer + Y)

use emu_core::Bus;

use crate::Registers;

/// Addressing mode tag carried by each decode-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl Mode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::Relative
            | Mode::IndexedIndirect
            | Mode::IndirectIndexed => 1,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
        }
    }
}

/// What an instruction operates on once its mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveOperand {
    /// No operand.
    Implied,
    /// The A register itself.
    Accumulator,
    /// A literal byte from the instruction stream.
    Immediate(u8),
    /// A bus address to read or write. For branches and jumps this is the
    /// target.
    Address(u16),
}

/// Result of resolving a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: EffectiveOperand,
    /// Indexing (or a branch target) landed on a different page.
    pub page_crossed: bool,
}

impl Resolved {
    const fn plain(operand: EffectiveOperand) -> Self {
        Self {
            operand,
            page_crossed: false,
        }
    }

    const fn indexed(base: u16, address: u16) -> Self {
        Self {
            operand: EffectiveOperand::Address(address),
            page_crossed: (base & 0xFF00) != (address & 0xFF00),
        }
    }
}

/// Read a little-endian word from two zero-page cells, wrapping at $FF.
fn read_zero_page_word<B: Bus>(bus: &mut B, pointer: u8) -> u16 {
    let low = bus.read(u16::from(pointer));
    let high = bus.read(u16::from(pointer.wrapping_add(1)));
    u16::from_le_bytes([low, high])
}

/// Read the JMP ($nnnn) target.
///
/// With `page_wrap` set this reproduces the NMOS bug: a pointer at $xxFF
/// takes its high byte from $xx00 instead of crossing into the next page.
pub fn read_indirect_target<B: Bus>(bus: &mut B, pointer: u16, page_wrap: bool) -> u16 {
    let low = bus.read(pointer);
    let high_addr = if page_wrap {
        (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF)
    } else {
        pointer.wrapping_add(1)
    };
    let high = bus.read(high_addr);
    u16::from_le_bytes([low, high])
}

/// Resolve `mode` given the operand bytes that followed the opcode.
///
/// `regs.pc` must already point past the operand bytes; relative branches
/// are measured from there. Only the indirect modes touch the bus, to fetch
/// their pointers. The effective address itself is never read here.
pub fn resolve<B: Bus>(
    mode: Mode,
    operand: [u8; 2],
    regs: &Registers,
    bus: &mut B,
    jmp_page_wrap: bool,
) -> Resolved {
    let low = operand[0];
    let word = u16::from_le_bytes(operand);

    match mode {
        Mode::Implied => Resolved::plain(EffectiveOperand::Implied),
        Mode::Accumulator => Resolved::plain(EffectiveOperand::Accumulator),
        Mode::Immediate => Resolved::plain(EffectiveOperand::Immediate(low)),
        Mode::ZeroPage => Resolved::plain(EffectiveOperand::Address(u16::from(low))),
        Mode::ZeroPageX => Resolved::plain(EffectiveOperand::Address(u16::from(
            low.wrapping_add(regs.x),
        ))),
        Mode::ZeroPageY => Resolved::plain(EffectiveOperand::Address(u16::from(
            low.wrapping_add(regs.y),
        ))),
        Mode::Relative => {
            let offset = low as i8;
            let target = regs.pc.wrapping_add_signed(i16::from(offset));
            Resolved::indexed(regs.pc, target)
        }
        Mode::Absolute => Resolved::plain(EffectiveOperand::Address(word)),
        Mode::AbsoluteX => Resolved::indexed(word, word.wrapping_add(u16::from(regs.x))),
        Mode::AbsoluteY => Resolved::indexed(word, word.wrapping_add(u16::from(regs.y))),
        Mode::Indirect => Resolved::plain(EffectiveOperand::Address(read_indirect_target(
            bus,
            word,
            jmp_page_wrap,
        ))),
        Mode::IndexedIndirect => {
            let pointer = low.wrapping_add(regs.x);
            Resolved::plain(EffectiveOperand::Address(read_zero_page_word(bus, pointer)))
        }
        Mode::IndirectIndexed => {
            let base = read_zero_page_word(bus, low);
            Resolved::indexed(base, base.wrapping_add(u16::from(regs.y)))
        }
    }
}
