//! Instruction-stepped 6502 CPU core, as used in the NES (Ricoh 2A03).
//!
//! Each `step()` runs one whole instruction (or one interrupt entry) against
//! a caller-supplied [`emu_core::Bus`] and returns the cycles it took. The
//! decimal flag is stored but has no effect on arithmetic, as on the 2A03.
//!
//! ```
//! use emu_core::SimpleBus;
//! use mos_6502::Mos6502;
//!
//! let mut bus = SimpleBus::new();
//! // LDA #$41 ; STA $10 ; LDX $10
//! bus.load(0x0200, &[0xA9, 0x41, 0x85, 0x10, 0xA6, 0x10]);
//!
//! let mut cpu = Mos6502::new();
//! cpu.regs.pc = 0x0200;
//! for _ in 0..3 {
//!     cpu.step(&mut bus).unwrap();
//! }
//! assert_eq!(cpu.regs.x, 0x41);
//! ```

mod addressing;
mod config;
mod cpu;
mod disasm;
mod error;
mod execute;
pub mod flags;
mod interrupt;
mod opcodes;
mod registers;

pub use addressing::{EffectiveOperand, Mode, Resolved, read_indirect_target, resolve};
pub use config::{CpuConfig, IllegalOpcodePolicy};
pub use cpu::Mos6502;
pub use disasm::{Instruction, disassemble};
pub use error::{DecodeFault, StackWrapDiagnostic};
pub use execute::Context;
pub use flags::Status;
pub use interrupt::{INTERRUPT_CYCLES, Interrupt, InterruptLines};
pub use opcodes::{Mnemonic, OPCODES, Opcode, decode};
pub use registers::{Registers, STACK_PAGE};
