//! 6502 CPU implementation.
//!
//! Instruction-stepped execution: each `step()` runs one whole instruction,
//! or one interrupt entry, and reports how many cycles it took. Bus accesses
//! happen in program order but are not spread over individual cycles.

use emu_core::{Bus, Cpu, Observable, Value};

use crate::addressing::resolve;
use crate::config::{CpuConfig, IllegalOpcodePolicy};
use crate::disasm::Instruction;
use crate::error::{DecodeFault, StackWrapDiagnostic};
use crate::execute::Context;
use crate::flags::{C, D, I, N, V, Z};
use crate::interrupt::{INTERRUPT_CYCLES, Interrupt, InterruptLines};
use crate::Registers;

/// Cycles taken by an undocumented opcode run as a NOP.
const ILLEGAL_NOP_CYCLES: u32 = 2;

/// The MOS 6502 CPU, as found in the Ricoh 2A03.
#[derive(Debug)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,

    config: CpuConfig,

    /// NMI latch and IRQ line.
    lines: InterruptLines,

    stack_diag: StackWrapDiagnostic,

    /// Total cycles executed.
    total_cycles: u64,

    /// Instructions and interrupt entries executed.
    instructions: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a CPU with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            config,
            lines: InterruptLines::default(),
            stack_diag: StackWrapDiagnostic::default(),
            total_cycles: 0,
            instructions: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Change configuration between steps.
    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    /// Stack wrap counters. Stays zero unless `track_stack_wraps` is set.
    #[must_use]
    pub const fn stack_diagnostic(&self) -> StackWrapDiagnostic {
        self.stack_diag
    }

    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[must_use]
    pub const fn instructions(&self) -> u64 {
        self.instructions
    }

    #[must_use]
    pub const fn nmi_pending(&self) -> bool {
        self.lines.nmi_pending
    }

    #[must_use]
    pub const fn irq_line(&self) -> bool {
        self.lines.irq_line
    }

    fn context<'a, B: Bus>(&'a mut self, bus: &'a mut B) -> Context<'a, B> {
        let ctx = Context::new(&mut self.regs, bus);
        if self.config.track_stack_wraps {
            ctx.with_stack_tracking(&mut self.stack_diag)
        } else {
            ctx
        }
    }

    fn account(&mut self, cycles: u32) -> u32 {
        self.total_cycles += u64::from(cycles);
        self.instructions += 1;
        cycles
    }

    /// Execute one instruction, or enter a pending interrupt.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeFault`] when an undocumented opcode is fetched under
    /// [`IllegalOpcodePolicy::Fault`]. Registers are left untouched with PC
    /// on the offending byte.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, DecodeFault> {
        if let Some(kind) = self.lines.poll(self.regs.p.is_set(I)) {
            log::debug!("{kind:?} taken at ${:04X}", self.regs.pc);
            self.context(bus).enter_interrupt(kind);
            return Ok(self.account(INTERRUPT_CYCLES));
        }

        let pc = self.regs.pc;
        let inst = Instruction::fetch(bus, pc);

        if inst.entry.is_illegal() {
            return match self.config.illegal_opcodes {
                IllegalOpcodePolicy::Fault => {
                    log::warn!("illegal opcode ${:02X} at ${pc:04X}", inst.opcode);
                    Err(DecodeFault {
                        pc,
                        opcode: inst.opcode,
                    })
                }
                IllegalOpcodePolicy::Nop => {
                    log::warn!("illegal opcode ${:02X} at ${pc:04X} run as NOP", inst.opcode);
                    self.regs.pc = pc.wrapping_add(1);
                    Ok(self.account(ILLEGAL_NOP_CYCLES))
                }
            };
        }

        log::trace!("${pc:04X}  {inst}");

        self.regs.pc = pc.wrapping_add(inst.byte_len());
        let resolved = resolve(
            inst.entry.mode,
            inst.operand,
            &self.regs,
            bus,
            self.config.jmp_indirect_page_wrap,
        );

        let mut cycles = u32::from(inst.entry.cycles);
        if inst.entry.page_penalty && resolved.page_crossed {
            cycles += 1;
        }
        cycles += self.context(bus).execute(inst.entry.mnemonic, resolved);

        Ok(self.account(cycles))
    }

    /// Run the reset sequence.
    ///
    /// Registers return to their power-on values, a pending NMI is dropped,
    /// and PC is loaded from the reset vector. The IRQ line is left as the
    /// caller drives it.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.lines.nmi_pending = false;
        let pc = self.context(bus).read_word(Interrupt::Reset.vector());
        self.regs.pc = pc;
        self.total_cycles += u64::from(INTERRUPT_CYCLES);
        log::debug!("reset: PC=${:04X}", self.regs.pc);
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;
    type Fault = DecodeFault;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, DecodeFault> {
        Mos6502::step(self, bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn nmi(&mut self) {
        self.lines.request_nmi();
    }

    fn set_irq_line(&mut self, asserted: bool) {
        self.lines.set_irq(asserted);
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        Mos6502::reset(self, bus);
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.status_byte().into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(self.total_cycles.into()),
            "instructions" => Some(self.instructions.into()),
            "nmi_pending" => Some(self.lines.nmi_pending.into()),
            "irq_line" => Some(self.lines.irq_line.into()),
            "stack.overflows" => Some(self.stack_diag.overflows.into()),
            "stack.underflows" => Some(self.stack_diag.underflows.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.c",
            "flags.z",
            "flags.i",
            "flags.d",
            "flags.v",
            "flags.n",
            "cycles",
            "instructions",
            "nmi_pending",
            "irq_line",
            "stack.overflows",
            "stack.underflows",
        ]
    }
}
