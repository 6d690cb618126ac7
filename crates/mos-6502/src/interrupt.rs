//! Interrupt lines and the shared entry sequence.

use emu_core::Bus;

use crate::execute::Context;
use crate::flags::I;

/// Cycles spent entering any interrupt (BRK included).
pub const INTERRUPT_CYCLES: u32 = 7;

/// Interrupt sources, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Reset,
    Nmi,
    Irq,
    Brk,
}

impl Interrupt {
    /// Address of the little-endian handler pointer.
    #[must_use]
    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => 0xFFFA,
            Interrupt::Reset => 0xFFFC,
            Interrupt::Irq | Interrupt::Brk => 0xFFFE,
        }
    }
}

/// External interrupt inputs.
///
/// NMI is edge-triggered: a request is latched until serviced. IRQ is a
/// level: it fires on every step boundary while asserted and I is clear.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterruptLines {
    pub nmi_pending: bool,
    pub irq_line: bool,
}

impl InterruptLines {
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Pick the interrupt to service at this step boundary, consuming the
    /// NMI latch if it wins.
    pub fn poll(&mut self, interrupts_disabled: bool) -> Option<Interrupt> {
        if self.nmi_pending {
            self.nmi_pending = false;
            Some(Interrupt::Nmi)
        } else if self.irq_line && !interrupts_disabled {
            Some(Interrupt::Irq)
        } else {
            None
        }
    }
}

impl<B: Bus> Context<'_, B> {
    /// Push PC and P, set I, and jump through the vector for `kind`.
    ///
    /// Only BRK pushes P with the break bit set.
    pub fn enter_interrupt(&mut self, kind: Interrupt) {
        self.push_word(self.regs.pc);
        let status = if kind == Interrupt::Brk {
            self.regs.p.to_byte_brk()
        } else {
            self.regs.p.to_byte_irq()
        };
        self.push(status);
        self.regs.p.set(I);
        self.regs.pc = self.read_word(kind.vector());
    }
}
