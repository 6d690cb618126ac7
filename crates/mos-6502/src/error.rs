//! Faults and diagnostics reported by the CPU core.

use std::fmt;

/// An undocumented opcode was fetched while the core is configured to
/// refuse them.
///
/// The registers are left exactly as they were before the fetch, with PC on
/// the offending byte, so the caller can skip it or halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFault {
    /// Address of the opcode byte.
    pub pc: u16,
    /// The opcode byte itself.
    pub opcode: u8,
}

impl fmt::Display for DecodeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal opcode ${:02X} at ${:04X}", self.opcode, self.pc)
    }
}

impl std::error::Error for DecodeFault {}

/// Counts of stack pointer wraparounds.
///
/// Wrapping is silent on real hardware; these counters exist for debugging
/// runaway recursion or unbalanced pushes and never affect execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StackWrapDiagnostic {
    /// Pushes made with S at $00 (S wrapped to $FF).
    pub overflows: u64,
    /// Pops made with S at $FF (S wrapped to $00).
    pub underflows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_fault_message() {
        let fault = DecodeFault {
            pc: 0xC123,
            opcode: 0x02,
        };
        assert_eq!(fault.to_string(), "illegal opcode $02 at $C123");
    }
}
