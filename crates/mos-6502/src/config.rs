//! CPU core configuration.
//!
//! Every field has a default matching NES hardware with strict decoding.
//! Individual fields can be overridden for test suites or debugging.

/// What to do when an undocumented opcode is fetched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IllegalOpcodePolicy {
    /// Stop and return a `DecodeFault` to the caller.
    #[default]
    Fault,
    /// Treat the byte as a one-byte, two-cycle NOP.
    Nop,
}

/// CPU core configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CpuConfig {
    pub illegal_opcodes: IllegalOpcodePolicy,
    /// Reproduce the NMOS `JMP ($xxFF)` bug (high byte read from $xx00).
    pub jmp_indirect_page_wrap: bool,
    /// Count stack pointer wraparounds in a `StackWrapDiagnostic`.
    pub track_stack_wraps: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            illegal_opcodes: IllegalOpcodePolicy::Fault,
            jmp_indirect_page_wrap: true,
            track_stack_wraps: cfg!(debug_assertions),
        }
    }
}

impl CpuConfig {
    #[must_use]
    pub const fn with_illegal_opcodes(mut self, policy: IllegalOpcodePolicy) -> Self {
        self.illegal_opcodes = policy;
        self
    }

    #[must_use]
    pub const fn with_jmp_indirect_page_wrap(mut self, enabled: bool) -> Self {
        self.jmp_indirect_page_wrap = enabled;
        self
    }

    #[must_use]
    pub const fn with_stack_wrap_tracking(mut self, enabled: bool) -> Self {
        self.track_stack_wraps = enabled;
        self
    }
}
