//! CPU core trait.

use crate::Bus;

/// A CPU core driven one instruction at a time.
///
/// The bus is passed in, not owned, so the system clock that calls `step`
/// can run the video and audio chips against the same bus between steps.
/// An instruction always runs to completion inside one `step`; interrupt
/// lines are sampled only at instruction boundaries.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Error returned when an instruction cannot be executed.
    type Fault;

    /// Execute one instruction (or one interrupt entry) and return the
    /// number of CPU cycles it took.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Self::Fault>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Latch a non-maskable interrupt for the next instruction boundary.
    fn nmi(&mut self);

    /// Drive the level-sensitive interrupt request line.
    fn set_irq_line(&mut self, asserted: bool);

    /// Run the reset sequence, loading the program counter through the bus.
    fn reset<B: Bus>(&mut self, bus: &mut B);
}
