//! 6502 processor status register (P).
//!
//! Bit layout, high to low: `N V - B D I Z C`. Bit 5 has no storage and
//! always reads as 1. Bit 4 (B) has no storage either: it only exists in
//! copies of P pushed to the stack, where it tells BRK/PHP apart from a
//! hardware interrupt.

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode. Stored and pushed, but the 2A03 has no BCD adder so it
/// never changes arithmetic.
pub const D: u8 = 0x08;

/// Break flag - only appears in pushed copies of P.
pub const B: u8 = 0x10;

/// Unused bit - always reads as 1.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u8);

impl Status {
    /// Create a new status register with the unused bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Restore status from a byte (PLP/RTI): unused forced on, break dropped.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self((value | U) & !B)
    }

    /// Current value as read by software: unused set, break clear.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        (self.0 | U) & !B
    }

    /// Value pushed by BRK/PHP (break and unused both set).
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | U | B
    }

    /// Value pushed by IRQ/NMI (unused set, break clear).
    #[must_use]
    pub const fn to_byte_irq(self) -> u8 {
        (self.0 | U) & !B
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// Flags for CMP/CPX/CPY: unsigned `register - operand`.
    pub fn set_compare(&mut self, register: u8, operand: u8) {
        self.set_if(C, register >= operand);
        self.update_nz(register.wrapping_sub(operand));
    }

    /// Carry as 0 or 1, for folding into arithmetic.
    #[must_use]
    pub const fn carry_bit(self) -> u8 {
        self.0 & C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_bit_always_reads_set() {
        assert_eq!(Status(0).to_byte(), U);
        assert_eq!(Status::from_byte(0).0, U);
    }

    #[test]
    fn break_bit_only_in_brk_pushes() {
        let p = Status(C | N);
        assert_eq!(p.to_byte_brk(), C | N | U | B);
        assert_eq!(p.to_byte_irq(), C | N | U);
        assert_eq!(Status::from_byte(0xFF).0, !B);
    }

    #[test]
    fn update_nz() {
        let mut p = Status::new();
        p.update_nz(0);
        assert!(p.is_set(Z) && !p.is_set(N));
        p.update_nz(0x80);
        assert!(!p.is_set(Z) && p.is_set(N));
        p.update_nz(0x7F);
        assert!(!p.is_set(Z) && !p.is_set(N));
    }

    #[test]
    fn compare_against_self() {
        for value in 0..=0xFF_u8 {
            let mut p = Status::new();
            p.set_compare(value, value);
            assert!(p.is_set(Z), "Z for {value:#04X}");
            assert!(p.is_set(C), "C for {value:#04X}");
            assert!(!p.is_set(N), "N for {value:#04X}");
        }
    }

    #[test]
    fn compare_is_unsigned() {
        let mut p = Status::new();
        // $80 is 128 unsigned, so it is above $01 even though bit 7 is set.
        p.set_compare(0x80, 0x01);
        assert!(p.is_set(C));
        assert!(!p.is_set(Z));
        assert!(!p.is_set(N));

        p.set_compare(0x01, 0x02);
        assert!(!p.is_set(C));
        assert!(p.is_set(N));
    }
}
