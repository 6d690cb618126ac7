//! Instruction semantics.
//!
//! The executor holds no state of its own. Each instruction runs against a
//! [`Context`] that borrows the register file and the bus for the duration of
//! one step, so a test can build a context around fresh registers and a
//! `SimpleBus` and drive single instructions directly.

use emu_core::Bus;

use crate::addressing::{EffectiveOperand, Resolved};
use crate::flags::{C, D, I, N, V, Z};
use crate::interrupt::Interrupt;
use crate::opcodes::Mnemonic;
use crate::{Registers, StackWrapDiagnostic, Status};

/// Mutable view of the machine used while executing one instruction.
pub struct Context<'a, B: Bus> {
    pub regs: &'a mut Registers,
    pub bus: &'a mut B,
    stack_wraps: Option<&'a mut StackWrapDiagnostic>,
}

impl<'a, B: Bus> Context<'a, B> {
    pub fn new(regs: &'a mut Registers, bus: &'a mut B) -> Self {
        Self {
            regs,
            bus,
            stack_wraps: None,
        }
    }

    /// Count stack pointer wraparounds into `diagnostic`.
    #[must_use]
    pub fn with_stack_tracking(mut self, diagnostic: &'a mut StackWrapDiagnostic) -> Self {
        self.stack_wraps = Some(diagnostic);
        self
    }

    // ========================================================================
    // Bus and stack helpers
    // ========================================================================

    /// Push a byte onto the stack page.
    pub fn push(&mut self, value: u8) {
        if self.regs.s == 0x00
            && let Some(diag) = self.stack_wraps.as_deref_mut()
        {
            diag.overflows += 1;
            log::debug!("stack overflow: S wrapped $00 -> $FF near ${:04X}", self.regs.pc);
        }
        let addr = self.regs.push();
        self.bus.write(addr, value);
    }

    /// Pull a byte from the stack page.
    pub fn pull(&mut self) -> u8 {
        if self.regs.s == 0xFF
            && let Some(diag) = self.stack_wraps.as_deref_mut()
        {
            diag.underflows += 1;
            log::debug!("stack underflow: S wrapped $FF -> $00 near ${:04X}", self.regs.pc);
        }
        let addr = self.regs.pop();
        self.bus.read(addr)
    }

    /// Push a 16-bit word onto the stack (high byte first).
    pub fn push_word(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push(high);
        self.push(low);
    }

    /// Pull a 16-bit word from the stack (low byte first).
    pub fn pull_word(&mut self) -> u16 {
        let low = self.pull();
        let high = self.pull();
        u16::from_le_bytes([low, high])
    }

    /// Read a 16-bit little-endian word.
    pub fn read_word(&mut self, address: u16) -> u16 {
        let low = self.bus.read(address);
        let high = self.bus.read(address.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    fn load(&mut self, operand: EffectiveOperand) -> u8 {
        match operand {
            EffectiveOperand::Immediate(value) => value,
            EffectiveOperand::Address(addr) => self.bus.read(addr),
            EffectiveOperand::Accumulator => self.regs.a,
            EffectiveOperand::Implied => 0,
        }
    }

    fn store(&mut self, operand: EffectiveOperand, value: u8) {
        match operand {
            EffectiveOperand::Address(addr) => self.bus.write(addr, value),
            EffectiveOperand::Accumulator => self.regs.a = value,
            EffectiveOperand::Immediate(_) | EffectiveOperand::Implied => {}
        }
    }

    /// Read the operand and feed it to `op`.
    fn read_with(&mut self, operand: EffectiveOperand, op: fn(&mut Self, u8)) {
        let value = self.load(operand);
        op(self, value);
    }

    /// Read-modify-write on A or a memory cell.
    fn modify_with(&mut self, operand: EffectiveOperand, op: fn(&mut Self, u8) -> u8) {
        let value = self.load(operand);
        let result = op(self, value);
        self.store(operand, result);
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Execute one decoded instruction whose operand has been resolved.
    ///
    /// PC must already point at the next instruction. Returns the extra
    /// cycles a taken branch costs; every other cost is in the decode table.
    pub fn execute(&mut self, mnemonic: Mnemonic, resolved: Resolved) -> u32 {
        let operand = resolved.operand;
        let p = self.regs.p;

        match mnemonic {
            // Loads and stores
            Mnemonic::Lda => self.read_with(operand, Self::do_lda),
            Mnemonic::Ldx => self.read_with(operand, Self::do_ldx),
            Mnemonic::Ldy => self.read_with(operand, Self::do_ldy),
            Mnemonic::Sta => self.store(operand, self.regs.a),
            Mnemonic::Stx => self.store(operand, self.regs.x),
            Mnemonic::Sty => self.store(operand, self.regs.y),

            // Arithmetic and logic
            Mnemonic::Adc => self.read_with(operand, Self::do_adc),
            Mnemonic::Sbc => self.read_with(operand, Self::do_sbc),
            Mnemonic::And => self.read_with(operand, Self::do_and),
            Mnemonic::Ora => self.read_with(operand, Self::do_ora),
            Mnemonic::Eor => self.read_with(operand, Self::do_eor),
            Mnemonic::Cmp => self.read_with(operand, Self::do_cmp),
            Mnemonic::Cpx => self.read_with(operand, Self::do_cpx),
            Mnemonic::Cpy => self.read_with(operand, Self::do_cpy),
            Mnemonic::Bit => self.read_with(operand, Self::do_bit),

            // Read-modify-write
            Mnemonic::Asl => self.modify_with(operand, Self::do_asl),
            Mnemonic::Lsr => self.modify_with(operand, Self::do_lsr),
            Mnemonic::Rol => self.modify_with(operand, Self::do_rol),
            Mnemonic::Ror => self.modify_with(operand, Self::do_ror),
            Mnemonic::Inc => self.modify_with(operand, Self::do_inc),
            Mnemonic::Dec => self.modify_with(operand, Self::do_dec),

            // Register increment/decrement
            Mnemonic::Inx => self.regs.x = self.do_inc(self.regs.x),
            Mnemonic::Iny => self.regs.y = self.do_inc(self.regs.y),
            Mnemonic::Dex => self.regs.x = self.do_dec(self.regs.x),
            Mnemonic::Dey => self.regs.y = self.do_dec(self.regs.y),

            // Transfers
            Mnemonic::Tax => self.do_ldx(self.regs.a),
            Mnemonic::Tay => self.do_ldy(self.regs.a),
            Mnemonic::Txa => self.do_lda(self.regs.x),
            Mnemonic::Tya => self.do_lda(self.regs.y),
            Mnemonic::Tsx => self.do_ldx(self.regs.s),
            // TXS does not affect flags
            Mnemonic::Txs => self.regs.s = self.regs.x,

            // Branches
            Mnemonic::Bcc => return self.branch(!p.is_set(C), resolved),
            Mnemonic::Bcs => return self.branch(p.is_set(C), resolved),
            Mnemonic::Bne => return self.branch(!p.is_set(Z), resolved),
            Mnemonic::Beq => return self.branch(p.is_set(Z), resolved),
            Mnemonic::Bpl => return self.branch(!p.is_set(N), resolved),
            Mnemonic::Bmi => return self.branch(p.is_set(N), resolved),
            Mnemonic::Bvc => return self.branch(!p.is_set(V), resolved),
            Mnemonic::Bvs => return self.branch(p.is_set(V), resolved),

            // Jumps and subroutines
            Mnemonic::Jmp => self.jump(operand),
            Mnemonic::Jsr => {
                self.push_word(self.regs.pc.wrapping_sub(1));
                self.jump(operand);
            }
            Mnemonic::Rts => self.regs.pc = self.pull_word().wrapping_add(1),
            Mnemonic::Rti => {
                let status = self.pull();
                self.regs.p = Status::from_byte(status);
                self.regs.pc = self.pull_word();
            }
            Mnemonic::Brk => {
                // Skip the padding byte after BRK.
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.enter_interrupt(Interrupt::Brk);
            }

            // Stack
            Mnemonic::Pha => self.push(self.regs.a),
            Mnemonic::Php => self.push(self.regs.p.to_byte_brk()),
            Mnemonic::Pla => {
                let value = self.pull();
                self.do_lda(value);
            }
            Mnemonic::Plp => {
                let value = self.pull();
                self.regs.p = Status::from_byte(value);
            }

            // Flags
            Mnemonic::Clc => self.regs.p.clear(C),
            Mnemonic::Sec => self.regs.p.set(C),
            Mnemonic::Cli => self.regs.p.clear(I),
            Mnemonic::Sei => self.regs.p.set(I),
            Mnemonic::Cld => self.regs.p.clear(D),
            Mnemonic::Sed => self.regs.p.set(D),
            Mnemonic::Clv => self.regs.p.clear(V),

            Mnemonic::Nop | Mnemonic::Illegal => {}
        }
        0
    }

    fn jump(&mut self, operand: EffectiveOperand) {
        if let EffectiveOperand::Address(target) = operand {
            self.regs.pc = target;
        }
    }

    /// Taken branches cost one cycle, two if the target is on another page.
    fn branch(&mut self, taken: bool, resolved: Resolved) -> u32 {
        if !taken {
            return 0;
        }
        self.jump(resolved.operand);
        if resolved.page_crossed { 2 } else { 1 }
    }

    // ========================================================================
    // ALU operations
    // ========================================================================

    fn do_lda(&mut self, val: u8) {
        self.regs.a = val;
        self.regs.p.update_nz(val);
    }

    fn do_ldx(&mut self, val: u8) {
        self.regs.x = val;
        self.regs.p.update_nz(val);
    }

    fn do_ldy(&mut self, val: u8) {
        self.regs.y = val;
        self.regs.p.update_nz(val);
    }

    fn do_ora(&mut self, val: u8) {
        self.regs.a |= val;
        self.regs.p.update_nz(self.regs.a);
    }

    fn do_and(&mut self, val: u8) {
        self.regs.a &= val;
        self.regs.p.update_nz(self.regs.a);
    }

    fn do_eor(&mut self, val: u8) {
        self.regs.a ^= val;
        self.regs.p.update_nz(self.regs.a);
    }

    /// Binary add. The decimal flag is ignored: the 2A03 has no BCD adder.
    fn do_adc(&mut self, val: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(val) + u16::from(self.regs.p.carry_bit());
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        // Overflow: both inputs share a sign that the result does not.
        self.regs.p.set_if(V, (a ^ result) & (val ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    /// `A - M - (1 - C)` is `A + !M + C`.
    fn do_sbc(&mut self, val: u8) {
        self.do_adc(!val);
    }

    fn do_cmp(&mut self, val: u8) {
        self.regs.p.set_compare(self.regs.a, val);
    }

    fn do_cpx(&mut self, val: u8) {
        self.regs.p.set_compare(self.regs.x, val);
    }

    fn do_cpy(&mut self, val: u8) {
        self.regs.p.set_compare(self.regs.y, val);
    }

    fn do_bit(&mut self, val: u8) {
        self.regs.p.set_if(Z, self.regs.a & val == 0);
        self.regs.p.set_if(N, val & 0x80 != 0);
        self.regs.p.set_if(V, val & 0x40 != 0);
    }

    fn do_asl(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = val << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_lsr(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = val >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_rol(&mut self, val: u8) -> u8 {
        let carry = self.regs.p.carry_bit();
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = (val << 1) | carry;
        self.regs.p.update_nz(result);
        result
    }

    fn do_ror(&mut self, val: u8) -> u8 {
        let carry = self.regs.p.carry_bit() << 7;
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = (val >> 1) | carry;
        self.regs.p.update_nz(result);
        result
    }

    fn do_inc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn do_dec(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn imm(value: u8) -> Resolved {
        Resolved {
            operand: EffectiveOperand::Immediate(value),
            page_crossed: false,
        }
    }

    fn at(addr: u16) -> Resolved {
        Resolved {
            operand: EffectiveOperand::Address(addr),
            page_crossed: false,
        }
    }

    const ACC: Resolved = Resolved {
        operand: EffectiveOperand::Accumulator,
        page_crossed: false,
    };

    const NONE: Resolved = Resolved {
        operand: EffectiveOperand::Implied,
        page_crossed: false,
    };

    #[test]
    fn adc_exhaustive_without_carry() {
        let mut bus = SimpleBus::new();
        for a in 0..=0xFF_u8 {
            for b in 0..=0xFF_u8 {
                let mut regs = Registers::new();
                regs.a = a;
                Context::new(&mut regs, &mut bus).execute(Mnemonic::Adc, imm(b));

                let sum = u16::from(a) + u16::from(b);
                let result = sum as u8;
                let same_sign = (a ^ b) & 0x80 == 0;
                let flipped = (a ^ result) & 0x80 != 0;

                assert_eq!(regs.a, result, "{a:#04X}+{b:#04X}");
                assert_eq!(regs.p.is_set(C), sum >= 0x100, "C {a:#04X}+{b:#04X}");
                assert_eq!(regs.p.is_set(V), same_sign && flipped, "V {a:#04X}+{b:#04X}");
                assert_eq!(regs.p.is_set(Z), result == 0);
                assert_eq!(regs.p.is_set(N), result & 0x80 != 0);
            }
        }
    }

    #[test]
    fn sbc_exhaustive_matches_signed_reference() {
        let mut bus = SimpleBus::new();
        for carry in [false, true] {
            for a in 0..=0xFF_u8 {
                for b in 0..=0xFF_u8 {
                    let mut regs = Registers::new();
                    regs.a = a;
                    regs.p.set_if(C, carry);
                    Context::new(&mut regs, &mut bus).execute(Mnemonic::Sbc, imm(b));

                    let borrow = i16::from(!carry);
                    let unsigned = i16::from(a) - i16::from(b) - borrow;
                    let signed = i16::from(a as i8) - i16::from(b as i8) - borrow;

                    assert_eq!(regs.a, unsigned as u8, "{a:#04X}-{b:#04X} c={carry}");
                    assert_eq!(regs.p.is_set(C), unsigned >= 0, "C {a:#04X}-{b:#04X}");
                    assert_eq!(
                        regs.p.is_set(V),
                        !(-128..=127).contains(&signed),
                        "V {a:#04X}-{b:#04X} c={carry}"
                    );
                }
            }
        }
    }

    #[test]
    fn adc_ignores_decimal_flag() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.p.set(D);
        regs.a = 0x09;
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Adc, imm(0x01));
        assert_eq!(regs.a, 0x0A);
    }

    #[test]
    fn rotates_fold_carry() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.a = 0x80;
        regs.p.set(C);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Rol, ACC);
        assert_eq!(regs.a, 0x01);
        assert!(regs.p.is_set(C));

        regs.a = 0x01;
        regs.p.clear(C);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Ror, ACC);
        assert_eq!(regs.a, 0x00);
        assert!(regs.p.is_set(C));
        assert!(regs.p.is_set(Z));

        Context::new(&mut regs, &mut bus).execute(Mnemonic::Ror, ACC);
        assert_eq!(regs.a, 0x80);
        assert!(regs.p.is_set(N));
        assert!(!regs.p.is_set(C));
    }

    #[test]
    fn shifts_on_memory_write_back() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        bus.write(0x0040, 0x81);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Asl, at(0x0040));
        assert_eq!(bus.peek(0x0040), 0x02);
        assert!(regs.p.is_set(C));

        Context::new(&mut regs, &mut bus).execute(Mnemonic::Lsr, at(0x0040));
        assert_eq!(bus.peek(0x0040), 0x01);
        assert!(!regs.p.is_set(C));
        assert_eq!(regs.a, 0, "A untouched by memory shifts");
    }

    #[test]
    fn inc_dec_wrap_without_carry() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        bus.write(0x0010, 0xFF);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Inc, at(0x0010));
        assert_eq!(bus.peek(0x0010), 0x00);
        assert!(regs.p.is_set(Z));
        assert!(!regs.p.is_set(C));

        Context::new(&mut regs, &mut bus).execute(Mnemonic::Dex, NONE);
        assert_eq!(regs.x, 0xFF);
        assert!(regs.p.is_set(N));
    }

    #[test]
    fn bit_copies_operand_bits() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.a = 0x01;
        bus.write(0x0020, 0xC0);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Bit, at(0x0020));
        assert!(regs.p.is_set(Z));
        assert!(regs.p.is_set(V));
        assert!(regs.p.is_set(N));
        assert_eq!(regs.a, 0x01);
    }

    #[test]
    fn transfers_and_txs_flags() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.x = 0x00;
        regs.p.clear(Z);
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Txs, NONE);
        assert_eq!(regs.s, 0x00);
        assert!(!regs.p.is_set(Z), "TXS leaves flags alone");

        Context::new(&mut regs, &mut bus).execute(Mnemonic::Tsx, NONE);
        assert!(regs.p.is_set(Z));
    }

    #[test]
    fn branch_costs() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.pc = 0x0202;
        regs.p.set(Z);

        let same_page = at(0x0210);
        assert_eq!(Context::new(&mut regs, &mut bus).execute(Mnemonic::Beq, same_page), 1);
        assert_eq!(regs.pc, 0x0210);

        let far = Resolved {
            operand: EffectiveOperand::Address(0x0300),
            page_crossed: true,
        };
        assert_eq!(Context::new(&mut regs, &mut bus).execute(Mnemonic::Beq, far), 2);
        assert_eq!(regs.pc, 0x0300);

        assert_eq!(Context::new(&mut regs, &mut bus).execute(Mnemonic::Bne, far), 0);
        assert_eq!(regs.pc, 0x0300);
    }

    #[test]
    fn stack_round_trip_reverses_order() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.s = 0xFF;
        let bytes: Vec<u8> = (0..255).map(|i| (i * 7) as u8).collect();

        let mut ctx = Context::new(&mut regs, &mut bus);
        for &b in &bytes {
            ctx.push(b);
        }
        let popped: Vec<u8> = (0..bytes.len()).map(|_| ctx.pull()).collect();

        let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
        assert_eq!(popped, reversed);
        assert_eq!(regs.s, 0xFF);
    }

    #[test]
    fn stack_wraps_are_counted() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        let mut diag = StackWrapDiagnostic::default();
        regs.s = 0x00;

        let mut ctx = Context::new(&mut regs, &mut bus).with_stack_tracking(&mut diag);
        ctx.push(0xAA);
        assert_eq!(ctx.regs.s, 0xFF);
        assert_eq!(ctx.pull(), 0xAA);
        assert_eq!(ctx.pull(), 0x00);

        assert_eq!(diag.overflows, 1);
        assert_eq!(diag.underflows, 1);
        assert_eq!(bus.peek(0x0100), 0xAA);
    }

    #[test]
    fn php_pushes_break_plp_drops_it() {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.s = 0xFF;
        regs.p = Status(crate::flags::U | C);

        Context::new(&mut regs, &mut bus).execute(Mnemonic::Php, NONE);
        assert_eq!(bus.peek(0x01FF), 0x31);

        regs.p = Status::new();
        Context::new(&mut regs, &mut bus).execute(Mnemonic::Plp, NONE);
        assert_eq!(regs.p.0, 0x21);
    }
}
