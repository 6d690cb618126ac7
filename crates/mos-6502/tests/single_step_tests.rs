//! Integration tests using Tom Harte's `SingleStepTests` for the 6502.
//!
//! Each of the 151 documented opcode files holds 10,000 cases comparing
//! register and memory state, plus the cycle count, after one instruction.
//! Undocumented opcodes are skipped, as are ADC/SBC cases run with the
//! decimal flag set (the 2A03 has no decimal mode).
//!
//! Test data lives in `test-data/65x02/6502/v1/XX.json`.

use emu_core::SimpleBus;
use mos_6502::{Mnemonic, Mos6502, Status, decode, flags};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Vec<(u16, u8, String)>,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

/// Set up the CPU and bus from the initial test state.
fn setup(cpu: &mut Mos6502, bus: &mut SimpleBus, state: &CpuState) {
    for &(addr, value) in &state.ram {
        bus.load(addr, &[value]);
    }
    cpu.regs.pc = state.pc;
    cpu.regs.s = state.s;
    cpu.regs.a = state.a;
    cpu.regs.x = state.x;
    cpu.regs.y = state.y;
    cpu.regs.p = Status::from_byte(state.p);
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &Mos6502, bus: &SimpleBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();

    let pairs = [
        ("A", cpu.regs.a, expected.a),
        ("X", cpu.regs.x, expected.x),
        ("Y", cpu.regs.y, expected.y),
        ("S", cpu.regs.s, expected.s),
    ];
    for (name, got, want) in pairs {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }
    if cpu.regs.pc != expected.pc {
        errors.push(format!(
            "PC: got ${:04X}, want ${:04X}",
            cpu.regs.pc, expected.pc
        ));
    }

    // B has no storage in P; only pushed copies carry it.
    let actual_p = cpu.regs.p.0;
    let expected_p = Status::from_byte(expected.p).0;
    if actual_p != expected_p {
        errors.push(format!(
            "P: got ${actual_p:02X} ({actual_p:08b}), want ${expected_p:02X} ({expected_p:08b})"
        ));
    }

    for &(addr, expected_val) in &expected.ram {
        let actual_val = bus.peek(addr);
        if actual_val != expected_val {
            errors.push(format!(
                "RAM[${addr:04X}]: got ${actual_val:02X}, want ${expected_val:02X}"
            ));
        }
    }

    errors
}

fn uses_decimal(opcode: u8, state: &CpuState) -> bool {
    matches!(decode(opcode).mnemonic, Mnemonic::Adc | Mnemonic::Sbc) && state.p & flags::D != 0
}

#[test]
#[ignore = "requires test-data/65x02; run with --ignored"]
fn run_all() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/65x02/6502/v1");

    if !test_dir.exists() {
        eprintln!("Test data not found at {}", test_dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;
    let mut total_files = 0u32;

    for opcode in 0..=0xFF_u8 {
        if decode(opcode).is_illegal() {
            continue;
        }
        let filename = format!("{opcode:02x}.json");
        let path = test_dir.join(&filename);
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        let mut file_pass = 0u32;
        let mut file_fail = 0u32;
        let mut first_failures: Vec<String> = Vec::new();

        for test in tests.iter().filter(|t| !uses_decimal(opcode, &t.initial)) {
            let mut cpu = Mos6502::new();
            let mut bus = SimpleBus::new();

            setup(&mut cpu, &mut bus, &test.initial);

            let mut errors = match cpu.step(&mut bus) {
                Ok(cycles) if cycles as usize != test.cycles.len() => vec![format!(
                    "cycles: got {cycles}, want {}",
                    test.cycles.len()
                )],
                Ok(_) => Vec::new(),
                Err(fault) => vec![fault.to_string()],
            };
            errors.extend(compare(&cpu, &bus, &test.final_state));

            if errors.is_empty() {
                file_pass += 1;
            } else {
                file_fail += 1;
                if first_failures.len() < 5 {
                    first_failures.push(format!("  FAIL [{}]: {}", test.name, errors.join(", ")));
                }
            }
        }

        let status = if file_fail == 0 { "PASS" } else { "FAIL" };
        println!(
            "Opcode ${opcode:02X} ({filename}): {status}: {file_pass}/{} passed",
            file_pass + file_fail
        );
        for msg in &first_failures {
            println!("{msg}");
        }

        total_pass += u64::from(file_pass);
        total_fail += u64::from(file_fail);
        total_files += 1;
    }

    println!();
    println!("=== SingleStepTests Summary ===");
    println!(
        "Files: {total_files}, Total: {}, Pass: {total_pass}, Fail: {total_fail}",
        total_pass + total_fail
    );

    assert_eq!(total_fail, 0, "{total_fail} tests failed");
}
