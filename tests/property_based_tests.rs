//! Property-based tests for node resolution, the ALU, the program counter
//! and the assembler.

mod common;

use breadboard_emu::assembler::{assemble, disassemble};
use breadboard_emu::modules::{Alu, ProgramCounter};
use breadboard_emu::pin::{Network, PinValue};
use breadboard_emu::systems::{Computer, Instruction, Opcode};
use breadboard_emu::SimError;
use common::Bench;
use proptest::prelude::*;

mod proptest_helpers {
    use super::*;

    pub fn arb_opcode() -> impl Strategy<Value = Opcode> {
        proptest::sample::select(Opcode::ALL.to_vec())
    }

    pub fn arb_instruction() -> impl Strategy<Value = Instruction> {
        (arb_opcode(), 0u8..16).prop_map(|(opcode, operand)| {
            Instruction::new(opcode, if opcode.takes_operand() { operand } else { 0 })
        })
    }
}

#[cfg(test)]
mod network_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_agreeing_drivers_resolve(levels in prop::collection::vec(any::<bool>(), 1..6), split in 1usize..6) {
            let mut net = Network::new();
            let nodes: Vec<_> = (0..levels.len()).map(|i| net.add_node(format!("n{}", i))).collect();
            for (i, node) in nodes.iter().enumerate().skip(1) {
                // Join into one net through a chain, in two halves
                let anchor = if i < split { nodes[0] } else { nodes[i - 1] };
                net.connect(anchor, *node);
            }
            for (i, (node, level)) in nodes.iter().zip(&levels).enumerate() {
                let driver = net.add_driver(format!("d{}", i), *level);
                net.drive(*node, driver);
            }

            let result = net.resolve(nodes[0]);
            if levels.iter().all(|level| *level == levels[0]) {
                prop_assert_eq!(result, Ok(PinValue::from_bool(levels[0])));
            } else {
                match result {
                    Err(SimError::Conflict { highs, lows, .. }) => {
                        prop_assert_eq!(highs.len(), levels.iter().filter(|l| **l).count());
                        prop_assert_eq!(lows.len(), levels.iter().filter(|l| !**l).count());
                    }
                    other => prop_assert!(false, "expected conflict, got {:?}", other),
                }
            }
        }

        #[test]
        fn test_released_node_floats(level in any::<bool>()) {
            let mut net = Network::new();
            let node = net.add_node("n");
            let driver = net.add_driver("d", level);

            net.output(node, driver, PinValue::from_bool(level));
            prop_assert_eq!(net.resolve(node), Ok(PinValue::from_bool(level)));

            net.output(node, driver, PinValue::HighZ);
            prop_assert_eq!(net.resolve(node), Ok(PinValue::HighZ));
        }

        #[test]
        fn test_bus_value_round_trip(value in 0u32..256) {
            let mut bench = Bench::new();
            bench.bus.force(&mut bench.net, Some(value));
            prop_assert_eq!(bench.bus_value(), Some(value));
        }
    }
}

#[cfg(test)]
mod alu_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_alu_matches_byte_arithmetic(a in any::<u8>(), b in any::<u8>(), subtract in any::<bool>()) {
            let mut bench = Bench::new();
            let a_bus = bench.new_bus("A", 8);
            let b_bus = bench.new_bus("B", 8);
            let su = bench.line("SU", subtract);
            let eo = bench.line("EO", true);
            let fi = bench.line("FI", true);
            let (net, plane) = bench.split();
            let mut alu = Alu::new(net, plane, "ALU", &a_bus, &b_bus, su.node(), eo.node(), fi.node()).unwrap();

            a_bus.force(&mut bench.net, Some(a as u32));
            b_bus.force(&mut bench.net, Some(b as u32));
            bench.evaluate(&mut [&mut alu]).unwrap();

            let (expected, carry) = if subtract {
                let wide = a as u16 + (!b) as u16 + 1;
                (wide as u8, wide > 0xFF)
            } else {
                let (sum, carry) = a.overflowing_add(b);
                (sum, carry)
            };

            prop_assert_eq!(alu.sum(&bench.net).unwrap(), Some(expected));
            prop_assert_eq!(alu.carry(&bench.net).unwrap(), PinValue::from_bool(carry));
            prop_assert_eq!(alu.zero(&bench.net).unwrap(), PinValue::from_bool(expected == 0));
        }
    }
}

#[cfg(test)]
mod counter_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_program_counter_wraps(pulses in 0usize..40) {
            let mut bench = Bench::new();
            let clear = bench.line("CLR", true);
            let ce = bench.line("CE", true);
            let jump = bench.line("J", true);
            let out = bench.line("CO", true);
            let (net, plane) = bench.split();
            let mut pc = ProgramCounter::new(net, plane, "PC", clear.node(), ce.node(), jump.node(), out.node());

            for _ in 0..pulses {
                bench.cycle(&mut [&mut pc]).unwrap();
            }
            prop_assert_eq!(pc.value() as usize, pulses % 16);
        }
    }
}

#[cfg(test)]
mod assembler_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_disassembly_reassembles(instruction in proptest_helpers::arb_instruction()) {
            let byte = instruction.encode();
            let text = disassemble(byte);
            prop_assert_eq!(assemble(&text).unwrap(), vec![byte]);
        }

        #[test]
        fn test_decode_inverts_encode(instruction in proptest_helpers::arb_instruction()) {
            prop_assert_eq!(Instruction::decode(instruction.encode(), 0), Ok(instruction));
        }
    }
}

#[cfg(test)]
mod computer_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn test_add_program(a in any::<u8>(), b in any::<u8>()) {
            let program = assemble("LDA 14\nADD 15\nOUT\nHLT").unwrap();
            let mut computer = Computer::new().unwrap();
            computer.load_program(&program).unwrap();
            computer.preload(14, a).unwrap();
            computer.preload(15, b).unwrap();
            computer.boot().unwrap();
            computer.run(10).unwrap();

            prop_assert_eq!(computer.outputs(), &[a.wrapping_add(b)]);
            prop_assert_eq!(computer.carry_flag(), a.checked_add(b).is_none());
        }
    }
}
