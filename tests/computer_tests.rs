//! Whole-machine tests: programs assembled, loaded and run on the full
//! gate-level board.

use breadboard_emu::assembler::assemble;
use breadboard_emu::system_config::MachineConfig;
use breadboard_emu::systems::{Computer, Instruction, MachineState, Opcode};
use breadboard_emu::SimError;

fn machine(source: &str, preloads: &[(usize, u8)]) -> Computer {
    let program = assemble(source).unwrap();
    let mut computer = Computer::new().unwrap();
    computer.load_program(&program).unwrap();
    for (address, value) in preloads {
        computer.preload(*address, *value).unwrap();
    }
    computer.boot().unwrap();
    computer
}

fn run(source: &str, preloads: &[(usize, u8)]) -> Computer {
    let mut computer = machine(source, preloads);
    computer.run(200).unwrap();
    assert!(computer.is_halted(), "program did not halt");
    computer
}

const ADD_DEMO: &str = "
    LDA 14
    ADD 15
    OUT
    HLT
";

#[test]
fn test_named_operations() {
    let mut computer = machine(ADD_DEMO, &[(14, 1), (15, 2)]);
    assert_eq!(computer.pc(), 1);

    computer.lda().unwrap();
    assert_eq!(computer.a(), 1);
    computer.add().unwrap();
    assert_eq!(computer.a(), 3);
    assert_eq!(computer.b(), 2);
    computer.out().unwrap();
    assert_eq!(computer.output(), 3);
    assert_eq!(computer.outputs(), &[3]);

    computer.hlt().unwrap();
    assert!(computer.is_halted());
    assert!(!computer.step().unwrap());
}

#[test]
fn test_execute_decoded_instruction() {
    let mut computer = machine("LDI 6\nOUT\nHLT", &[]);
    let instruction = computer.current_instruction().unwrap();
    assert_eq!(instruction, Instruction::new(Opcode::Ldi, 6));

    computer.execute(instruction).unwrap();
    assert_eq!(computer.a(), 6);
    assert_eq!(computer.current_instruction().unwrap().opcode, Opcode::Out);
}

#[test]
fn test_default_config_runs_demo() {
    let config = MachineConfig::default();
    let mut computer = config.build().unwrap();
    computer.boot().unwrap();

    let executed = computer.run(config.max_steps).unwrap();
    assert_eq!(executed, 4);
    assert_eq!(computer.outputs(), &[3]);
}

#[test]
fn test_built_config_runs_without_boot() {
    let config = MachineConfig::from_json_str(r#"{"name": "show", "program": ["OUT", "HLT"]}"#).unwrap();
    let mut computer = config.build().unwrap();

    assert_eq!(computer.run(10).unwrap(), 2);
    assert!(computer.is_halted());
    assert_eq!(computer.outputs(), &[0]);
    assert_eq!(computer.state().unwrap().steps, 2);
}

#[test]
fn test_first_step_after_reset_fetches() {
    let mut computer = Computer::new().unwrap();
    computer.load_program(&assemble("OUT\nHLT").unwrap()).unwrap();
    assert_eq!(computer.run(10).unwrap(), 2);
    assert_eq!(computer.outputs(), &[0]);

    let mut computer = MachineConfig::from_json_file("configs/add.json").unwrap().build().unwrap();
    assert_eq!(computer.run(16).unwrap(), 4);
    assert_eq!(computer.outputs(), &[42]);
}

#[test]
fn test_named_operation_on_unbooted_machine() {
    let mut computer = Computer::new().unwrap();
    computer.load_program(&assemble("LDI 5\nOUT\nHLT").unwrap()).unwrap();

    computer.ldi().unwrap();
    assert_eq!(computer.a(), 5);
    assert_eq!(computer.pc(), 2);
    assert_eq!(computer.current_instruction().unwrap().opcode, Opcode::Out);
}

#[test]
fn test_subtract() {
    let computer = run("LDA 14\nSUB 15\nOUT\nHLT", &[(14, 5), (15, 3)]);
    assert_eq!(computer.outputs(), &[2]);
    assert!(computer.carry_flag());
    assert!(!computer.zero_flag());
}

#[test]
fn test_store_and_load_immediate() {
    let source = "
        LDI 7
        STA 13
        LDA 13
        ADD 13
        OUT
        HLT
    ";
    let computer = run(source, &[]);
    assert_eq!(computer.memory(13).unwrap(), 7);
    assert_eq!(computer.outputs(), &[14]);
}

#[test]
fn test_jump_skips() {
    let source = "
        LDI 1
        JMP 3
        LDI 9   ; skipped
        OUT
        HLT
    ";
    assert_eq!(run(source, &[]).outputs(), &[1]);
}

const CARRY_BRANCH: &str = "
    LDA 14
    ADD 15
    JC 5
    OUT
    HLT
    LDI 7
    OUT
    HLT
";

#[test]
fn test_jump_on_carry_taken() {
    let computer = run(CARRY_BRANCH, &[(14, 255), (15, 1)]);
    assert!(computer.carry_flag());
    assert_eq!(computer.outputs(), &[7]);
}

#[test]
fn test_jump_on_carry_not_taken() {
    let computer = run(CARRY_BRANCH, &[(14, 1), (15, 1)]);
    assert!(!computer.carry_flag());
    assert_eq!(computer.outputs(), &[2]);
}

#[test]
fn test_jump_on_zero() {
    let source = "
        LDA 14
        SUB 14
        JZ 5
        OUT
        HLT
        LDI 9
        OUT
        HLT
    ";
    let computer = run(source, &[(14, 42)]);
    assert!(computer.zero_flag());
    assert_eq!(computer.outputs(), &[9]);
}

#[test]
fn test_count_down_loop() {
    let source = "
        LDI 3
        OUT     ; 1
        JZ 6
        SUB 15
        JMP 1
        NOP
        HLT     ; 6
    ";
    let computer = run(source, &[(15, 1)]);
    assert_eq!(computer.outputs(), &[3, 2, 1, 0]);
}

#[test]
fn test_nop_only_advances() {
    let mut computer = machine("LDI 4\nNOP\nOUT\nHLT", &[]);
    computer.step().unwrap();
    let a = computer.a();
    computer.step().unwrap();
    assert_eq!(computer.a(), a);
    assert_eq!(computer.pc(), 3);

    computer.run(10).unwrap();
    assert_eq!(computer.outputs(), &[4]);
}

#[test]
fn test_illegal_opcode() {
    let mut computer = Computer::new().unwrap();
    computer.load_program(&[0x41, 0x90]).unwrap();
    computer.boot().unwrap();

    assert!(computer.step().unwrap());
    assert_eq!(
        computer.step(),
        Err(SimError::IllegalInstruction {
            opcode: 9,
            address: 1
        })
    );
}

#[test]
fn test_step_limit() {
    let mut computer = machine("JMP 0", &[]);
    assert_eq!(computer.run(10).unwrap(), 10);
    assert!(!computer.is_halted());
    assert_eq!(computer.pc(), 1);
}

#[test]
fn test_program_too_long() {
    let mut computer = Computer::new().unwrap();
    assert!(matches!(
        computer.load_program(&[0; 17]),
        Err(SimError::AddressOutOfRange { .. })
    ));
}

#[test]
fn test_reset_keeps_memory() {
    let mut computer = run(ADD_DEMO, &[(14, 1), (15, 2)]);
    computer.reset().unwrap();

    assert!(!computer.is_halted());
    assert_eq!(computer.pc(), 0);
    assert_eq!(computer.a(), 0);
    assert!(computer.outputs().is_empty());
    assert_eq!(computer.memory(14).unwrap(), 1);

    computer.boot().unwrap();
    computer.run(10).unwrap();
    assert_eq!(computer.outputs(), &[3]);
}

#[test]
fn test_state_serializes() {
    let computer = run(ADD_DEMO, &[(14, 1), (15, 2)]);
    let state = computer.state().unwrap();
    assert_eq!(state.a, 3);
    assert_eq!(state.output, 3);
    assert!(state.halted);
    assert_eq!(state.memory.len(), 16);
    assert_eq!(state.memory[15], 2);

    let json = serde_json::to_string(&state).unwrap();
    let back: MachineState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

#[test]
fn test_count_down_config_file() {
    let config = MachineConfig::from_json_file("configs/count_down.json").unwrap();
    let mut computer = config.build().unwrap();
    computer.boot().unwrap();
    computer.run(config.max_steps).unwrap();

    assert!(computer.is_halted());
    assert_eq!(computer.outputs(), &[3, 2, 1, 0]);
}

#[test]
fn test_multiply_demo() {
    let computer = run(include_str!("../demos/multiply.asm"), &[]);
    assert_eq!(computer.outputs(), &[0, 3, 6, 9, 12, 15]);
    assert_eq!(computer.memory(13).unwrap(), 0);
}

#[test]
fn test_fibonacci_demo() {
    let mut computer = machine(include_str!("../demos/fibonacci.asm"), &[]);
    computer.run(100).unwrap();
    assert_eq!(&computer.outputs()[..8], &[0, 1, 1, 2, 3, 5, 8, 13]);
}
