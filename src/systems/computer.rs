//! # Breadboard computer
//!
//! Owns the signal network and every module of the machine, and drives the
//! clock. Nothing moves until one of the operations here is called.
//!
//! ## Micro-step protocol
//!
//! 1. Drive the control lines for the step.
//! 2. Evaluate every module once with CLK low so outputs follow the new
//!    control word before anything latches.
//! 3. Pulse the clock: CLK high and evaluate all, CLK low and evaluate all.
//!
//! Modules are always evaluated in the same order: reset inverter, program
//! counter, memory, instruction register, A, B, ALU, output.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::bus::Bus;
use crate::component::{Chip, Component};
use crate::components::{HexInverter, TwoPhaseClock};
use crate::connection::attach_power;
use crate::error::SimError;
use crate::modules::{
    Alu, Backplane, OutputUnit, ProgramCounter, RamModule, Register, RegisterOutput,
};
use crate::pin::{Line, Network, NodeId, Rails};
use crate::systems::microcode::{micro_program, ControlWord, Instruction, Opcode, Signal, FETCH};

/// Bytes the 4-bit memory address register can reach.
pub const PROGRAM_SIZE: usize = 16;

/// One driven line per [`Signal`], each at its deasserted level initially.
#[derive(Debug, Clone)]
pub struct ControlBus {
    lines: Vec<Line>,
}

impl ControlBus {
    pub fn new(net: &mut Network) -> Self {
        let lines = Signal::ALL
            .iter()
            .map(|signal| Line::new(net, signal.to_str(), signal.level(false)))
            .collect();
        ControlBus { lines }
    }

    fn line(&self, signal: Signal) -> &Line {
        &self.lines[signal as usize]
    }

    pub fn node(&self, signal: Signal) -> NodeId {
        self.line(signal).node()
    }

    /// Assert exactly the signals in `word`.
    pub fn apply(&self, net: &mut Network, word: ControlWord) {
        for signal in Signal::ALL {
            self.line(signal).set(net, signal.level(word.contains(signal)));
        }
    }
}

/// Every module on the board, in evaluation order.
#[derive(Debug, Clone)]
struct Board {
    reset_inverter: HexInverter,
    pc: ProgramCounter,
    ram: RamModule,
    ir: Register,
    a: Register,
    b: Register,
    alu: Alu,
    output: OutputUnit,
}

impl Board {
    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.reset_inverter.evaluate(net)?;
        self.pc.evaluate(net)?;
        self.ram.evaluate(net)?;
        self.ir.evaluate(net)?;
        self.a.evaluate(net)?;
        self.b.evaluate(net)?;
        self.alu.evaluate(net)?;
        self.output.evaluate(net)
    }
}

/// Snapshot of the visible machine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub pc: u8,
    pub mar: u8,
    pub ir: u8,
    pub a: u8,
    pub b: u8,
    /// ALU result, `None` while any bit floats.
    pub alu: Option<u8>,
    /// Bus levels, most significant bit first, `x` for floating.
    pub bus: String,
    pub carry: bool,
    pub zero: bool,
    pub output: u8,
    pub outputs: Vec<u8>,
    pub control: String,
    pub halted: bool,
    pub cycles: u64,
    pub steps: u64,
    pub memory: Vec<u8>,
}

#[derive(Debug)]
pub struct Computer {
    net: Network,
    rails: Rails,
    bus: Bus,
    clock: TwoPhaseClock,
    reset_line: Line,
    control: ControlBus,
    board: Board,
    word: ControlWord,
    instruction_address: u8,
    fetched: bool,
    halted: bool,
    steps: u64,
    outputs: Vec<u8>,
}

impl Computer {
    /// Build the machine and bring it out of reset with PC = 0.
    pub fn new() -> Result<Self, SimError> {
        let mut net = Network::new();
        let rails = Rails::new(&mut net);
        let bus = Bus::new(&mut net, "BUS", 8);
        let clock = TwoPhaseClock::new(&mut net, "CLK");
        let reset_line = Line::new(&mut net, "RESET", false);
        let control = ControlBus::new(&mut net);

        let plane = Backplane {
            rails: &rails,
            bus: &bus,
            clock: clock.node(),
            reset: reset_line.node(),
        };

        // The counter clears on low; everything else clears on high
        let reset_inverter = HexInverter::new(&mut net, "RST.04")?;
        attach_power(&mut net, &rails, &reset_inverter);
        net.connect(reset_inverter.pin(HexInverter::A1), reset_line.node());
        let clear_n = reset_inverter.pin(HexInverter::Y1);

        let pc = ProgramCounter::new(
            &mut net,
            plane,
            "PC",
            clear_n,
            control.node(Signal::CE),
            control.node(Signal::J),
            control.node(Signal::CO),
        );
        let ram = RamModule::new(
            &mut net,
            plane,
            "MEM",
            control.node(Signal::MI),
            control.node(Signal::RI),
            control.node(Signal::RO),
        )?;
        let ir = Register::new(
            &mut net,
            plane,
            "IR",
            control.node(Signal::II),
            control.node(Signal::IO),
            RegisterOutput::LowNibble,
        );
        let a = Register::new(
            &mut net,
            plane,
            "A",
            control.node(Signal::AI),
            control.node(Signal::AO),
            RegisterOutput::Full,
        );
        // B never drives the bus
        let b = Register::new(
            &mut net,
            plane,
            "B",
            control.node(Signal::BI),
            rails.vcc(),
            RegisterOutput::Full,
        );
        let alu = Alu::new(
            &mut net,
            plane,
            "ALU",
            a.value_bus(),
            b.value_bus(),
            control.node(Signal::SU),
            control.node(Signal::EO),
            control.node(Signal::FI),
        )?;
        let output = OutputUnit::new(&mut net, plane, "OUT", control.node(Signal::OI));

        debug!(
            nodes = net.node_count(),
            drivers = net.driver_count(),
            "board assembled"
        );

        let mut computer = Computer {
            net,
            rails,
            bus,
            clock,
            reset_line,
            control,
            board: Board {
                reset_inverter,
                pc,
                ram,
                ir,
                a,
                b,
                alu,
                output,
            },
            word: ControlWord::NONE,
            instruction_address: 0,
            fetched: false,
            halted: false,
            steps: 0,
            outputs: Vec::new(),
        };
        computer.reset()?;
        Ok(computer)
    }

    /// Pulse the reset line: clears PC, registers and flags. Memory is kept.
    #[instrument(level = "debug", skip_all, err)]
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.word = ControlWord::NONE;
        self.control.apply(&mut self.net, self.word);

        self.reset_line.set(&mut self.net, true);
        self.settle()?;
        self.pulse()?;
        self.reset_line.set(&mut self.net, false);
        self.settle()?;

        self.instruction_address = 0;
        self.fetched = false;
        self.halted = false;
        self.steps = 0;
        self.outputs.clear();
        Ok(())
    }

    /// Reset, then fetch the first instruction.
    #[instrument(level = "debug", skip_all, err)]
    pub fn boot(&mut self) -> Result<(), SimError> {
        self.reset()?;
        self.fetch()
    }

    /// Write one memory cell directly, bypassing the bus.
    pub fn preload(&mut self, address: usize, value: u8) -> Result<(), SimError> {
        self.board.ram.preload(address, value)
    }

    /// Place `program` at address 0.
    #[instrument(level = "debug", skip_all, err)]
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), SimError> {
        if program.len() > PROGRAM_SIZE {
            return Err(SimError::AddressOutOfRange {
                part: self.board.ram.name().to_string(),
                address: program.len() - 1,
            });
        }
        self.board.ram.ram_mut().load(0, program)
    }

    fn settle(&mut self) -> Result<(), SimError> {
        self.board.evaluate(&mut self.net)
    }

    fn pulse(&mut self) -> Result<(), SimError> {
        let board = &mut self.board;
        self.clock.pulse(&mut self.net, |net| board.evaluate(net))
    }

    fn micro_step(&mut self, word: ControlWord) -> Result<(), SimError> {
        debug!(cycle = self.clock.cycles(), control = %word, "micro-step");
        self.word = word;
        self.control.apply(&mut self.net, word);
        self.settle()?;
        self.pulse()
    }

    fn run_steps(&mut self, words: &[ControlWord]) -> Result<(), SimError> {
        for word in words {
            self.micro_step(*word)?;
        }
        Ok(())
    }

    /// Load the instruction at PC into IR and advance PC.
    #[instrument(level = "debug", skip_all, err)]
    pub fn fetch(&mut self) -> Result<(), SimError> {
        self.instruction_address = self.board.pc.value();
        self.run_steps(&FETCH)?;
        self.fetched = true;
        Ok(())
    }

    /// IR holds nothing meaningful until the first fetch after reset.
    fn ensure_fetched(&mut self) -> Result<(), SimError> {
        if self.fetched {
            return Ok(());
        }
        debug!("no instruction fetched since reset");
        self.fetch()
    }

    /// Run the execute steps of `opcode` and, unless it halts, fetch the next
    /// instruction. The operand reaches the bus from the instruction register.
    fn execute_opcode(&mut self, opcode: Opcode) -> Result<(), SimError> {
        if self.halted {
            return Ok(());
        }
        self.ensure_fetched()?;

        let words = micro_program(opcode, self.carry_flag(), self.zero_flag());
        self.run_steps(words)?;
        self.steps += 1;

        match opcode {
            Opcode::Hlt => {
                self.halted = true;
                info!(address = self.instruction_address, "halted");
                return Ok(());
            }
            Opcode::Out => {
                let value = self.board.output.value();
                self.outputs.push(value);
                info!(value, "output");
            }
            _ => {}
        }

        self.fetch()
    }

    /// Execute `instruction`, which should be the one currently in IR.
    #[instrument(level = "debug", skip_all, fields(instruction = %instruction), err)]
    pub fn execute(&mut self, instruction: Instruction) -> Result<(), SimError> {
        if !self.halted {
            self.ensure_fetched()?;
        }
        let operand = self.board.ir.value() & 0x0F;
        if instruction.opcode.takes_operand() && instruction.operand != operand {
            warn!(
                expected = instruction.operand,
                operand, "instruction register holds a different operand"
            );
        }
        self.execute_opcode(instruction.opcode)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn lda(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Lda)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn add(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Add)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn sub(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Sub)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn sta(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Sta)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn ldi(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Ldi)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn jmp(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Jmp)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn jc(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Jc)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn jz(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Jz)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn out(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Out)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn nop(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Nop)
    }

    #[instrument(level = "debug", skip_all, err)]
    pub fn hlt(&mut self) -> Result<(), SimError> {
        self.execute_opcode(Opcode::Hlt)
    }

    /// The instruction in IR, decoded from the register's value lines.
    pub fn current_instruction(&self) -> Result<Instruction, SimError> {
        let byte = self
            .board
            .ir
            .value_bus()
            .value(&self.net)?
            .ok_or_else(|| SimError::configuration("IR", "value lines are floating"))?;
        Instruction::decode(byte as u8, self.instruction_address)
    }

    /// Decode and execute the instruction in IR, fetching first on a machine
    /// that has not fetched since reset. Returns false once halted.
    #[instrument(level = "debug", skip_all, err)]
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.halted {
            return Ok(false);
        }
        self.ensure_fetched()?;
        let instruction = self.current_instruction()?;
        debug!(address = self.instruction_address, %instruction, "step");
        self.execute_opcode(instruction.opcode)?;
        Ok(!self.halted)
    }

    /// Step until HLT or `max_steps` instructions. Returns the number executed.
    #[instrument(level = "debug", skip(self), err)]
    pub fn run(&mut self, max_steps: u64) -> Result<u64, SimError> {
        let mut executed = 0;
        while executed < max_steps && !self.halted {
            self.step()?;
            executed += 1;
        }
        if !self.halted {
            warn!(max_steps, "step limit reached before HLT");
        }
        Ok(executed)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Value currently latched in the output register.
    pub fn output(&self) -> u8 {
        self.board.output.value()
    }

    /// Every value shown by OUT since the last reset.
    pub fn outputs(&self) -> &[u8] {
        &self.outputs
    }

    pub fn carry_flag(&self) -> bool {
        self.board.alu.carry_flag()
    }

    pub fn zero_flag(&self) -> bool {
        self.board.alu.zero_flag()
    }

    pub fn pc(&self) -> u8 {
        self.board.pc.value()
    }

    pub fn a(&self) -> u8 {
        self.board.a.value()
    }

    pub fn b(&self) -> u8 {
        self.board.b.value()
    }

    pub fn memory(&self, address: usize) -> Result<u8, SimError> {
        self.board.ram.ram().get(address)
    }

    pub fn network(&self) -> &Network {
        &self.net
    }

    pub fn rails(&self) -> &Rails {
        &self.rails
    }

    pub fn state(&self) -> Result<MachineState, SimError> {
        Ok(MachineState {
            pc: self.board.pc.value(),
            mar: self.board.ram.address(),
            ir: self.board.ir.value(),
            a: self.board.a.value(),
            b: self.board.b.value(),
            alu: self.board.alu.sum(&self.net)?,
            bus: self.bus.to_bit_string(&self.net)?,
            carry: self.carry_flag(),
            zero: self.zero_flag(),
            output: self.output(),
            outputs: self.outputs.clone(),
            control: self.word.to_string(),
            halted: self.halted,
            cycles: self.clock.cycles(),
            steps: self.steps,
            memory: self.board.ram.ram().snapshot(0, PROGRAM_SIZE)?.to_vec(),
        })
    }
}
