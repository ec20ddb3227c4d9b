//! Instruction set and micro-programs of the breadboard computer.
//!
//! An instruction byte is a 4-bit opcode in the high nibble and a 4-bit
//! operand (usually an address) in the low nibble. Each opcode expands to a
//! fixed list of control words, one per clock pulse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// One control line of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Memory address register in
    MI,
    /// RAM in
    RI,
    /// RAM out
    RO,
    /// Instruction register out (operand nibble)
    IO,
    /// Instruction register in
    II,
    /// A register in
    AI,
    /// A register out
    AO,
    /// ALU out
    EO,
    /// Subtract
    SU,
    /// B register in
    BI,
    /// Output register in
    OI,
    /// Counter enable
    CE,
    /// Counter out
    CO,
    /// Jump
    J,
    /// Flags register in
    FI,
}

impl Signal {
    pub const ALL: [Signal; 15] = [
        Signal::MI,
        Signal::RI,
        Signal::RO,
        Signal::IO,
        Signal::II,
        Signal::AI,
        Signal::AO,
        Signal::EO,
        Signal::SU,
        Signal::BI,
        Signal::OI,
        Signal::CE,
        Signal::CO,
        Signal::J,
        Signal::FI,
    ];

    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Whether asserting the signal pulls its line low.
    pub fn is_active_low(self) -> bool {
        !matches!(self, Signal::RI | Signal::SU | Signal::CE)
    }

    /// Line level that asserts or deasserts this signal.
    pub fn level(self, asserted: bool) -> bool {
        asserted != self.is_active_low()
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Signal::MI => "MI",
            Signal::RI => "RI",
            Signal::RO => "RO",
            Signal::IO => "IO",
            Signal::II => "II",
            Signal::AI => "AI",
            Signal::AO => "AO",
            Signal::EO => "EO",
            Signal::SU => "SU",
            Signal::BI => "BI",
            Signal::OI => "OI",
            Signal::CE => "CE",
            Signal::CO => "CO",
            Signal::J => "J",
            Signal::FI => "FI",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// The set of signals asserted during one clock pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlWord(u16);

impl ControlWord {
    pub const NONE: ControlWord = ControlWord(0);

    pub const fn of(signals: &[Signal]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < signals.len() {
            bits |= signals[i].bit();
            i += 1;
        }
        ControlWord(bits)
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }

    pub fn with(self, signal: Signal) -> Self {
        ControlWord(self.0 | signal.bit())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        Signal::ALL.into_iter().filter(move |signal| self.contains(*signal))
    }
}

impl fmt::Display for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names: Vec<&str> = self.signals().map(Signal::to_str).collect();
        f.write_str(&names.join("|"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Lda,
    Add,
    Sub,
    Sta,
    Ldi,
    Jmp,
    Jc,
    Jz,
    Nop,
    Out,
    Hlt,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Lda,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Sta,
        Opcode::Ldi,
        Opcode::Jmp,
        Opcode::Jc,
        Opcode::Jz,
        Opcode::Nop,
        Opcode::Out,
        Opcode::Hlt,
    ];

    pub fn code(self) -> u8 {
        match self {
            Opcode::Lda => 0x0,
            Opcode::Add => 0x1,
            Opcode::Sub => 0x2,
            Opcode::Sta => 0x3,
            Opcode::Ldi => 0x4,
            Opcode::Jmp => 0x5,
            Opcode::Jc => 0x6,
            Opcode::Jz => 0x7,
            Opcode::Nop => 0x8,
            Opcode::Out => 0xE,
            Opcode::Hlt => 0xF,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|opcode| opcode.code() == code)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lda => "LDA",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Sta => "STA",
            Opcode::Ldi => "LDI",
            Opcode::Jmp => "JMP",
            Opcode::Jc => "JC",
            Opcode::Jz => "JZ",
            Opcode::Nop => "NOP",
            Opcode::Out => "OUT",
            Opcode::Hlt => "HLT",
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|opcode| opcode.mnemonic().eq_ignore_ascii_case(text))
    }

    /// Whether the low nibble means anything for this opcode.
    pub fn takes_operand(self) -> bool {
        !matches!(self, Opcode::Nop | Opcode::Out | Opcode::Hlt)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: u8,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: u8) -> Self {
        Instruction {
            opcode,
            operand: operand & 0x0F,
        }
    }

    pub fn encode(&self) -> u8 {
        self.opcode.code() << 4 | (self.operand & 0x0F)
    }

    /// Split an instruction byte. `address` is only used for the error.
    pub fn decode(byte: u8, address: u8) -> Result<Self, SimError> {
        let code = byte >> 4;
        let opcode = Opcode::from_code(code).ok_or(SimError::IllegalInstruction {
            opcode: code,
            address,
        })?;
        Ok(Instruction::new(opcode, byte & 0x0F))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.opcode.takes_operand() {
            write!(f, "{} {}", self.opcode, self.operand)
        } else {
            write!(f, "{}", self.opcode)
        }
    }
}

use Signal::*;

pub const FETCH: [ControlWord; 3] = [
    ControlWord::of(&[CO, MI]),
    ControlWord::of(&[RO, II]),
    ControlWord::of(&[CE]),
];

const LDA: [ControlWord; 2] = [ControlWord::of(&[IO, MI]), ControlWord::of(&[RO, AI])];
const ADD: [ControlWord; 3] = [
    ControlWord::of(&[IO, MI]),
    ControlWord::of(&[RO, BI]),
    ControlWord::of(&[EO, AI, FI]),
];
const SUB: [ControlWord; 3] = [
    ControlWord::of(&[IO, MI]),
    ControlWord::of(&[RO, BI]),
    ControlWord::of(&[EO, AI, SU, FI]),
];
const STA: [ControlWord; 2] = [ControlWord::of(&[IO, MI]), ControlWord::of(&[AO, RI])];
const LDI: [ControlWord; 1] = [ControlWord::of(&[IO, AI])];
const JMP: [ControlWord; 1] = [ControlWord::of(&[IO, J])];
const OUT: [ControlWord; 1] = [ControlWord::of(&[AO, OI])];

/// Execute steps of `opcode`, not counting the fetch that follows. Conditional
/// jumps depend on the latched flags.
pub fn micro_program(opcode: Opcode, carry: bool, zero: bool) -> &'static [ControlWord] {
    match opcode {
        Opcode::Lda => &LDA,
        Opcode::Add => &ADD,
        Opcode::Sub => &SUB,
        Opcode::Sta => &STA,
        Opcode::Ldi => &LDI,
        Opcode::Jmp => &JMP,
        Opcode::Jc if carry => &JMP,
        Opcode::Jz if zero => &JMP,
        Opcode::Jc | Opcode::Jz | Opcode::Nop | Opcode::Hlt => &[],
        Opcode::Out => &OUT,
    }
}
