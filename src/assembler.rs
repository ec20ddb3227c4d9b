//! Text form of a program: one byte per line.
//!
//! ```text
//! LDA 14   ; load RAM[14] into A
//! ADD 15
//! OUT
//! HLT
//! 1        ; bare numbers are data bytes
//! -1       ; negative data is stored as two's complement
//! ```

use thiserror::Error;

use crate::systems::{Instruction, Opcode, PROGRAM_SIZE};
use crate::types::to_unsigned;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("line {line}: unknown mnemonic `{text}`")]
    UnknownMnemonic { line: usize, text: String },

    #[error("line {line}: bad number `{text}`")]
    BadNumber { line: usize, text: String },

    #[error("line {line}: {mnemonic} needs an operand")]
    MissingOperand { line: usize, mnemonic: &'static str },

    #[error("line {line}: {mnemonic} takes no operand")]
    UnexpectedOperand { line: usize, mnemonic: &'static str },

    #[error("line {line}: operand {value} does not fit in 4 bits")]
    OperandOutOfRange { line: usize, value: u32 },

    #[error("line {line}: too many tokens")]
    TrailingTokens { line: usize },

    #[error("program is {len} bytes, memory holds {max}")]
    TooLong { len: usize, max: usize },
}

fn parse_number(text: &str, line: usize) -> Result<u32, AssembleError> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2)
    } else {
        text.parse()
    };

    parsed.map_err(|_| AssembleError::BadNumber {
        line,
        text: text.to_string(),
    })
}

/// A data byte: unsigned up to 255, or negative down to -128 in two's
/// complement.
fn parse_data(text: &str, line: usize) -> Result<u8, AssembleError> {
    let bad = || AssembleError::BadNumber {
        line,
        text: text.to_string(),
    };

    match text.strip_prefix('-') {
        Some(magnitude) => {
            let magnitude = parse_number(magnitude, line)?;
            if magnitude > 128 {
                return Err(bad());
            }
            Ok(to_unsigned(-(magnitude as i16)))
        }
        None => u8::try_from(parse_number(text, line)?).map_err(|_| bad()),
    }
}

fn assemble_line(tokens: &[&str], line: usize) -> Result<u8, AssembleError> {
    let head = tokens[0];

    if head.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        if tokens.len() > 1 {
            return Err(AssembleError::TrailingTokens { line });
        }
        return parse_data(head, line);
    }

    let opcode = Opcode::from_mnemonic(head).ok_or_else(|| AssembleError::UnknownMnemonic {
        line,
        text: head.to_string(),
    })?;

    let operand = match (opcode.takes_operand(), tokens.get(1)) {
        (true, Some(text)) => {
            let value = parse_number(text, line)?;
            if value > 0x0F {
                return Err(AssembleError::OperandOutOfRange { line, value });
            }
            value as u8
        }
        (true, None) => {
            return Err(AssembleError::MissingOperand {
                line,
                mnemonic: opcode.mnemonic(),
            })
        }
        (false, Some(_)) => {
            return Err(AssembleError::UnexpectedOperand {
                line,
                mnemonic: opcode.mnemonic(),
            })
        }
        (false, None) => 0,
    };

    if tokens.len() > 2 {
        return Err(AssembleError::TrailingTokens { line });
    }

    Ok(Instruction::new(opcode, operand).encode())
}

/// Assemble `source` into memory bytes starting at address 0.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssembleError> {
    let mut program = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let code = raw.split(';').next().unwrap_or("");
        let tokens: Vec<&str> = code.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        program.push(assemble_line(&tokens, index + 1)?);
    }

    if program.len() > PROGRAM_SIZE {
        return Err(AssembleError::TooLong {
            len: program.len(),
            max: PROGRAM_SIZE,
        });
    }
    Ok(program)
}

/// Assemble a list of lines, as stored in a machine config.
pub fn assemble_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<u8>, AssembleError> {
    let source: Vec<&str> = lines.iter().map(|line| line.as_ref()).collect();
    assemble(&source.join("\n"))
}

/// Render one memory byte as an instruction, or as a number if the high
/// nibble is not an opcode.
pub fn disassemble(byte: u8) -> String {
    match Instruction::decode(byte, 0) {
        Ok(instruction) => instruction.to_string(),
        Err(_) => byte.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_demo() {
        let program = assemble("LDA 14\nADD 15\nOUT\nHLT\n").unwrap();
        assert_eq!(program, vec![0x0E, 0x1F, 0xE0, 0xF0]);
    }

    #[test]
    fn test_comments_blank_lines_and_data() {
        let source = "; add two numbers\n\n  lda 0xE ; first\n add 15\n\n28\n";
        assert_eq!(assemble(source).unwrap(), vec![0x0E, 0x1F, 28]);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            assemble("LDA 1\nFOO 2"),
            Err(AssembleError::UnknownMnemonic {
                line: 2,
                text: "FOO".to_string()
            })
        );
        assert_eq!(
            assemble("LDA"),
            Err(AssembleError::MissingOperand {
                line: 1,
                mnemonic: "LDA"
            })
        );
        assert_eq!(
            assemble("OUT 3"),
            Err(AssembleError::UnexpectedOperand {
                line: 1,
                mnemonic: "OUT"
            })
        );
        assert_eq!(
            assemble("JMP 16"),
            Err(AssembleError::OperandOutOfRange { line: 1, value: 16 })
        );
        assert!(matches!(assemble("256"), Err(AssembleError::BadNumber { .. })));
        assert!(matches!(assemble("-129"), Err(AssembleError::BadNumber { .. })));
    }

    #[test]
    fn test_negative_data() {
        assert_eq!(assemble("-1\n-128\n-0x10").unwrap(), vec![255, 128, 240]);
    }

    #[test]
    fn test_program_too_long() {
        let source = "NOP\n".repeat(17);
        assert_eq!(
            assemble(&source),
            Err(AssembleError::TooLong { len: 17, max: 16 })
        );
    }

    #[test]
    fn test_disassemble() {
        assert_eq!(disassemble(0x0E), "LDA 14");
        assert_eq!(disassemble(0xF0), "HLT");
        assert_eq!(disassemble(0x93), "147");
    }
}
