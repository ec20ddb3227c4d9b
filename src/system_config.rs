//! # JSON Machine Configuration
//!
//! A machine config names a program (as assembly lines), any extra memory
//! preloads, the step limit for batch runs and the console options.
//!
//! ## Usage
//!
//! ```no_run
//! use breadboard_emu::system_config::MachineConfig;
//!
//! let config = MachineConfig::from_json_file("configs/count_down.json")?;
//! let mut computer = config.build()?;
//! computer.boot()?;
//! computer.run(config.max_steps)?;
//! println!("{}", computer.output());
//! # Ok::<(), breadboard_emu::system_config::ConfigError>(())
//! ```
//!
//! ## Configuration File Format
//!
//! ```json
//! {
//!   "name": "add",
//!   "description": "Adds two numbers from memory",
//!   "program": ["LDA 14", "ADD 15", "OUT", "HLT"],
//!   "memory": [{"address": 14, "value": 1}, {"address": 15, "value": 2}],
//!   "max_steps": 256,
//!   "console": {"refresh_rate_ms": 100, "show_memory": true, "memory_rows": 2}
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assembler::{assemble_lines, AssembleError};
use crate::console::ConsoleConfig;
use crate::error::SimError;
use crate::systems::Computer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("program does not assemble: {0}")]
    Assemble(#[from] AssembleError),

    #[error("machine rejected the config: {0}")]
    Sim(#[from] SimError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPreload {
    pub address: usize,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub name: String,
    pub description: String,
    pub program: Vec<String>,
    pub memory: Vec<MemoryPreload>,
    pub max_steps: u64,
    pub console: ConsoleConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            name: "demo".to_string(),
            description: "Adds RAM[14] and RAM[15] and shows the sum".to_string(),
            program: ["LDA 14", "ADD 15", "OUT", "HLT"]
                .iter()
                .map(|line| line.to_string())
                .collect(),
            memory: vec![
                MemoryPreload {
                    address: 14,
                    value: 1,
                },
                MemoryPreload {
                    address: 15,
                    value: 2,
                },
            ],
            max_steps: 256,
            console: ConsoleConfig::default(),
        }
    }
}

impl MachineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.as_ref().display(), name = %config.name, "loaded machine config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn assemble(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(assemble_lines(&self.program)?)
    }

    /// Build a computer with the program and preloads in memory, out of
    /// reset but not yet booted. The first step fetches from address 0.
    pub fn build(&self) -> Result<Computer, ConfigError> {
        let program = self.assemble()?;
        let mut computer = Computer::new()?;
        computer.load_program(&program)?;
        for preload in &self.memory {
            computer.preload(preload.address, preload.value)?;
        }
        Ok(computer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_demo() {
        let config = MachineConfig::default();
        assert_eq!(config.assemble().unwrap(), vec![0x0E, 0x1F, 0xE0, 0xF0]);
        assert_eq!(config.memory.len(), 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MachineConfig::from_json_str(r#"{"name": "tiny", "program": ["HLT"]}"#).unwrap();
        assert_eq!(config.name, "tiny");
        assert_eq!(config.max_steps, 256);
        assert_eq!(config.console, ConsoleConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = MachineConfig::default();
        let parsed = MachineConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bad_program_is_reported() {
        let config = MachineConfig {
            program: vec!["FOO".to_string()],
            ..MachineConfig::default()
        };
        assert!(matches!(config.build(), Err(ConfigError::Assemble(_))));
    }

    #[test]
    fn test_preload_out_of_range() {
        let config = MachineConfig {
            memory: vec![MemoryPreload {
                address: 40000,
                value: 1,
            }],
            ..MachineConfig::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigError::Sim(SimError::AddressOutOfRange { .. }))
        ));
    }
}
