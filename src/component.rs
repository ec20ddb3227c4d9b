use std::collections::BTreeMap;

use crate::error::SimError;
use crate::pin::{Network, NodeId, PinValue};

/// Anything the clock can evaluate: a single chip or a module of chips.
pub trait Component {
    fn name(&self) -> &str;

    /// Read input levels from the network and drive outputs for this pass.
    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError>;
}

/// A physical package with numbered pins.
pub trait Chip: Component {
    fn base(&self) -> &BaseComponent;

    fn pin(&self, number: u8) -> NodeId {
        self.base().pin(number)
    }

    fn get_pin(&self, number: u8) -> Result<NodeId, SimError> {
        self.base().get_pin(number)
    }
}

/// A chip that refuses to evaluate unless VCC reads high and GND reads low.
pub trait Powered: Chip {
    const VCC: u8;
    const GND: u8;

    fn check_power(&self, net: &Network) -> Result<(), SimError> {
        let vcc = net.resolve(self.pin(Self::VCC))?;
        let gnd = net.resolve(self.pin(Self::GND))?;

        if vcc == PinValue::High && gnd == PinValue::Low {
            Ok(())
        } else {
            Err(SimError::Power {
                part: self.name().to_string(),
                vcc,
                gnd,
            })
        }
    }
}

/// Name and pin table shared by every chip model.
#[derive(Debug, Clone)]
pub struct BaseComponent {
    name: String,
    pins: BTreeMap<u8, (&'static str, NodeId)>,
}

impl BaseComponent {
    /// Create one network node per `(number, name)` pin.
    pub fn new(net: &mut Network, name: impl Into<String>, pins: &[(u8, &'static str)]) -> Self {
        let name = name.into();
        let pins = pins
            .iter()
            .map(|&(number, pin_name)| {
                let node = net.add_node(format!("{}.{}", name, pin_name));
                (number, (pin_name, node))
            })
            .collect();

        BaseComponent { name, pins }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node behind a datasheet pin number. Pin numbers are fixed per chip,
    /// so asking for one the package does not have is a wiring bug.
    pub fn pin(&self, number: u8) -> NodeId {
        match self.pins.get(&number) {
            Some((_, node)) => *node,
            None => panic!("{} has no pin {}", self.name, number),
        }
    }

    pub fn get_pin(&self, number: u8) -> Result<NodeId, SimError> {
        self.pins
            .get(&number)
            .map(|(_, node)| *node)
            .ok_or_else(|| SimError::UnknownPin {
                part: self.name.clone(),
                pin: number,
            })
    }

    pub fn pin_name(&self, number: u8) -> Option<&'static str> {
        self.pins.get(&number).map(|(name, _)| *name)
    }

    pub fn pin_by_name(&self, name: &str) -> Option<NodeId> {
        self.pins
            .values()
            .find(|(pin_name, _)| *pin_name == name)
            .map(|(_, node)| *node)
    }

    pub fn pin_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins.keys().copied()
    }

    pub fn read(&self, net: &Network, number: u8) -> Result<PinValue, SimError> {
        net.resolve(self.pin(number))
    }

    pub fn read_all(&self, net: &Network, numbers: &[u8]) -> Result<Vec<PinValue>, SimError> {
        numbers.iter().map(|number| self.read(net, *number)).collect()
    }

    /// Configuration pins must be tied high or low; floating is fatal.
    pub fn read_tied(&self, net: &Network, number: u8) -> Result<bool, SimError> {
        self.read(net, number)?.to_bool().ok_or_else(|| {
            SimError::configuration(
                &self.name,
                format!(
                    "pin {} ({}) is not tied high or low",
                    number,
                    self.pin_name(number).unwrap_or("?")
                ),
            )
        })
    }
}
