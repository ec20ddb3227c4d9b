use crate::error::SimError;
use crate::pin::{DriverId, Network, NodeId, PinValue};
use crate::types::{bit_string, int_to_list, levels_to_int};

/// An ordered group of nodes read as one value, index 0 least significant.
///
/// Each position owns a private driver so a test bench (or the sequencer)
/// can force the bus without going through a chip.
#[derive(Debug, Clone)]
pub struct Bus {
    name: String,
    lines: Vec<NodeId>,
    forcers: Vec<DriverId>,
}

impl Bus {
    pub fn new(net: &mut Network, name: &str, width: usize) -> Self {
        let lines = (0..width)
            .map(|i| net.add_node(format!("{}[{}]", name, i)))
            .collect();
        Self::from_nodes(net, name, lines)
    }

    /// Wrap existing nodes, for example a chip's outputs.
    pub fn from_nodes(net: &mut Network, name: &str, lines: Vec<NodeId>) -> Self {
        let forcers = (0..lines.len())
            .map(|i| net.add_driver(format!("{}.force[{}]", name, i), false))
            .collect();

        Bus {
            name: name.to_string(),
            lines,
            forcers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.lines.len()
    }

    pub fn node(&self, bit: usize) -> NodeId {
        self.lines[bit]
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.lines
    }

    pub fn levels(&self, net: &Network) -> Result<Vec<PinValue>, SimError> {
        net.resolve_all(&self.lines)
    }

    /// Current value, or `None` while any line floats.
    pub fn value(&self, net: &Network) -> Result<Option<u32>, SimError> {
        Ok(levels_to_int(&self.levels(net)?))
    }

    /// Force the first `bits.len()` lines. `None` releases that line so a
    /// chip output can take it over; lines past the slice are untouched.
    pub fn pull_to(&self, net: &mut Network, bits: &[Option<bool>]) {
        debug_assert!(bits.len() <= self.lines.len(), "{}: too many bits", self.name);

        for ((line, forcer), bit) in self.lines.iter().zip(&self.forcers).zip(bits) {
            net.output(*line, *forcer, PinValue::from(*bit));
        }
    }

    /// Force every line to `value`, or release them all for `None`.
    pub fn force(&self, net: &mut Network, value: Option<u32>) {
        let bits: Vec<Option<bool>> = match value {
            Some(value) => int_to_list(value, self.width()).into_iter().map(Some).collect(),
            None => vec![None; self.width()],
        };
        self.pull_to(net, &bits);
    }

    pub fn float(&self, net: &mut Network) {
        self.force(net, None);
    }

    pub fn to_bit_string(&self, net: &Network) -> Result<String, SimError> {
        Ok(bit_string(&self.levels(net)?))
    }
}
