//! # Signal network
//!
//! Every conductor in the simulated machine is a node in one [`Network`]
//! arena. Drivers are settable logic sources that can be attached to and
//! released from nodes; nodes can be linked to each other to model wires.
//! The level of a node is never cached: [`Network::resolve`] walks the net
//! the node belongs to and merges every attached driver on every read.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinValue {
    Low,
    High,
    HighZ, // Floating
}

impl PinValue {
    pub fn to_str(&self) -> &'static str {
        match self {
            PinValue::Low => "Low",
            PinValue::High => "High",
            PinValue::HighZ => "HighZ",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            PinValue::Low => '0',
            PinValue::High => '1',
            PinValue::HighZ => 'x',
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PinValue::High
        } else {
            PinValue::Low
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            PinValue::Low => Some(false),
            PinValue::High => Some(true),
            PinValue::HighZ => None,
        }
    }

    pub fn is_high(&self) -> bool {
        *self == PinValue::High
    }

    pub fn is_low(&self) -> bool {
        *self == PinValue::Low
    }

    pub fn is_floating(&self) -> bool {
        *self == PinValue::HighZ
    }
}

impl From<bool> for PinValue {
    fn from(value: bool) -> Self {
        PinValue::from_bool(value)
    }
}

impl From<Option<bool>> for PinValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(PinValue::HighZ, PinValue::from_bool)
    }
}

impl std::fmt::Display for PinValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Stable handle to a conductor in a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Stable handle to a voltage source in a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(usize);

#[derive(Debug)]
struct Node {
    name: String,
    drivers: Vec<DriverId>,
    links: Vec<NodeId>,
}

#[derive(Debug)]
struct Driver {
    name: String,
    value: bool,
}

/// Arena of every node and driver in a simulated circuit.
#[derive(Debug, Default)]
pub struct Network {
    nodes: Vec<Node>,
    drivers: Vec<Driver>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.push(Node {
            name: name.into(),
            drivers: Vec::new(),
            links: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_driver(&mut self, name: impl Into<String>, value: bool) -> DriverId {
        self.drivers.push(Driver {
            name: name.into(),
            value,
        });
        DriverId(self.drivers.len() - 1)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn driver_name(&self, driver: DriverId) -> &str {
        &self.drivers[driver.0].name
    }

    /// Change the level of a driver. Nothing propagates until a node is read.
    pub fn set_driver(&mut self, driver: DriverId, value: bool) {
        self.drivers[driver.0].value = value;
    }

    /// Attach a driver to a node. Attaching twice is a no-op.
    pub fn drive(&mut self, node: NodeId, driver: DriverId) {
        let drivers = &mut self.nodes[node.0].drivers;
        if !drivers.contains(&driver) {
            drivers.push(driver);
        }
    }

    /// Detach a driver from a node, leaving the rest of the net untouched.
    pub fn release(&mut self, node: NodeId, driver: DriverId) {
        self.nodes[node.0].drivers.retain(|d| *d != driver);
    }

    pub fn is_driving(&self, node: NodeId, driver: DriverId) -> bool {
        self.nodes[node.0].drivers.contains(&driver)
    }

    /// Drive `node` through `driver` at `value`, or release it for `HighZ`.
    pub fn output(&mut self, node: NodeId, driver: DriverId, value: PinValue) {
        match value.to_bool() {
            Some(level) => {
                self.set_driver(driver, level);
                self.drive(node, driver);
            }
            None => self.release(node, driver),
        }
    }

    /// Wire two nodes together. Links are bidirectional.
    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        if !self.nodes[a.0].links.contains(&b) {
            self.nodes[a.0].links.push(b);
        }
        if !self.nodes[b.0].links.contains(&a) {
            self.nodes[b.0].links.push(a);
        }
    }

    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a.0].links.contains(&b)
    }

    /// Every node reachable from `node` through links, `node` first.
    pub fn net_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut visited = vec![node];
        let mut pending = vec![node];

        while let Some(current) = pending.pop() {
            for &next in &self.nodes[current.0].links {
                if !visited.contains(&next) {
                    visited.push(next);
                    pending.push(next);
                }
            }
        }

        visited
    }

    /// Merge every driver on the net `node` belongs to.
    ///
    /// Returns `HighZ` when nothing drives the net and fails with
    /// [`SimError::Conflict`] when drivers disagree.
    pub fn resolve(&self, node: NodeId) -> Result<PinValue, SimError> {
        let mut highs = Vec::new();
        let mut lows = Vec::new();

        for member in self.net_of(node) {
            for driver in &self.nodes[member.0].drivers {
                let source = &self.drivers[driver.0];
                if source.value {
                    highs.push(driver);
                } else {
                    lows.push(driver);
                }
            }
        }

        match (highs.is_empty(), lows.is_empty()) {
            (true, true) => Ok(PinValue::HighZ),
            (false, true) => Ok(PinValue::High),
            (true, false) => Ok(PinValue::Low),
            (false, false) => Err(SimError::Conflict {
                node: self.node_name(node).to_string(),
                highs: highs.iter().map(|d| self.driver_name(**d).to_string()).collect(),
                lows: lows.iter().map(|d| self.driver_name(**d).to_string()).collect(),
            }),
        }
    }

    pub fn resolve_all(&self, nodes: &[NodeId]) -> Result<Vec<PinValue>, SimError> {
        nodes.iter().map(|node| self.resolve(*node)).collect()
    }
}

/// A node with its own permanently attached driver: a control line, a
/// power rail or a test probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    node: NodeId,
    driver: DriverId,
}

impl Line {
    pub fn new(net: &mut Network, name: &str, value: bool) -> Self {
        let node = net.add_node(name);
        let driver = net.add_driver(name, value);
        net.drive(node, driver);
        Line { node, driver }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn driver(&self) -> DriverId {
        self.driver
    }

    pub fn set(&self, net: &mut Network, value: bool) {
        net.set_driver(self.driver, value);
        net.drive(self.node, self.driver);
    }

    /// Stop driving the line so something else can.
    pub fn release(&self, net: &mut Network) {
        net.release(self.node, self.driver);
    }

    pub fn read(&self, net: &Network) -> Result<PinValue, SimError> {
        net.resolve(self.node)
    }
}

/// The VCC and GND rails every powered chip hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rails {
    pub vcc: Line,
    pub gnd: Line,
}

impl Rails {
    pub fn new(net: &mut Network) -> Self {
        Rails {
            vcc: Line::new(net, "VCC", true),
            gnd: Line::new(net, "GND", false),
        }
    }

    pub fn vcc(&self) -> NodeId {
        self.vcc.node()
    }

    pub fn gnd(&self) -> NodeId {
        self.gnd.node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let mut net = Network::new();
        let node = net.add_node("TEST");
        assert_eq!(net.node_name(node), "TEST");
        assert_eq!(net.resolve(node).unwrap(), PinValue::HighZ);
    }

    #[test]
    fn test_node_driving() {
        let mut net = Network::new();
        let node = net.add_node("TEST");
        let driver = net.add_driver("driver1", true);

        net.drive(node, driver);
        assert_eq!(net.resolve(node).unwrap(), PinValue::High);

        net.set_driver(driver, false);
        assert_eq!(net.resolve(node).unwrap(), PinValue::Low);

        net.release(node, driver);
        assert_eq!(net.resolve(node).unwrap(), PinValue::HighZ);
    }

    #[test]
    fn test_agreeing_drivers_merge() {
        let mut net = Network::new();
        let node = net.add_node("TEST");
        for i in 0..3 {
            let driver = net.add_driver(format!("d{}", i), true);
            net.drive(node, driver);
        }
        assert_eq!(net.resolve(node).unwrap(), PinValue::High);
    }

    #[test]
    fn test_conflict_names_drivers() {
        let mut net = Network::new();
        let node = net.add_node("BUS0");
        let up = net.add_driver("up", true);
        let down = net.add_driver("down", false);
        net.drive(node, up);
        net.drive(node, down);

        match net.resolve(node) {
            Err(SimError::Conflict { node, highs, lows }) => {
                assert_eq!(node, "BUS0");
                assert_eq!(highs, vec!["up".to_string()]);
                assert_eq!(lows, vec!["down".to_string()]);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_linked_nodes_share_level() {
        let mut net = Network::new();
        let input = net.add_node("IN");
        let output = net.add_node("OUT");
        net.connect(output, input);

        let driver = net.add_driver("src", true);
        net.drive(input, driver);

        assert_eq!(net.resolve(output).unwrap(), PinValue::High);
        assert_eq!(net.resolve(input).unwrap(), PinValue::High);
        assert!(net.is_connected(input, output));
    }

    #[test]
    fn test_cyclic_links_terminate() {
        let mut net = Network::new();
        let a = net.add_node("A");
        let b = net.add_node("B");
        let c = net.add_node("C");
        net.connect(a, b);
        net.connect(b, c);
        net.connect(c, a);

        let driver = net.add_driver("src", false);
        net.drive(c, driver);

        assert_eq!(net.resolve(a).unwrap(), PinValue::Low);
        assert_eq!(net.net_of(a).len(), 3);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut net = Network::new();
        let node = net.add_node("TEST");
        let driver = net.add_driver("d", true);
        net.drive(node, driver);

        let first = net.resolve(node).unwrap();
        let second = net.resolve(node).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_high_z_releases() {
        let mut net = Network::new();
        let node = net.add_node("Q");
        let driver = net.add_driver("q", false);

        net.output(node, driver, PinValue::High);
        assert!(net.is_driving(node, driver));
        assert_eq!(net.resolve(node).unwrap(), PinValue::High);

        net.output(node, driver, PinValue::HighZ);
        assert!(!net.is_driving(node, driver));
        assert_eq!(net.resolve(node).unwrap(), PinValue::HighZ);
    }

    #[test]
    fn test_line_toggle() {
        let mut net = Network::new();
        let line = Line::new(&mut net, "CLK", false);
        assert_eq!(line.read(&net).unwrap(), PinValue::Low);

        line.set(&mut net, true);
        assert_eq!(line.read(&net).unwrap(), PinValue::High);

        line.release(&mut net);
        assert_eq!(line.read(&net).unwrap(), PinValue::HighZ);
    }

    #[test]
    fn test_rails() {
        let mut net = Network::new();
        let rails = Rails::new(&mut net);
        assert_eq!(net.resolve(rails.vcc()).unwrap(), PinValue::High);
        assert_eq!(net.resolve(rails.gnd()).unwrap(), PinValue::Low);
    }
}
