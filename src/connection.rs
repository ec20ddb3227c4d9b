//! Wiring helpers used while a machine is assembled.
//!
//! Pins are wired once at construction and never re-wired afterward.

use crate::bus::Bus;
use crate::component::{Chip, Powered};
use crate::pin::{Network, NodeId, Rails};

/// Hook a chip's VCC and GND pins to the rails.
pub fn attach_power<C: Powered>(net: &mut Network, rails: &Rails, chip: &C) {
    net.connect(chip.pin(C::VCC), rails.vcc());
    net.connect(chip.pin(C::GND), rails.gnd());
}

/// Wire `pins[i]` of `chip` to `nodes[i]`.
pub fn connect_pins<C: Chip>(net: &mut Network, chip: &C, pins: &[u8], nodes: &[NodeId]) {
    debug_assert_eq!(pins.len(), nodes.len(), "{}: pin/node count mismatch", chip.name());

    for (pin, node) in pins.iter().zip(nodes) {
        net.connect(chip.pin(*pin), *node);
    }
}

/// Wire `pins[i]` to bit `first_bit + i` of `bus`.
pub fn connect_bus<C: Chip>(net: &mut Network, chip: &C, pins: &[u8], bus: &Bus, first_bit: usize) {
    let nodes = &bus.nodes()[first_bit..first_bit + pins.len()];
    connect_pins(net, chip, pins, nodes);
}

/// Tie every pin in `pins` to the same node, usually a rail or control line.
pub fn tie<C: Chip>(net: &mut Network, chip: &C, pins: &[u8], node: NodeId) {
    for pin in pins {
        net.connect(chip.pin(*pin), node);
    }
}

/// Join two pins on (possibly different) chips with a wire.
pub fn connect_chips<A: Chip, B: Chip>(net: &mut Network, a: &A, pin_a: u8, b: &B, pin_b: u8) {
    net.connect(a.pin(pin_a), b.pin(pin_b));
}
