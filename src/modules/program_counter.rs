use crate::component::{Chip, Component};
use crate::components::{BinaryCounter, OctalBusTransceiver};
use crate::connection::{attach_power, connect_bus, connect_chips, connect_pins, tie};
use crate::error::SimError;
use crate::modules::Backplane;
use crate::pin::{Network, NodeId};

/// A 74LS161 counter with a 74LS245 onto the low nibble of the bus.
///
/// Jumping is the counter's parallel load; CE drives both count enables.
#[derive(Debug, Clone)]
pub struct ProgramCounter {
    name: String,
    counter: BinaryCounter,
    transceiver: OctalBusTransceiver,
}

impl ProgramCounter {
    /// `clear`, `jump` and `out` are active low, `count_enable` active high.
    pub fn new(
        net: &mut Network,
        plane: Backplane<'_>,
        name: &str,
        clear: NodeId,
        count_enable: NodeId,
        jump: NodeId,
        out: NodeId,
    ) -> Self {
        let counter = BinaryCounter::new(net, format!("{}.161", name));
        let transceiver = OctalBusTransceiver::new(net, format!("{}.245", name));
        attach_power(net, plane.rails, &counter);
        attach_power(net, plane.rails, &transceiver);

        connect_bus(net, &counter, &BinaryCounter::D, plane.bus, 0);
        tie(net, &counter, &[BinaryCounter::ENP, BinaryCounter::ENT], count_enable);
        net.connect(counter.pin(BinaryCounter::LOAD), jump);
        net.connect(counter.pin(BinaryCounter::CLR), clear);
        net.connect(counter.pin(BinaryCounter::CLK), plane.clock);

        // A5..A8 carry Q4..Q1; the upper nibble reads as zero
        tie(net, &transceiver, &OctalBusTransceiver::A[..4], plane.gnd());
        for (a, q) in OctalBusTransceiver::A[4..].iter().zip(BinaryCounter::Q.iter().rev()) {
            connect_chips(net, &transceiver, *a, &counter, *q);
        }
        connect_pins(
            net,
            &transceiver,
            &OctalBusTransceiver::B,
            &plane.bus_bits(&[7, 6, 5, 4, 3, 2, 1, 0]),
        );
        net.connect(transceiver.pin(OctalBusTransceiver::DIRECTION), plane.vcc());
        net.connect(transceiver.pin(OctalBusTransceiver::ENABLED), out);

        ProgramCounter {
            name: name.to_string(),
            counter,
            transceiver,
        }
    }

    pub fn value(&self) -> u8 {
        self.counter.count()
    }
}

impl Component for ProgramCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.counter.evaluate(net)?;
        self.transceiver.evaluate(net)
    }
}
