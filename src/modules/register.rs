use crate::bus::Bus;
use crate::component::{Chip, Component};
use crate::components::{FourBitDRegister, OctalBusTransceiver};
use crate::connection::{attach_power, connect_pins, tie};
use crate::error::SimError;
use crate::modules::Backplane;
use crate::pin::{Network, NodeId};
use crate::types::list_to_int;

/// Which bits a [`Register`] puts on the bus when its out line is asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutput {
    Full,
    /// Bits 3..0 only; bits 7..4 are driven low. Used by the instruction
    /// register, whose high nibble is the opcode.
    LowNibble,
}

/// Two 74LS173s holding one byte latched from the bus.
///
/// D1 of each chip takes the most significant bit of its nibble, so the high
/// chip reads bus bits 7..4 and the low chip bits 3..0. The Q outputs are
/// always enabled and form the latch's value bus.
#[derive(Debug, Clone)]
pub struct ByteLatch {
    high: FourBitDRegister,
    low: FourBitDRegister,
    value: Bus,
}

impl ByteLatch {
    pub fn new(net: &mut Network, plane: Backplane<'_>, name: &str, load: NodeId) -> Self {
        let high = FourBitDRegister::new(net, format!("{}.hi", name));
        let low = FourBitDRegister::new(net, format!("{}.lo", name));

        for (chip, bits) in [(&high, [7, 6, 5, 4]), (&low, [3, 2, 1, 0])] {
            attach_power(net, plane.rails, chip);
            connect_pins(net, chip, &FourBitDRegister::D, &plane.bus_bits(&bits));
            tie(net, chip, &[FourBitDRegister::M, FourBitDRegister::N], plane.gnd());
            tie(net, chip, &[FourBitDRegister::G1, FourBitDRegister::G2], load);
            net.connect(chip.pin(FourBitDRegister::CLK), plane.clock);
            net.connect(chip.pin(FourBitDRegister::CLR), plane.reset);
        }

        // Value bus index 0 is the least significant bit, i.e. low Q4
        let q_nodes = [&low, &high]
            .iter()
            .flat_map(|chip| FourBitDRegister::Q.iter().rev().map(move |pin| chip.pin(*pin)))
            .collect();
        let value = Bus::from_nodes(net, &format!("{}.value", name), q_nodes);

        ByteLatch { high, low, value }
    }

    pub fn value_bus(&self) -> &Bus {
        &self.value
    }

    /// Stored byte, read from the chips' state rather than the pins.
    pub fn value(&self) -> u8 {
        let mut bits: Vec<bool> = self.low.state().into_iter().rev().collect();
        bits.extend(self.high.state().into_iter().rev());
        list_to_int(&bits) as u8
    }

    pub fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.high.evaluate(net)?;
        self.low.evaluate(net)
    }
}

/// A byte register: a [`ByteLatch`] plus a 74LS245 that puts the stored
/// value on the bus while `out` is low.
#[derive(Debug, Clone)]
pub struct Register {
    name: String,
    latch: ByteLatch,
    transceiver: OctalBusTransceiver,
}

impl Register {
    /// `load` and `out` are active low.
    pub fn new(
        net: &mut Network,
        plane: Backplane<'_>,
        name: &str,
        load: NodeId,
        out: NodeId,
        output: RegisterOutput,
    ) -> Self {
        let latch = ByteLatch::new(net, plane, name, load);
        let transceiver = OctalBusTransceiver::new(net, format!("{}.245", name));
        attach_power(net, plane.rails, &transceiver);

        // A1 carries bit 7 on both ports
        let msb_first: Vec<NodeId> = latch.value_bus().nodes().iter().rev().copied().collect();
        match output {
            RegisterOutput::Full => {
                connect_pins(net, &transceiver, &OctalBusTransceiver::A, &msb_first);
            }
            RegisterOutput::LowNibble => {
                tie(net, &transceiver, &OctalBusTransceiver::A[..4], plane.gnd());
                connect_pins(net, &transceiver, &OctalBusTransceiver::A[4..], &msb_first[4..]);
            }
        }
        connect_pins(
            net,
            &transceiver,
            &OctalBusTransceiver::B,
            &plane.bus_bits(&[7, 6, 5, 4, 3, 2, 1, 0]),
        );
        net.connect(transceiver.pin(OctalBusTransceiver::DIRECTION), plane.vcc());
        net.connect(transceiver.pin(OctalBusTransceiver::ENABLED), out);

        Register {
            name: name.to_string(),
            latch,
            transceiver,
        }
    }

    pub fn value(&self) -> u8 {
        self.latch.value()
    }

    /// The stored value as seen by the parts wired to it directly.
    pub fn value_bus(&self) -> &Bus {
        self.latch.value_bus()
    }
}

impl Component for Register {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.latch.evaluate(net)?;
        self.transceiver.evaluate(net)
    }
}
