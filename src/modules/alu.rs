//! The ALU board: two cascaded 74LS283 adders, B inverted through two
//! 74LS86s for subtraction, a zero detector made of a 74LS02 and a 74LS08,
//! a 74LS173 flags register and a 74LS245 onto the bus.
//!
//! Subtraction is A + !B + 1: SU feeds every XOR and the low adder's carry in.

use crate::bus::Bus;
use crate::component::{Chip, Component};
use crate::components::{FourBitAdder, FourBitDRegister, OctalBusTransceiver, QuadAnd, QuadNor, QuadXor};
use crate::connection::{attach_power, connect_chips, connect_pins, tie};
use crate::error::SimError;
use crate::modules::Backplane;
use crate::pin::{Network, NodeId, PinValue};

/// (A, B, Y) pins of the four gates in a 74LS86.
const XOR_GATES: [(u8, u8, u8); 4] = [
    (QuadXor::A1, QuadXor::B1, QuadXor::Y1),
    (QuadXor::A2, QuadXor::B2, QuadXor::Y2),
    (QuadXor::A3, QuadXor::B3, QuadXor::Y3),
    (QuadXor::A4, QuadXor::B4, QuadXor::Y4),
];

#[derive(Debug, Clone)]
pub struct Alu {
    name: String,
    inverters: [QuadXor; 2],
    low: FourBitAdder,
    high: FourBitAdder,
    nor: QuadNor,
    and: QuadAnd,
    flags: FourBitDRegister,
    transceiver: OctalBusTransceiver,
    sum: Bus,
}

impl Alu {
    /// `subtract` is active high; `out` and `flags_in` are active low.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        net: &mut Network,
        plane: Backplane<'_>,
        name: &str,
        a: &Bus,
        b: &Bus,
        subtract: NodeId,
        out: NodeId,
        flags_in: NodeId,
    ) -> Result<Self, SimError> {
        let inverters = [
            QuadXor::new(net, format!("{}.86a", name))?,
            QuadXor::new(net, format!("{}.86b", name))?,
        ];
        let low = FourBitAdder::new(net, format!("{}.283lo", name));
        let high = FourBitAdder::new(net, format!("{}.283hi", name));
        let nor = QuadNor::new(net, format!("{}.02", name))?;
        let and = QuadAnd::new(net, format!("{}.08", name))?;
        let flags = FourBitDRegister::new(net, format!("{}.flags", name));
        let transceiver = OctalBusTransceiver::new(net, format!("{}.245", name));
        let sum = Bus::new(net, &format!("{}.sum", name), 8);

        for chip in &inverters {
            attach_power(net, plane.rails, chip);
        }
        attach_power(net, plane.rails, &low);
        attach_power(net, plane.rails, &high);
        attach_power(net, plane.rails, &nor);
        attach_power(net, plane.rails, &and);
        attach_power(net, plane.rails, &flags);
        attach_power(net, plane.rails, &transceiver);

        // B XOR SU into the adders' B inputs
        for (nibble, (chip, adder)) in inverters.iter().zip([&low, &high]).enumerate() {
            for (i, (a_pin, b_pin, y_pin)) in XOR_GATES.iter().enumerate() {
                net.connect(chip.pin(*a_pin), b.node(nibble * 4 + i));
                net.connect(chip.pin(*b_pin), subtract);
                connect_chips(net, chip, *y_pin, adder, FourBitAdder::B[i]);
            }
        }

        connect_pins(net, &low, &FourBitAdder::A, &a.nodes()[..4]);
        connect_pins(net, &high, &FourBitAdder::A, &a.nodes()[4..]);
        connect_pins(net, &low, &FourBitAdder::S, &sum.nodes()[..4]);
        connect_pins(net, &high, &FourBitAdder::S, &sum.nodes()[4..]);
        net.connect(low.pin(FourBitAdder::C0), subtract);
        connect_chips(net, &low, FourBitAdder::C4, &high, FourBitAdder::C0);

        // Zero detect: NOR bit pairs, then AND the four results together
        let nor_gates = [
            (QuadNor::A1, QuadNor::B1, QuadNor::Y1),
            (QuadNor::A2, QuadNor::B2, QuadNor::Y2),
            (QuadNor::A3, QuadNor::B3, QuadNor::Y3),
            (QuadNor::A4, QuadNor::B4, QuadNor::Y4),
        ];
        for (i, (a_pin, b_pin, _)) in nor_gates.iter().enumerate() {
            net.connect(nor.pin(*a_pin), sum.node(2 * i));
            net.connect(nor.pin(*b_pin), sum.node(2 * i + 1));
        }
        connect_chips(net, &nor, QuadNor::Y1, &and, QuadAnd::A1);
        connect_chips(net, &nor, QuadNor::Y2, &and, QuadAnd::B1);
        connect_chips(net, &nor, QuadNor::Y3, &and, QuadAnd::A2);
        connect_chips(net, &nor, QuadNor::Y4, &and, QuadAnd::B2);
        connect_chips(net, &and, QuadAnd::Y1, &and, QuadAnd::A3);
        connect_chips(net, &and, QuadAnd::Y2, &and, QuadAnd::B3);
        tie(net, &and, &[QuadAnd::A4, QuadAnd::B4], plane.gnd());

        // Flags: D1 = carry, D2 = zero
        connect_chips(net, &high, FourBitAdder::C4, &flags, FourBitDRegister::D[0]);
        connect_chips(net, &and, QuadAnd::Y3, &flags, FourBitDRegister::D[1]);
        tie(net, &flags, &FourBitDRegister::D[2..], plane.gnd());
        tie(net, &flags, &[FourBitDRegister::M, FourBitDRegister::N], plane.gnd());
        tie(net, &flags, &[FourBitDRegister::G1, FourBitDRegister::G2], flags_in);
        net.connect(flags.pin(FourBitDRegister::CLK), plane.clock);
        net.connect(flags.pin(FourBitDRegister::CLR), plane.reset);

        let msb_first: Vec<NodeId> = sum.nodes().iter().rev().copied().collect();
        connect_pins(net, &transceiver, &OctalBusTransceiver::A, &msb_first);
        connect_pins(
            net,
            &transceiver,
            &OctalBusTransceiver::B,
            &plane.bus_bits(&[7, 6, 5, 4, 3, 2, 1, 0]),
        );
        net.connect(transceiver.pin(OctalBusTransceiver::DIRECTION), plane.vcc());
        net.connect(transceiver.pin(OctalBusTransceiver::ENABLED), out);

        Ok(Alu {
            name: name.to_string(),
            inverters,
            low,
            high,
            nor,
            and,
            flags,
            transceiver,
            sum,
        })
    }

    /// The adders' outputs, index 0 least significant.
    pub fn sum_bus(&self) -> &Bus {
        &self.sum
    }

    pub fn sum(&self, net: &Network) -> Result<Option<u8>, SimError> {
        Ok(self.sum.value(net)?.map(|value| value as u8))
    }

    /// Live carry out of the high adder.
    pub fn carry(&self, net: &Network) -> Result<PinValue, SimError> {
        self.high.base().read(net, FourBitAdder::C4)
    }

    /// Live output of the zero detector.
    pub fn zero(&self, net: &Network) -> Result<PinValue, SimError> {
        self.and.base().read(net, QuadAnd::Y3)
    }

    /// Carry flag as last latched by FI.
    pub fn carry_flag(&self) -> bool {
        self.flags.state()[0]
    }

    /// Zero flag as last latched by FI.
    pub fn zero_flag(&self) -> bool {
        self.flags.state()[1]
    }
}

impl Component for Alu {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        // Flags first, so a clock edge latches the result settled before it
        self.flags.evaluate(net)?;

        for chip in &mut self.inverters {
            chip.evaluate(net)?;
        }
        self.low.evaluate(net)?;
        self.high.evaluate(net)?;
        self.nor.evaluate(net)?;
        self.and.evaluate(net)?;
        self.transceiver.evaluate(net)
    }
}
