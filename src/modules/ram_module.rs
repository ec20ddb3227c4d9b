use crate::component::{Chip, Component};
use crate::components::{FourBitDRegister, QuadNand, StaticRam};
use crate::connection::{attach_power, connect_bus, connect_chips, tie};
use crate::error::SimError;
use crate::modules::Backplane;
use crate::pin::{Network, NodeId};

/// Memory board: a 74LS173 memory address register, a 71256 RAM and a
/// 74LS00 gate that only lets WE through while CLK is high.
///
/// Only A0..A3 come from the address register; the rest of the address is
/// tied low, giving the machine 16 bytes.
#[derive(Debug, Clone)]
pub struct RamModule {
    name: String,
    address: FourBitDRegister,
    write_gate: QuadNand,
    ram: StaticRam,
}

impl RamModule {
    /// `address_in` and `ram_out` are active low, `ram_in` is active high.
    pub fn new(
        net: &mut Network,
        plane: Backplane<'_>,
        name: &str,
        address_in: NodeId,
        ram_in: NodeId,
        ram_out: NodeId,
    ) -> Result<Self, SimError> {
        let address = FourBitDRegister::new(net, format!("{}.mar", name));
        let write_gate = QuadNand::new(net, format!("{}.00", name))?;
        let ram = StaticRam::new(net, format!("{}.71256", name));

        attach_power(net, plane.rails, &address);
        attach_power(net, plane.rails, &write_gate);
        attach_power(net, plane.rails, &ram);

        connect_bus(net, &address, &FourBitDRegister::D, plane.bus, 0);
        tie(net, &address, &[FourBitDRegister::M, FourBitDRegister::N], plane.gnd());
        tie(net, &address, &[FourBitDRegister::G1, FourBitDRegister::G2], address_in);
        net.connect(address.pin(FourBitDRegister::CLK), plane.clock);
        net.connect(address.pin(FourBitDRegister::CLR), plane.reset);

        for (q, a) in FourBitDRegister::Q.iter().zip(&StaticRam::A[..4]) {
            connect_chips(net, &address, *q, &ram, *a);
        }
        tie(net, &ram, &StaticRam::A[4..], plane.gnd());
        connect_bus(net, &ram, &StaticRam::IO, plane.bus, 0);
        net.connect(ram.pin(StaticRam::CS), plane.gnd());
        net.connect(ram.pin(StaticRam::OE), ram_out);

        // WE = NAND(CLK, RI)
        net.connect(write_gate.pin(QuadNand::A1), plane.clock);
        net.connect(write_gate.pin(QuadNand::B1), ram_in);
        connect_chips(net, &write_gate, QuadNand::Y1, &ram, StaticRam::WE);

        Ok(RamModule {
            name: name.to_string(),
            address,
            write_gate,
            ram,
        })
    }

    /// Current memory address register contents.
    pub fn address(&self) -> u8 {
        self.address.value()
    }

    pub fn ram(&self) -> &StaticRam {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut StaticRam {
        &mut self.ram
    }

    /// Seed memory before the clock starts.
    pub fn preload(&mut self, address: usize, value: u8) -> Result<(), SimError> {
        self.ram.set(address, value)
    }
}

impl Component for RamModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.address.evaluate(net)?;
        self.write_gate.evaluate(net)?;
        self.ram.evaluate(net)
    }
}
