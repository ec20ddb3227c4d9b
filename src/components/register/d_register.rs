use tracing::trace;

use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::error::SimError;
use crate::pin::{DriverId, Network, PinValue};
use crate::types::list_to_int;

/// 74LS173 4-bit D-type register with tri-state outputs.
///
/// Stored state starts at zero. CLR (active high) clears it, G1/G2 (active
/// high) inhibit loading, and otherwise D1..D4 are latched on a rising CLK.
/// Q1..Q4 drive the stored state while M and N are both low.
#[derive(Debug, Clone)]
pub struct FourBitDRegister {
    base: BaseComponent,
    q_drivers: [DriverId; 4],
    state: [bool; 4],
    last_clock: bool,
}

impl FourBitDRegister {
    pub const M: u8 = 1;
    pub const N: u8 = 2;
    pub const CLK: u8 = 7;
    pub const G1: u8 = 9;
    pub const G2: u8 = 10;
    pub const CLR: u8 = 15;

    /// Q1..Q4
    pub const Q: [u8; 4] = [3, 4, 5, 6];
    /// D1..D4
    pub const D: [u8; 4] = [14, 13, 12, 11];

    pub fn new(net: &mut Network, name: impl Into<String>) -> Self {
        let base = BaseComponent::new(
            net,
            name,
            &[
                (1, "M"),
                (2, "N"),
                (3, "Q1"),
                (4, "Q2"),
                (5, "Q3"),
                (6, "Q4"),
                (7, "CLK"),
                (8, "GND"),
                (9, "G1"),
                (10, "G2"),
                (11, "D4"),
                (12, "D3"),
                (13, "D2"),
                (14, "D1"),
                (15, "CLR"),
                (16, "VCC"),
            ],
        );

        let q_drivers = Self::Q.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("Q")), false)
        });

        FourBitDRegister {
            base,
            q_drivers,
            state: [false; 4],
            last_clock: false,
        }
    }

    /// Stored bits, index 0 = Q1.
    pub fn state(&self) -> [bool; 4] {
        self.state
    }

    /// Stored bits as a number with Q1 as the least significant bit.
    pub fn value(&self) -> u8 {
        list_to_int(&self.state) as u8
    }

    fn latch(&mut self, net: &Network) -> Result<(), SimError> {
        let levels = self.base.read_all(net, &Self::D)?;
        for (i, level) in levels.iter().enumerate() {
            self.state[i] = level.to_bool().ok_or_else(|| {
                SimError::configuration(
                    self.base.name(),
                    format!("D{} is floating on a latching clock edge", i + 1),
                )
            })?;
        }
        trace!(chip = self.base.name(), value = self.value(), "latched");
        Ok(())
    }

    fn drive_outputs(&self, net: &mut Network) -> Result<(), SimError> {
        let disabled = self.base.read(net, Self::M)?.is_high() || self.base.read(net, Self::N)?.is_high();

        for ((pin, driver), bit) in Self::Q.iter().zip(&self.q_drivers).zip(self.state) {
            let level = if disabled {
                PinValue::HighZ
            } else {
                PinValue::from_bool(bit)
            };
            net.output(self.pin(*pin), *driver, level);
        }
        Ok(())
    }
}

impl Component for FourBitDRegister {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.check_power(net)?;

        // Edge detection sees every call, not only the ones that latch
        let clock = self.base.read(net, Self::CLK)?.is_high();
        let rising = clock && !self.last_clock;
        self.last_clock = clock;

        if self.base.read(net, Self::CLR)?.is_high() {
            if self.state != [false; 4] {
                trace!(chip = self.base.name(), "cleared");
            }
            self.state = [false; 4];
        } else {
            // Data enable (active low)
            let inhibited =
                self.base.read(net, Self::G1)?.is_high() || self.base.read(net, Self::G2)?.is_high();
            if !inhibited && rising {
                self.latch(net)?;
            }
        }

        self.drive_outputs(net)
    }
}

impl Chip for FourBitDRegister {
    fn base(&self) -> &BaseComponent {
        &self.base
    }
}

impl Powered for FourBitDRegister {
    const VCC: u8 = 16;
    const GND: u8 = 8;
}
