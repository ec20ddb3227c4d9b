use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::error::SimError;
use crate::pin::{DriverId, Network, PinValue};

/// 74LS245 tri-state octal bus transceiver.
///
/// While ENABLED is low the eight levels on the input port are copied to the
/// output port on every evaluate; DIRECTION high means A to B. Otherwise both
/// ports are released.
#[derive(Debug, Clone)]
pub struct OctalBusTransceiver {
    base: BaseComponent,
    a_drivers: [DriverId; 8],
    b_drivers: [DriverId; 8],
}

impl OctalBusTransceiver {
    pub const DIRECTION: u8 = 1;
    pub const ENABLED: u8 = 19;

    /// A1..A8, index 0 = A1.
    pub const A: [u8; 8] = [2, 3, 4, 5, 6, 7, 8, 9];
    /// B1..B8, index 0 = B1. B8 sits next to GND.
    pub const B: [u8; 8] = [18, 17, 16, 15, 14, 13, 12, 11];

    pub fn new(net: &mut Network, name: impl Into<String>) -> Self {
        let base = BaseComponent::new(
            net,
            name,
            &[
                (1, "DIR"),
                (2, "A1"),
                (3, "A2"),
                (4, "A3"),
                (5, "A4"),
                (6, "A5"),
                (7, "A6"),
                (8, "A7"),
                (9, "A8"),
                (10, "GND"),
                (11, "B8"),
                (12, "B7"),
                (13, "B6"),
                (14, "B5"),
                (15, "B4"),
                (16, "B3"),
                (17, "B2"),
                (18, "B1"),
                (19, "OE"),
                (20, "VCC"),
            ],
        );

        let a_drivers = Self::A.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("A")), false)
        });
        let b_drivers = Self::B.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("B")), false)
        });

        OctalBusTransceiver {
            base,
            a_drivers,
            b_drivers,
        }
    }

    fn release_port(&self, net: &mut Network, pins: &[u8; 8], drivers: &[DriverId; 8]) {
        for (pin, driver) in pins.iter().zip(drivers) {
            net.release(self.pin(*pin), *driver);
        }
    }

    fn release_all(&self, net: &mut Network) {
        self.release_port(net, &Self::A, &self.a_drivers);
        self.release_port(net, &Self::B, &self.b_drivers);
    }
}

impl Component for OctalBusTransceiver {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.check_power(net)?;

        // Output enable (active low)
        if self.base.read(net, Self::ENABLED)? != PinValue::Low {
            self.release_all(net);
            return Ok(());
        }

        let a_to_b = self.base.read_tied(net, Self::DIRECTION)?;
        let (inputs, in_drivers, outputs, out_drivers) = if a_to_b {
            (&Self::A, &self.a_drivers, &Self::B, &self.b_drivers)
        } else {
            (&Self::B, &self.b_drivers, &Self::A, &self.a_drivers)
        };

        // The input port must not see our own drivers from a previous direction
        self.release_port(net, inputs, in_drivers);

        let levels = self.base.read_all(net, inputs)?;
        for ((pin, driver), level) in outputs.iter().zip(out_drivers).zip(levels) {
            net.output(self.pin(*pin), *driver, level);
        }

        Ok(())
    }
}

impl Chip for OctalBusTransceiver {
    fn base(&self) -> &BaseComponent {
        &self.base
    }
}

impl Powered for OctalBusTransceiver {
    const VCC: u8 = 20;
    const GND: u8 = 10;
}
