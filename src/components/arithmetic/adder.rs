use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::error::SimError;
use crate::pin::{DriverId, Network, PinValue};
use crate::types::{int_to_levels, levels_to_int};

/// 74LS283 4-bit binary full adder with fast carry.
///
/// Purely combinational: S1..S4 and C4 show A + B + C0 on every evaluate.
/// If any input floats, every output is released.
#[derive(Debug, Clone)]
pub struct FourBitAdder {
    base: BaseComponent,
    sum_drivers: [DriverId; 4],
    carry_driver: DriverId,
}

impl FourBitAdder {
    pub const C0: u8 = 7;
    pub const C4: u8 = 9;

    /// A1..A4
    pub const A: [u8; 4] = [5, 3, 14, 12];
    /// B1..B4
    pub const B: [u8; 4] = [6, 2, 15, 11];
    /// S1..S4
    pub const S: [u8; 4] = [4, 1, 13, 10];

    pub fn new(net: &mut Network, name: impl Into<String>) -> Self {
        let base = BaseComponent::new(
            net,
            name,
            &[
                (1, "S2"),
                (2, "B2"),
                (3, "A2"),
                (4, "S1"),
                (5, "A1"),
                (6, "B1"),
                (7, "C0"),
                (8, "GND"),
                (9, "C4"),
                (10, "S4"),
                (11, "B4"),
                (12, "A4"),
                (13, "S3"),
                (14, "A3"),
                (15, "B3"),
                (16, "VCC"),
            ],
        );

        let sum_drivers = Self::S.map(|pin| {
            net.add_driver(format!("{}.{}", base.name(), base.pin_name(pin).unwrap_or("S")), false)
        });
        let carry_driver = net.add_driver(format!("{}.C4", base.name()), false);

        FourBitAdder {
            base,
            sum_drivers,
            carry_driver,
        }
    }

    fn write(&self, net: &mut Network, sum: [PinValue; 4], carry: PinValue) {
        for ((pin, driver), level) in Self::S.iter().zip(&self.sum_drivers).zip(sum) {
            net.output(self.pin(*pin), *driver, level);
        }
        net.output(self.pin(Self::C4), self.carry_driver, carry);
    }
}

impl Component for FourBitAdder {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        self.check_power(net)?;

        let a = levels_to_int(&self.base.read_all(net, &Self::A)?);
        let b = levels_to_int(&self.base.read_all(net, &Self::B)?);
        let carry_in = self.base.read(net, Self::C0)?.to_bool();

        match (a, b, carry_in) {
            (Some(a), Some(b), Some(carry_in)) => {
                let result = a + b + carry_in as u32;
                let levels = int_to_levels(result & 0b1111, 4);
                let sum = [levels[0], levels[1], levels[2], levels[3]];
                self.write(net, sum, PinValue::from_bool(result & 0b1_0000 != 0));
            }
            _ => self.write(net, [PinValue::HighZ; 4], PinValue::HighZ),
        }

        Ok(())
    }
}

impl Chip for FourBitAdder {
    fn base(&self) -> &BaseComponent {
        &self.base
    }
}

impl Powered for FourBitAdder {
    const VCC: u8 = 16;
    const GND: u8 = 8;
}
