//! 74LS-series gate packages.
//!
//! Every package here is a fixed table of gates over datasheet pin numbers
//! plus the power pins; `evaluate` checks power and then every gate.

use crate::component::{BaseComponent, Chip, Component, Powered};
use crate::components::logic::gate::{GateArray, GateKind};
use crate::error::SimError;
use crate::pin::Network;

macro_rules! gate_chip {
    (
        $(#[$meta:meta])*
        $chip:ident: $kind:expr, vcc = $vcc:literal, gnd = $gnd:literal,
        pins { $($pin:ident = $number:literal),* $(,)? },
        gates [ $( [$($input:ident),+] => $output:ident ),* $(,)? ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $chip {
            base: BaseComponent,
            gates: GateArray,
        }

        impl $chip {
            $(pub const $pin: u8 = $number;)*

            pub const GATES: &'static [(&'static [u8], u8)] = &[
                $( (&[$(Self::$input),+], Self::$output) ),*
            ];

            pub fn new(net: &mut Network, name: impl Into<String>) -> Result<Self, SimError> {
                let base = BaseComponent::new(
                    net,
                    name,
                    &[$((Self::$pin, stringify!($pin)),)* ($vcc, "VCC"), ($gnd, "GND")],
                );
                let gates = GateArray::new(net, &base, $kind, Self::GATES)?;
                Ok($chip { base, gates })
            }

            pub fn gates(&self) -> &GateArray {
                &self.gates
            }
        }

        impl Component for $chip {
            fn name(&self) -> &str {
                self.base.name()
            }

            fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
                self.check_power(net)?;
                self.gates.evaluate(net)
            }
        }

        impl Chip for $chip {
            fn base(&self) -> &BaseComponent {
                &self.base
            }
        }

        impl Powered for $chip {
            const VCC: u8 = $vcc;
            const GND: u8 = $gnd;
        }
    };
}

gate_chip! {
    /// 74LS00 quad 2-input NAND, DIP-14.
    QuadNand: GateKind::Nand, vcc = 14, gnd = 7,
    pins {
        A1 = 1, B1 = 2, Y1 = 3,
        A2 = 4, B2 = 5, Y2 = 6,
        Y3 = 8, A3 = 9, B3 = 10,
        Y4 = 11, A4 = 12, B4 = 13,
    },
    gates [[A1, B1] => Y1, [A2, B2] => Y2, [A3, B3] => Y3, [A4, B4] => Y4]
}

gate_chip! {
    /// 74LS02 quad 2-input NOR, DIP-14. Outputs come first on each side.
    QuadNor: GateKind::Nor, vcc = 14, gnd = 7,
    pins {
        Y1 = 1, A1 = 2, B1 = 3,
        Y2 = 4, A2 = 5, B2 = 6,
        A3 = 8, B3 = 9, Y3 = 10,
        A4 = 11, B4 = 12, Y4 = 13,
    },
    gates [[A1, B1] => Y1, [A2, B2] => Y2, [A3, B3] => Y3, [A4, B4] => Y4]
}

gate_chip! {
    /// 74LS04 hex inverter, DIP-14.
    HexInverter: GateKind::Not, vcc = 14, gnd = 7,
    pins {
        A1 = 1, Y1 = 2,
        A2 = 3, Y2 = 4,
        A3 = 5, Y3 = 6,
        Y4 = 8, A4 = 9,
        Y5 = 10, A5 = 11,
        Y6 = 12, A6 = 13,
    },
    gates [[A1] => Y1, [A2] => Y2, [A3] => Y3, [A4] => Y4, [A5] => Y5, [A6] => Y6]
}

gate_chip! {
    /// 74LS08 quad 2-input AND, DIP-14.
    QuadAnd: GateKind::And, vcc = 14, gnd = 7,
    pins {
        A1 = 1, B1 = 2, Y1 = 3,
        A2 = 4, B2 = 5, Y2 = 6,
        Y3 = 8, A3 = 9, B3 = 10,
        Y4 = 11, A4 = 12, B4 = 13,
    },
    gates [[A1, B1] => Y1, [A2, B2] => Y2, [A3, B3] => Y3, [A4, B4] => Y4]
}

gate_chip! {
    /// 74LS32 quad 2-input OR, DIP-14.
    QuadOr: GateKind::Or, vcc = 14, gnd = 7,
    pins {
        A1 = 1, B1 = 2, Y1 = 3,
        A2 = 4, B2 = 5, Y2 = 6,
        Y3 = 8, A3 = 9, B3 = 10,
        Y4 = 11, A4 = 12, B4 = 13,
    },
    gates [[A1, B1] => Y1, [A2, B2] => Y2, [A3, B3] => Y3, [A4, B4] => Y4]
}

gate_chip! {
    /// 74LS86 quad 2-input exclusive OR, DIP-14.
    QuadXor: GateKind::Xor, vcc = 14, gnd = 7,
    pins {
        A1 = 1, B1 = 2, Y1 = 3,
        A2 = 4, B2 = 5, Y2 = 6,
        Y3 = 8, A3 = 9, B3 = 10,
        Y4 = 11, A4 = 12, B4 = 13,
    },
    gates [[A1, B1] => Y1, [A2, B2] => Y2, [A3, B3] => Y3, [A4, B4] => Y4]
}
