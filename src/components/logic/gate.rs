use crate::component::BaseComponent;
use crate::error::SimError;
use crate::pin::{DriverId, Network, NodeId, PinValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    Nand,
    Nor,
    And,
    Or,
    Xor,
    Not,
}

impl GateKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Not => "NOT",
        }
    }

    fn check_inputs(&self, count: usize) -> Result<(), SimError> {
        let (ok, expected) = match self {
            GateKind::Not => (count == 1, "exactly 1"),
            GateKind::Xor => (count == 2, "exactly 2"),
            _ => (count >= 2, "at least 2"),
        };

        if ok {
            Ok(())
        } else {
            Err(SimError::Shape {
                gate: self.to_str(),
                expected,
                got: count,
            })
        }
    }

    /// Three-valued truth table. A controlling input (low into AND, high
    /// into OR) decides the output even if other inputs float; otherwise a
    /// floating input leaves the output indeterminate. No inputs at all
    /// leaves it floating too.
    pub fn apply(&self, inputs: &[PinValue]) -> PinValue {
        let Some(first) = inputs.first() else {
            return PinValue::HighZ;
        };
        match self {
            GateKind::And => all_high(inputs),
            GateKind::Nand => invert(all_high(inputs)),
            GateKind::Or => any_high(inputs),
            GateKind::Nor => invert(any_high(inputs)),
            GateKind::Not => invert(*first),
            GateKind::Xor => {
                let bits: Option<Vec<bool>> = inputs.iter().map(PinValue::to_bool).collect();
                match bits {
                    Some(bits) => PinValue::from_bool(bits.iter().filter(|b| **b).count() % 2 == 1),
                    None => PinValue::HighZ,
                }
            }
        }
    }
}

fn invert(value: PinValue) -> PinValue {
    match value {
        PinValue::Low => PinValue::High,
        PinValue::High => PinValue::Low,
        PinValue::HighZ => PinValue::HighZ,
    }
}

fn all_high(inputs: &[PinValue]) -> PinValue {
    if inputs.iter().any(PinValue::is_low) {
        PinValue::Low
    } else if inputs.iter().all(PinValue::is_high) {
        PinValue::High
    } else {
        PinValue::HighZ
    }
}

fn any_high(inputs: &[PinValue]) -> PinValue {
    if inputs.iter().any(PinValue::is_high) {
        PinValue::High
    } else if inputs.iter().all(PinValue::is_low) {
        PinValue::Low
    } else {
        PinValue::HighZ
    }
}

/// One gate inside a package, with a private driver on its output pin.
#[derive(Debug, Clone)]
pub struct Gate {
    kind: GateKind,
    inputs: Vec<NodeId>,
    output: NodeId,
    driver: DriverId,
}

impl Gate {
    pub fn new(
        kind: GateKind,
        inputs: Vec<NodeId>,
        output: NodeId,
        driver: DriverId,
    ) -> Result<Self, SimError> {
        kind.check_inputs(inputs.len())?;
        Ok(Gate {
            kind,
            inputs,
            output,
            driver,
        })
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn output(&self) -> NodeId {
        self.output
    }

    pub fn evaluate(&self, net: &mut Network) -> Result<(), SimError> {
        let levels = net.resolve_all(&self.inputs)?;
        let result = self.kind.apply(&levels);
        net.output(self.output, self.driver, result);
        Ok(())
    }
}

/// The gates of one package, wired by datasheet pin numbers.
#[derive(Debug, Clone)]
pub struct GateArray {
    gates: Vec<Gate>,
}

impl GateArray {
    /// Build a gate per `(input pins, output pin)` entry of `table`.
    pub fn new(
        net: &mut Network,
        base: &BaseComponent,
        kind: GateKind,
        table: &[(&[u8], u8)],
    ) -> Result<Self, SimError> {
        let mut gates = Vec::with_capacity(table.len());

        for (inputs, output) in table {
            let driver_name = format!(
                "{}.{}",
                base.name(),
                base.pin_name(*output).unwrap_or("Y")
            );
            let driver = net.add_driver(driver_name, false);
            let inputs = inputs.iter().map(|pin| base.pin(*pin)).collect();
            gates.push(Gate::new(kind, inputs, base.pin(*output), driver)?);
        }

        Ok(GateArray { gates })
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn evaluate(&self, net: &mut Network) -> Result<(), SimError> {
        for gate in &self.gates {
            gate.evaluate(net)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PinValue::{High, HighZ, Low};

    #[test]
    fn test_truth_tables() {
        let cases = [(Low, Low), (Low, High), (High, Low), (High, High)];
        let expected = [
            (GateKind::Nand, [High, High, High, Low]),
            (GateKind::Nor, [High, Low, Low, Low]),
            (GateKind::And, [Low, Low, Low, High]),
            (GateKind::Or, [Low, High, High, High]),
            (GateKind::Xor, [Low, High, High, Low]),
        ];

        for (kind, outputs) in expected {
            for ((a, b), y) in cases.iter().zip(outputs) {
                assert_eq!(kind.apply(&[*a, *b]), y, "{} {} {}", kind.to_str(), a, b);
            }
        }
    }

    #[test]
    fn test_floating_inputs() {
        assert_eq!(GateKind::Nand.apply(&[Low, HighZ]), High);
        assert_eq!(GateKind::Nand.apply(&[High, HighZ]), HighZ);
        assert_eq!(GateKind::Nor.apply(&[High, HighZ]), Low);
        assert_eq!(GateKind::Nor.apply(&[Low, HighZ]), HighZ);
        assert_eq!(GateKind::Xor.apply(&[High, HighZ]), HighZ);
        assert_eq!(GateKind::Not.apply(&[HighZ]), HighZ);
    }

    #[test]
    fn test_no_inputs_float() {
        for kind in [
            GateKind::Nand,
            GateKind::Nor,
            GateKind::And,
            GateKind::Or,
            GateKind::Xor,
            GateKind::Not,
        ] {
            assert_eq!(kind.apply(&[]), HighZ, "{}", kind.to_str());
        }
    }

    #[test]
    fn test_gate_shape_checked_at_construction() {
        let mut net = Network::new();
        let a = net.add_node("A");
        let b = net.add_node("B");
        let y = net.add_node("Y");
        let d = net.add_driver("Y", false);

        assert!(matches!(
            Gate::new(GateKind::Not, vec![a, b], y, d),
            Err(SimError::Shape { gate: "NOT", got: 2, .. })
        ));
        assert!(matches!(
            Gate::new(GateKind::Xor, vec![a], y, d),
            Err(SimError::Shape { gate: "XOR", got: 1, .. })
        ));
        assert!(Gate::new(GateKind::Nand, vec![a, b], y, d).is_ok());
    }

    #[test]
    fn test_three_input_nand() {
        let mut net = Network::new();
        let inputs: Vec<_> = (0..3)
            .map(|i| {
                let node = net.add_node(format!("IN{}", i));
                let driver = net.add_driver(format!("in{}", i), true);
                net.drive(node, driver);
                node
            })
            .collect();
        let y = net.add_node("Y");
        let d = net.add_driver("Y", false);

        let gate = Gate::new(GateKind::Nand, inputs, y, d).unwrap();
        gate.evaluate(&mut net).unwrap();
        assert_eq!(net.resolve(y).unwrap(), Low);
    }
}
