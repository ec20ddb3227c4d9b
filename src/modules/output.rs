use tracing::debug;

use crate::bus::Bus;
use crate::component::Component;
use crate::error::SimError;
use crate::modules::register::ByteLatch;
use crate::modules::Backplane;
use crate::pin::{Network, NodeId};

/// Output display register: latches the bus on a rising clock while OI is
/// low. Nothing reads it back onto the bus.
#[derive(Debug, Clone)]
pub struct OutputUnit {
    name: String,
    latch: ByteLatch,
}

impl OutputUnit {
    /// `load` is active low.
    pub fn new(net: &mut Network, plane: Backplane<'_>, name: &str, load: NodeId) -> Self {
        OutputUnit {
            name: name.to_string(),
            latch: ByteLatch::new(net, plane, name, load),
        }
    }

    pub fn value(&self) -> u8 {
        self.latch.value()
    }

    pub fn value_bus(&self) -> &Bus {
        self.latch.value_bus()
    }
}

impl Component for OutputUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, net: &mut Network) -> Result<(), SimError> {
        let before = self.latch.value();
        self.latch.evaluate(net)?;

        let after = self.latch.value();
        if after != before {
            debug!(unit = %self.name, value = after, "output latched");
        }
        Ok(())
    }
}
