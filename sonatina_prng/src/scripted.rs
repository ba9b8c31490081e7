// Scripted random source for forcing stage decisions in tests.
//
// Replays a fixed cycle of index draws and unit draws. An index draw for
// `[low, high)` yields `low + (scripted % (high - low))`, so a scripted 0
// always selects the first table entry and a scripted 9 selects the tenth
// entry of a ten-entry table. Unit draws feed `random_bool`: a unit of 0.99
// makes every coin with `p <= 0.99` come up false.

use crate::RandomSource;

#[derive(Clone, Debug)]
pub struct ScriptedSource {
    indices: Vec<usize>,
    units: Vec<f64>,
    next_index: usize,
    next_unit: usize,
}

impl ScriptedSource {
    /// Cycle through `indices` for index draws and `units` for unit draws.
    /// Empty lists behave as `[0]` and `[0.0]`.
    pub fn new(indices: Vec<usize>, units: Vec<f64>) -> Self {
        Self {
            indices: if indices.is_empty() { vec![0] } else { indices },
            units: if units.is_empty() { vec![0.0] } else { units },
            next_index: 0,
            next_unit: 0,
        }
    }

    /// Every index draw yields `index`, every unit draw yields `unit`.
    pub fn constant(index: usize, unit: f64) -> Self {
        Self::new(vec![index], vec![unit])
    }
}

impl RandomSource for ScriptedSource {
    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        let scripted = self.indices[self.next_index % self.indices.len()];
        self.next_index += 1;
        low + scripted % (high - low)
    }

    fn next_f64(&mut self) -> f64 {
        let unit = self.units[self.next_unit % self.units.len()];
        self.next_unit += 1;
        unit.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
