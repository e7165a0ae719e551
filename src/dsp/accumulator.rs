//! Running-sum integrator used inside the loop filters

/// Accumulator with no decay; the state only ever changes by addition
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    state: f64,
}

impl Accumulator {
    pub fn new(state: f64) -> Self {
        Self { state }
    }

    pub fn update(&mut self, x: f64) {
        self.state += x;
    }

    pub fn out(&self) -> f64 {
        self.state
    }
}
