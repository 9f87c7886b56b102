pub const DEFAULT_RATE_PER_KM: f64 = 0.28;
pub const MIN_RATE_PER_KM: f64 = 0.01;
pub const RATE_STEP: f64 = 0.01;

/// Cost of a route: `(distance_meters / 1000) * rate_per_km`. No rounding.
pub fn compute_cost(distance_meters: f64, rate_per_km: f64) -> f64 {
    (distance_meters / 1000.0) * rate_per_km
}

pub fn format_cost(cost: f64) -> String {
    format!("{:.2}€", cost)
}

pub fn format_distance_km(distance_meters: f64) -> String {
    format!("{:.1} km", distance_meters / 1000.0)
}

/// Per-kilometer rate as adjusted by the user.
///
/// Each step moves the rate by exactly [`RATE_STEP`]. The rate never drops
/// below [`MIN_RATE_PER_KM`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate(f64);

impl Default for Rate {
    fn default() -> Self {
        Self(DEFAULT_RATE_PER_KM)
    }
}

impl Rate {
    pub fn new(per_km: f64) -> Option<Self> {
        if per_km.is_finite() && per_km >= MIN_RATE_PER_KM {
            Some(Self(per_km))
        } else {
            None
        }
    }

    pub fn per_km(&self) -> f64 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 = strip_noise(self.0 + RATE_STEP);
    }

    /// Returns `false` and leaves the rate untouched when the step would go
    /// below the minimum.
    pub fn decrement(&mut self) -> bool {
        let next = strip_noise(self.0 - RATE_STEP);
        if next < MIN_RATE_PER_KM {
            return false;
        }
        self.0 = next;
        true
    }

    pub fn set(&mut self, per_km: f64) -> bool {
        match Self::new(per_km) {
            Some(rate) => {
                *self = rate;
                true
            }
            None => false,
        }
    }
}

// Drops the binary residue of adding 0.01 so repeated steps land on the
// decimal values the user sees.
fn strip_noise(value: f64) -> f64 {
    (value * 1e9).round() / 1e9
}
