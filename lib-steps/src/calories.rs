use core::fmt;

/// Estimated energy cost of a single step, in kcal.
///
pub const CALORIES_PER_STEP: f32 = 0.05;

/// Calorie estimate derived from a step count. It is recomputed from the count every time and
/// never stored on its own.
///
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Calories(pub f32);

impl Calories {

    #[inline]
    pub fn from_steps(steps: u32) -> Self {
        Calories(estimated_calories(steps))
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.0
    }
}

/// Always printed with two decimals, e.g. `1.00`.
///
impl fmt::Display for Calories {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

pub fn estimated_calories(steps: u32) -> f32 {
    steps as f32 * CALORIES_PER_STEP
}
