/// One accelerometer reading, reduced to the vertical axis.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample
{
    /// Vertical-axis (y) acceleration in device-relative units.
    pub value: f32,

    /// In milliseconds; monotonic capture time of the reading.
    pub timestamp_ms: u64,
}

impl SensorSample {

    #[inline]
    pub const fn new(value: f32, timestamp_ms: u64) -> Self {
        SensorSample { value, timestamp_ms }
    }

    /// Builds a sample from a full three axis reading. Only the y component is used for step
    /// detection, the other two axes are dropped here.
    ///
    #[inline]
    pub fn from_axes(_x: f32, y: f32, _z: f32, timestamp_ms: u64) -> Self {
        SensorSample::new(y, timestamp_ms)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}
