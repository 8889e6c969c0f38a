/// Running min/max/sum/count for one station.
///
/// `Default` is the merge identity: no readings, `min = +inf`, `max = -inf`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureSummary {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl TemperatureSummary {
    pub fn of(temp: f64) -> Self {
        Self {
            min: temp,
            max: temp,
            sum: temp,
            count: 1,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[cfg_attr(feature = "profiled", inline(never))]
    #[cfg_attr(not(feature = "profiled"), inline(always))]
    pub fn add_reading(&mut self, temp: f64) {
        self.min = self.min.min(temp);
        self.max = self.max.max(temp);
        self.sum += temp;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &TemperatureSummary) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }
}

impl Default for TemperatureSummary {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }
}
