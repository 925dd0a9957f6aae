//! Host statistics read through `sysinfo`.

use sysinfo::{Components, System};

use crate::codec::{StatsSample, round_half_away_from_zero_1dp};
use crate::core::TelemetrySource;

/// Samples memory, per-core CPU usage and temperature sensors.
pub struct SystemTelemetry {
    system: System,
    components: Components,
}

impl SystemTelemetry {
    /// Create a sampler and prime CPU usage so the first sample is meaningful.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
        }
    }

    fn memory_percent(&self) -> f64 {
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64 * 100.0
    }

    fn temperatures(&mut self) -> (f64, f64) {
        self.components.refresh(false);
        let readings: Vec<f32> = self
            .components
            .list()
            .iter()
            .filter_map(|component| component.temperature())
            .collect();
        summarize_temperatures(&readings)
    }
}

impl Default for SystemTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SystemTelemetry {
    fn sample(&mut self) -> StatsSample {
        self.system.refresh_memory();
        self.system.refresh_cpu_usage();

        let core_percents = self
            .system
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .collect();
        let (average_temperature, max_temperature) = self.temperatures();

        StatsSample {
            memory_percent: self.memory_percent(),
            core_percents,
            average_temperature,
            max_temperature,
        }
    }
}

/// Average and maximum of the finite readings, each rounded to one decimal.
///
/// `(0.0, 0.0)` when there are no usable readings.
pub fn summarize_temperatures(readings: &[f32]) -> (f64, f64) {
    let finite: Vec<f64> = readings
        .iter()
        .map(|&r| f64::from(r))
        .filter(|r| r.is_finite())
        .collect();
    if finite.is_empty() {
        return (0.0, 0.0);
    }

    let average = finite.iter().sum::<f64>() / finite.len() as f64;
    let max = finite.iter().copied().fold(f64::MIN, f64::max);
    (
        round_half_away_from_zero_1dp(average),
        round_half_away_from_zero_1dp(max),
    )
}
