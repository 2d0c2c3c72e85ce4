use crate::core::flow_temperature::flow_temp;
use crate::core::heat_loss::resolve_heat_loss_coefficient;
use crate::core::heat_pump::{carnot_cop, electrical_power, real_cop, CARNOT_COP_SENTINEL};
use crate::core::heating_period::in_period;
use crate::core::units::{celsius_to_kelvin, watt_hours_to_kilowatt_hours};
use crate::errors::SimulationError;
use crate::input::{timestamp_format, SimulationConfig, TemperatureSample};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Aggregate outcome of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Every sample in the series, gaps and out-of-period hours included
    pub hours_total: usize,
    pub hours_heating: usize,
    pub heat_energy_kwh: f64,
    pub electrical_energy_kwh: f64,
    /// Seasonal performance factor (JAZ); zero when no electricity was used
    pub performance_factor: f64,
    pub heat_loss_coefficient: f64,
    pub max_heat_load: Option<PeakLoad>,
    pub max_electrical_load: Option<PeakLoad>,
}

/// The hour at which a load first reached its maximum over the run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PeakLoad {
    pub power_w: f64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub outdoor_temp: f64,
}

/// Figures for a single hour in which the heat pump ran.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HourlyStep {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub outdoor_temp: f64,
    pub heat_load_w: f64,
    pub flow_temp: f64,
    pub cop_carnot: f64,
    pub cop_real: f64,
    pub electrical_power_w: f64,
}

impl HourlyStep {
    fn hit_carnot_sentinel(&self) -> bool {
        self.cop_carnot >= CARNOT_COP_SENTINEL
    }
}

/// Run the hour-by-hour simulation over a chronologically ordered series.
///
/// An empty series is not an error here: it yields zero hours, zero energy and no peaks.
pub fn simulate(
    samples: &[TemperatureSample],
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    let heat_loss_coefficient = resolve_heat_loss_coefficient(samples, config)?;

    let totals = samples
        .iter()
        .filter_map(|sample| heating_hour(sample, config, heat_loss_coefficient))
        .fold(RunningTotals::default(), RunningTotals::absorb);

    Ok(totals.finish(samples.len(), heat_loss_coefficient))
}

/// As [`simulate`], additionally returning the figures for each heating hour.
pub fn simulate_detailed(
    samples: &[TemperatureSample],
    config: &SimulationConfig,
) -> Result<(SimulationResult, Vec<HourlyStep>), SimulationError> {
    let heat_loss_coefficient = resolve_heat_loss_coefficient(samples, config)?;

    let steps: Vec<HourlyStep> = samples
        .iter()
        .filter_map(|sample| heating_hour(sample, config, heat_loss_coefficient))
        .collect();

    let totals = steps
        .iter()
        .copied()
        .fold(RunningTotals::default(), RunningTotals::absorb);

    Ok((
        totals.finish(samples.len(), heat_loss_coefficient),
        steps,
    ))
}

/// As [`simulate`], with the hourly steps evaluated in parallel.
///
/// Partial totals are merged in series order, so peaks resolve to the same (earliest) hour as
/// the sequential run. Energy sums may differ from it in the last bits of precision.
pub fn simulate_parallel(
    samples: &[TemperatureSample],
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    let heat_loss_coefficient = resolve_heat_loss_coefficient(samples, config)?;

    let totals = samples
        .par_iter()
        .filter_map(|sample| heating_hour(sample, config, heat_loss_coefficient))
        .fold(RunningTotals::default, RunningTotals::absorb)
        .reduce(RunningTotals::default, RunningTotals::merge);

    Ok(totals.finish(samples.len(), heat_loss_coefficient))
}

/// Evaluate one sample, or `None` when the heat pump does not run in that hour: a gap in the
/// series, an hour at or above the indoor temperature, or an hour outside the heating period.
pub(crate) fn heating_hour(
    sample: &TemperatureSample,
    config: &SimulationConfig,
    heat_loss_coefficient: f64,
) -> Option<HourlyStep> {
    let outdoor_temp = sample.outdoor_temp?;
    let indoor_temp = config.indoor_temp;

    if outdoor_temp >= indoor_temp
        || !in_period(&sample.timestamp, config.heating_period.as_ref())
    {
        return None;
    }

    // load is constant over the hour, so W and Wh are interchangeable
    let heat_load = heat_loss_coefficient * (indoor_temp - outdoor_temp);
    let flow_temp = flow_temp(outdoor_temp, indoor_temp, &config.flow_curve);
    let cop_carnot = carnot_cop(celsius_to_kelvin(outdoor_temp), celsius_to_kelvin(flow_temp));
    let cop_real = real_cop(config.efficiency_factor, cop_carnot);

    Some(HourlyStep {
        timestamp: sample.timestamp,
        outdoor_temp,
        heat_load_w: heat_load,
        flow_temp,
        cop_carnot,
        cop_real,
        electrical_power_w: electrical_power(heat_load, cop_real),
    })
}

#[derive(Clone, Debug, Default)]
struct RunningTotals {
    heat_wh: f64,
    electrical_wh: f64,
    hours_heating: usize,
    hours_carnot_sentinel: usize,
    max_heat_load: Option<PeakLoad>,
    max_electrical_load: Option<PeakLoad>,
}

impl RunningTotals {
    fn absorb(mut self, step: HourlyStep) -> Self {
        self.heat_wh += step.heat_load_w;
        self.electrical_wh += step.electrical_power_w;
        self.hours_heating += 1;
        if step.hit_carnot_sentinel() {
            self.hours_carnot_sentinel += 1;
        }

        self.max_heat_load = later_peak_if_greater(
            self.max_heat_load,
            Some(PeakLoad {
                power_w: step.heat_load_w,
                timestamp: step.timestamp,
                outdoor_temp: step.outdoor_temp,
            }),
        );
        self.max_electrical_load = later_peak_if_greater(
            self.max_electrical_load,
            Some(PeakLoad {
                power_w: step.electrical_power_w,
                timestamp: step.timestamp,
                outdoor_temp: step.outdoor_temp,
            }),
        );

        self
    }

    /// Combine with the totals of the hours that follow these ones.
    fn merge(self, later: Self) -> Self {
        Self {
            heat_wh: self.heat_wh + later.heat_wh,
            electrical_wh: self.electrical_wh + later.electrical_wh,
            hours_heating: self.hours_heating + later.hours_heating,
            hours_carnot_sentinel: self.hours_carnot_sentinel + later.hours_carnot_sentinel,
            max_heat_load: later_peak_if_greater(self.max_heat_load, later.max_heat_load),
            max_electrical_load: later_peak_if_greater(
                self.max_electrical_load,
                later.max_electrical_load,
            ),
        }
    }

    fn finish(self, hours_total: usize, heat_loss_coefficient: f64) -> SimulationResult {
        let heat_energy_kwh = watt_hours_to_kilowatt_hours(self.heat_wh);
        let electrical_energy_kwh = watt_hours_to_kilowatt_hours(self.electrical_wh);
        let performance_factor = if electrical_energy_kwh > 0. {
            heat_energy_kwh / electrical_energy_kwh
        } else {
            0.
        };

        debug!(
            "Simulated {hours_total} hours with heat loss coefficient {heat_loss_coefficient:.2} W/K"
        );
        if self.hours_heating == 0 {
            info!("No heating hours in the period: outdoor temperatures never fell below the indoor temperature within the heating period");
        }
        if self.hours_carnot_sentinel > 0 {
            warn!(
                "Flow temperature was at or below the outdoor temperature in {} of {} heating hours; the Carnot COP is unbounded there and the performance factor will be inflated. Check the heating curve parameters.",
                self.hours_carnot_sentinel, self.hours_heating
            );
        }

        SimulationResult {
            hours_total,
            hours_heating: self.hours_heating,
            heat_energy_kwh,
            electrical_energy_kwh,
            performance_factor,
            heat_loss_coefficient,
            max_heat_load: self.max_heat_load,
            max_electrical_load: self.max_electrical_load,
        }
    }
}

/// Keep the earlier peak unless the later one is strictly greater. A peak only registers once
/// its power exceeds zero.
fn later_peak_if_greater(earlier: Option<PeakLoad>, later: Option<PeakLoad>) -> Option<PeakLoad> {
    let threshold = earlier.map_or(0., |peak| peak.power_w);
    match later {
        Some(peak) if peak.power_w > threshold => Some(peak),
        _ => earlier,
    }
}
