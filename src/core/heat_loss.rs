use crate::core::heating_period::{in_period, HeatingPeriod};
use crate::core::units::kilowatt_hours_to_watt_hours;
use crate::errors::SimulationError;
use crate::input::{LoadModel, SimulationConfig, TemperatureSample};
use tracing::debug;

/// Resolve the heat loss coefficient of the building (W/K), either directly from its envelope
/// or by calibrating against the fuel the previous heating system consumed over the series.
///
/// The returned value is fixed for the whole of a simulation run.
pub fn resolve_heat_loss_coefficient(
    samples: &[TemperatureSample],
    config: &SimulationConfig,
) -> Result<f64, SimulationError> {
    match config.load_model {
        LoadModel::Physics { area, u_value } => Ok(u_value * area),
        LoadModel::Consumption {
            fuel_amount,
            fuel_type,
            old_system_efficiency,
        } => {
            let degree_hours = sum_degree_hours(
                samples,
                config.indoor_temp,
                config.heating_period.as_ref(),
            );
            if degree_hours <= 0. {
                return Err(SimulationError::InsufficientData);
            }

            let heat_demand_kwh = fuel_type.energy_content_kwh(fuel_amount) * old_system_efficiency;
            debug!(
                "Calibrating from {fuel_amount} ({fuel_type}) over {degree_hours:.1} degree-hours: {heat_demand_kwh:.1} kWh of heat delivered"
            );

            Ok(kilowatt_hours_to_watt_hours(heat_demand_kwh) / degree_hours)
        }
    }
}

/// Sum of (indoor - outdoor) over every in-period hour colder than indoors. Gaps add nothing.
pub fn sum_degree_hours(
    samples: &[TemperatureSample],
    indoor_temp: f64,
    heating_period: Option<&HeatingPeriod>,
) -> f64 {
    samples
        .iter()
        .filter(|sample| in_period(&sample.timestamp, heating_period))
        .filter_map(|sample| sample.outdoor_temp)
        .filter(|&outdoor_temp| outdoor_temp < indoor_temp)
        .map(|outdoor_temp| indoor_temp - outdoor_temp)
        .sum()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::FuelType;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn hourly_series(
        start: NaiveDateTime,
        temperatures: &[Option<f64>],
    ) -> Vec<TemperatureSample> {
        temperatures
            .iter()
            .enumerate()
            .map(|(i, &temp)| TemperatureSample::new(start + Duration::hours(i as i64), temp))
            .collect()
    }

    pub(crate) fn jan_first(year: i32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn consumption_config(fuel_type: FuelType, fuel_amount: f64) -> SimulationConfig {
        SimulationConfig {
            indoor_temp: 20.,
            load_model: LoadModel::Consumption {
                fuel_amount,
                fuel_type,
                old_system_efficiency: 0.9,
            },
            ..Default::default()
        }
    }

    #[fixture]
    fn hundred_hours_ten_below_indoor() -> Vec<TemperatureSample> {
        hourly_series(jan_first(2024), &[Some(10.); 100])
    }

    #[rstest]
    fn should_multiply_area_and_u_value_for_physics_model() {
        let config = SimulationConfig {
            load_model: LoadModel::Physics {
                area: 250.,
                u_value: 0.4,
            },
            ..Default::default()
        };
        assert_relative_eq!(resolve_heat_loss_coefficient(&[], &config).unwrap(), 100.);
    }

    #[rstest]
    fn should_calibrate_against_gas_consumption(hundred_hours_ten_below_indoor: Vec<TemperatureSample>) {
        let config = consumption_config(FuelType::Gas, 1000.);

        assert_relative_eq!(
            sum_degree_hours(&hundred_hours_ten_below_indoor, 20., None),
            1000.
        );
        assert_relative_eq!(
            resolve_heat_loss_coefficient(&hundred_hours_ten_below_indoor, &config).unwrap(),
            900.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_convert_oil_litres_at_ten_kwh_each(hundred_hours_ten_below_indoor: Vec<TemperatureSample>) {
        let config = consumption_config(FuelType::Oil, 100.);
        assert_relative_eq!(
            resolve_heat_loss_coefficient(&hundred_hours_ten_below_indoor, &config).unwrap(),
            900.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_skip_gaps_and_warm_hours_in_degree_hours() {
        let samples = hourly_series(
            jan_first(2024),
            &[Some(15.), None, Some(25.), Some(20.), Some(-5.)],
        );
        assert_relative_eq!(sum_degree_hours(&samples, 20., None), 30.);
    }

    #[rstest]
    fn should_only_count_degree_hours_within_heating_period() {
        let mut samples = hourly_series(jan_first(2024), &[Some(0.); 24]);
        samples.extend(hourly_series(
            NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            &[Some(0.); 24],
        ));
        let october_to_april = HeatingPeriod::new(1, 10, 30, 4);

        assert_relative_eq!(sum_degree_hours(&samples, 20., None), 960.);
        assert_relative_eq!(
            sum_degree_hours(&samples, 20., Some(&october_to_april)),
            480.
        );
    }

    #[rstest]
    fn should_fail_calibration_without_heating_demand() {
        let warm = hourly_series(jan_first(2024), &[Some(22.), None, Some(20.)]);
        let config = consumption_config(FuelType::Gas, 1000.);

        assert_eq!(
            resolve_heat_loss_coefficient(&warm, &config),
            Err(SimulationError::InsufficientData)
        );
        assert_eq!(
            resolve_heat_loss_coefficient(&[], &config),
            Err(SimulationError::InsufficientData)
        );
    }

    #[rstest]
    fn should_fail_calibration_when_all_cold_hours_are_out_of_period() {
        let samples = hourly_series(jan_first(2024), &[Some(0.); 10]);
        let config = SimulationConfig {
            heating_period: Some(HeatingPeriod::new(1, 10, 31, 12)),
            ..consumption_config(FuelType::Gas, 1000.)
        };

        assert_eq!(
            resolve_heat_loss_coefficient(&samples, &config),
            Err(SimulationError::InsufficientData)
        );
    }
}
