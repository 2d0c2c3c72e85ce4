pub mod core;
pub mod engine;
pub mod errors;
pub mod input;
pub mod output;
pub mod read_weather_file;

use crate::engine::{simulate, simulate_detailed, simulate_parallel, HourlyStep, SimulationResult};
use crate::errors::{JazError, OutputError, SimulationError};
use crate::input::{ingest_for_processing, timestamp_format, Input, TemperatureSample};
use crate::output::{Output, OutputLocation};
use bitflags::bitflags;
use chrono::{Local, NaiveDateTime};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Read;
use tracing::{info, warn};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ProjectFlags: u8 {
        /// Also produce and write out the figures for every heating hour
        const DETAILED_OUTPUT = 0b1;
        /// Evaluate hours in parallel (ignored with detailed output)
        const PARALLEL = 0b10;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResults {
    pub result: SimulationResult,
    /// Empty unless detailed output was requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hourly_steps: Vec<HourlyStep>,
}

pub fn run_project(
    input: impl Read,
    output: impl Output,
    temperatures: Option<Vec<TemperatureSample>>,
    flags: &ProjectFlags,
) -> Result<RunResults, JazError> {
    let mut input_for_processing = ingest_for_processing(input)?;

    if let Some(temperatures) = temperatures {
        if input_for_processing.has_temperatures() {
            warn!("Temperatures were given both inline and from a weather file; using the weather file");
        }
        input_for_processing.set_temperatures(temperatures);
    }

    let Input {
        date_range,
        simulation,
        temperatures,
    } = input_for_processing.finalize()?;

    let temperatures = match date_range {
        Some(date_range) => {
            date_range.check()?;
            if date_range.end >= Local::now().date_naive() {
                warn!(
                    "End date {} is not in the past; historical data for it may be incomplete",
                    date_range.end
                );
            }
            temperatures
                .into_iter()
                .filter(|sample| date_range.contains(&sample.timestamp))
                .collect()
        }
        None => temperatures,
    };

    if temperatures.is_empty() {
        return Err(SimulationError::EmptySeries.into());
    }

    info!("Running calculation over {} hours", temperatures.len());

    let (result, hourly_steps) = if flags.contains(ProjectFlags::DETAILED_OUTPUT) {
        simulate_detailed(&temperatures, &simulation)?
    } else if flags.contains(ProjectFlags::PARALLEL) {
        (simulate_parallel(&temperatures, &simulation)?, vec![])
    } else {
        (simulate(&temperatures, &simulation)?, vec![])
    };

    info!(
        "{} of {} hours heated: {:.2} kWh heat, {:.2} kWh electricity, performance factor {:.2}",
        result.hours_heating,
        result.hours_total,
        result.heat_energy_kwh,
        result.electrical_energy_kwh,
        result.performance_factor
    );

    if !output.is_noop() {
        write_summary_file(&output, &result)
            .map_err(|e| JazError::ErrorInOutput(OutputError::new(e)))?;
        if flags.contains(ProjectFlags::DETAILED_OUTPUT) {
            write_hourly_file(&output, &hourly_steps)
                .map_err(|e| JazError::ErrorInOutput(OutputError::new(e)))?;
        }
    }

    Ok(RunResults {
        result,
        hourly_steps,
    })
}

const SUMMARY_COLUMNS: [(&str, &str); 11] = [
    ("Hours total", "[count]"),
    ("Hours heating", "[count]"),
    ("Heat energy", "[kWh]"),
    ("Electrical energy", "[kWh]"),
    ("Performance factor (JAZ)", "[ratio]"),
    ("Heat loss coefficient", "[W/K]"),
    ("Max heat load", "[W]"),
    ("Max heat load time", "[timestamp]"),
    ("Max electrical load", "[W]"),
    ("Max electrical load time", "[timestamp]"),
    ("Outdoor temp at max electrical load", "[deg C]"),
];

const HOURLY_COLUMNS: [(&str, &str); 7] = [
    ("Timestamp", "[timestamp]"),
    ("Outdoor temp", "[deg C]"),
    ("Heat load", "[W]"),
    ("Flow temp", "[deg C]"),
    ("Carnot COP", "[ratio]"),
    ("Real COP", "[ratio]"),
    ("Electrical power", "[W]"),
];

fn write_summary_file(output: &impl Output, result: &SimulationResult) -> anyhow::Result<()> {
    info!("writing out to {}", OutputLocation::Summary);
    let writer = output.writer_for_location(OutputLocation::Summary)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(SUMMARY_COLUMNS.iter().map(|(heading, _)| heading))?;
    writer.write_record(SUMMARY_COLUMNS.iter().map(|(_, unit)| unit))?;

    let timestamp = |time: NaiveDateTime| time.format(timestamp_format::FORMAT).to_string();
    let (max_heat, max_heat_time) = match result.max_heat_load {
        Some(peak) => (peak.power_w.to_string(), timestamp(peak.timestamp)),
        None => (String::new(), String::new()),
    };
    let (max_elec, max_elec_time, max_elec_outdoor) = match result.max_electrical_load {
        Some(peak) => (
            peak.power_w.to_string(),
            timestamp(peak.timestamp),
            peak.outdoor_temp.to_string(),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    writer.write_record([
        result.hours_total.to_string(),
        result.hours_heating.to_string(),
        result.heat_energy_kwh.to_string(),
        result.electrical_energy_kwh.to_string(),
        result.performance_factor.to_string(),
        result.heat_loss_coefficient.to_string(),
        max_heat,
        max_heat_time,
        max_elec,
        max_elec_time,
        max_elec_outdoor,
    ])?;

    writer.flush()?;

    Ok(())
}

fn write_hourly_file(output: &impl Output, hourly_steps: &[HourlyStep]) -> anyhow::Result<()> {
    info!("writing out to {}", OutputLocation::Hourly);
    let writer = output.writer_for_location(OutputLocation::Hourly)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(HOURLY_COLUMNS.iter().map(|(heading, _)| heading))?;
    writer.write_record(HOURLY_COLUMNS.iter().map(|(_, unit)| unit))?;

    for step in hourly_steps {
        writer.write_record([
            step.timestamp
                .format(timestamp_format::FORMAT)
                .to_string(),
            step.outdoor_temp.to_string(),
            step.heat_load_w.to_string(),
            step.flow_temp.to_string(),
            step.cop_carnot.to_string(),
            step.cop_real.to_string(),
            step.electrical_power_w.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
