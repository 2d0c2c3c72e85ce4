use crate::core::units::KILOWATT_HOURS_PER_LITRE_OIL;
use crate::errors::SimulationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt::{Display, Formatter};
use std::io::{BufReader, Read};
use thiserror::Error;

pub use crate::core::heating_period::HeatingPeriod;

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub temperatures: Vec<TemperatureSample>,
}

/// One hourly outdoor temperature reading. A missing reading is a gap in the series.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemperatureSample {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub outdoor_temp: Option<f64>,
}

impl TemperatureSample {
    pub fn new(timestamp: NaiveDateTime, outdoor_temp: Option<f64>) -> Self {
        Self {
            timestamp,
            outdoor_temp,
        }
    }
}

/// Inclusive range of calendar days the caller wants simulated.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SimulationError> {
        let range = Self { start, end };
        range.check()?;
        Ok(range)
    }

    pub fn check(&self) -> Result<(), SimulationError> {
        if self.start >= self.end {
            return Err(SimulationError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        (self.start..=self.end).contains(&timestamp.date())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fraction of the Carnot COP the heat pump achieves in practice
    #[validate(exclusive_minimum = 0.0)]
    #[validate(maximum = 1.0)]
    pub efficiency_factor: f64,
    pub indoor_temp: f64,
    pub flow_curve: FlowCurve,
    pub load_model: LoadModel,
    pub heating_period: Option<HeatingPeriod>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            efficiency_factor: 0.5,
            indoor_temp: 20.,
            flow_curve: FlowCurve::Params { a: 1., b: 22. },
            load_model: LoadModel::Physics {
                area: 100.,
                u_value: 0.5,
            },
            heating_period: None,
        }
    }
}

impl SimulationConfig {
    /// Check the constraints serde alone cannot express.
    pub fn check(&self) -> Result<(), InputValidationError> {
        self.validate()
            .map_err(|e| InputValidationError::Fields(e.to_string()))?;

        if let Some(heating_period) = &self.heating_period {
            heating_period
                .validate()
                .map_err(|e| InputValidationError::Fields(e.to_string()))?;
        }

        match self.load_model {
            LoadModel::Physics { area, u_value } => {
                non_negative("area", area)?;
                non_negative("u_value", u_value)?;
            }
            LoadModel::Consumption {
                fuel_amount,
                old_system_efficiency,
                ..
            } => {
                non_negative("fuel_amount", fuel_amount)?;
                if !(old_system_efficiency > 0. && old_system_efficiency <= 1.) {
                    return Err(InputValidationError::OldSystemEfficiency(
                        old_system_efficiency,
                    ));
                }
            }
        }

        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), InputValidationError> {
    if value.is_nan() || value < 0. {
        return Err(InputValidationError::NegativeQuantity { name, value });
    }
    Ok(())
}

/// Heating curve mapping outdoor temperature to the flow temperature the heat pump must supply.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum FlowCurve {
    /// flow = a * (indoor - outdoor) + b
    ///
    /// Some older configurations were written for flow = a * (outdoor - indoor) + b; such a
    /// curve is expressed here by negating `a`.
    Params { a: f64, b: f64 },
    /// Straight line through two (outdoor, flow) points, extrapolated beyond them.
    Points { p1: CurvePoint, p2: CurvePoint },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CurvePoint {
    pub outdoor_temp: f64,
    pub flow_temp: f64,
}

impl CurvePoint {
    pub fn new(outdoor_temp: f64, flow_temp: f64) -> Self {
        Self {
            outdoor_temp,
            flow_temp,
        }
    }
}

/// How the heat loss coefficient of the building is determined.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum LoadModel {
    /// Envelope area (m2) and average U-value (W/m2.K)
    Physics { area: f64, u_value: f64 },
    /// Calibrated against the fuel burned by the system being replaced
    Consumption {
        fuel_amount: f64,
        fuel_type: FuelType,
        old_system_efficiency: f64,
    },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    /// amount given in kWh
    Gas,
    /// amount given in litres
    Oil,
}

impl FuelType {
    pub fn energy_content_kwh(&self, fuel_amount: f64) -> f64 {
        match self {
            FuelType::Gas => fuel_amount,
            FuelType::Oil => fuel_amount * KILOWATT_HOURS_PER_LITRE_OIL,
        }
    }
}

impl Display for FuelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let json_string = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json_string.trim_matches('"'))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InputValidationError {
    #[error("Invalid simulation settings: {0}")]
    Fields(String),
    #[error("old_system_efficiency must be greater than 0 and at most 1, but was {0}")]
    OldSystemEfficiency(f64),
    #[error("{name} must not be negative, but was {value}")]
    NegativeQuantity { name: &'static str, value: f64 },
}

pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn has_temperatures(&self) -> bool {
        !self.input.temperatures.is_empty()
    }

    pub fn set_temperatures(&mut self, temperatures: Vec<TemperatureSample>) -> &Self {
        self.input.temperatures = temperatures;
        self
    }

    pub fn finalize(self) -> Result<Input, anyhow::Error> {
        self.input.simulation.check()?;

        Ok(self.input)
    }
}

/// (De)serialization of local timestamps in the form "2024-01-31T13:00".
pub(crate) mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M";
    const FORMAT_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(value, FORMAT_WITH_SECONDS))
    }

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }
}
