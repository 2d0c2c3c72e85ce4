use crate::read_weather_file::WeatherFileError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JazError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during JAZ calculation: {0}")]
    FailureInCalculation(#[from] SimulationError),
    #[error("Weather data could not be used: {0}")]
    WeatherSource(#[from] WeatherFileError),
    #[error("Error while writing outputs: {0}")]
    ErrorInOutput(OutputError),
}

/// Failures of the simulation itself, or of the checks a caller makes before running it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("No temperature samples are available for the requested period")]
    EmptySeries,
    #[error("No heating demand was found in the temperature series (zero degree-hours), so the heat loss coefficient cannot be calibrated from fuel consumption")]
    InsufficientData,
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
