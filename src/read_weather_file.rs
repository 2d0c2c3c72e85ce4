use crate::input::{timestamp_format, TemperatureSample};
use csv::ReaderBuilder as CsvReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

const COLUMN_TIMESTAMP: usize = 0;
const COLUMN_AIR_TEMP: usize = 1; // air temperature 2m above ground in degrees

#[derive(Debug, Error)]
pub enum WeatherFileError {
    #[error("Could not parse weather archive JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not read weather CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: could not parse timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("Row {row}: could not parse temperature '{value}'")]
    Temperature { row: usize, value: String },
    #[error("Row {row}: expected a timestamp and a temperature column")]
    MissingColumn { row: usize },
    #[error("Weather archive has {times} timestamps but {temperatures} temperatures")]
    MismatchedLengths { times: usize, temperatures: usize },
    #[error("Row {row}: timestamp is earlier than the one before it")]
    NotChronological { row: usize },
}

/// Shape of a saved response from the Open-Meteo historical weather archive, requested with
/// `hourly=temperature_2m`. Only the fields used here are declared.
#[derive(Debug, Deserialize)]
struct OpenMeteoArchive {
    hourly: OpenMeteoHourly,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
}

pub fn open_meteo_archive_to_samples(
    json: impl Read,
) -> Result<Vec<TemperatureSample>, WeatherFileError> {
    let archive: OpenMeteoArchive = serde_json::from_reader(json)?;
    let OpenMeteoHourly {
        time,
        temperature_2m,
    } = archive.hourly;

    if time.len() != temperature_2m.len() {
        return Err(WeatherFileError::MismatchedLengths {
            times: time.len(),
            temperatures: temperature_2m.len(),
        });
    }

    let samples = time
        .iter()
        .zip(temperature_2m)
        .enumerate()
        .map(|(row, (timestamp, outdoor_temp))| {
            Ok(TemperatureSample::new(
                parse_timestamp(row, timestamp)?,
                outdoor_temp,
            ))
        })
        .collect::<Result<Vec<_>, WeatherFileError>>()?;

    check_chronological(&samples)?;
    Ok(samples)
}

/// Read a CSV with a header row, a timestamp column and a temperature column. An empty
/// temperature cell is a gap in the series.
pub fn csv_to_samples(file: impl Read) -> Result<Vec<TemperatureSample>, WeatherFileError> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut samples = vec![];

    for (row, result) in reader.records().enumerate() {
        let record: csv::StringRecord = result?;
        let timestamp = record
            .get(COLUMN_TIMESTAMP)
            .ok_or(WeatherFileError::MissingColumn { row })?;
        let air_temp = record
            .get(COLUMN_AIR_TEMP)
            .ok_or(WeatherFileError::MissingColumn { row })?;

        let outdoor_temp = match air_temp {
            "" => None,
            value => Some(
                value
                    .parse::<f64>()
                    .map_err(|_| WeatherFileError::Temperature {
                        row,
                        value: value.to_string(),
                    })?,
            ),
        };

        samples.push(TemperatureSample::new(
            parse_timestamp(row, timestamp)?,
            outdoor_temp,
        ));
    }

    check_chronological(&samples)?;
    Ok(samples)
}

fn parse_timestamp(
    row: usize,
    value: &str,
) -> Result<chrono::NaiveDateTime, WeatherFileError> {
    timestamp_format::parse(value).map_err(|_| WeatherFileError::Timestamp {
        row,
        value: value.to_string(),
    })
}

/// A repeated timestamp is accepted: archives saved in a local timezone repeat an hour when
/// daylight saving time ends, and each repeat is a real hour of heating.
fn check_chronological(samples: &[TemperatureSample]) -> Result<(), WeatherFileError> {
    match samples
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        Some(index) => Err(WeatherFileError::NotChronological { row: index + 1 }),
        None => Ok(()),
    }
}
