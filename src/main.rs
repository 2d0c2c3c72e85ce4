extern crate jaz;

use clap::{Args, Parser};
use jaz::input::TemperatureSample;
use jaz::output::FileOutput;
use jaz::read_weather_file::{csv_to_samples, open_meteo_archive_to_samples};
use jaz::{run_project, ProjectFlags};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct JazArgs {
    input_file: String,
    #[command(flatten)]
    weather_file: WeatherFileType,
    /// Write the figures for every heating hour alongside the summary
    #[arg(long, short, default_value_t = false)]
    detailed: bool,
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

#[derive(Args, Clone, Default, Debug)]
#[group(required = false, multiple = false)]
struct WeatherFileType {
    /// Saved response of the Open-Meteo historical archive (hourly temperature_2m)
    #[arg(long, short)]
    open_meteo_file: Option<String>,
    /// CSV with a header row and timestamp,temperature columns
    #[arg(long, short)]
    csv_weather_file: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = JazArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input_file = Path::new(args.input_file.as_str());

    let temperatures: Option<Vec<TemperatureSample>> = match args.weather_file {
        WeatherFileType {
            open_meteo_file: Some(file),
            csv_weather_file: None,
        } => {
            info!("Reading weather archive {file}");
            Some(open_meteo_archive_to_samples(BufReader::new(File::open(
                file,
            )?))?)
        }
        WeatherFileType {
            open_meteo_file: None,
            csv_weather_file: Some(file),
        } => {
            info!("Reading weather CSV {file}");
            Some(csv_to_samples(BufReader::new(File::open(file)?))?)
        }
        _ => None,
    };

    let mut flags = ProjectFlags::empty();
    flags.set(ProjectFlags::DETAILED_OUTPUT, args.detailed);
    flags.set(ProjectFlags::PARALLEL, args.parallel);

    let results = run_project(
        BufReader::new(File::open(input_file)?),
        FileOutput::beside_input_file(input_file),
        temperatures,
        &flags,
    )?;

    println!("{}", serde_json::to_string_pretty(&results.result)?);

    Ok(())
}
