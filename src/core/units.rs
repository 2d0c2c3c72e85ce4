pub const WATT_HOURS_PER_KILOWATT_HOUR: u32 = 1_000;
/// Offset between the Celsius and Kelvin scales
pub const KELVIN_OFFSET: f64 = 273.15;
/// Calorific value used for heating oil, in kWh per litre
pub const KILOWATT_HOURS_PER_LITRE_OIL: f64 = 10.;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + KELVIN_OFFSET
}

pub(crate) fn watt_hours_to_kilowatt_hours(energy_wh: f64) -> f64 {
    energy_wh / WATT_HOURS_PER_KILOWATT_HOUR as f64
}

pub(crate) fn kilowatt_hours_to_watt_hours(energy_kwh: f64) -> f64 {
    energy_kwh * WATT_HOURS_PER_KILOWATT_HOUR as f64
}
