pub mod flow_temperature;
pub mod heat_loss;
pub mod heat_pump;
pub mod heating_period;
pub mod units;
