/// Carnot COP used when the flow temperature does not lie above the source temperature
pub const CARNOT_COP_SENTINEL: f64 = 99_999.;
/// A heat pump is never modelled as worse than direct electric heating
pub const COP_FLOOR: f64 = 1.;
/// Above this COP the electrical draw is taken to be nil
pub const COP_NEGLIGIBLE_DRAW: f64 = 20_000.;

/// Calculate Carnot CoP based on source and outlet temperatures (in Kelvin)
///
/// When the outlet is not hotter than the source, the sentinel is returned in place of an
/// infinite or negative value.
pub fn carnot_cop(temp_source: f64, temp_outlet: f64) -> f64 {
    if temp_outlet <= temp_source {
        return CARNOT_COP_SENTINEL;
    }
    temp_outlet / (temp_outlet - temp_source)
}

/// Real CoP from the Carnot CoP, derated by the empirical efficiency factor.
pub fn real_cop(efficiency_factor: f64, carnot_cop: f64) -> f64 {
    (efficiency_factor * carnot_cop).max(COP_FLOOR)
}

/// Electrical power (W) drawn to deliver `heat_load` (W) at the given real CoP.
pub fn electrical_power(heat_load: f64, real_cop: f64) -> f64 {
    if real_cop > COP_NEGLIGIBLE_DRAW {
        0.
    } else {
        heat_load / real_cop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_calc_carnot_cop() {
        assert_relative_eq!(carnot_cop(268.15, 328.15), 328.15 / 60., max_relative = 1e-12);
        assert_relative_eq!(carnot_cop(273.15, 308.15), 8.804285714, max_relative = 1e-9);
    }

    #[rstest]
    #[case(300., 300.)]
    #[case(300., 299.9)]
    #[case(280., 250.)]
    fn should_return_sentinel_when_outlet_not_above_source(
        #[case] temp_source: f64,
        #[case] temp_outlet: f64,
    ) {
        assert_eq!(carnot_cop(temp_source, temp_outlet), CARNOT_COP_SENTINEL);
    }

    #[rstest]
    fn should_derate_carnot_cop() {
        assert_relative_eq!(real_cop(0.5, 5.469166667), 2.734583333, max_relative = 1e-9);
    }

    #[rstest]
    #[case(0.5, 1.5)]
    #[case(0.1, 9.)]
    #[case(0.3, 0.2)]
    fn should_floor_real_cop_at_one(#[case] efficiency_factor: f64, #[case] carnot: f64) {
        assert_eq!(real_cop(efficiency_factor, carnot), COP_FLOOR);
    }

    #[rstest]
    fn should_draw_nothing_when_cop_is_effectively_infinite() {
        let cop = real_cop(0.5, CARNOT_COP_SENTINEL);
        assert_eq!(electrical_power(5000., cop), 0.);
    }

    #[rstest]
    fn should_still_draw_power_for_low_efficiency_at_sentinel() {
        // 0.1 * 99999 stays below the negligible draw threshold
        let cop = real_cop(0.1, CARNOT_COP_SENTINEL);
        assert_relative_eq!(electrical_power(9999.9, cop), 1., max_relative = 1e-12);
    }

    #[rstest]
    fn should_divide_heat_load_by_cop() {
        assert_relative_eq!(electrical_power(5000., 2.5), 2000.);
        assert_eq!(electrical_power(0., 3.), 0.);
    }
}
