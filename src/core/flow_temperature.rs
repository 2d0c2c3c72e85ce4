use crate::input::{CurvePoint, FlowCurve};

/// Outdoor temperature spans (K) below which two curve points are treated as coincident
const DEGENERATE_OUTDOOR_SPAN: f64 = 0.001;

/// Calculate the flow temperature (in Celsius) the heating curve demands at the current
/// outdoor and indoor temperatures.
///
/// The parametric curve follows flow = a * (indoor - outdoor) + b, so `b` is the flow
/// temperature when no heating is needed and `a` is the rise in flow temperature per degree
/// of indoor/outdoor difference.
pub fn flow_temp(outdoor_temp: f64, indoor_temp: f64, curve: &FlowCurve) -> f64 {
    match *curve {
        FlowCurve::Params { a, b } => a * (indoor_temp - outdoor_temp) + b,
        FlowCurve::Points { p1, p2 } => interpolate_two_points(outdoor_temp, p1, p2),
    }
}

/// Linear interpolation through two points, extrapolated without clamping outside them.
fn interpolate_two_points(outdoor_temp: f64, p1: CurvePoint, p2: CurvePoint) -> f64 {
    let outdoor_span = p2.outdoor_temp - p1.outdoor_temp;

    if outdoor_span.abs() < DEGENERATE_OUTDOOR_SPAN {
        return (p1.flow_temp + p2.flow_temp) / 2.;
    }

    p1.flow_temp + (outdoor_temp - p1.outdoor_temp) * (p2.flow_temp - p1.flow_temp) / outdoor_span
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[fixture]
    fn points_curve() -> FlowCurve {
        FlowCurve::Points {
            p1: CurvePoint::new(-10., 50.),
            p2: CurvePoint::new(15., 30.),
        }
    }

    #[rstest]
    #[case(-5., 55.)]
    #[case(20., 30.)]
    #[case(10., 40.)]
    fn should_follow_indoor_minus_outdoor_convention(#[case] outdoor: f64, #[case] expected: f64) {
        let curve = FlowCurve::Params { a: 1., b: 30. };
        assert_relative_eq!(flow_temp(outdoor, 20., &curve), expected);
    }

    #[rstest]
    fn should_use_current_indoor_temperature() {
        let curve = FlowCurve::Params { a: 0.8, b: 25. };
        assert_relative_eq!(flow_temp(0., 20., &curve), 41.);
        assert_relative_eq!(flow_temp(0., 22., &curve), 42.6);
    }

    #[rstest]
    fn should_give_outdoor_temperature_for_negative_unit_slope() {
        // a = -1, b = indoor makes the flow equal to outdoor
        let curve = FlowCurve::Params { a: -1., b: 20. };
        for outdoor in [-15., -3.5, 0., 12.] {
            assert_relative_eq!(flow_temp(outdoor, 20., &curve), outdoor);
        }
    }

    #[rstest]
    #[case(-10., 50.)]
    #[case(15., 30.)]
    #[case(2.5, 40.)]
    fn should_interpolate_between_points(
        points_curve: FlowCurve,
        #[case] outdoor: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(flow_temp(outdoor, 20., &points_curve), expected);
    }

    #[rstest]
    #[case(-20., 58.)]
    #[case(20., 26.)]
    fn should_extrapolate_beyond_points(
        points_curve: FlowCurve,
        #[case] outdoor: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(flow_temp(outdoor, 20., &points_curve), expected);
    }

    #[rstest]
    fn should_ignore_point_order() {
        let reversed = FlowCurve::Points {
            p1: CurvePoint::new(15., 30.),
            p2: CurvePoint::new(-10., 50.),
        };
        assert_relative_eq!(flow_temp(0., 20., &reversed), 42.);
    }

    #[rstest]
    #[case(-30.)]
    #[case(5.)]
    #[case(5.0005)]
    #[case(40.)]
    fn should_average_flow_for_coincident_points(#[case] outdoor: f64) {
        let curve = FlowCurve::Points {
            p1: CurvePoint::new(5., 45.),
            p2: CurvePoint::new(5.0005, 35.),
        };
        assert_eq!(flow_temp(outdoor, 20., &curve), 40.);

        let identical = FlowCurve::Points {
            p1: CurvePoint::new(5., 45.),
            p2: CurvePoint::new(5., 35.),
        };
        assert_eq!(flow_temp(outdoor, 20., &identical), 40.);
    }
}
