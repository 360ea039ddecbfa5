/// Width-to-height ratio of the trajectory (y over x) views.
pub const DISTANCE_TO_HEIGHT_RATIO: f64 = 2.0;

const X_PADDING_RATIO: f64 = 0.06;
const Y_PADDING_RATIO: f64 = 0.10;

/// Data window `(x_span, y_span)` that contains `[0, raw_max_x] × [0, raw_max_y]`
/// plus padding, widened on one axis so that `x_span / y_span == ratio`.
/// Keeps a flat flight from looking like a steep one.
pub fn fixed_ratio_axis_window(raw_max_x: f64, raw_max_y: f64, ratio: f64) -> (f64, f64) {
    let raw_x_span = raw_max_x.max(1.0);
    let raw_y_span = raw_max_y.max(1.0);

    let mut x_span = (raw_max_x + raw_x_span * X_PADDING_RATIO).max(1.0);
    let mut y_span = (raw_max_y + raw_y_span * Y_PADDING_RATIO).max(1.0);

    if x_span / y_span < ratio {
        x_span = y_span * ratio;
    } else {
        y_span = x_span / ratio;
    }

    (x_span, y_span)
}

/// Vertical range for a time series: `[min(0, lo), hi]` with headroom.
pub fn padded_value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0f64, 1.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = (hi - lo) * Y_PADDING_RATIO;
    (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::{DISTANCE_TO_HEIGHT_RATIO, fixed_ratio_axis_window, padded_value_range};

    #[test]
    fn wide_flight_stretches_the_height_axis() {
        let (x, y) = fixed_ratio_axis_window(1000.0, 100.0, DISTANCE_TO_HEIGHT_RATIO);
        assert_eq!(x, 1060.0);
        assert_eq!(y, 530.0);
    }

    #[test]
    fn tall_flight_stretches_the_distance_axis() {
        let (x, y) = fixed_ratio_axis_window(10.0, 100.0, DISTANCE_TO_HEIGHT_RATIO);
        assert!((y - 110.0).abs() < 1e-9);
        assert!((x - 220.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_still_give_a_unit_window() {
        let (x, y) = fixed_ratio_axis_window(0.0, 0.0, 1.0);
        assert!(x >= 1.0 && y >= 1.0);
    }

    #[test]
    fn value_range_includes_zero_and_pads_the_top() {
        let (lo, hi) = padded_value_range([5.0, 20.0, 10.0]);
        assert_eq!(lo, 0.0);
        assert!((hi - 22.0).abs() < 1e-9);

        let (lo, _) = padded_value_range([-10.0, 10.0]);
        assert!(lo < -10.0);
    }
}
