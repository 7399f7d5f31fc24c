//! Temperature-Humidity Index
//!
//! Single closed-form expression used everywhere a THI is produced or
//! checked. Computed once per fresh observation and stored alongside it;
//! cached reads return the stored value unchanged.

/// THI from temperature (°C) and relative humidity (%), rounded to two
/// decimals:
///
/// `THI = 0.8·T + (RH/100)·(T − 14.4) + 46.4`
#[must_use]
pub fn thi(temperature_c: f64, humidity_pct: f64) -> f64 {
    let raw = 0.8 * temperature_c + (humidity_pct / 100.0) * (temperature_c - 14.4) + 46.4;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(42.0, 24.42, 86.74)]
    #[case(0.0, 0.0, 46.4)]
    #[case(14.4, 100.0, 57.92)]
    #[case(25.0, 60.0, 72.76)]
    #[case(35.0, 80.0, 90.88)]
    fn test_thi_values(#[case] temperature: f64, #[case] humidity: f64, #[case] expected: f64) {
        assert_eq!(thi(temperature, humidity), expected);
    }

    #[test]
    fn test_thi_is_pure() {
        let first = thi(29.3, 71.2);
        let second = thi(29.3, 71.2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_thi_rounds_to_two_decimals() {
        let value = thi(21.7, 43.9);
        assert_eq!(value, (value * 100.0).round() / 100.0);
    }
}
