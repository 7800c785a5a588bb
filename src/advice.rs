//! Irrigation hints derived from a merged weather report

use crate::data::WeatherReport;

/// Schedule recommendation based on current rainfall, humidity and heat
///
/// Rainfall takes precedence over humidity, which takes precedence over heat.
pub fn irrigation_advice(report: &WeatherReport) -> &'static str {
    if report.rainfall > 5.0 {
        "Skip irrigation - sufficient natural rainfall"
    } else if report.humidity > 80.0 {
        "Reduce irrigation frequency"
    } else if report.temperature > 30.0 {
        "Increase irrigation, water early morning"
    } else {
        "Normal irrigation schedule recommended"
    }
}

/// Short description of how much rain to expect
pub fn rain_outlook(report: &WeatherReport) -> &'static str {
    let rainfall = report.rainfall;
    if rainfall > 1.0 && rainfall < 5.0 {
        "Only Slight Rain Expected"
    } else if rainfall > 5.0 && rainfall < 10.0 {
        "Moderate Rain Expected"
    } else if rainfall > 10.0 {
        "Good Rain Expected"
    } else {
        "Normal irrigation schedule recommended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(temperature: f64, humidity: f64, rainfall: f64) -> WeatherReport {
        WeatherReport {
            temperature,
            humidity,
            rainfall,
            wind_speed: 10.0,
            uv_index: 3.0,
            condition: "Clear".to_string(),
            forecast: Vec::new(),
        }
    }

    #[test]
    fn test_rainfall_wins_over_other_signals() {
        let advice = irrigation_advice(&report(35.0, 90.0, 6.0));
        assert_eq!(advice, "Skip irrigation - sufficient natural rainfall");
    }

    #[test]
    fn test_humid_and_hot_prefers_humidity() {
        assert_eq!(
            irrigation_advice(&report(35.0, 85.0, 0.0)),
            "Reduce irrigation frequency"
        );
        assert_eq!(
            irrigation_advice(&report(35.0, 50.0, 0.0)),
            "Increase irrigation, water early morning"
        );
    }

    #[test]
    fn test_mild_conditions_keep_normal_schedule() {
        assert_eq!(
            irrigation_advice(&report(24.0, 60.0, 5.0)),
            "Normal irrigation schedule recommended"
        );
    }

    #[test]
    fn test_rain_outlook_bands() {
        assert_eq!(rain_outlook(&report(25.0, 60.0, 3.0)), "Only Slight Rain Expected");
        assert_eq!(rain_outlook(&report(25.0, 60.0, 7.5)), "Moderate Rain Expected");
        assert_eq!(rain_outlook(&report(25.0, 60.0, 12.4)), "Good Rain Expected");
    }

    #[test]
    fn test_rain_outlook_band_edges_fall_through() {
        for rainfall in [0.0, 1.0, 5.0, 10.0] {
            assert_eq!(
                rain_outlook(&report(25.0, 60.0, rainfall)),
                "Normal irrigation schedule recommended",
                "rainfall {rainfall}"
            );
        }
    }
}
