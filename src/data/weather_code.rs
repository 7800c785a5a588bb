//! WMO weather code labels
//!
//! Open-Meteo reports conditions as WMO integer codes. Only a fixed set of
//! codes has a label; everything else is reported as [`UNKNOWN_CONDITION`].

/// Label returned for codes outside the known set
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Map a WMO weather code to its display label
pub fn condition_label(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Cloudy",
        45 => "Foggy",
        48 => "Rime Fog",
        51 => "Light Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        71 => "Snow",
        80 => "Showers",
        95 => "Thunderstorm",
        _ => UNKNOWN_CONDITION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_code_has_its_label() {
        let expected = [
            (0, "Clear"),
            (1, "Mainly Clear"),
            (2, "Partly Cloudy"),
            (3, "Cloudy"),
            (45, "Foggy"),
            (48, "Rime Fog"),
            (51, "Light Drizzle"),
            (61, "Light Rain"),
            (63, "Rain"),
            (65, "Heavy Rain"),
            (71, "Snow"),
            (80, "Showers"),
            (95, "Thunderstorm"),
        ];

        for (code, label) in expected {
            assert_eq!(condition_label(code), label, "code {code}");
        }
    }

    #[test]
    fn test_unknown_codes_map_to_unknown() {
        assert_eq!(condition_label(999), UNKNOWN_CONDITION);
        assert_eq!(condition_label(-1), UNKNOWN_CONDITION);
        // Neighbours of known codes are not labelled
        assert_eq!(condition_label(53), UNKNOWN_CONDITION);
        assert_eq!(condition_label(96), UNKNOWN_CONDITION);
    }
}
