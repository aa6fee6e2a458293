// ── Signal strength mapping ─────────────────────────────────────────
//
// dBm and percent are related linearly: -100 dBm or weaker is 0 %,
// -40 dBm or stronger is 100 %. Both directions round to the nearest
// integer, so a percent -> dBm -> percent round trip is exact to within 1.

/// Weakest RSSI that still maps above 0 %.
pub const RSSI_FLOOR: i32 = -100;
/// Strongest RSSI that maps below 100 %.
pub const RSSI_CEILING: i32 = -40;

const SPAN: i32 = RSSI_CEILING - RSSI_FLOOR;

/// Convert an RSSI in dBm to a signal-strength percentage (0-100).
pub fn rssi_to_percentage(rssi: i32) -> u8 {
    let offset = rssi.clamp(RSSI_FLOOR, RSSI_CEILING) - RSSI_FLOOR;
    let pct = (offset * 100 + SPAN / 2) / SPAN;
    u8::try_from(pct).unwrap_or(100)
}

/// Convert a signal-strength percentage to an RSSI in dBm.
pub fn percentage_to_rssi(percent: u8) -> i32 {
    let pct = i32::from(percent.min(100));
    RSSI_FLOOR + (pct * SPAN + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rssi_maps_to_expected_percentages() {
        assert_eq!(rssi_to_percentage(-51), 82);
        assert_eq!(rssi_to_percentage(-67), 55);
        assert_eq!(rssi_to_percentage(-39), 100);
        assert_eq!(rssi_to_percentage(-40), 100);
        assert_eq!(rssi_to_percentage(-100), 0);
        assert_eq!(rssi_to_percentage(-120), 0);
        assert_eq!(rssi_to_percentage(0), 100);
    }

    #[test]
    fn percentages_map_to_expected_rssi() {
        assert_eq!(percentage_to_rssi(31), -81);
        assert_eq!(percentage_to_rssi(42), -75);
        assert_eq!(percentage_to_rssi(85), -49);
        assert_eq!(percentage_to_rssi(43), -74);
        assert_eq!(percentage_to_rssi(65), -61);
        assert_eq!(percentage_to_rssi(0), -100);
        assert_eq!(percentage_to_rssi(100), -40);
        assert_eq!(percentage_to_rssi(255), -40);
    }

    #[test]
    fn round_trip_is_within_one_percent() {
        for pct in 0..=100u8 {
            let back = rssi_to_percentage(percentage_to_rssi(pct));
            assert!(back.abs_diff(pct) <= 1, "{pct} -> {back}");
        }
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut last = 0;
        for rssi in -110..=-30 {
            let pct = rssi_to_percentage(rssi);
            assert!(pct >= last);
            last = pct;
        }
    }
}
