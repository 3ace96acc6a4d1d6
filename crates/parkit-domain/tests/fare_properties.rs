//! Property tests for fare calculation

use chrono::{Duration, TimeZone, Utc};
use parkit_domain::constants::default_rate_per_hour;
use parkit_domain::service::FareCalculator;
use parkit_domain::{ParkingSpot, Ticket};
use parkit_types::ParkingType;
use proptest::prelude::*;

fn closed_ticket(parking_type: ParkingType, parked_seconds: i64) -> Ticket {
    let out = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut ticket = Ticket::open(
        ParkingSpot::new(1, parking_type, false),
        "PROP-1",
        out - Duration::seconds(parked_seconds),
        false,
    );
    ticket.out_time = Some(out);
    ticket
}

fn parking_type() -> impl Strategy<Value = ParkingType> {
    prop_oneof![Just(ParkingType::Car), Just(ParkingType::Bike)]
}

proptest! {
    #[test]
    fn prop_free_window_costs_nothing(t in parking_type(), secs in 0i64..=1800, discount in any::<bool>()) {
        let calc = FareCalculator::default();
        let price = calc.calculate_fare(&closed_ticket(t, secs), discount).unwrap();
        prop_assert_eq!(price, 0.0);
    }

    #[test]
    fn prop_paid_stay_is_duration_times_rate(t in parking_type(), secs in 1801i64..(72 * 3600)) {
        let calc = FareCalculator::default();
        let price = calc.calculate_fare(&closed_ticket(t, secs), false).unwrap();
        let expected = secs as f64 / 3600.0 * default_rate_per_hour(t);
        prop_assert!((price - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_discount_is_a_fixed_multiplier(t in parking_type(), secs in 0i64..(72 * 3600)) {
        let calc = FareCalculator::default();
        let ticket = closed_ticket(t, secs);
        let full = calc.calculate_fare(&ticket, false).unwrap();
        let discounted = calc.calculate_fare(&ticket, true).unwrap();
        prop_assert!((discounted - 0.95 * full).abs() < 1e-9);
        prop_assert!(discounted >= 0.0);
    }

    #[test]
    fn prop_exit_before_entry_is_rejected(t in parking_type(), secs in 1i64..(72 * 3600), discount in any::<bool>()) {
        let calc = FareCalculator::default();
        let result = calc.calculate_fare(&closed_ticket(t, -secs), discount);
        prop_assert!(matches!(result, Err(parkit_types::Error::InvalidTimeRange(_))));
    }
}
