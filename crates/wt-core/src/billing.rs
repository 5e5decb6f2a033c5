//! Billables calculation.
//!
//! Turns an active interval and an hourly rate into elapsed seconds,
//! fractional hours and a monetary charge.
//!
//! # Rounding
//!
//! Each interval is rounded on its own (hours to 6 places, bill to 2) and
//! the rounded increments are summed onto the entry. Totals are never
//! recomputed from `total_time`, so an entry with several intervals may
//! differ in the last decimal place from one continuous interval of the
//! same length. Rounding is half-to-even.

use std::ops::AddAssign;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::entry::Entry;
use crate::types::HourlyRate;

/// Decimal places kept on `hours`.
pub const HOURS_SCALE: u32 = 6;

/// Decimal places kept on `bill`.
pub const BILL_SCALE: u32 = 2;

const SECONDS_PER_HOUR: i64 = 3600;

/// Elapsed time and charge for one interval, or a running total of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Billables {
    /// Whole elapsed seconds.
    pub total_time: i64,
    /// Elapsed hours, at [`HOURS_SCALE`].
    pub hours: Decimal,
    /// Charge, at [`BILL_SCALE`].
    pub bill: Decimal,
}

impl Billables {
    /// Computes the billables for `[start, end)` at `rate`.
    ///
    /// A negative interval contributes nothing.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>, rate: HourlyRate) -> Self {
        let elapsed = (end - start).max(TimeDelta::zero());
        let hours = round_to(exact_seconds(elapsed) / Decimal::from(SECONDS_PER_HOUR), HOURS_SCALE);
        let bill = round_to(hours * rate.value(), BILL_SCALE);
        Self {
            total_time: elapsed.num_seconds(),
            hours,
            bill,
        }
    }
}

impl AddAssign for Billables {
    fn add_assign(&mut self, rhs: Self) {
        self.total_time += rhs.total_time;
        self.hours = with_scale(self.hours + rhs.hours, HOURS_SCALE);
        self.bill = with_scale(self.bill + rhs.bill, BILL_SCALE);
    }
}

/// Adds the billables for `[start, end)` onto the entry's accumulators.
pub fn accumulate(mut entry: Entry, start: DateTime<Utc>, end: DateTime<Utc>, rate: HourlyRate) -> Entry {
    let increment = Billables::between(start, end, rate);
    let mut totals = entry.billables();
    totals += increment;
    entry.total_time = totals.total_time;
    entry.hours = totals.hours;
    entry.bill = totals.bill;
    tracing::trace!(
        entry_id = %entry.id,
        seconds = increment.total_time,
        hours = %increment.hours,
        bill = %increment.bill,
        "accumulated interval"
    );
    entry
}

/// Elapsed time in seconds, keeping microsecond precision.
fn exact_seconds(elapsed: TimeDelta) -> Decimal {
    elapsed.num_microseconds().map_or_else(
        || Decimal::from(elapsed.num_seconds()),
        |micros| Decimal::new(micros, 6),
    )
}

fn round_to(value: Decimal, scale: u32) -> Decimal {
    with_scale(
        value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven),
        scale,
    )
}

fn with_scale(mut value: Decimal, scale: u32) -> Decimal {
    value.rescale(scale);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::entry::Entry;
    use crate::types::{EntryId, TaskId};

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, min, sec).unwrap()
    }

    fn rate(value: i64) -> HourlyRate {
        HourlyRate::new(Decimal::from(value)).unwrap()
    }

    #[test]
    fn three_hours_at_ten_per_hour() {
        let billables = Billables::between(at(9, 0, 0), at(12, 0, 0), rate(10));
        assert_eq!(billables.total_time, 10_800);
        assert_eq!(billables.hours, Decimal::from(3));
        assert_eq!(billables.hours.to_string(), "3.000000");
        assert_eq!(billables.bill.to_string(), "30.00");
    }

    #[test]
    fn hours_round_to_six_places() {
        // 1 second = 0.000277777... hours
        let billables = Billables::between(at(9, 0, 0), at(9, 0, 1), rate(10));
        assert_eq!(billables.total_time, 1);
        assert_eq!(billables.hours.to_string(), "0.000278");
        assert_eq!(billables.bill.to_string(), "0.00");
    }

    #[test]
    fn bill_rounds_from_rounded_hours() {
        // 20 minutes = 0.333333 hours; 0.333333 * 45 = 14.999985
        let billables = Billables::between(at(9, 0, 0), at(9, 20, 0), rate(45));
        assert_eq!(billables.hours.to_string(), "0.333333");
        assert_eq!(billables.bill.to_string(), "15.00");
    }

    #[test]
    fn sub_second_time_counts_toward_hours_only() {
        let start = at(9, 0, 0);
        let end = start + TimeDelta::milliseconds(1_800_500);
        let billables = Billables::between(start, end, rate(10));
        assert_eq!(billables.total_time, 1800);
        assert_eq!(billables.hours.to_string(), "0.500139");
    }

    #[test]
    fn negative_interval_contributes_nothing() {
        let billables = Billables::between(at(12, 0, 0), at(9, 0, 0), rate(10));
        assert_eq!(billables, Billables::between(at(9, 0, 0), at(9, 0, 0), rate(10)));
        assert_eq!(billables.total_time, 0);
        assert!(billables.hours.is_zero());
    }

    #[test]
    fn zero_rate_bills_nothing() {
        let billables = Billables::between(at(9, 0, 0), at(17, 0, 0), HourlyRate::ZERO);
        assert_eq!(billables.hours, Decimal::from(8));
        assert!(billables.bill.is_zero());
    }

    #[test]
    fn accumulate_sums_rounded_increments() {
        let entry = Entry::active(
            EntryId::new("entry-1").unwrap(),
            TaskId::new("task-1").unwrap(),
            at(9, 0, 0),
        );
        let entry = accumulate(entry, at(9, 0, 0), at(9, 0, 1), rate(10));
        let entry = accumulate(entry, at(10, 0, 0), at(10, 0, 1), rate(10));

        assert_eq!(entry.total_time, 2);
        assert_eq!(entry.hours.to_string(), "0.000556");
        assert_eq!(entry.hours, Decimal::new(278, 6) * Decimal::from(2));
    }

    #[test]
    fn per_interval_rounding_differs_from_single_interval() {
        let one = Billables::between(at(9, 0, 0), at(9, 0, 1), rate(10));
        let mut summed = one;
        summed += one;
        summed += one;
        let once = Billables::between(at(9, 0, 0), at(9, 0, 3), rate(10));

        assert_eq!(summed.total_time, once.total_time);
        assert_eq!(summed.hours.to_string(), "0.000834");
        assert_eq!(once.hours.to_string(), "0.000833");
    }
}
