use chrono::{Datelike, NaiveDate};

/// Result of prorating a monthly fee from a given start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prorated {
    /// Amount to charge in whole currency units (KRW)
    pub amount: i64,
    /// False when the full monthly fee was charged
    pub is_prorated: bool,
    /// Memo text recorded on the resulting charge
    pub label: String,
}

/// Number of days in the calendar month containing `date`.
pub fn days_in_month(date: NaiveDate) -> i64 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is always valid");
    let first_of_this = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of month is always valid");
    (first_of_next - first_of_this).num_days()
}

/// Prorates `monthly_fee` for a start on `reference_date`.
///
/// Starting on the 1st charges the full fee as-is. Any later day charges
/// the remaining-day fraction of the fee, rounded down to the nearest
/// 1,000. The two paths intentionally differ: a fee that is not itself a
/// multiple of 1,000 is charged exactly on the 1st but rounded when
/// prorated.
pub fn prorate(monthly_fee: i64, reference_date: NaiveDate) -> Prorated {
    if reference_date.day() == 1 {
        return Prorated {
            amount: monthly_fee,
            is_prorated: false,
            label: "full month".to_string(),
        };
    }

    let total_days = days_in_month(reference_date);
    let remaining_days = total_days - i64::from(reference_date.day()) + 1;
    let amount = monthly_fee * remaining_days / total_days / 1000 * 1000;

    Prorated {
        amount,
        is_prorated: true,
        label: format!("prorated {}/{} days", remaining_days, total_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_counts_handle_leap_years() {
        assert_eq!(days_in_month(d(2025, 11, 16)), 30);
        assert_eq!(days_in_month(d(2025, 12, 31)), 31);
        assert_eq!(days_in_month(d(2024, 2, 10)), 29);
        assert_eq!(days_in_month(d(2025, 2, 10)), 28);
    }

    #[test]
    fn first_of_month_charges_full_fee() {
        let p = prorate(90_000, d(2025, 11, 1));
        assert_eq!(p.amount, 90_000);
        assert!(!p.is_prorated);
    }

    #[test]
    fn mid_month_charges_remaining_fraction() {
        // Nov 16: 15 of 30 days remain
        let p = prorate(90_000, d(2025, 11, 16));
        assert_eq!(p.amount, 45_000);
        assert!(p.is_prorated);
    }

    #[test]
    fn prorated_amount_rounds_down_to_thousands() {
        // Nov 20: 11 of 30 days remain; 100000 * 11/30 = 36666.67
        let p = prorate(100_000, d(2025, 11, 20));
        assert_eq!(p.amount, 36_000);
    }

    #[test]
    fn full_fee_is_not_rounded_but_prorated_is() {
        assert_eq!(prorate(90_500, d(2025, 6, 1)).amount, 90_500);
        // Jun 2: 29 of 30 days remain; 90500 * 29/30 = 87483.33
        assert_eq!(prorate(90_500, d(2025, 6, 2)).amount, 87_000);
    }

    #[test]
    fn last_day_of_month_charges_single_day_fraction() {
        // Nov 30: 1 of 30 days remains; 90000 / 30 = 3000
        let p = prorate(90_000, d(2025, 11, 30));
        assert_eq!(p.amount, 3_000);
    }

    #[test]
    fn zero_fee_prorates_to_zero() {
        assert_eq!(prorate(0, d(2025, 11, 16)).amount, 0);
    }
}
