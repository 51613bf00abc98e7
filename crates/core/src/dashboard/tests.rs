use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::period::Period;

fn member(user_id: i64, name: &str, revenue: i64) -> MemberShareInput {
    MemberShareInput {
        user_id,
        user_name: name.to_string(),
        revenue,
    }
}

#[rstest]
#[case(150, 100, 50)]
#[case(50, 100, -50)]
#[case(100, 100, 0)]
#[case(500, 0, 0)]
#[case(0, 200, -100)]
// 1/8 = 12.5% rounds to even
#[case(9, 8, 12)]
// 3/8 = 37.5% rounds to even
#[case(11, 8, 38)]
fn test_difference_percentage(#[case] current: i64, #[case] previous: i64, #[case] expected: i64) {
    assert_eq!(
        DashboardService::difference_percentage(current, previous),
        expected
    );
}

#[rstest]
#[case(1, 8, 13)]
#[case(1, 3, 33)]
#[case(2, 3, 67)]
#[case(5, 0, 0)]
#[case(10, 10, 100)]
fn test_share_percentage(#[case] part: i64, #[case] total: i64, #[case] expected: i64) {
    assert_eq!(DashboardService::share_percentage(part, total), expected);
}

#[test]
fn test_comparisons() {
    assert_eq!(
        DashboardService::compare_revenue(1_200_000, 1_000_000),
        RevenueComparison {
            revenue: 1_200_000,
            difference_percentage: 20
        }
    );
    assert_eq!(
        DashboardService::compare_count(3, 7),
        CountComparison {
            transaction_count: 3,
            difference_count: -4
        }
    );
}

#[test]
fn test_history_window() {
    let now = Period::new(2022, 3).unwrap();
    assert_eq!(
        DashboardService::history_window(now, 0),
        Err(DashboardError::InvalidMonthRange)
    );
    assert_eq!(
        DashboardService::history_window(now, -2),
        Err(DashboardError::InvalidMonthRange)
    );
    assert_eq!(DashboardService::history_window(now, 1), Ok(None));
    assert_eq!(
        DashboardService::history_window(now, 6),
        Ok(Some((
            Period::new(2021, 10).unwrap(),
            Period::new(2022, 2).unwrap()
        )))
    );
}

#[test]
fn test_revenue_series_appends_current_month() {
    let history = vec![
        MonthlyRevenue {
            year: 2022,
            month: 2,
            revenue: 20,
        },
        MonthlyRevenue {
            year: 2021,
            month: 12,
            revenue: 10,
        },
    ];
    let series = DashboardService::revenue_series(history, Period::new(2022, 3).unwrap(), 5);
    let months: Vec<(i32, u32, i64)> = series.iter().map(|m| (m.year, m.month, m.revenue)).collect();
    assert_eq!(months, [(2021, 12, 10), (2022, 2, 20), (2022, 3, 5)]);
}

#[test]
fn test_member_revenue_rates() {
    let current = [
        member(1, "kim", 600),
        member(2, "lee", 300),
        member(3, "park", 100),
    ];
    let previous = [member(1, "kim", 500), member(2, "lee", 500)];

    let rates = DashboardService::member_revenue_rates(&current, &previous);
    let rows: Vec<(&str, i64, i64)> = rates
        .iter()
        .map(|r| (r.user_name.as_str(), r.percentage, r.difference_percentage))
        .collect();
    assert_eq!(rows, [("kim", 60, 10), ("lee", 30, -20), ("park", 10, 0)]);
}

#[test]
fn test_member_revenue_rates_without_previous_month() {
    let rates = DashboardService::member_revenue_rates(&[member(1, "kim", 0)], &[]);
    assert_eq!(rates[0].percentage, 0);
    assert_eq!(rates[0].difference_percentage, 0);
    assert!(DashboardService::member_revenue_rates(&[], &[]).is_empty());
}

#[test]
fn test_company_rates_sorted_by_gain() {
    let current = vec![("samsung".to_string(), 5), ("db".to_string(), 5)];
    let previous = vec![("samsung".to_string(), 9), ("db".to_string(), 1)];

    let rates = DashboardService::company_rates(&current, &previous);
    assert_eq!(rates[0].company_name, "db");
    assert_eq!(rates[0].percentage, 50);
    assert_eq!(rates[0].difference_percentage, 40);
    assert_eq!(rates[1].company_name, "samsung");
    assert_eq!(rates[1].difference_percentage, -40);
}

#[test]
fn test_member_missing_last_month_shows_no_change() {
    let current = [member(1, "kim", 500), member(2, "lee", 500)];
    let previous = [member(1, "kim", 100)];

    let rates = DashboardService::member_revenue_rates(&current, &previous);
    assert_eq!(rates[0].user_name, "kim");
    assert_eq!(rates[0].difference_percentage, -50);
    assert_eq!(rates[1].user_name, "lee");
    assert_eq!(rates[1].percentage, 50);
    assert_eq!(rates[1].difference_percentage, 0);
}

#[test]
fn test_company_missing_last_month_shows_no_change() {
    let current = vec![("a".to_string(), 3), ("b".to_string(), 1)];
    let previous = vec![("a".to_string(), 2)];

    let rates = DashboardService::company_rates(&current, &previous);
    let rows: Vec<(&str, i64, i64)> = rates
        .iter()
        .map(|r| (r.company_name.as_str(), r.percentage, r.difference_percentage))
        .collect();
    assert_eq!(rows, [("b", 25, 0), ("a", 75, -25)]);
}

proptest! {
    /// Shares of a month never exceed the whole and stay within rounding of 100.
    #[test]
    fn test_member_shares_sum_near_hundred(revenues in proptest::collection::vec(1i64..10_000_000, 1..8)) {
        let current: Vec<MemberShareInput> = revenues
            .iter()
            .enumerate()
            .map(|(i, r)| member(i64::try_from(i).unwrap(), "m", *r))
            .collect();
        let rates = DashboardService::member_revenue_rates(&current, &[]);
        let total: i64 = rates.iter().map(|r| r.percentage).sum();
        let n = i64::try_from(rates.len()).unwrap();
        prop_assert!((100 - n..=100 + n).contains(&total));
        prop_assert!(rates.windows(2).all(|w| w[0].percentage >= w[1].percentage));
    }
}
