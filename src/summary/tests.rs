#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Cycle, PaletteColor, SubscriptionId};

fn make_sub(id: u64, price: Decimal, cycle: Cycle, cancelled: bool) -> Subscription {
    Subscription {
        id: SubscriptionId(id),
        name: format!("sub-{id}"),
        price,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        cycle,
        color: PaletteColor::Teal,
        cancelled,
    }
}

#[test]
fn test_empty_total_is_zero() {
    assert_eq!(monthly_total(&[]), Decimal::ZERO);
}

#[test]
fn test_mixed_cycles_with_cancelled() {
    let subs = vec![
        make_sub(1, dec!(10), Cycle::Monthly, false),
        make_sub(2, dec!(120), Cycle::Yearly, false),
        make_sub(3, dec!(50), Cycle::Monthly, true),
    ];
    assert_eq!(monthly_total(&subs), dec!(20.00));
}

#[test]
fn test_total_with_repeating_yearly_shares_is_order_independent() {
    let a = make_sub(1, dec!(100), Cycle::Yearly, false);
    let b = make_sub(2, dec!(7), Cycle::Yearly, false);
    let c = make_sub(3, dec!(123456.78), Cycle::Monthly, false);
    let expected = dec!(123456.78) + dec!(107) / dec!(12);

    let orders = [
        [&a, &b, &c],
        [&a, &c, &b],
        [&b, &a, &c],
        [&b, &c, &a],
        [&c, &a, &b],
        [&c, &b, &a],
    ];
    for order in orders {
        let subs: Vec<Subscription> = order.into_iter().cloned().collect();
        assert_eq!(monthly_total(&subs), expected);
    }
}

#[test]
fn test_total_is_order_independent() {
    let mut subs = vec![
        make_sub(1, dec!(15.49), Cycle::Monthly, false),
        make_sub(2, dec!(99.99), Cycle::Yearly, false),
        make_sub(3, dec!(2.99), Cycle::Monthly, false),
        make_sub(4, dec!(36), Cycle::Yearly, false),
    ];
    let forward = monthly_total(&subs);
    subs.reverse();
    assert_eq!(monthly_total(&subs), forward);
    subs.swap(0, 2);
    assert_eq!(monthly_total(&subs), forward);
}

#[test]
fn test_cancelling_never_increases_total() {
    let subs = vec![
        make_sub(1, dec!(10), Cycle::Monthly, false),
        make_sub(2, dec!(0), Cycle::Monthly, false),
        make_sub(3, dec!(60), Cycle::Yearly, false),
    ];
    let before = monthly_total(&subs);
    for i in 0..subs.len() {
        let mut changed = subs.clone();
        changed[i].cancelled = true;
        let after = monthly_total(&changed);
        if subs[i].price.is_zero() {
            assert_eq!(after, before);
        } else {
            assert!(after < before);
        }
    }
}

#[test]
fn test_summary_counts() {
    let subs = vec![
        make_sub(1, dec!(10), Cycle::Monthly, false),
        make_sub(2, dec!(120), Cycle::Yearly, false),
        make_sub(3, dec!(50), Cycle::Monthly, true),
    ];
    let summary = Summary::of(&subs);
    assert_eq!(summary.active, 2);
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.monthly_total, dec!(20));
    assert_eq!(summary.yearly_total, dec!(240));
}
