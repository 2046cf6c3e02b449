//! Monthly aggregation
//!
//! Decorates bills with their concrete due date and paid flag for a month,
//! and rolls the amounts up into [`MonthlyTotals`]. Sums are plain `f64`
//! additions with no rounding.

use crate::models::{Bill, BillWithStatus, MonthlySummary, MonthlyTotals};
use crate::month::{due_date_label, MonthKey};

/// Pin a bill to a concrete date within `month`
pub fn decorate(bill: Bill, month: &MonthKey, is_paid: bool) -> BillWithStatus {
    let due_date = month.due_date(bill.due_day);
    BillWithStatus {
        bill,
        is_paid,
        due_date,
        due_date_label: due_date_label(due_date),
    }
}

impl MonthlyTotals {
    /// Roll up decorated bills
    pub fn from_bills(bills: &[BillWithStatus]) -> Self {
        let total_due = sum_where(bills, |_| true);
        let recurring_due = sum_where(bills, |b| b.bill.is_recurring);

        Self {
            total_due,
            recurring_due,
            one_time_due: total_due - recurring_due,
            paid: sum_where(bills, |b| b.is_paid),
            paid_recurring: sum_where(bills, |b| b.is_paid && b.bill.is_recurring),
            remaining: sum_where(bills, |b| !b.is_paid),
            remaining_recurring: sum_where(bills, |b| !b.is_paid && b.bill.is_recurring),
        }
    }
}

fn sum_where(bills: &[BillWithStatus], pred: impl Fn(&BillWithStatus) -> bool) -> f64 {
    bills
        .iter()
        .filter(|b| pred(*b))
        .map(|b| b.bill.amount)
        .sum()
}

/// Build the summary for a month from already-decorated bills
pub fn summarize(month: MonthKey, bills: Vec<BillWithStatus>) -> MonthlySummary {
    let totals = MonthlyTotals::from_bills(&bills);
    MonthlySummary {
        month,
        bills,
        totals,
    }
}
