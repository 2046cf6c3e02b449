//! Bill command implementations

use anyhow::{bail, Context, Result};
use billbook_core::{BillInput, BillStore, BillWithStatus, MonthlyTotals};

use super::{parse_month_arg, truncate};

/// Fields for `billbook add`
pub struct NewBillArgs {
    pub id: Option<String>,
    pub name: String,
    pub due_day: u32,
    pub amount: f64,
    pub notes: Option<String>,
    pub one_time: bool,
}

pub fn cmd_list(store: &BillStore, month: Option<&str>) -> Result<()> {
    let Some(month) = month else {
        let bills = store.list_bills().context("Failed to read bills")?;
        if bills.is_empty() {
            println!("No bills yet. Add one with: billbook add --name <NAME> --due-day <DAY> --amount <AMOUNT>");
            return Ok(());
        }

        println!("📋 Bills ({}):", bills.len());
        println!();
        println!(
            "   {:<10} {:<28} {:>4} {:>10}  {}",
            "ID", "Name", "Day", "Amount", "Type"
        );
        println!("   {}", "─".repeat(64));
        for bill in &bills {
            println!(
                "   {:<10} {:<28} {:>4} {:>10.2}  {}",
                truncate(&bill.id, 10),
                truncate(&bill.name, 28),
                bill.due_day,
                bill.amount,
                if bill.is_recurring { "recurring" } else { "one-time" }
            );
        }
        return Ok(());
    };

    let month = parse_month_arg(Some(month))?;
    let bills = store
        .list_bills_with_status(&month)
        .context("Failed to read bills")?;

    println!("📋 Bills for {} ({}):", month, bills.len());
    println!();
    for entry in &bills {
        print_bill_line(entry);
    }
    Ok(())
}

pub fn cmd_add(store: &BillStore, args: NewBillArgs) -> Result<()> {
    let input = BillInput {
        id: args.id,
        name: Some(args.name),
        due_day: Some(f64::from(args.due_day)),
        amount: Some(args.amount),
        notes: args.notes,
        is_recurring: Some(!args.one_time),
        ..Default::default()
    };

    let bill = input.into_new_bill().context("Invalid bill")?;
    let bill = store.upsert_bill(bill).context("Failed to save bill")?;

    println!(
        "✅ Saved bill '{}' (id: {}) due day {} for ${:.2}",
        bill.name, bill.id, bill.due_day, bill.amount
    );
    Ok(())
}

pub fn cmd_remove(store: &BillStore, id: &str) -> Result<()> {
    if !store.delete_bill(id).context("Failed to delete bill")? {
        bail!("Bill not found: {}", id);
    }
    println!("🗑️  Removed bill {}", id);
    Ok(())
}

pub fn cmd_set_paid(store: &BillStore, id: &str, month: Option<&str>, is_paid: bool) -> Result<()> {
    let month = parse_month_arg(month)?;

    let bill = store.require_bill(id)?;

    store
        .set_paid_status(&month, id, is_paid)
        .context("Failed to update paid status")?;

    if is_paid {
        println!("✅ Marked '{}' paid for {}", bill.name, month);
    } else {
        println!("⬜ Marked '{}' unpaid for {}", bill.name, month);
    }
    Ok(())
}

pub fn cmd_summary(store: &BillStore, month: Option<&str>) -> Result<()> {
    let month = parse_month_arg(month)?;
    let summary = store
        .get_monthly_summary(&month)
        .context("Failed to build summary")?;

    println!("📊 Summary for {}", summary.month);
    println!("   ─────────────────────────────────────────────────────────────");
    print_totals(&summary.totals);

    if !summary.bills.is_empty() {
        println!();
        for entry in &summary.bills {
            print_bill_line(entry);
        }
    }
    Ok(())
}

fn print_totals(totals: &MonthlyTotals) {
    println!("   Total due:            ${:>10.2}", totals.total_due);
    println!("     Recurring:          ${:>10.2}", totals.recurring_due);
    println!("     One-time:           ${:>10.2}", totals.one_time_due);
    println!("   Paid:                 ${:>10.2}", totals.paid);
    println!("     Recurring paid:     ${:>10.2}", totals.paid_recurring);
    println!("   Remaining:            ${:>10.2}", totals.remaining);
    println!("     Recurring left:     ${:>10.2}", totals.remaining_recurring);
}

fn print_bill_line(entry: &BillWithStatus) {
    println!(
        "   {} {:<10} {:<28} due {}  ${:>9.2}{}",
        if entry.is_paid { "✅" } else { "⬜" },
        truncate(&entry.bill.id, 10),
        truncate(&entry.bill.name, 28),
        entry.due_date_label,
        entry.bill.amount,
        if entry.bill.is_recurring { "" } else { "  (one-time)" }
    );
}
