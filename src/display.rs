use std::io::Write;

use anyhow::Result;
use budget_summary::{Bucket, RuleTable, Summary};
use rust_decimal::Decimal;
use rusty_money::{iso::Currency, Money};
use tabwriter::TabWriter;

/// Formats an amount with exactly the currency's minor unit digits.
fn money(mut amount: Decimal, currency: &Currency) -> Money<'_, Currency> {
    amount.rescale(currency.exponent);
    Money::from_decimal(amount, currency)
}

pub fn print_summary<T: Write>(wr: T, summary: &Summary, currency: &Currency) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Bucket\tTransactions\tTotal")?;

    for (bucket, total) in summary.iter() {
        writeln!(
            tw,
            "{}\t{}\t{}",
            bucket,
            summary.count(bucket),
            money(total, currency)
        )?;
    }

    let count: usize = Bucket::ALL.into_iter().map(|b| summary.count(b)).sum();
    writeln!(
        tw,
        "total\t{}\t{}",
        count,
        money(summary.grand_total(), currency)
    )?;

    tw.flush()?;

    Ok(())
}

pub fn print_rules<T: Write>(wr: T, rules: &RuleTable) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Bucket\tCategory")?;

    for bucket in Bucket::ALL {
        for label in rules.labels(bucket) {
            writeln!(tw, "{}\t{}", bucket, label)?;
        }
    }

    tw.flush()?;

    Ok(())
}
