use std::io::Write;

use anyhow::Result;
use monarch::model::{Tag, Transaction};
use tabwriter::TabWriter;

pub fn transaction_url(app_url: &str, id: &str) -> String {
    format!("{}/transactions/{}", app_url.trim_end_matches('/'), id)
}

pub fn print_transactions<T: Write>(wr: T, txns: &[Transaction]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Date\tStatus\tAmount\tMerchant\tDescription\tCategory\tTags\tID")?;

    for txn in txns {
        let status = match (txn.pending, txn.hide_from_reports) {
            (_, true) => "hidden",
            (true, false) => "pending",
            (false, false) => "posted",
        };
        let tags = txn
            .tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        writeln!(
            tw,
            "{}\t{}\t{:.2}\t{}\t{}\t{}\t{}\t{}",
            txn.date,
            status,
            txn.amount,
            txn.merchant_name().unwrap_or("-"),
            txn.plaid_name.as_deref().unwrap_or("-"),
            txn.category.as_ref().map_or("-", |c| c.name.as_str()),
            tags,
            txn.id,
        )?;
    }

    tw.flush()?;

    Ok(())
}

pub fn print_tags<T: Write>(wr: T, tags: &[Tag]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tName\tColor\tOrder\tTransactions")?;

    for tag in tags {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}",
            tag.id,
            tag.name,
            tag.color,
            tag.order,
            tag.transaction_count.map_or("-".to_string(), |c| c.to_string()),
        )?;
    }

    tw.flush()?;

    Ok(())
}
