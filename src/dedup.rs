use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ArgMatches;
use futures_util::{pin_mut, StreamExt};
use monarch::model::Transaction;
use monarch::{Client, TransactionQuery, Transport};
use tracing::{debug, info};

use crate::display::transaction_url;
use crate::session::{self, Overrides};
use crate::settings::Settings;

/// Same-day, same-amount grouping key. Amounts compare at cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionKey {
    pub date: NaiveDate,
    pub cents: i64,
}

impl CollisionKey {
    fn of(txn: &Transaction) -> Self {
        Self {
            date: txn.date,
            cents: (txn.amount * 100.0).round() as i64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collision {
    /// First transaction seen for the key.
    pub original: Transaction,
    /// The later transaction, likely a duplicate of `original`.
    pub duplicate: Transaction,
}

/// Single pass duplicate finder.
///
/// Only the first transaction seen for a key is kept, so every later
/// transaction sharing that key is compared against it alone.
#[derive(Debug, Default)]
pub struct Detector {
    seen: HashMap<CollisionKey, Transaction>,
}

impl Detector {
    pub fn observe(&mut self, txn: Transaction) -> Option<Collision> {
        if txn.hide_from_reports {
            return None;
        }

        match self.seen.entry(CollisionKey::of(&txn)) {
            Entry::Vacant(slot) => {
                slot.insert(txn);
                None
            }
            Entry::Occupied(slot) => {
                let original = slot.get();
                if original.plaid_name == txn.plaid_name
                    && original.merchant_name() != txn.merchant_name()
                {
                    return Some(Collision {
                        original: original.clone(),
                        duplicate: txn,
                    });
                }

                debug!(id = %txn.id, original = %original.id, "same key, not a duplicate");
                None
            }
        }
    }
}

fn merchant(txn: &Transaction) -> &str {
    txn.merchant_name().unwrap_or("-")
}

pub fn print_collision<T: Write>(
    mut wr: T,
    app_url: &str,
    collision: &Collision,
    records: bool,
) -> Result<()> {
    let Collision {
        original,
        duplicate,
    } = collision;

    writeln!(
        wr,
        "possible collision - {} {:.2}:",
        duplicate.date, duplicate.amount
    )?;
    writeln!(
        wr,
        "1. {} {}",
        transaction_url(app_url, &original.id),
        merchant(original)
    )?;
    writeln!(
        wr,
        "2. {} {}",
        transaction_url(app_url, &duplicate.id),
        merchant(duplicate)
    )?;
    if records {
        writeln!(wr, "{:?}", duplicate)?;
        writeln!(wr, "{:?}", original)?;
    }
    writeln!(wr)?;

    Ok(())
}

pub fn print_hiding<T: Write>(mut wr: T, app_url: &str, txn: &Transaction) -> Result<()> {
    writeln!(
        wr,
        "hiding {} {}",
        transaction_url(app_url, &txn.id),
        merchant(txn)
    )?;

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub app_url: &'a str,
    /// Hide the later transaction of each pair instead of reporting it.
    pub hide: bool,
    /// Dump both full records after each reported pair.
    pub records: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub found: usize,
}

/// Streams every transaction through a [`Detector`], reporting or hiding each
/// likely duplicate as it is found. The first failed request ends the scan.
pub async fn scan<T: Transport, W: Write>(
    client: &Client<T>,
    query: TransactionQuery,
    opts: &ScanOptions<'_>,
    mut out: W,
) -> Result<ScanSummary> {
    let txns = client.transactions(query);
    pin_mut!(txns);

    let mut detector = Detector::default();
    let mut summary = ScanSummary::default();

    while let Some(txn) = txns.next().await {
        summary.scanned += 1;
        let Some(collision) = detector.observe(txn?) else {
            continue;
        };
        summary.found += 1;

        if opts.hide {
            print_hiding(&mut out, opts.app_url, &collision.duplicate)?;
            client.hide_transaction(&collision.duplicate.id).await?;
        } else {
            print_collision(&mut out, opts.app_url, &collision, opts.records)?;
        }
    }

    Ok(summary)
}

#[tracing::instrument(skip_all)]
pub(crate) async fn run(
    matches: &ArgMatches,
    settings: &Settings,
    overrides: &Overrides<'_>,
    verbose: bool,
) -> Result<()> {
    let opts = ScanOptions {
        app_url: &settings.app_url,
        hide: matches.is_present("hide"),
        records: verbose,
    };
    info!(hide = opts.hide, "Scanning transactions for duplicates.");

    let client = session::connect(settings, overrides).await?;
    let query = TransactionQuery {
        page_size: settings.page_size,
        ..TransactionQuery::default()
    };
    let summary = scan(&client, query, &opts, std::io::stdout().lock()).await?;

    info!(
        "Scanned {} transactions, found {} likely duplicates.",
        summary.scanned, summary.found
    );

    Ok(())
}
