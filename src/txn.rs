use anyhow::{anyhow, Result};
use clap::ArgMatches;
use futures_util::TryStreamExt;
use monarch::model::Transaction;
use monarch::{TransactionFilters, TransactionQuery};
use tracing::info;

use crate::display::{print_transactions, transaction_url};
use crate::session::{self, Overrides};
use crate::settings::Settings;

fn to_query(matches: &ArgMatches, settings: &Settings) -> Result<TransactionQuery> {
    let page_size = match matches.value_of("page_size") {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| anyhow!("page size must be a positive integer, got {:?}", v))?,
        None => settings.page_size,
    };

    if page_size < 1 {
        return Err(anyhow!("page size must be a positive integer, got 0"));
    }

    Ok(TransactionQuery {
        page_size,
        filters: TransactionFilters {
            search: matches.value_of("search").unwrap_or_default().to_string(),
            ..TransactionFilters::default()
        },
        ..TransactionQuery::default()
    })
}

#[tracing::instrument(skip_all)]
pub(crate) async fn run(
    matches: &ArgMatches,
    settings: &Settings,
    overrides: &Overrides<'_>,
) -> Result<()> {
    let query = to_query(matches, settings)?;
    let client = session::connect(settings, overrides).await?;

    let txns: Vec<Transaction> = client.transactions(query).try_collect().await?;
    info!("Fetched {} transactions.", txns.len());

    print_transactions(std::io::stdout().lock(), &txns)
}

pub(crate) async fn hide(
    matches: &ArgMatches,
    settings: &Settings,
    overrides: &Overrides<'_>,
) -> Result<()> {
    let id = matches
        .value_of("transaction_id")
        .ok_or_else(|| anyhow!("a transaction ID is required"))?;
    let client = session::connect(settings, overrides).await?;

    client.hide_transaction(id).await?;
    println!("hid {}", transaction_url(&settings.app_url, id));

    Ok(())
}
