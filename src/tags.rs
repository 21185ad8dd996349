use anyhow::{anyhow, Result};
use clap::ArgMatches;
use monarch::TagQuery;

use crate::display::print_tags;
use crate::session::{self, Overrides};
use crate::settings::Settings;

fn parse_limit(value: Option<&str>) -> Result<Option<usize>> {
    match value {
        None => Ok(None),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(anyhow!("limit must be a positive integer, got {:?}", v)),
        },
    }
}

async fn list(matches: &ArgMatches, settings: &Settings, overrides: &Overrides<'_>) -> Result<()> {
    let limit = parse_limit(matches.value_of("limit"))?;
    let query = TagQuery {
        search: matches.value_of("search").map(String::from),
        limit,
    };

    let client = session::connect(settings, overrides).await?;
    let tags = client.tags(&query).await?;

    print_tags(std::io::stdout().lock(), &tags)
}

async fn set(matches: &ArgMatches, settings: &Settings, overrides: &Overrides<'_>) -> Result<()> {
    let id = matches
        .value_of("transaction_id")
        .ok_or_else(|| anyhow!("a transaction ID is required"))?;
    let tag_ids: Vec<String> = matches
        .values_of("tag_ids")
        .map(|ids| ids.map(String::from).collect())
        .unwrap_or_default();

    let client = session::connect(settings, overrides).await?;
    let applied = client.set_transaction_tags(id, &tag_ids).await?;

    if applied.is_empty() {
        println!("cleared tags on {}", id);
    } else {
        println!("tagged {} with {}", id, applied.join(", "));
    }

    Ok(())
}

pub(crate) async fn run(
    matches: &ArgMatches,
    settings: &Settings,
    overrides: &Overrides<'_>,
) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => list(list_matches, settings, overrides).await,
        Some(("set", set_matches)) => set(set_matches, settings, overrides).await,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_must_be_positive() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("25")).unwrap(), Some(25));
        assert!(parse_limit(Some("0")).is_err());
        assert!(parse_limit(Some("-3")).is_err());
        assert!(parse_limit(Some("ten")).is_err());
    }
}
