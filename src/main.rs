mod dedup;
mod display;
mod session;
mod settings;
mod tags;
mod txn;

use anyhow::Result;
use clap::{arg, Arg, Command};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::session::Overrides;
use crate::settings::Settings;

static CLIENT_NAME: &str = "monarch";

fn app() -> Command<'static> {
    Command::new(CLIENT_NAME)
        .about("The monarch utility reads transactions and tags from Monarch Money \
         and finds transactions that were likely imported twice.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose "Logs progress to stderr"))
        .arg(arg!(token: --token [TOKEN] "API token, skips logging in"))
        .arg(arg!(username: --username [EMAIL] "Account email used to log in"))
        .arg(arg!(password: --password [PASSWORD] "Account password used to log in"))
        .arg(arg!(totp: --totp [CODE] "One-time code for accounts with multi-factor auth"))
        .subcommand(Command::new("login").about("Logs in and prints an API token."))
        .subcommand(Command::new("extend-token").about("Extends the lifetime of the current token and prints the result."))
        .subcommand(Command::new("transactions")
            .about("Prints every transaction.")
            .arg(Arg::new("page_size")
                .long("page-size")
                .value_name("N")
                .takes_value(true)
                .help("Number of transactions requested per page."))
            .arg(arg!(search: --search [TEXT] "Only transactions matching the search text.")))
        .subcommand(Command::new("tags")
            .subcommand_required(true)
            .about("Lists household tags or sets the tags of a transaction.")
            .subcommand(Command::new("list")
                .about("Prints household tags.")
                .arg(arg!(search: --search [TEXT] "Only tags whose name contains the text."))
                .arg(arg!(limit: --limit [N] "Maximum number of tags to print.")))
            .subcommand(Command::new("set")
                .about("Replaces every tag on a transaction. Passing no tag IDs clears its tags.")
                .arg(arg!(transaction_id: <TRANSACTION_ID> "The transaction to tag."))
                .arg(Arg::new("tag_ids")
                    .value_name("TAG_ID")
                    .multiple_values(true)
                    .help("Tags to apply."))))
        .subcommand(Command::new("hide")
            .about("Hides a transaction from reports.")
            .arg(arg!(transaction_id: <TRANSACTION_ID> "The transaction to hide.")))
        .subcommand(Command::new("dedup")
            .about("Finds transactions with the same date, amount and source description but a different merchant.")
            .arg(arg!(hide: --hide "Hide the later transaction of each likely duplicate pair.")))
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let matches = app().get_matches();
    init_tracing(matches.is_present("verbose"));

    let settings = Settings::new(matches.value_of("CONFIG"))?;
    let overrides = Overrides::from(&matches);

    match matches.subcommand() {
        Some(("login", _)) => session::print_login(&settings, &overrides).await?,
        Some(("extend-token", _)) => session::print_extended(&settings, &overrides).await?,
        Some(("transactions", txn_matches)) => {
            txn::run(txn_matches, &settings, &overrides).await?
        }
        Some(("tags", tag_matches)) => tags::run(tag_matches, &settings, &overrides).await?,
        Some(("hide", hide_matches)) => txn::hide(hide_matches, &settings, &overrides).await?,
        Some(("dedup", dedup_matches)) => {
            dedup::run(dedup_matches, &settings, &overrides, matches.is_present("verbose")).await?
        }
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
