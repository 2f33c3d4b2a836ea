use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use mw_ipa::{Field, Resource};

#[derive(Parser, Debug)]
#[command(
    name = "mw-ipa",
    version,
    about = "Query merriam-webster.com for IPA or POS data"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["ipa", "pos"])))]
struct Cli {
    /// Text file without punctuation to use as input
    infile: PathBuf,

    /// Output file to write tab-separated data to
    outfile: PathBuf,

    /// Retrieve IPA translations
    #[arg(short = 'i', long = "ipa")]
    ipa: bool,

    /// Retrieve POS information
    #[arg(short = 'p', long = "pos")]
    pos: bool,

    /// API key (overrides environment variables and settings)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Dictionary resource to query
    #[arg(short = 'R', long = "resource", value_enum)]
    resource: Option<Resource>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn field(&self) -> Field {
        if self.ipa {
            Field::Pronunciation
        } else {
            Field::PartOfSpeech
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    mw_ipa::logging::init(cli.verbose)?;

    let field = cli.field();
    mw_ipa::run(mw_ipa::Config {
        input: cli.infile,
        output: cli.outfile,
        field,
        key: cli.key,
        resource: cli.resource,
        settings_path: cli.read_settings,
        settings_scope: None,
    })
    .await?;
    Ok(())
}
