mod tag;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "phenotag";
    pub const BIN_NAME: &str = "phenotag";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Tag genes, markers, regions and studies with evidentially-associated diseases.")
        .subcommand_required(true)
        .subcommand(tag::cli::create_tag_cli())
}

fn main() -> Result<()> {
    env_logger::init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // TAG
        //
        Some((tag::cli::TAG_CMD, matches)) => {
            tag::handlers::run_tag(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
