use clap::{Arg, Command, arg};

pub const TAG_CMD: &str = "tag";

pub fn create_tag_cli() -> Command {
    Command::new(TAG_CMD)
        .about("Run criteria rules for one feature kind and flush the disease tags.")
        .arg(
            Arg::new("feature")
                .required(true)
                .help("Feature kind to tag: gene, marker, region or study"),
        )
        .arg(
            arg!(--criteria <names>)
                .help("Comma-separated rule names to run; omit to run every rule for the feature"),
        )
        .arg(arg!(--config <path>).help("Criteria config file (TOML); omit for the built-in one"))
        .arg(
            arg!(--show)
                .help("List the rules available for the feature and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--test)
                .help("Bounded sample run against in-process fixtures instead of the store")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(arg!(--fixtures <path>).help("JSON fixture file seeding the in-process store for --test"))
}
