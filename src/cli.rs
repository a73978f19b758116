use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, Command, ValueHint};

pub fn build_command() -> Command {
    command!()
        .about("List the Steam games every given user owns.")
        .args([
            Arg::new("config")
                .short('c')
                .long("config-file")
                .alias("config")
                .required(false)
                .value_hint(ValueHint::FilePath)
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Path to the YAML config file."),
            Arg::new("cache_file")
                .long("cache-file")
                .alias("cache")
                .required(false)
                .value_hint(ValueHint::FilePath)
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Where store metadata is cached between runs."),
            Arg::new("delay_ms")
                .long("delay-ms")
                .required(false)
                .value_parser(value_parser!(u64))
                .value_name("MS")
                .help("Pause before each store request, in milliseconds."),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging."),
            Arg::new("no_color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Print the report without ANSI colors."),
            Arg::new("user_ids")
                .num_args(0..)
                .value_name("USER")
                .help("SteamIDs (numeric) or custom profile names."),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn collects_positional_users() {
        let matches =
            build_command().get_matches_from(["steamparty", "-v", "76561197960435530", "gaben"]);
        let users: Vec<&String> = matches.get_many("user_ids").unwrap().collect();
        assert_eq!(users, ["76561197960435530", "gaben"]);
        assert!(matches.get_flag("verbose"));
    }
}
