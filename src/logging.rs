use log::{Level, LevelFilter};
use simplelog::{Color, ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Installs the process-wide stderr logger. Call once, before any work.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_level_color(Level::Info, Some(Color::Green))
        .set_level_color(Level::Warn, Some(Color::Yellow))
        .set_level_color(Level::Error, Some(Color::Red))
        .add_filter_allow_str(env!("CARGO_CRATE_NAME"))
        .build();

    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("WARNING: logger already initialized: {e}");
    }
}
