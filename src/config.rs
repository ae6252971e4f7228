use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Path of the captured message-profile dataset.
    #[arg(
        long = "data",
        env = "STATESCOPE_DATA",
        value_name = "FILE",
        default_value = "data.json",
        help = "JSON file holding the profiled messages to visualize"
    )]
    pub data: PathBuf,

    /// Optional file to write logs to instead of stderr.
    #[arg(
        long = "log-file",
        env = "STATESCOPE_LOG",
        value_name = "FILE",
        help = "Append tracing output to FILE (stderr when unset)"
    )]
    pub log_file: Option<PathBuf>,

    /// Terminal refresh cadence in milliseconds.
    #[arg(
        long = "tick",
        env = "STATESCOPE_TICK",
        value_name = "MS",
        default_value_t = 250,
        help = "Milliseconds between redraw ticks"
    )]
    pub tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_bare_invocation() {
        let config = Config::parse_from(["statescope"]);

        assert_eq!(config.data, PathBuf::from("data.json"));
        assert!(config.log_file.is_none());
        assert_eq!(config.tick, 250);
    }

    #[test]
    fn flags_override_the_defaults() {
        let config = Config::parse_from([
            "statescope",
            "--data",
            "captures/run-7.json",
            "--log-file",
            "statescope.log",
            "--tick",
            "100",
        ]);

        assert_eq!(config.data, PathBuf::from("captures/run-7.json"));
        assert_eq!(config.log_file, Some(PathBuf::from("statescope.log")));
        assert_eq!(config.tick, 100);
    }
}
