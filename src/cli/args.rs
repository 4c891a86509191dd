//! Command-line flags of a Trellis test binary.
//!
//! The flags map one-to-one onto [`RunOptions`]; the two partition flags
//! fall back to `TRELLIS_PARTITIONS` and `TRELLIS_PARTITION` so a CI matrix
//! can shard a suite without touching the command line.

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::runner::RunOptions;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(name = "trellis", version, about = "Runs the tests linked into this binary.")]
pub struct TrellisArgs {
    /// Print a line for every passing test.
    #[arg(short = 'a', long = "all")]
    pub show_passed: bool,

    /// Let tests write to stdout instead of capturing their output.
    #[arg(short = 'o', long = "output")]
    pub show_output: bool,

    /// Stop after the first failing test.
    #[arg(short = 's', long = "stop")]
    pub stop: bool,

    /// Split the suite into this many partitions.
    #[arg(short = 'p', long = "partitions", env = "TRELLIS_PARTITIONS", default_value_t = 1)]
    pub partitions: usize,

    /// Run only this partition, counted from 1.
    #[arg(short = 'n', long = "partition", env = "TRELLIS_PARTITION", default_value_t = 1)]
    pub partition: usize,

    /// Run only tests whose description contains this text. Repeatable.
    #[arg(short = 't', long = "tag", value_name = "TEXT")]
    pub tags: Vec<String>,

    /// When to colour the report.
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    pub color: ColorArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}

impl TrellisArgs {
    pub fn into_options(self) -> RunOptions {
        RunOptions {
            partition_count: self.partitions,
            partition_index: self.partition,
            show_passed: self.show_passed,
            suppress_output: !self.show_output,
            stop_after_failure: self.stop,
            tag_filter: self.tags,
            color: self.color.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_run_options() {
        let options = TrellisArgs::parse_from(["trellis"]).into_options();
        let defaults = RunOptions::default();
        assert_eq!(options.partition_count, defaults.partition_count);
        assert_eq!(options.partition_index, defaults.partition_index);
        assert_eq!(options.show_passed, defaults.show_passed);
        assert_eq!(options.suppress_output, defaults.suppress_output);
        assert_eq!(options.stop_after_failure, defaults.stop_after_failure);
        assert!(options.tag_filter.is_empty());
    }

    #[test]
    fn test_short_flags() {
        let options =
            TrellisArgs::parse_from(["trellis", "-a", "-o", "-s", "-p", "3", "-n", "2", "-t", "str", "-t", "sub"])
                .into_options();
        assert!(options.show_passed);
        assert!(!options.suppress_output);
        assert!(options.stop_after_failure);
        assert_eq!(options.partition_count, 3);
        assert_eq!(options.partition_index, 2);
        assert_eq!(options.tag_filter, ["str", "sub"]);
    }

    #[test]
    fn test_color_choice() {
        let args = TrellisArgs::parse_from(["trellis", "--color", "never"]);
        assert_eq!(args.color, ColorArg::Never);
        assert!(matches!(ColorChoice::from(args.color), ColorChoice::Never));
    }
}
