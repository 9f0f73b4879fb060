// reelstitch-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use chrono::FixedOffset;
use clap::{Args, Parser, Subcommand};
use reelstitch_core::config::{
    DEFAULT_ARTIFACT_PREFIX, DEFAULT_CATEGORY_ID, DEFAULT_DESCRIPTION, DEFAULT_LEDGER_FILENAME,
    DEFAULT_TARGET_DURATION_SECS, DEFAULT_TITLE,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelstitch: short clip compiler and upload scheduler",
    long_about = "Groups short clips into compilations with background music using ffmpeg, \
                  then schedules them for staggered publication on YouTube."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for run log files (defaults to OUTPUT_DIR/logs)
    #[arg(long, global = true, value_name = "LOG_DIR", env = "REELSTITCH_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Groups clips by duration and compiles each group with a background track
    Compile(CompileArgs),
    /// Schedules compiled files for publication, resuming from the progress ledger
    Schedule(ScheduleArgs),
    /// Compiles, then schedules
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Directory containing the source .mp4 clips
    #[arg(short = 'i', long = "input", value_name = "INPUT_DIR", env = "REELSTITCH_INPUT_DIR", default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory containing background tracks (.mp3, .wav)
    #[arg(short = 't', long = "tracks", value_name = "TRACKS_DIR", env = "REELSTITCH_TRACKS_DIR", default_value = "tracks")]
    pub tracks_dir: PathBuf,

    /// Directory where numbered compilations are written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR", env = "REELSTITCH_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Target summed clip duration per compilation, in seconds
    #[arg(long, value_name = "SECONDS", env = "REELSTITCH_TARGET_DURATION", default_value_t = DEFAULT_TARGET_DURATION_SECS)]
    pub target_duration: f64,

    /// Optional: Base directory for per-group scratch space (defaults to OUTPUT_DIR)
    #[arg(long, value_name = "TEMP_DIR", env = "REELSTITCH_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// File name prefix of compilations (<prefix>-<n>.mp4)
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_ARTIFACT_PREFIX)]
    pub prefix: String,

    /// Keep compilations that already exist instead of rebuilding them
    #[arg(long)]
    pub skip_existing: bool,

    /// Optional: Override the libx264 CRF used when normalizing clips (0-51)
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Optional: Override the libx264 preset used when normalizing clips
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Optional: ntfy.sh topic URL for sending notifications (e.g., https://ntfy.sh/your_topic)
    /// Can also be set via the REELSTITCH_NTFY_TOPIC environment variable.
    #[arg(long, value_name = "TOPIC_URL", env = "REELSTITCH_NTFY_TOPIC")]
    pub ntfy: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Directory holding the compilations to schedule
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR", env = "REELSTITCH_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// File name prefix of compilations (<prefix>-<n>.mp4)
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_ARTIFACT_PREFIX)]
    pub prefix: String,

    /// Optional: ntfy.sh topic URL for sending notifications
    #[arg(long, value_name = "TOPIC_URL", env = "REELSTITCH_NTFY_TOPIC")]
    pub ntfy: Option<String>,

    #[command(flatten)]
    pub upload: UploadArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub compile: CompileArgs,

    #[command(flatten)]
    pub upload: UploadArgs,
}

/// Options of the upload side shared by `schedule` and `run`.
#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Progress ledger location
    #[arg(long, value_name = "FILE", env = "REELSTITCH_LEDGER", default_value = DEFAULT_LEDGER_FILENAME)]
    pub ledger: PathBuf,

    /// OAuth client secrets downloaded from the Google Cloud Console
    #[arg(long, value_name = "FILE", env = "REELSTITCH_CREDENTIALS", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Stored OAuth token containing a refresh_token
    #[arg(long, value_name = "FILE", env = "REELSTITCH_TOKEN", default_value = "token.json")]
    pub token: PathBuf,

    /// Comma-separated hours of the day cycled through for publish slots
    #[arg(long, value_name = "HOURS", value_delimiter = ',', default_value = "11,18,21",
          value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hours: Vec<u32>,

    /// UTC offset the hours are given in, e.g. -03:00 (defaults to the local offset)
    #[arg(long, value_name = "OFFSET", env = "REELSTITCH_UTC_OFFSET", allow_hyphen_values = true,
          value_parser = parse_utc_offset)]
    pub utc_offset: Option<FixedOffset>,

    /// Title of every upload
    #[arg(long, value_name = "TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Description of every upload
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_DESCRIPTION)]
    pub description: String,

    /// Comma-separated tags of every upload
    #[arg(long, value_name = "TAGS", value_delimiter = ',', default_value = "shorts,automator")]
    pub tags: Vec<String>,

    /// YouTube category id of every upload
    #[arg(long, value_name = "ID", default_value = DEFAULT_CATEGORY_ID)]
    pub category: String,
}

/// Parses `+HH:MM`, `-HH:MM`, `+HHMM`, `-HH` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, String> {
    let invalid = || format!("invalid UTC offset '{value}', expected e.g. -03:00");
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.as_str(), "0"),
        4 => digits.split_at(2),
        _ => return Err(invalid()),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_defaults() {
        let cli = Cli::parse_from(["reelstitch", "compile"]);
        match cli.command {
            Commands::Compile(args) => {
                assert_eq!(args.input_dir, PathBuf::from("input"));
                assert_eq!(args.tracks_dir, PathBuf::from("tracks"));
                assert_eq!(args.output_dir, PathBuf::from("output"));
                assert_eq!(args.target_duration, 65.0);
                assert_eq!(args.prefix, "compilation");
                assert!(!args.skip_existing);
                assert!(args.crf.is_none());
            }
            other => panic!("expected compile, got {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_schedule_options() {
        let cli = Cli::parse_from([
            "reelstitch",
            "schedule",
            "-o",
            "out",
            "--hours",
            "9,21",
            "--utc-offset",
            "-03:00",
            "--tags",
            "a,b,c",
            "--verbose",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Schedule(args) => {
                assert_eq!(args.output_dir, PathBuf::from("out"));
                assert_eq!(args.upload.hours, vec![9, 21]);
                assert_eq!(args.upload.utc_offset, FixedOffset::west_opt(3 * 3600));
                assert_eq!(args.upload.tags, vec!["a", "b", "c"]);
                assert_eq!(args.upload.ledger, PathBuf::from("upload_progress.json"));
            }
            other => panic!("expected schedule, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_combines_both_sides() {
        let cli = Cli::parse_from(["reelstitch", "run", "-i", "clips", "--token", "t.json"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.compile.input_dir, PathBuf::from("clips"));
                assert_eq!(args.upload.token, PathBuf::from("t.json"));
                assert_eq!(args.upload.hours, vec![11, 18, 21]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_hour() {
        assert!(Cli::try_parse_from(["reelstitch", "schedule", "--hours", "11,24"]).is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("-03:00"), Ok(FixedOffset::west_opt(3 * 3600).unwrap()));
        assert_eq!(parse_utc_offset("+0530"), Ok(FixedOffset::east_opt(5 * 3600 + 1800).unwrap()));
        assert_eq!(parse_utc_offset("+9"), Ok(FixedOffset::east_opt(9 * 3600).unwrap()));
        assert_eq!(parse_utc_offset("Z"), Ok(FixedOffset::east_opt(0).unwrap()));
        assert!(parse_utc_offset("03:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+ab").is_err());
    }
}
