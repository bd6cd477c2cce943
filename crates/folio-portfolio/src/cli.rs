#![forbid(unsafe_code)]

//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::layout::LayoutMode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
folio: a map-navigated portfolio for the terminal

USAGE:
    folio [OPTIONS]

OPTIONS:
    --layout=MODE        Navigation layout: auto, hub, compact (default: auto)
                         auto uses the compact tab bar below 80 columns
    --no-mouse           Disable mouse capture
    --state-file=PATH    Where the theme preference is stored
    --content=PATH       Load portfolio content from a JSON file
    --seed=N             Seed for the background particles
    --log-file=PATH      Append logs to PATH (logging is off otherwise)
    --log-json           Write logs as JSON lines
    --exit-after-ms=N    Quit after N milliseconds (0 = never)
    -h, --help           Show this help message
    -V, --version        Show version

KEYBINDINGS:
    Enter / Space        Enter the portfolio (intro)
    Arrow keys           Navigate from the map
    Esc                  Close the project overlay, or return to the map
    b                    Back to the map
    j / k, PgUp / PgDn   Scroll
    Tab / Shift-Tab      Move between project cards or form fields
    1-9                  Open a project
    t                    Toggle light/dark theme
    q, Ctrl+C            Quit

ENVIRONMENT VARIABLES:
    FOLIO_LAYOUT         Override --layout
    FOLIO_STATE_FILE     Override --state-file
    FOLIO_SEED           Override --seed
    FOLIO_LOG_FILE       Override --log-file
    FOLIO_EXIT_AFTER_MS  Override --exit-after-ms
    FOLIO_LOG            Log filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Hub nodes, tab bar, or chosen by width.
    pub layout: LayoutMode,
    /// Whether to enable mouse capture.
    pub mouse: bool,
    /// Preference file; the platform state directory when `None`.
    pub state_file: Option<PathBuf>,
    /// Content JSON; built-in records when `None`.
    pub content: Option<PathBuf>,
    pub seed: u64,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Auto,
            mouse: true,
            state_file: None,
            content: None,
            seed: 0x00F0_7105,
            log_file: None,
            log_json: false,
            exit_after_ms: 0,
        }
    }
}

/// Result of parsing: options to run with, or an informational request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and `FOLIO_*` environment.
    ///
    /// `--help` and `--version` print and exit; bad input exits with status 1.
    pub fn parse() -> Self {
        match parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("folio {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

/// Environment values apply first; explicit arguments override them.
pub fn parse_from<I, S, E>(args: I, var: E) -> Result<Parsed, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    E: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    if let Some(val) = var("FOLIO_LAYOUT")
        && let Some(mode) = LayoutMode::parse(&val)
    {
        opts.layout = mode;
    }
    if let Some(val) = var("FOLIO_STATE_FILE")
        && !val.is_empty()
    {
        opts.state_file = Some(PathBuf::from(val));
    }
    if let Some(val) = var("FOLIO_SEED")
        && let Ok(n) = val.parse()
    {
        opts.seed = n;
    }
    if let Some(val) = var("FOLIO_LOG_FILE")
        && !val.is_empty()
    {
        opts.log_file = Some(PathBuf::from(val));
    }
    if let Some(val) = var("FOLIO_EXIT_AFTER_MS")
        && let Ok(n) = val.parse()
    {
        opts.exit_after_ms = n;
    }

    for arg in args {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(Parsed::Help),
            "--version" | "-V" => return Ok(Parsed::Version),
            "--no-mouse" => opts.mouse = false,
            "--log-json" => opts.log_json = true,
            other => {
                if let Some(val) = other.strip_prefix("--layout=") {
                    opts.layout =
                        LayoutMode::parse(val).ok_or_else(|| format!("Invalid --layout value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--state-file=") {
                    opts.state_file = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--content=") {
                    opts.content = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--seed=") {
                    opts.seed = val.parse().map_err(|_| format!("Invalid --seed value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = val
                        .parse()
                        .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    Ok(Parsed::Run(opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str]) -> Opts {
        match parse_from(args, no_env) {
            Ok(Parsed::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.layout, LayoutMode::Auto);
        assert!(opts.mouse);
        assert!(opts.state_file.is_none());
        assert_eq!(opts.exit_after_ms, 0);
        assert_eq!(run(&[]), opts);
    }

    #[test]
    fn flags_and_values() {
        let opts = run(&[
            "--layout=compact",
            "--no-mouse",
            "--seed=7",
            "--state-file=/tmp/s.json",
            "--log-json",
            "--exit-after-ms=250",
        ]);
        assert_eq!(opts.layout, LayoutMode::Compact);
        assert!(!opts.mouse);
        assert_eq!(opts.seed, 7);
        assert_eq!(opts.state_file, Some(PathBuf::from("/tmp/s.json")));
        assert!(opts.log_json);
        assert_eq!(opts.exit_after_ms, 250);
    }

    #[test]
    fn arguments_override_environment() {
        let env = |key: &str| match key {
            "FOLIO_LAYOUT" => Some("hub".to_string()),
            "FOLIO_SEED" => Some("42".to_string()),
            "FOLIO_EXIT_AFTER_MS" => Some("not-a-number".to_string()),
            _ => None,
        };
        let Ok(Parsed::Run(opts)) = parse_from(["--seed=9"], env) else {
            panic!("parse failed");
        };
        assert_eq!(opts.layout, LayoutMode::Hub);
        assert_eq!(opts.seed, 9);
        assert_eq!(opts.exit_after_ms, 0);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_from(["--seed=1", "-h"], no_env), Ok(Parsed::Help));
        assert_eq!(parse_from(["--version", "--bogus"], no_env), Ok(Parsed::Version));
    }

    #[test]
    fn invalid_input_is_reported() {
        let Err(msg) = parse_from(["--layout=mobile"], no_env) else {
            panic!("expected error");
        };
        assert!(msg.contains("--layout"));
        assert!(parse_from(["--seed=x"], no_env).is_err());
        let Err(msg) = parse_from(["--frobnicate"], no_env) else {
            panic!("expected error");
        };
        assert_eq!(msg, "Unknown argument: --frobnicate");
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_env_vars() {
        for var in ["FOLIO_LAYOUT", "FOLIO_STATE_FILE", "FOLIO_SEED", "FOLIO_LOG_FILE", "FOLIO_EXIT_AFTER_MS"] {
            assert!(HELP_TEXT.contains(var), "{var}");
        }
    }
}
