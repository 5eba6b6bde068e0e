use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use filever::{resolve_fixed_info, Error, ErrorKind, Format};

/// Print the version of a Windows executable file.
///
/// An executable file has a major, minor, patch and build version. On success the formatted
/// version is printed without a trailing newline and the exit status is 0; only then is the
/// output valid. A file without version info prints nothing and exits with status 3.
#[derive(Parser, Debug)]
#[command(
    name = "filever",
    version,
    disable_help_flag = true,
    override_usage = "filever [OPTIONS] [FORMAT] <FILE>",
    after_help = "\
FORMAT is a dot-separated list of the version names \"major\", \"minor\", \"patch\" and \"build\".
For example \"major.minor\" on a file with version 1.2.3.4 prints \"1.2\".
The default is \"major.minor.patch.build\".

-h, --help, -help, /h or /? as the only argument prints this help.

Exit status: 0 success, 1 internal error, 2 bad arguments or missing file, 3 no version info."
)]
struct Cli {
    /// Report the product version instead of the file version.
    #[arg(short, long)]
    product: bool,

    /// Log to stderr. Repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The executable, or FORMAT when a second argument follows.
    #[arg(value_name = "FORMAT|FILE")]
    first: OsString,

    /// The executable.
    #[arg(value_name = "FILE")]
    second: Option<OsString>,
}

impl Cli {
    /// Split the positionals into (format, file).
    fn format_and_file(&self) -> (Option<&OsString>, PathBuf) {
        match &self.second {
            None => (None, PathBuf::from(&self.first)),
            Some(file) => (Some(&self.first), PathBuf::from(file)),
        }
    }
}

/// Help is only recognised as the sole argument.
const HELP_ALIASES: &[&str] = &["-h", "--help", "-help", "/h", "/?"];

fn is_help_alias(args: &[OsString]) -> bool {
    match args {
        [arg] => HELP_ALIASES.iter().any(|h| arg == h),
        _ => false,
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_format(format: Option<&OsString>) -> Result<Format, Error> {
    match format {
        None => Ok(Format::default()),
        Some(f) => match f.to_str() {
            Some(s) => s.parse(),
            None => Err(Error::InvalidField(f.to_string_lossy().into_owned())),
        },
    }
}

fn run(cli: &Cli) -> Result<String, Error> {
    let (format, file) = cli.format_and_file();
    debug!(file = %file.display(), product = cli.product, "reading version");

    let info = resolve_fixed_info(&file)?;
    let packed = if cli.product {
        info.product_version
    } else {
        info.file_version
    };
    Ok(parse_format(format)?.render(packed))
}

fn report(err: &Error) {
    match err.kind() {
        // the library already logged it; stdout stays empty
        ErrorKind::NoVersionInfo => {}
        ErrorKind::Argument => {
            eprintln!("error: {}", err);
            if let Error::InvalidField(_) = err {
                eprintln!("\n{}", Cli::command().render_usage());
            }
        }
        ErrorKind::Internal => eprintln!("error: {}", err),
    }
}

fn main() -> ExitCode {
    let raw: Vec<OsString> = std::env::args_os().skip(1).collect();
    if is_help_alias(&raw) {
        return match Cli::command().print_long_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::from(ErrorKind::Internal.exit_code()),
        };
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            match stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: writing output: {}", e);
                    ExitCode::from(ErrorKind::Internal.exit_code())
                }
            }
        }
        Err(e) => {
            report(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("filever").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn one_positional_is_the_file() {
        let cli = parse(&["app.exe"]);
        let (format, file) = cli.format_and_file();
        assert!(format.is_none());
        assert_eq!(file, PathBuf::from("app.exe"));
    }

    #[test]
    fn two_positionals_are_format_then_file() {
        let cli = parse(&["-p", "major.minor", "app.exe"]);
        let (format, file) = cli.format_and_file();
        assert_eq!(format, Some(&OsString::from("major.minor")));
        assert_eq!(file, PathBuf::from("app.exe"));
        assert!(cli.product);
    }

    #[test]
    fn wrong_positional_count_is_rejected() {
        assert!(Cli::try_parse_from(["filever"]).is_err());
        assert!(Cli::try_parse_from(["filever", "a", "b", "c"]).is_err());
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn help_aliases() {
        for flag in HELP_ALIASES {
            assert!(is_help_alias(&os(&[*flag])), "{}", flag);
        }
        assert!(!is_help_alias(&os(&["/?", "x.exe"])));
        assert!(!is_help_alias(&os(&["-h", "x.exe"])));
        assert!(!is_help_alias(&os(&["x.exe"])));
    }

    #[test]
    fn help_flag_is_not_an_option() {
        assert!(Cli::try_parse_from(["filever", "-h", "app.exe"]).is_err());
        assert!(Cli::try_parse_from(["filever", "app.exe", "--help"]).is_err());
    }

    #[test]
    fn format_defaults_when_omitted() {
        assert_eq!(parse_format(None).unwrap(), Format::default());
        let f = OsString::from("BUILD.major");
        assert_eq!(parse_format(Some(&f)).unwrap().to_string(), "build.major");
    }
}
