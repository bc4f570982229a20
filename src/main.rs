use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gman::logging::{init_logging, LogConfig, LogFormat};
use gman::{Browser, Config, IndexStatus, Navigation, Outcome, Viewport};
use tracing::{info, warn, Level};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\nrustc: ", env!("RUSTC_VERSION"));

#[derive(Parser)]
#[command(
    name = "gman",
    version,
    long_version = LONG_VERSION,
    about = "Documentation viewer for programmers",
    long_about = "Show man pages and STL reference pages as HTML.\n\n\
                  Search text may be a man URL (man:printf(3)), an STL URL \
                  (stl:vector, stl:std::string) or a bare name, which is looked \
                  up in man sections 2 and 3."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    docs: DocsArgs,

    /// Write HTML here instead of stdout.
    #[arg(long, short, value_name = "PATH", global = true)]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Explicit log level (overrides -v/-q).
    #[arg(long = "log-level", value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,
}

#[derive(Args)]
struct DocsArgs {
    /// Root of the STL HTML documentation.
    #[arg(long, env = "GMAN_STL_ROOT", value_name = "DIR", global = true,
          default_value = gman::config::DEFAULT_STL_ROOT)]
    stl_root: PathBuf,

    /// PolyglotMan binary used to turn man pages into HTML.
    #[arg(long, env = "GMAN_FORMATTER", value_name = "PATH", global = true,
          default_value = gman::config::DEFAULT_FORMATTER)]
    formatter: PathBuf,

    /// Skip the formatter and show plain `man` output.
    #[arg(long, global = true)]
    no_formatter: bool,

    #[arg(long = "man", env = "GMAN_MAN", value_name = "PROGRAM", global = true,
          default_value = gman::config::DEFAULT_MAN_PROGRAM)]
    man_program: String,

    /// Sections searched for text without a scheme.
    #[arg(long, env = "GMAN_SECTIONS", value_name = "LIST", global = true,
          default_value = gman::config::DEFAULT_SECTIONS)]
    sections: String,
}

#[derive(Subcommand)]
enum Command {
    /// Look up search-box text (man:page(section), stl:term, or a name).
    Search {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Follow a link as if clicked in a page.
    Open {
        link: String,
        /// URL of the page the link appears on.
        #[arg(long, value_name = "URL")]
        from: Option<String>,
    },
    /// List the STL terms the index knows about.
    StlTerms,
    /// Read searches from stdin, one per line; `:open LINK` follows a link,
    /// `:hover [URL]` sets the status hint, `:quit` exits.
    Shell,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn log_config(cli: &Cli) -> LogConfig {
    let config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_ansi(io::stderr().is_terminal())
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        });
    match cli.log_level {
        Some(LogLevelArg::Error) => config.with_level(Level::ERROR),
        Some(LogLevelArg::Warn) => config.with_level(Level::WARN),
        Some(LogLevelArg::Info) => config.with_level(Level::INFO),
        Some(LogLevelArg::Debug) => config.with_level(Level::DEBUG),
        Some(LogLevelArg::Trace) => config.with_level(Level::TRACE),
        None => config,
    }
}

fn docs_config(args: &DocsArgs) -> Config {
    Config::default()
        .with_stl_root(&args.stl_root)
        .with_formatter((!args.no_formatter).then(|| args.formatter.clone()))
        .with_man_program(&args.man_program)
        .with_default_sections(&args.sections)
}

fn run(cli: Cli) -> gman::Result<ExitCode> {
    let mut browser = Browser::system(docs_config(&cli.docs));
    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(File::create(path).map_err(|source| gman::Error::Io {
            path: path.clone(),
            source,
        })?),
        None => Box::new(io::stdout().lock()),
    };
    let mut viewport = Viewport::new(sink);

    match cli.command {
        Command::Search { text } => {
            let outcome = browser.search(&text.join(" "), &mut viewport)?;
            Ok(report(&outcome, &viewport))
        }
        Command::Open { link, from } => {
            if let Some(from) = from {
                browser = browser.with_navigation(Navigation::starting_at(from));
            }
            let outcome = browser.follow(&link, &mut viewport)?;
            Ok(report(&outcome, &viewport))
        }
        Command::StlTerms => {
            let index = browser.stl_index();
            if let IndexStatus::Loaded { .. } = index.status() {
                let mut out = viewport.stream();
                for term in index.terms() {
                    writeln!(out, "{term}")?;
                }
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("{}", index.status());
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Shell => shell(&mut browser, &mut viewport),
    }
}

/// Log what was displayed; nothing shown at all is a failed lookup.
fn report<W: Write>(outcome: &Outcome, viewport: &Viewport<W>) -> ExitCode {
    match outcome {
        Outcome::Shown => {
            info!(title = %viewport.window_title(), "shown");
            ExitCode::SUCCESS
        }
        Outcome::Streamed { url, bytes } => {
            info!(url, bytes, "streamed");
            ExitCode::SUCCESS
        }
        Outcome::Ignored => {
            warn!("not a valid man: or stl: URL");
            ExitCode::FAILURE
        }
        Outcome::NotFound { term } => {
            warn!(term, "no STL documentation");
            ExitCode::FAILURE
        }
    }
}

fn shell<I, F, W>(browser: &mut Browser<I, F>, viewport: &mut Viewport<W>) -> gman::Result<ExitCode>
where
    I: gman::ToolInvoker,
    F: gman::Fetcher,
    W: Write,
{
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = if line == ":quit" {
            break;
        } else if let Some(link) = line.strip_prefix(":open ") {
            browser.follow(link.trim(), viewport)
        } else if let Some(rest) = line.strip_prefix(":hover") {
            let url = rest.trim();
            browser.status_hint().hover((!url.is_empty()).then_some(url));
            if let Some(hint) = browser.status_hint().shown() {
                eprintln!("{hint}");
            }
            continue;
        } else {
            browser.search(line, viewport)
        };

        // A failed page leaves the session running.
        match result {
            Ok(outcome) => {
                report(&outcome, viewport);
            }
            Err(error) => warn!(%error, "load failed"),
        }
    }
    Ok(ExitCode::SUCCESS)
}
