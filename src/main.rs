use std::io::{self, Write};
use std::path::{MAIN_SEPARATOR, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use logsift_logs::{
    Config, LinePattern, LogSource, MessageMatcher, PatternPreset, QueryClient, kind,
    parse_timestamp, sort_records,
};

/// Logsift - parse a flat text log and query its records
#[derive(Parser, Debug)]
#[command(name = "logsift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file name (looked up in the log directory) or path
    #[arg(value_name = "SOURCE")]
    source: String,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory bare log names are resolved against
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Built-in line pattern (generic, severity_char)
    #[arg(long, value_name = "NAME")]
    preset: Option<PatternPreset>,

    /// Custom line pattern; wins over --preset and the config file
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,

    /// Only ERROR lines
    #[arg(long, group = "kind_filter")]
    errors: bool,

    /// Only WARNING lines
    #[arg(long, group = "kind_filter")]
    warnings: bool,

    /// Only INFO lines
    #[arg(long, group = "kind_filter")]
    infos: bool,

    /// Only lines with this exact type
    #[arg(long = "type", value_name = "TYPE", group = "kind_filter")]
    kind: Option<String>,

    /// Only lines with this exact prefix
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Only messages containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    message: Option<String>,

    /// Only messages matching this regex (case-sensitive unless it says otherwise)
    #[arg(long, value_name = "REGEX")]
    regex: Option<String>,

    /// Only lines strictly after this timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    since: Option<String>,

    /// Print the number of matching lines
    #[arg(long, group = "output")]
    count: bool,

    /// Print the distinct prefixes
    #[arg(long, group = "output")]
    prefixes: bool,

    /// Print only timestamps
    #[arg(long, group = "output")]
    timestamps: bool,

    /// Print only messages
    #[arg(long, group = "output")]
    messages: bool,

    /// Print records as JSON lines
    #[arg(long, group = "output")]
    json: bool,

    /// Drop lines whose prefixed message was already seen
    #[arg(long)]
    uniq: bool,

    /// Order lines by timestamp
    #[arg(long)]
    sort: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.log_dir {
        config.set_log_dir(dir);
    }
    if let Some(preset) = args.preset {
        config.set_line_pattern_preset(preset);
    }

    let explicit = args
        .pattern
        .as_deref()
        .map(LinePattern::new)
        .transpose()
        .context("Invalid --pattern")?;
    let pattern = config.select_pattern(explicit.as_ref(), None);

    let log = QueryClient::with_pattern(source_from_arg(&args.source), &config, pattern);
    tracing::debug!(
        path = %log.path().display(),
        pattern = log.line_pattern().as_str(),
        "querying log"
    );

    let log = apply_filters(log, args)
        .with_context(|| format!("Failed to query {}", args.source))?;
    print_results(&log, args)
}

/// A source containing a path separator is a path, anything else a log name
fn source_from_arg(arg: &str) -> LogSource {
    if arg.contains('/') || arg.contains(MAIN_SEPARATOR) {
        LogSource::Path(PathBuf::from(arg))
    } else {
        LogSource::Name(arg.to_string())
    }
}

fn apply_filters(mut log: QueryClient, args: &Args) -> Result<QueryClient> {
    let wanted_kind = if args.errors {
        Some(kind::ERROR)
    } else if args.warnings {
        Some(kind::WARNING)
    } else if args.infos {
        Some(kind::INFO)
    } else {
        args.kind.as_deref()
    };

    if let Some(name) = wanted_kind {
        log = log.by_type(name)?;
    }
    if let Some(prefix) = &args.prefix {
        log = log.by_prefix(prefix)?;
    }
    if let Some(text) = &args.message {
        log = log.by_message(MessageMatcher::text(text))?;
    }
    if let Some(pattern) = &args.regex {
        let matcher = MessageMatcher::regex(pattern).context("Invalid --regex")?;
        log = log.by_message(matcher)?;
    }
    if let Some(since) = &args.since {
        let reference = parse_timestamp(since).context("Invalid --since")?;
        log = log.since(&reference)?;
    }

    Ok(log)
}

fn print_results(log: &QueryClient, args: &Args) -> Result<()> {
    let mut out = io::stdout().lock();

    if args.count {
        writeln!(out, "{}", log.count()?)?;
        return Ok(());
    }

    if args.prefixes {
        for prefix in log.prefixes()? {
            writeln!(out, "{}", prefix)?;
        }
        return Ok(());
    }

    let mut records = if args.uniq { log.uniq()? } else { log.to_vec()? };
    if args.sort {
        sort_records(&mut records);
    }

    for record in &records {
        if args.timestamps {
            writeln!(out, "{}", record.timestamp())?;
        } else if args.messages {
            writeln!(out, "{}", record.message())?;
        } else if args.json {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        } else {
            writeln!(out, "{}", record)?;
        }
    }

    Ok(())
}
