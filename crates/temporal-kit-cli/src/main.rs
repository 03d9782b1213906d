//! `tkit`: convert, compute with and format ISO-8601 temporal values from the
//! command line.
//!
//! Values print in their canonical ISO form; structured results print as
//! JSON. Diagnostics go to stderr.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use temporal_kit::{
    CalendarId, ConfigPatch, DurationStyle, FormatOptions, FormatPreset, Style, TemporalConfig,
    TemporalEngine, TemporalInput, TemporalValue, Unit, ValueKind,
};
use tracing::{debug, error, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tkit", version, about, long_about = None)]
struct Cli {
    /// Locale for formatting, e.g. en-US or de-DE
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Default IANA time zone, e.g. America/New_York
    #[arg(long, global = true)]
    time_zone: Option<String>,

    /// Default calendar (iso8601 or gregory)
    #[arg(long, global = true)]
    calendar: Option<CalendarId>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an input to a value of another kind
    Convert {
        input: String,
        /// Target kind: plain-date, plain-time, plain-date-time, zoned, instant, duration
        #[arg(short = 't', long = "to")]
        to: ValueKind,
        /// Read the input as epoch milliseconds
        #[arg(long)]
        epoch: bool,
        /// Zone for a zoned target, overriding the default
        #[arg(long)]
        zone: Option<String>,
    },
    /// Render a value for display
    Format {
        input: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
        /// full, long, medium or short
        #[arg(long)]
        date_style: Option<String>,
        /// full, long, medium or short
        #[arg(long)]
        time_style: Option<String>,
        /// Named option set, e.g. dateShort or isoDateTime
        #[arg(long)]
        preset: Option<FormatPreset>,
        /// Options as JSON, e.g. '{"month":"long","day":"numeric"}'
        #[arg(long)]
        options: Option<String>,
        /// Duration style: long, short, narrow or digital
        #[arg(long)]
        style: Option<DurationStyle>,
        /// Describe the date relative to today (or --reference)
        #[arg(long)]
        relative: bool,
        #[arg(long, requires = "relative")]
        reference: Option<String>,
    },
    /// Add a duration to a value
    Add {
        input: String,
        duration: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
    },
    /// Subtract a duration from a value
    Subtract {
        input: String,
        duration: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
    },
    /// Difference from A to B
    Diff {
        a: String,
        b: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
        /// Print a whole number of this unit instead of a duration
        #[arg(long, conflicts_with = "largest")]
        unit: Option<Unit>,
        /// Coarsest unit the duration may carry into
        #[arg(long)]
        largest: Option<Unit>,
    },
    /// Compare A against B
    Compare {
        a: String,
        b: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
    },
    /// Check whether an input converts to a kind
    Validate {
        input: String,
        #[arg(short, long, default_value = "plain-date-time")]
        kind: ValueKind,
    },
    /// Check a JSON format-options object for consistency
    ValidateOptions { options: String },
    /// Print the current time
    Now {
        #[arg(short, long, default_value = "zoned")]
        kind: ValueKind,
        #[arg(long)]
        zone: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("warning: logging unavailable: {err}");
    }

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Compact logs on stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::TRACE } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,temporal_kit={level},tkit={level}")));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize tracing")
}

fn build_engine(cli: &Cli) -> Result<TemporalEngine> {
    let patch = ConfigPatch {
        default_locale: cli.locale.clone(),
        default_time_zone: cli.time_zone.clone(),
        default_calendar: cli.calendar,
    };
    let config = TemporalConfig::default().merged(&patch);
    debug!(?config, "resolved configuration");
    TemporalEngine::new(config).context("invalid global options")
}

fn run(cli: Cli) -> Result<String> {
    let engine = build_engine(&cli)?;
    let value = |raw: &str, kind: ValueKind| -> Result<TemporalValue> {
        engine
            .convert(raw, kind)
            .with_context(|| format!("cannot read '{raw}' as {kind}"))
    };

    match &cli.command {
        Command::Convert {
            input,
            to,
            epoch,
            zone,
        } => {
            let source = read_input(input, *epoch)?;
            let converted = match (to, zone) {
                (ValueKind::ZonedDateTime, Some(zone)) => engine
                    .to_zoned_date_time(source, Some(zone.as_str()))
                    .map(TemporalValue::from),
                (_, Some(_)) => bail!("--zone only applies to zoned targets"),
                (kind, None) => engine.convert(source, *kind),
            };
            let converted = converted.with_context(|| format!("cannot convert '{input}' to {to}"))?;
            Ok(converted.to_string())
        }
        Command::Format {
            input,
            kind,
            date_style,
            time_style,
            preset,
            options,
            style,
            relative,
            reference,
        } => {
            let v = value(input.as_str(), *kind)?;
            if *relative {
                let reference = reference
                    .as_deref()
                    .map(|r| value(r, ValueKind::PlainDate))
                    .transpose()?;
                let text = engine.format_relative(&v, reference.as_ref());
                if text.is_empty() {
                    bail!("'{input}' has no calendar date");
                }
                return Ok(text);
            }
            let mut opts = preset.map(FormatOptions::from).unwrap_or_default();
            if let Some(json) = options {
                let parsed: FormatOptions =
                    serde_json::from_str(json).context("invalid --options JSON")?;
                opts = opts.merge(&parsed);
            }
            if let Some(s) = date_style {
                opts.date_style = Some(parse_style(s)?);
            }
            if let Some(s) = time_style {
                opts.time_style = Some(parse_style(s)?);
            }
            if style.is_some() {
                opts.duration_style = *style;
            }
            Ok(engine.try_format(&v, &opts)?)
        }
        Command::Add {
            input,
            duration,
            kind,
        } => Ok(engine.add(&value(input.as_str(), *kind)?, duration.as_str())?.to_string()),
        Command::Subtract {
            input,
            duration,
            kind,
        } => Ok(engine.subtract(&value(input.as_str(), *kind)?, duration.as_str())?.to_string()),
        Command::Diff {
            a,
            b,
            kind,
            unit,
            largest,
        } => {
            let (a, b) = (value(a.as_str(), *kind)?, value(b.as_str(), *kind)?);
            match unit {
                Some(unit) => Ok(engine.difference_in(*unit, &a, &b)?.to_string()),
                None => Ok(engine.difference(&a, &b, *largest)?.to_string()),
            }
        }
        Command::Compare { a, b, kind } => {
            let result = engine.compare_detailed(&value(a.as_str(), *kind)?, &value(b.as_str(), *kind)?)?;
            to_json(&result)
        }
        Command::Validate { input, kind } => to_json(&engine.validate(input.as_str(), *kind)),
        Command::ValidateOptions { options } => {
            let parsed: FormatOptions =
                serde_json::from_str(options).context("options must be a JSON object")?;
            to_json(&engine.validate_options(&parsed))
        }
        Command::Now { kind, zone } => {
            let now = engine.now();
            let v = match kind {
                ValueKind::Instant => TemporalValue::from(now.instant()),
                ValueKind::ZonedDateTime => now.zoned_date_time(zone.as_deref())?.into(),
                ValueKind::PlainDateTime => now.plain_date_time()?.into(),
                ValueKind::PlainDate => now.plain_date()?.into(),
                ValueKind::PlainTime => now.plain_time()?.into(),
                ValueKind::Duration => bail!("the current time is not a duration"),
            };
            Ok(v.to_string())
        }
    }
}

fn read_input(raw: &str, epoch: bool) -> Result<TemporalInput> {
    if epoch {
        let ms: i64 = raw
            .trim()
            .parse()
            .with_context(|| format!("'{raw}' is not a number of milliseconds"))?;
        Ok(TemporalInput::from(ms))
    } else {
        Ok(TemporalInput::from(raw))
    }
}

fn parse_style(raw: &str) -> Result<Style> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .with_context(|| format!("unknown style '{raw}', expected full, long, medium or short"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize result")
}
