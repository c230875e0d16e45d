use std::fmt::Debug;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::terminal::spinner;

/// Events on this target are printed verbatim, without a level marker.
pub const PRINT_TARGET: &str = "lenscout::print";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise every `lenscout*` target logs at
/// `info`, raised by `-v`/`-vv` and lowered by `-q`; everything else at
/// `warn`.
pub fn init_logging(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose, quiet)))?;

    let indicatif_layer = IndicatifLayer::new().with_progress_style(spinner::style()?);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(LenscoutFormatter)
        .with_writer(indicatif_layer.get_stderr_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .try_init()?;

    Ok(())
}

fn default_directives(verbose: u8, quiet: u8) -> String {
    let level: &str = match (quiet, verbose) {
        (1.., _) => "warn",
        (0, 0) => "info",
        (0, 1) => "debug",
        (0, _) => "trace",
    };
    format!("warn,lenscout={level},{PRINT_TARGET}=info")
}

pub struct LenscoutFormatter;

impl<S, N> FormatEvent<S, N> for LenscoutFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut fields = EventFields::default();
        event.record(&mut fields);

        if let Some(raw) = fields.raw {
            return writeln!(writer, "{raw}");
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *event.metadata().level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO if fields.success => ("[+]", |s| s.green().bold()),
                Level::INFO => ("[*]", |s| s.cyan()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} {}", color_func(symbol.into()), fields.message)?;
        for extra in &fields.extra {
            write!(writer, " {}", extra.dimmed())?;
        }

        writeln!(writer)
    }
}

/// The parts of an event the formatter cares about.
#[derive(Default)]
struct EventFields {
    message: String,
    raw: Option<String>,
    success: bool,
    extra: Vec<String>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "raw_msg" => self.raw = Some(value.to_string()),
            "status" => self.success = value == "success",
            name => self.extra.push(format!("{name}={value}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "raw_msg" => self.raw = Some(format!("{value:?}")),
            name => self.extra.push(format!("{name}={value:?}")),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
