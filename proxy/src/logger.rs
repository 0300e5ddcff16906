//! Logging setup: `thread_<id>: [LEVEL] <message>` lines, info undecorated,
//! error routed to stderr and everything else to stdout.

use std::fmt;
use std::io;

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Formats an event as `thread_<id>: [LEVEL] <message>`, dropping the level
/// tag for `INFO` events.
pub struct ProxyFormatter;

impl<S, N> FormatEvent<S, N> for ProxyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let thread_id = format!("{:?}", std::thread::current().id());
        let thread_id = thread_id
            .trim_start_matches("ThreadId(")
            .trim_end_matches(')');

        match *event.metadata().level() {
            Level::INFO => write!(writer, "thread_{thread_id}: ")?,
            level => write!(writer, "thread_{thread_id}: [{level}] ")?,
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Routes `ERROR` events to stderr and everything else to stdout.
#[derive(Clone, Default)]
pub struct LevelSplitWriter;

impl<'a> MakeWriter<'a> for LevelSplitWriter {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        Box::new(io::stdout())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        if *meta.level() == Level::ERROR {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        }
    }
}

/// Installs the global subscriber. `verbose` gates `DEBUG`-level output; the
/// format and destinations are otherwise fixed.
pub fn init(verbose: bool) {
    let filter = EnvFilter::new(if verbose { "debug" } else { "info" });
    let subscriber = tracing_subscriber::fmt()
        .event_format(ProxyFormatter)
        .with_writer(LevelSplitWriter)
        .with_env_filter(filter)
        .finish();
    // Only the first call in a process wins; tests that install a subscriber
    // of their own may run after this one without a panic.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
