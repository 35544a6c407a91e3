use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use msdk_natives::{MsdkNatives, NativesError};

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy()
}

/// Log to STDERR, and to `log_file` too if given. The returned guard must be held
/// until the program exits so buffered file output is flushed.
fn configure_log(log_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(fs::File::create(path)?);
            let layer = fmt::layer()
                .compact()
                .with_ansi(false)
                .with_thread_ids(true)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(writer)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(io::stderr)
                .with_filter(env_filter()),
        )
        .with(file_layer)
        .init();
    Ok(guard)
}

fn main() -> Result<(), NativesError> {
    let args = MsdkNatives::parse();
    let _guard = configure_log(args.log_file.as_deref())?;
    if let Err(e) = args.main() {
        error!("{e}");
        return Err(e);
    }
    Ok(())
}
