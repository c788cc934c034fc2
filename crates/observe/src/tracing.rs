use {
    crate::{config::Config, panic_hook},
    std::{io::IsTerminal, sync::Once},
    time::macros::format_description,
    tracing::Level,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Installs the global tracing subscriber and the panic hook.
///
/// `env_filter` uses the directive syntax documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    panic_hook::install();
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(config: &Config) {
    // The subscriber is a global object so installing it a second time from
    // another test thread would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| initialize(config));
}

fn set_tracing_subscriber(config: &Config) {
    let stderr_threshold = config.stderr_threshold.unwrap_or(Level::ERROR);
    let env_filter = EnvFilter::try_new(&config.env_filter).unwrap_or_else(|err| {
        eprintln!(
            "invalid log filter {:?} ({err}), falling back to \"info\"",
            config.env_filter
        );
        EnvFilter::new("info")
    });

    macro_rules! writer {
        ($threshold:expr) => {
            std::io::stderr
                .with_max_level($threshold)
                .or_else(std::io::stdout)
        };
    }
    macro_rules! timer {
        () => {
            UtcTime::new(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
        };
    }

    let fmt_layer = if config.use_json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer!(stderr_threshold))
            .with_timer(timer!())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer!(stderr_threshold))
            .with_timer(timer!())
            .with_ansi(std::io::stdout().is_terminal())
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .init();
    tracing::debug!(
        filter = %config.env_filter,
        json = config.use_json_format,
        "initialized logging"
    );
}
