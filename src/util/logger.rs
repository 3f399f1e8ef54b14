use std::fs;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A pair of daily-rolling files, plain text and JSON, sharing one level.
struct LogStream {
    dir: &'static str,
    prefix: &'static str,
    level: String,
}

impl LogStream {
    fn layers(&self, guards: &mut Vec<WorkerGuard>) -> std::io::Result<Vec<BoxedLayer>> {
        let json_dir = format!("{}/json", self.dir);
        fs::create_dir_all(&json_dir)?;

        let (text, text_guard) = non_blocking(rolling::daily(self.dir, format!("{}.log", self.prefix)));
        let (json, json_guard) = non_blocking(rolling::daily(&json_dir, format!("{}.json", self.prefix)));
        guards.push(text_guard);
        guards.push(json_guard);

        Ok(vec![
            fmt::layer()
                .with_writer(text)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new(&self.level))
                .boxed(),
            fmt::layer()
                .json()
                .with_writer(json)
                .with_file(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new(&self.level))
                .boxed(),
        ])
    }
}

/// Console output plus the general and error log streams under `logs/`.
/// Dropping the value stops the background writers, so hold it for the
/// lifetime of the process.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let streams = [
            LogStream {
                dir: "logs",
                prefix: "shipdesk-backend",
                level: std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            },
            LogStream {
                dir: "logs/error",
                prefix: "shipdesk-backend-error",
                level: std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string()),
            },
        ];

        let console_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shipdesk_backend=debug"));
        let mut layers: Vec<BoxedLayer> = vec![fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(console_filter)
            .boxed()];

        let mut guards = Vec::with_capacity(streams.len() * 2);
        for stream in &streams {
            layers.extend(stream.layers(&mut guards)?);
        }

        tracing_subscriber::registry().with(layers).try_init()?;
        Ok(Logger { guards })
    }
}
