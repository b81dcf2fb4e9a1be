use std::collections::HashMap;
use std::io::stdout;
use std::path::PathBuf;

use tracing::dispatcher::Dispatch;
use tracing::Level as TraceLevel;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer as FmtLayer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::{AppBasepathCfg, AppLogAlias, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg};
use crate::constant::logging::{Destination, Level};

pub type AppLogLevel = Level;

/// Per-module log dispatchers built from the `logging` section of the
/// configuration, the alias of each logger is the module path which emits
/// the events, e.g. `catalog_price::usecase::special_price`
pub struct AppLogContext {
    dispatchers: HashMap<AppLogAlias, Dispatch>,
    // dropping a guard stops its background writer thread, keep them as long
    // as any dispatcher is alive
    _guards: Vec<WorkerGuard>,
}

#[macro_export]
macro_rules! to_3rdparty_level {
    ($lvlin:expr) => {
        match $lvlin {
            $crate::logging::AppLogLevel::TRACE => tracing::Level::TRACE,
            $crate::logging::AppLogLevel::DEBUG => tracing::Level::DEBUG,
            $crate::logging::AppLogLevel::INFO => tracing::Level::INFO,
            $crate::logging::AppLogLevel::WARNING => tracing::Level::WARN,
            $crate::logging::AppLogLevel::ERROR | $crate::logging::AppLogLevel::FATAL => {
                tracing::Level::ERROR
            }
        }
    };
}

struct LogHandler {
    writer: NonBlocking,
    min_level: TraceLevel,
}

fn handler_writer(basepath: &AppBasepathCfg, cfg: &AppLogHandlerCfg) -> (NonBlocking, WorkerGuard) {
    let rpath = match (&cfg.destination, cfg.path.as_ref()) {
        (Destination::LOCALFS, Some(p)) => p,
        _others => return tracing_appender::non_blocking(stdout()),
    };
    let fullpath: PathBuf = [basepath.system.as_str(), rpath.trim_start_matches('/')]
        .into_iter()
        .collect();
    match (fullpath.parent(), fullpath.file_name()) {
        (Some(dir), Some(fname)) => {
            let appender = RollingFileAppender::new(Rotation::NEVER, dir, fname);
            tracing_appender::non_blocking(appender)
        }
        _others => {
            println!("[WARN] invalid log file path: {:?}, switch to console", fullpath);
            tracing_appender::non_blocking(stdout())
        }
    }
}

fn build_dispatcher(cfg: &AppLoggerCfg, handlers: &HashMap<AppLogAlias, LogHandler>) -> Dispatch {
    let override_lvl = cfg.level.as_ref().map(|l| to_3rdparty_level!(l));
    let layers = cfg
        .handlers
        .iter()
        .filter_map(|alias| handlers.get(alias))
        .map(|h| {
            let lvl = override_lvl.unwrap_or(h.min_level);
            FmtLayer::new()
                .with_writer(h.writer.clone())
                .with_file(false) // hide full source path
                .with_line_number(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(LevelFilter::from_level(lvl))
        })
        .collect::<Vec<_>>();
    Dispatch::new(Registry::default().with(layers))
}

impl AppLogContext {
    pub fn new(basepath: &AppBasepathCfg, cfg: &AppLoggingCfg) -> Self {
        let mut guards = Vec::with_capacity(cfg.handlers.len());
        let mut handlers = HashMap::new();
        for c in cfg.handlers.iter() {
            let (writer, guard) = handler_writer(basepath, c);
            guards.push(guard);
            let min_level = to_3rdparty_level!(&c.min_level);
            handlers.insert(c.alias.clone(), LogHandler { writer, min_level });
        }
        let dispatchers = cfg
            .loggers
            .iter()
            .map(|c| (c.alias.clone(), build_dispatcher(c, &handlers)))
            .collect();
        Self {
            dispatchers,
            _guards: guards,
        }
    }

    pub fn get_assigner(&self, key: &str) -> Option<&Dispatch> {
        self.dispatchers.get(&key.to_string())
    }
} // end of impl AppLogContext

/// Emit an event through the dispatcher registered for the calling module,
/// events from modules without dispatcher are printed to standard output.
#[macro_export]
macro_rules! app_log_event {
    ( $ctx:ident, $lvl:expr, $($arg:tt)+ ) => {{
        const MOD_PATH: &str = module_path!();
        match $ctx.get_assigner(MOD_PATH) {
            Some(d) => {
                const LVL: tracing::Level = $crate::logging::to_3rdparty_level!($lvl);
                tracing::dispatcher::with_default(d, || tracing::event!(LVL, $($arg)+));
            }
            None => {
                println!("[WARN] no log dispatcher for module {}", MOD_PATH);
                println!($($arg)+);
            }
        }
    }};
}

pub use app_log_event;
pub use to_3rdparty_level;
