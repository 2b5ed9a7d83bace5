use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

// Crate name shared by the library and the binary.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Diagnostics go to stderr so stdout and the environment file stay clean.
/// Records from dependencies are only shown at error level.
struct StderrLogger {
    level: AtomicUsize,
}

impl StderrLogger {
    const fn new() -> Self {
        Self {
            level: AtomicUsize::new(LevelFilter::Warn as usize),
        }
    }

    fn current_level(&self) -> LevelFilter {
        level_from_usize(self.level.load(Ordering::Relaxed))
    }
}

fn level_from_usize(val: usize) -> LevelFilter {
    match val {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if !is_own_target(metadata.target()) && metadata.level() > Level::Error {
            return false;
        }
        metadata.level() <= self.current_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(io::stderr(), "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(CRATE_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

static LOGGER: StderrLogger = StderrLogger::new();

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

pub fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = level_for(verbose);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    LOGGER.level.store(level as usize, Ordering::Relaxed);
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Warn);
    }

    #[test]
    fn test_level_from_usize() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ] {
            assert_eq!(level_from_usize(level as usize), level);
        }
    }

    fn metadata(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_is_own_target() {
        assert!(is_own_target("setup_network_environment"));
        assert!(is_own_target("setup_network_environment::route"));
        assert!(!is_own_target("setup_network_environment_extra"));
        assert!(!is_own_target("netlink_packet_route::link"));
    }

    #[test]
    fn test_enabled_filters_dependency_records() {
        let logger = StderrLogger::new();
        assert!(logger.enabled(&metadata(Level::Warn, "setup_network_environment::route")));
        assert!(!logger.enabled(&metadata(Level::Info, "setup_network_environment::route")));
        assert!(!logger.enabled(&metadata(Level::Warn, "netlink_packet_route::link")));
        assert!(logger.enabled(&metadata(Level::Error, "netlink_packet_route::link")));

        logger
            .level
            .store(LevelFilter::Debug as usize, Ordering::Relaxed);
        assert!(logger.enabled(&metadata(Level::Debug, "setup_network_environment::netlink")));
        assert!(!logger.enabled(&metadata(Level::Debug, "rtnetlink::handle")));
    }
}
