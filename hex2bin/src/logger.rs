use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(max_level))
}

pub struct Logger {
    pub verbose: bool,
}

impl Logger {
    fn max_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.max_level() {
            return false;
        }

        let chunks: Vec<&str> = metadata.target().split("::").collect();
        matches!(chunks[..], ["intel_hex", ..] | ["hex2bin", ..])
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if record.level() < Level::Info {
                eprint!("{} - ", record.level());
            }

            eprintln!("{}", record.args());
        }
    }

    fn flush(&self) {}
}
