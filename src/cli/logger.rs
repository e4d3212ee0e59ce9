use std::{
    error::Error,
    fmt,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    panic,
    sync::Mutex,
};

use {
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    log::{LevelFilter, Record},
    log4rs::{
        append::file::FileAppender,
        config::{Appender, Config, Root},
        encode::{pattern::PatternEncoder, Encode, Write as LogWrite},
        Handle,
    },
};

static DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

static LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}";

lazy_static! {
    static ref PREFIX_ERR: ColoredString = "error".bright_red();
    static ref PREFIX_FATAL: ColoredString = "fatal".on_bright_red();
    static ref PREFIX_LEX: ColoredString = "  LEX".bright_blue();
    static ref PREFIX_LEX_OK: ColoredString = "   OK".bright_green();
    static ref PREFIX_LEX_ERR: ColoredString = "ERROR".bright_red();
    static ref LOGGER_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);
}

macro_rules! catch_fatal {
    ($body: block, $catch: block) => {
        panic::set_hook(Box::new(|info| {
            if !info.payload().is::<Fatal>() {
                use backtrace::Backtrace;
                let backtrace = Backtrace::new();

                println!("{}", info);
                error!("{}", info);
                println!("{:?}", backtrace);
                error!("{:?}", backtrace);
                println!("Something terrible has happened, this is a bug in munch");
                error!("Something terrible has happened, this is a bug in munch");
            }
        }));

        if let Err(err) = panic::catch_unwind(panic::AssertUnwindSafe(|| $body)) {
            if err.is::<Fatal>() {
                $catch

                #[allow(unreachable_code)] {
                    let _ = panic::take_hook();
                }
            } else {
                panic::resume_unwind(err)
            }
        }
    };
}

#[derive(Debug)]
pub enum Fatal {
    Error,
}

impl fmt::Display for Fatal {
    fn fmt(&self, _: &mut fmt::Formatter) -> fmt::Result {
        Ok(())
    }
}

impl Error for Fatal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

pub fn init(matches: &ArgMatches) {
    if let Some(log_file) = matches.value_of("logfile") {
        let level = level_of(matches.value_of("loglevel"));
        match file_config(log_file, level) {
            Ok(config) => install(config),
            Err(err) => fatal(&format!("Failed to configure logging to {}: {}", log_file, err)),
        }
    }

    info!(
        "
                            _
 _ __ ___  _   _ _ __   ___| |__
| '_ ` _ \\| | | | '_ \\ / __| '_ \\
| | | | | | |_| | | | | (__| | | |
|_| |_| |_|\\__,_|_| |_|\\___|_| |_|
"
    );
}

fn level_of(name: Option<&str>) -> LevelFilter {
    match name {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => DEFAULT_LOG_LEVEL,
    }
}

fn file_config(log_file: &str, level: LevelFilter) -> Result<Config, Box<dyn Error>> {
    let encoder = SanitizedEncoder::wrap(PatternEncoder::new(LOG_PATTERN));
    let appender = FileAppender::builder()
        .encoder(Box::new(encoder))
        .build(log_file)?;

    Ok(Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level))?)
}

fn install(config: Config) {
    let mut handle = LOGGER_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    match *handle {
        Some(ref handle) => handle.set_config(config),
        None => match log4rs::init_config(config) {
            Ok(installed) => *handle = Some(installed),
            Err(err) => fatal(&format!("Failed to initialize logger: {}", err)),
        },
    }
}

pub fn info(string: &str) {
    println!("{}", string);
    info!("{}", string);
}

pub fn err(string: &str) {
    println!("{}: {}", *PREFIX_ERR, string);
    error!("{}", string);
}

pub fn fatal(string: &str) -> ! {
    println!("{}: {}", *PREFIX_FATAL, string);
    error!("{}", string);
    panic::panic_any(Fatal::Error)
}

pub fn lex(string: &str) {
    println!("{}| {}", *PREFIX_LEX, string);
    debug!("Lexing {} ...", string);
}

pub fn lex_ok(string: &str) {
    println!("{}| {}", *PREFIX_LEX_OK, string);
    debug!("Finished lexing {}", string);
}

pub fn lex_err(string: &str) {
    println!("{}| {}", *PREFIX_LEX_ERR, string);
    error!("{}", string);
}

pub fn token(string: &str) {
    println!("{}", string);
    trace!("{}", string);
}

#[derive(Debug)]
struct SanitizedEncoder {
    encoder: Box<dyn Encode>,
}

impl SanitizedEncoder {
    fn wrap(encoder: impl Encode) -> Self {
        SanitizedEncoder {
            encoder: Box::new(encoder),
        }
    }
}

impl Encode for SanitizedEncoder {
    fn encode(&self, w: &mut dyn LogWrite, record: &Record) -> anyhow::Result<()> {
        let mut writer = SanitizedLogWriter::new();
        self.encoder.encode(&mut writer, record)?;
        writer.sanitize_write(w)?;
        Ok(())
    }
}

struct SanitizedLogWriter {
    cursor: Cursor<Vec<u8>>,
}

impl SanitizedLogWriter {
    fn new() -> Self {
        SanitizedLogWriter {
            cursor: Cursor::new(Vec::new()),
        }
    }

    fn sanitize_write(&mut self, w: &mut dyn LogWrite) -> io::Result<()> {
        let mut buf = Vec::new();
        self.cursor.seek(SeekFrom::Start(0))?;
        self.cursor.read_to_end(&mut buf)?;

        let sanitized = strip_ansi_escapes::strip(buf)?;
        w.write_all(&sanitized)
    }
}

impl Write for SanitizedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.cursor.flush()
    }
}

impl LogWrite for SanitizedLogWriter {}
