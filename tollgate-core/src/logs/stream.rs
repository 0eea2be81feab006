use crate::logs::error::LogError;
use crate::logs::format::LogFormat;
use crate::logs::locate::LogSource;
use crate::logs::types::LogRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::vec;
use tracing::debug;

struct OpenLog {
    path: PathBuf,
    format: LogFormat,
    reader: BufReader<File>,
    buf: Vec<u8>,
    parsed: u64,
    skipped: u64,
}

/// Single-pass iterator over the records of several access logs, in source
/// order then line order.
///
/// A file is opened when the iterator reaches it and closed before the next
/// one is opened. Lines that do not fit the format are skipped. The first
/// unreadable file ends the stream with an error.
pub struct LogRecords {
    pending: vec::IntoIter<LogSource>,
    current: Option<OpenLog>,
    failed: bool,
}

impl LogRecords {
    pub fn new(sources: Vec<LogSource>) -> Self {
        Self {
            pending: sources.into_iter(),
            current: None,
            failed: false,
        }
    }

    fn open_next(&mut self) -> Option<Result<(), LogError>> {
        let source = self.pending.next()?;
        match File::open(&source.path) {
            Ok(file) => {
                debug!(path = %source.path.display(), "reading access log");
                self.current = Some(OpenLog {
                    path: source.path,
                    format: source.format,
                    reader: BufReader::new(file),
                    buf: Vec::new(),
                    parsed: 0,
                    skipped: 0,
                });
                Some(Ok(()))
            }
            Err(e) => Some(Err(LogError::unreadable(source.path, e))),
        }
    }
}

impl Iterator for LogRecords {
    type Item = Result<LogRecord, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let Some(log) = self.current.as_mut() else {
                match self.open_next()? {
                    Ok(()) => continue,
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
            };

            log.buf.clear();
            match log.reader.read_until(b'\n', &mut log.buf) {
                Ok(0) => {
                    debug!(
                        path = %log.path.display(),
                        parsed = log.parsed,
                        skipped = log.skipped,
                        "finished access log"
                    );
                    self.current = None;
                }
                Ok(_) => {
                    // Invalid UTF-8 only spoils the line it is on.
                    let line = String::from_utf8_lossy(&log.buf);
                    match log.format.parse_line(&line) {
                        Some(record) => {
                            log.parsed += 1;
                            return Some(Ok(record));
                        }
                        None => log.skipped += 1,
                    }
                }
                Err(e) => {
                    let path = log.path.clone();
                    self.current = None;
                    self.failed = true;
                    return Some(Err(LogError::unreadable(path, e)));
                }
            }
        }
    }
}
