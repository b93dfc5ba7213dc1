use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::intern::FilePool;
use crate::token::SourceLoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
        }
    }
}

/// Overall compilation status. Transitions are monotonic: once a warning has
/// been reported the status never returns to `Ok`, and once an error has been
/// reported it stays `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warn,
    Err,
}

/// One reported message, resolved into plain data for embedders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub col: u32,
    pub level: Level,
    pub message: String,
}

/// Accumulates diagnostics for one compilation. Messages append to a single
/// text buffer as `<file>:<line>:<col>: <level>: <message>` lines and are
/// also kept as structured records.
pub struct DiagSink {
    buffer: String,
    records: Vec<Diagnostic>,
    status: Status,
}

impl DiagSink {
    pub fn new() -> Self {
        DiagSink {
            buffer: String::new(),
            records: Vec::new(),
            status: Status::Ok,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn error_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn report(&mut self, pool: &FilePool, loc: SourceLoc, level: Level, message: String) {
        let file = pool.resolve(loc.file);
        debug!(
            file,
            line = loc.line,
            col = loc.col,
            level = level.as_str(),
            %message,
            "diagnostic"
        );
        self.buffer.push_str(&format!(
            "{}:{}:{}: {}: {}\n",
            file,
            loc.line,
            loc.col,
            level.as_str(),
            message
        ));
        self.records.push(Diagnostic {
            file: file.to_string(),
            line: loc.line,
            col: loc.col,
            level,
            message,
        });
        self.status = match (self.status, level) {
            (_, Level::Error) | (Status::Err, _) => Status::Err,
            (Status::Warn, _) | (_, Level::Warning) => Status::Warn,
            (Status::Ok, Level::Note) => Status::Ok,
        };
    }

    pub fn error(&mut self, pool: &FilePool, loc: SourceLoc, message: String) {
        self.report(pool, loc, Level::Error, message);
    }

    pub fn warning(&mut self, pool: &FilePool, loc: SourceLoc, message: String) {
        self.report(pool, loc, Level::Warning, message);
    }

    pub fn note(&mut self, pool: &FilePool, loc: SourceLoc, message: String) {
        self.report(pool, loc, Level::Note, message);
    }
}

impl Default for DiagSink {
    fn default() -> Self {
        Self::new()
    }
}
