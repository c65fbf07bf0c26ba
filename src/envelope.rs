use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::row::Row;

/// Kind of change, encoded on the wire as a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "c")]
    Insert,
    #[serde(rename = "u")]
    Update,
    #[serde(rename = "d")]
    Delete,
    #[serde(rename = "r")]
    Read,
}

impl Operation {
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Insert => "c",
            Operation::Update => "u",
            Operation::Delete => "d",
            Operation::Read => "r",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" | "insert" | "create" => Ok(Operation::Insert),
            "u" | "update" => Ok(Operation::Update),
            "d" | "delete" => Ok(Operation::Delete),
            "r" | "read" => Ok(Operation::Read),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

/// Origin of a change event. Field order matches [`crate::schema::source_schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub version: String,
    pub name: String,
    pub server_id: i64,
    pub ts_sec: i64,
    pub gtid: Option<String>,
    pub file: String,
    pub pos: i64,
    pub row: i32,
    pub snapshot: Option<bool>,
    pub thread: Option<i64>,
    pub db: String,
    pub table: String,
}

impl SourceMetadata {
    /// `ts_sec` is the time the change happened at the source, in epoch seconds.
    /// Position fields start zeroed and optional fields absent.
    pub fn new(name: String, server_id: i64, ts_sec: i64, db: String, table: String) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name,
            server_id,
            ts_sec,
            gtid: None,
            file: String::new(),
            pos: 0,
            row: 0,
            snapshot: None,
            thread: None,
            db,
            table,
        }
    }

    /// Binlog file, offset within it, and row index within the event.
    pub fn with_position(mut self, file: String, pos: i64, row: i32) -> Self {
        self.file = file;
        self.pos = pos;
        self.row = row;
        self
    }

    pub fn with_gtid(mut self, gtid: String) -> Self {
        self.gtid = Some(gtid);
        self
    }

    pub fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_thread(mut self, thread: i64) -> Self {
        self.thread = Some(thread);
        self
    }
}

/// Payload of one change event.
///
/// No relationship between `op` and the presence of `before`/`after` is
/// enforced; that is the caller's call.
///
/// Encode with [`crate::serializer::serialize_envelope`]. Going through
/// `serde_json::to_value` sorts row members by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub before: Option<Row>,
    pub after: Option<Row>,
    pub source: SourceMetadata,
    pub op: Operation,
    pub ts_ms: i64,
}

/// Composes the parts of a change event into an [`Envelope`].
pub fn assemble(
    before: Option<Row>,
    after: Option<Row>,
    source: SourceMetadata,
    op: Operation,
    ts_ms: i64,
) -> Envelope {
    Envelope {
        before,
        after,
        source,
        op,
        ts_ms,
    }
}
