// src/types.rs

use std::borrow::Cow;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

/// Modification time in milliseconds since the Unix epoch.
///
/// `Mtime::NEG_INFINITY` stands for "never changed" and compares lower than
/// any real timestamp, so it is the identity for [`Mtime::max`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mtime(i64);

impl Mtime {
    pub const NEG_INFINITY: Mtime = Mtime(i64::MIN);

    pub fn from_millis(ms: i64) -> Self {
        Mtime(ms)
    }

    pub fn from_system_time(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Mtime(d.as_millis() as i64),
            Err(e) => Mtime(-(e.duration().as_millis() as i64)),
        }
    }

    pub fn millis(self) -> Option<i64> {
        self.is_finite().then_some(self.0)
    }

    pub fn is_finite(self) -> bool {
        self != Mtime::NEG_INFINITY
    }

    /// Read a `$mtime`-style JSON number. Anything else is negative infinity.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_f64) {
            Some(ms) if ms.is_finite() => Mtime(ms as i64),
            _ => Mtime::NEG_INFINITY,
        }
    }

    /// JSON form: the millisecond count, or `null` for negative infinity.
    pub fn to_json(self) -> Value {
        match self.millis() {
            Some(ms) => Value::from(ms),
            None => Value::Null,
        }
    }
}

impl Default for Mtime {
    fn default() -> Self {
        Mtime::NEG_INFINITY
    }
}

impl fmt::Display for Mtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.millis() {
            Some(ms) => write!(f, "{ms}ms"),
            None => f.write_str("-inf"),
        }
    }
}

/// How a file should be read by the load-file pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Text,
    Binary,
}

/// Content flowing through the load and render pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(s) => s.as_bytes(),
            FileContent::Binary(b) => b,
        }
    }

    /// Text view of the content; binary content is decoded lossily.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FileContent::Text(s) => Cow::Borrowed(s),
            FileContent::Binary(b) => String::from_utf8_lossy(b),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            FileContent::Text(s) => s,
            FileContent::Binary(b) => match String::from_utf8(b) {
                Ok(s) => s,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
        }
    }

    /// Binary content that is valid UTF-8 becomes text; anything else is
    /// returned unchanged.
    pub fn textual(self) -> FileContent {
        match self {
            FileContent::Binary(b) => match String::from_utf8(b) {
                Ok(s) => FileContent::Text(s),
                Err(e) => FileContent::Binary(e.into_bytes()),
            },
            text => text,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContent::Text(s) => s.into_bytes(),
            FileContent::Binary(b) => b,
        }
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        FileContent::Text(s)
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        FileContent::Text(s.to_string())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(b: Vec<u8>) -> Self {
        FileContent::Binary(b)
    }
}
