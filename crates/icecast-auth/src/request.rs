//! The authentication request record and its accumulator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::parse::{HeaderLine, ParsedLine};

/// Header keys every request exposes, whether or not they were sent.
pub const KNOWN_KEYS: [&str; 5] = ["mountpoint", "user", "pass", "agent", "referer"];

/// One authentication attempt as reported by the media server.
///
/// The record is an open mapping from lowercase header key to value. The
/// well-known keys have typed accessors that return `None` while unset,
/// which is distinct from a header sent with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    date: DateTime<Utc>,
    fields: BTreeMap<String, String>,
}

impl AuthRequest {
    /// Create an empty request stamped with `date`.
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    /// When the adapter was constructed.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The construction time in HTTP date form, e.g.
    /// `Tue, 20 Oct 2026 09:00:00 GMT`.
    pub fn date_string(&self) -> String {
        self.date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// The mount the client asked for.
    pub fn mountpoint(&self) -> Option<&str> {
        self.get("mountpoint")
    }

    /// The user name; `Some("")` if the header was sent without a value.
    pub fn user(&self) -> Option<&str> {
        self.get("user")
    }

    /// The password; `Some("")` if the header was sent without a value.
    pub fn pass(&self) -> Option<&str> {
        self.get("pass")
    }

    /// The client's user agent, percent-decoded.
    pub fn agent(&self) -> Option<&str> {
        self.get("agent")
    }

    /// The client's referer, percent-decoded.
    pub fn referer(&self) -> Option<&str> {
        self.get("referer")
    }

    /// Look up any header by key. The key is matched case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.fields.get(key.trim()).map(String::as_str)
    }

    /// Iterate over every header that was received, ordered by key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Store a header, replacing any earlier value for the same key.
    pub fn insert(&mut self, header: HeaderLine) {
        let HeaderLine { key, value } = header;
        self.fields.insert(key, value);
    }
}

impl Serialize for AuthRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let extra = self
            .fields
            .iter()
            .filter(|(k, _)| *k != "date" && !KNOWN_KEYS.contains(&k.as_str()));

        let mut map = serializer.serialize_map(None)?;
        match self.fields.get("date") {
            Some(date) => map.serialize_entry("date", date)?,
            None => map.serialize_entry("date", &self.date_string())?,
        }
        for key in KNOWN_KEYS {
            map.serialize_entry(key, &self.fields.get(key))?;
        }
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Lifecycle of an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Accepting header lines.
    Reading,
    /// The terminator was seen; all further input is ignored.
    Closed,
}

/// Builds an [`AuthRequest`] from parsed lines.
///
/// The request is handed out exactly once, on the first terminator line.
#[derive(Debug)]
pub struct RequestAccumulator {
    state: AdapterState,
    request: AuthRequest,
}

impl RequestAccumulator {
    /// Start reading a request stamped with `date`.
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            state: AdapterState::Reading,
            request: AuthRequest::new(date),
        }
    }

    /// Whether the terminator has been seen yet.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Feed one parsed line.
    ///
    /// Returns the finished request when `line` is the first terminator,
    /// otherwise `None`.
    pub fn feed(&mut self, line: ParsedLine) -> Option<AuthRequest> {
        if self.state == AdapterState::Closed {
            return None;
        }

        match line {
            ParsedLine::Header(header) => {
                self.request.insert(header);
                None
            }
            ParsedLine::Terminator => {
                self.state = AdapterState::Closed;
                Some(self.request.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap()
    }

    fn feed_lines(acc: &mut RequestAccumulator, lines: &[&str]) -> Vec<AuthRequest> {
        lines
            .iter()
            .filter_map(|line| acc.feed(parse_line(line).unwrap()))
            .collect()
    }

    #[test]
    fn known_keys_start_unset() {
        let request = AuthRequest::new(date());
        for key in KNOWN_KEYS {
            assert_eq!(request.get(key), None);
        }
        assert_eq!(request.date(), date());
    }

    #[test]
    fn date_string_is_http_date() {
        let request = AuthRequest::new(date());
        assert_eq!(request.date_string(), "Tue, 20 Oct 2026 09:00:00 GMT");
    }

    #[test]
    fn last_write_wins() {
        let mut acc = RequestAccumulator::new(date());
        let published = feed_lines(&mut acc, &["user: a", "USER: b", ""]);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].user(), Some("b"));
    }

    #[test]
    fn publishes_once_and_ignores_later_lines() {
        let mut acc = RequestAccumulator::new(date());
        let published = feed_lines(
            &mut acc,
            &["mountpoint: /a", "", "mountpoint: /b", "", "also terminator"],
        );
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].mountpoint(), Some("/a"));
        assert_eq!(acc.state(), AdapterState::Closed);
    }

    #[test]
    fn any_colon_free_line_terminates() {
        let mut acc = RequestAccumulator::new(date());
        assert_eq!(acc.state(), AdapterState::Reading);
        let published = feed_lines(&mut acc, &["user: a", "not a header", "pass: b"]);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].pass(), None);
    }

    #[test]
    fn empty_value_is_not_unset() {
        let mut acc = RequestAccumulator::new(date());
        let published = feed_lines(&mut acc, &["User:", ""]);
        assert_eq!(published[0].user(), Some(""));
        assert_eq!(published[0].pass(), None);
    }

    #[test]
    fn get_is_case_insensitive() {
        let mut acc = RequestAccumulator::new(date());
        let published = feed_lines(&mut acc, &["ip: 127.0.0.1", ""]);
        assert_eq!(published[0].get("IP"), Some("127.0.0.1"));
        assert_eq!(
            published[0].fields().collect::<Vec<_>>(),
            vec![("ip", "127.0.0.1")]
        );
    }

    #[test]
    fn date_header_does_not_replace_construction_time() {
        let mut acc = RequestAccumulator::new(date());
        let published = feed_lines(&mut acc, &["date: yesterday", ""]);
        assert_eq!(published[0].date(), date());
        assert_eq!(published[0].get("date"), Some("yesterday"));
    }
}
