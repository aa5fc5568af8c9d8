use shared::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Units a sleep request may be expressed in. There is no default unit.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
        }
    }
}

/// A validated `(amount, unit)` pair. Adapters only ever see this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationRequest {
    amount: u64,
    unit: TimeUnit,
}

impl DurationRequest {
    /// Call-boundary check for raw caller input.
    pub fn new(amount: i64, unit: Option<TimeUnit>) -> Result<Self> {
        let unit = unit.ok_or_else(|| Error::precondition("time unit must be present"))?;
        let amount = u64::try_from(amount)
            .map_err(|_| Error::precondition(format!("sleep amount must be >= 0 (got {})", amount)))?;
        Ok(Self { amount, unit })
    }

    pub fn of(amount: u64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn duration(&self) -> Duration {
        self.unit.to_duration(self.amount)
    }
}

impl fmt::Display for DurationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.as_str())
    }
}

/// Non-empty cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::precondition("cache key must be non-empty"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a cache read. A stored empty string is `Hit("")`, never `Miss`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Hit(String),
    Miss,
}

impl Lookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Lookup::Hit(v) => Some(v),
            Lookup::Miss => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Lookup::Hit(v) => Some(v),
            Lookup::Miss => None,
        }
    }
}

impl From<Option<String>> for Lookup {
    fn from(value: Option<String>) -> Self {
        value.map_or(Lookup::Miss, Lookup::Hit)
    }
}

/// Identifies endpoint semantics in a way that's stable for logs and routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HelloMode {
    Platform,
    Virtual,
    Reactive,
}

impl HelloMode {
    pub const ALL: [HelloMode; 3] = [HelloMode::Platform, HelloMode::Virtual, HelloMode::Reactive];

    pub fn label(self) -> &'static str {
        match self {
            HelloMode::Platform => "platform",
            HelloMode::Virtual => "virtual",
            HelloMode::Reactive => "reactive",
        }
    }

    pub fn endpoint_tag(self) -> &'static str {
        match self {
            HelloMode::Platform => "/hello/platform",
            HelloMode::Virtual => "/hello/virtual",
            HelloMode::Reactive => "/hello/reactive",
        }
    }

    pub fn response_prefix(self) -> &'static str {
        match self {
            HelloMode::Platform => "Hello from Rust platform REST ",
            HelloMode::Virtual => "Hello from Rust virtual REST ",
            HelloMode::Reactive => "Hello from Rust reactive REST ",
        }
    }
}

impl FromStr for HelloMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HelloMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::precondition(format!("unknown hello mode '{}'", s)))
    }
}

/// Cache adapter selection plus its clamped entry count.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub kind: String,
    pub size: usize,
}

impl CacheConfig {
    /// Used when the configured size is missing or below `MIN_SIZE`.
    pub const DEFAULT_SIZE: usize = 50_000;
    pub const MIN_SIZE: i64 = 1;
    /// Caps prefill to protect host memory during benchmarks.
    pub const MAX_SIZE: usize = 5_000_000;

    pub fn new(kind: impl Into<String>, raw_size: i64) -> Self {
        Self {
            kind: kind.into(),
            size: Self::clamp_size(raw_size),
        }
    }

    pub fn clamp_size(raw: i64) -> usize {
        if raw < Self::MIN_SIZE {
            return Self::DEFAULT_SIZE;
        }
        usize::try_from(raw).map_or(Self::MAX_SIZE, |n| n.min(Self::MAX_SIZE))
    }
}
