use serde::Serialize;
use std::fmt;

/// Display unit for a duration measured in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
}

impl TimeUnit {
    /// Unit in which `nanos`, rounded to two decimals, falls in [1, 1000).
    pub fn for_magnitude(nanos: f64) -> Self {
        let nanos = nanos.abs();
        let unit = if nanos < 1e3 {
            TimeUnit::Nanos
        } else if nanos < 1e6 {
            TimeUnit::Micros
        } else if nanos < 1e9 {
            TimeUnit::Millis
        } else {
            TimeUnit::Seconds
        };
        // 999.996 rounds up to 1000.00; show it as 1.00 of the next unit.
        match unit.next() {
            Some(next) if unit.hundredths(nanos) >= 100_000.0 => next,
            _ => unit,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            TimeUnit::Nanos => Some(TimeUnit::Micros),
            TimeUnit::Micros => Some(TimeUnit::Millis),
            TimeUnit::Millis => Some(TimeUnit::Seconds),
            TimeUnit::Seconds => None,
        }
    }

    fn hundredths(self, nanos: f64) -> f64 {
        (nanos * 100.0 / self.nanos_per_unit()).round()
    }

    pub fn nanos_per_unit(self) -> f64 {
        match self {
            TimeUnit::Nanos => 1.0,
            TimeUnit::Micros => 1e3,
            TimeUnit::Millis => 1e6,
            TimeUnit::Seconds => 1e9,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanos => "ns",
            TimeUnit::Micros => "µs",
            TimeUnit::Millis => "ms",
            TimeUnit::Seconds => "s",
        }
    }

    pub fn scale(self, nanos: f64) -> f64 {
        nanos / self.nanos_per_unit()
    }

    /// `nanos` in this unit, two decimals, rounded half away from zero.
    pub fn format(self, nanos: f64) -> String {
        // Scale into hundredths before rounding: 17885 ns is exactly
        // 1788.5 hundredths of a µs, while 17.885 has no exact f64.
        let hundredths = self.hundredths(nanos);
        let sign = if hundredths < 0.0 { "-" } else { "" };
        let hundredths = hundredths.abs() as u64;
        format!("{}{}.{:02}{}", sign, hundredths / 100, hundredths % 100, self.suffix())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Format with the unit chosen from the value's own magnitude.
pub fn format_nanos(nanos: f64) -> String {
    TimeUnit::for_magnitude(nanos).format(nanos)
}
