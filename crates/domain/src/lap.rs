use derive_more::Display;

pub const CENTISECONDS_PER_SECOND: u64 = 100;
pub const CENTISECONDS_PER_MINUTE: u64 = 60 * CENTISECONDS_PER_SECOND;

/// A split time in minutes, seconds and centiseconds.
///
/// The components are not normalized. A lap with `seconds >= 60` or
/// `centi_seconds >= 100` is kept as is and contributes a positionally
/// weighted value to [`Lap::total_time`].
#[derive(Display, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{minutes:02}:{seconds:02}.{centi_seconds:02}")]
pub struct Lap {
    pub minutes: u32,
    pub seconds: u32,
    pub centi_seconds: u32,
}

impl Lap {
    #[must_use]
    pub const fn new(minutes: u32, seconds: u32, centi_seconds: u32) -> Self {
        Self {
            minutes,
            seconds,
            centi_seconds,
        }
    }

    /// Splits a number of centiseconds into normalized components.
    #[must_use]
    pub fn from_centiseconds(total: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let (seconds, centi_seconds) = (
            ((total % CENTISECONDS_PER_MINUTE) / CENTISECONDS_PER_SECOND) as u32,
            (total % CENTISECONDS_PER_SECOND) as u32,
        );
        Self {
            minutes: u32::try_from(total / CENTISECONDS_PER_MINUTE).unwrap_or(u32::MAX),
            seconds,
            centi_seconds,
        }
    }

    /// Total time in centiseconds.
    #[must_use]
    pub fn total_time(&self) -> u64 {
        u64::from(self.minutes) * CENTISECONDS_PER_MINUTE
            + u64::from(self.seconds) * CENTISECONDS_PER_SECOND
            + u64::from(self.centi_seconds)
    }

    /// Component-wise absolute difference.
    ///
    /// Borrows across second or minute boundaries are not taken into account,
    /// e.g. `00:00.90` and `00:01.10` differ by `00:01.80`.
    #[must_use]
    pub fn componentwise_delta(&self, other: &Lap) -> Self {
        Self {
            minutes: self.minutes.abs_diff(other.minutes),
            seconds: self.seconds.abs_diff(other.seconds),
            centi_seconds: self.centi_seconds.abs_diff(other.centi_seconds),
        }
    }

    /// Time elapsed from `earlier` to `self`, saturating at zero.
    #[must_use]
    pub fn duration_since(&self, earlier: &Lap) -> Self {
        Self::from_centiseconds(self.total_time().saturating_sub(earlier.total_time()))
    }
}

/// Formats a time component as used by the stopwatch digits.
#[must_use]
pub fn two_digits(value: u32) -> String {
    format!("{value:02}")
}
