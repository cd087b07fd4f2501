//! Step frequencies and timestamp-index arithmetic.

use crate::error::ForecastError;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;

/// Sampling frequency of a time-indexed table.
///
/// Fixed frequencies step by a constant duration; calendar frequencies
/// (monthly, quarterly, yearly) step by whole months and keep month-end
/// anchoring when the series starts on the last day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Frequency {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl std::str::FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t" | "min" | "minute" | "minutely" => Ok(Frequency::Minutely),
            "h" | "hour" | "hourly" => Ok(Frequency::Hourly),
            "d" | "day" | "daily" => Ok(Frequency::Daily),
            "w" | "week" | "weekly" => Ok(Frequency::Weekly),
            "m" | "ms" | "me" | "month" | "monthly" => Ok(Frequency::Monthly),
            "q" | "qs" | "qe" | "quarter" | "quarterly" => Ok(Frequency::Quarterly),
            "y" | "a" | "ys" | "ye" | "as" | "year" | "yearly" | "annual" => {
                Ok(Frequency::Yearly)
            }
            _ => Err(ForecastError::Configuration(format!(
                "Unknown frequency label '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Frequency {
    /// Short label, as accepted by `FromStr`.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Minutely => "min",
            Frequency::Hourly => "h",
            Frequency::Daily => "d",
            Frequency::Weekly => "w",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
            Frequency::Yearly => "y",
        }
    }

    fn months_per_step(&self) -> Option<u32> {
        match self {
            Frequency::Monthly => Some(1),
            Frequency::Quarterly => Some(3),
            Frequency::Yearly => Some(12),
            _ => None,
        }
    }

    fn fixed_step(&self) -> Option<Duration> {
        match self {
            Frequency::Minutely => Some(Duration::minutes(1)),
            Frequency::Hourly => Some(Duration::hours(1)),
            Frequency::Daily => Some(Duration::days(1)),
            Frequency::Weekly => Some(Duration::weeks(1)),
            _ => None,
        }
    }

    /// Timestamp `steps` periods after `origin`.
    pub fn advance(&self, origin: NaiveDateTime, steps: usize) -> Option<NaiveDateTime> {
        if let Some(step) = self.fixed_step() {
            let steps = i32::try_from(steps).ok()?;
            return origin.checked_add_signed(step * steps);
        }

        let months = self.months_per_step()?.checked_mul(u32::try_from(steps).ok()?)?;
        let shifted = origin.checked_add_months(Months::new(months))?;
        if is_month_end(origin.date()) {
            Some(month_end(shifted.date())?.and_time(origin.time()))
        } else {
            Some(shifted)
        }
    }

    /// `n` consecutive timestamps starting one period after `last`.
    pub fn following(&self, last: NaiveDateTime, n: usize) -> Option<Vec<NaiveDateTime>> {
        (1..=n).map(|k| self.advance(last, k)).collect()
    }

    /// Position of the first timestamp that breaks the regular grid
    /// anchored at `index[0]`, or `None` if the index is gap-free,
    /// duplicate-free and strictly increasing.
    pub fn first_irregularity(&self, index: &[NaiveDateTime]) -> Option<usize> {
        let origin = *index.first()?;
        index
            .iter()
            .enumerate()
            .skip(1)
            .find(|(k, ts)| self.advance(origin, *k) != Some(**ts))
            .map(|(k, _)| k)
    }

    /// Guess the frequency of an index from its most common spacing.
    pub fn infer(index: &[NaiveDateTime]) -> Option<Frequency> {
        if index.len() < 2 {
            return None;
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in index.windows(2) {
            let diff = (w[1] - w[0]).num_seconds();
            if diff > 0 {
                *counts.entry(diff).or_insert(0) += 1;
            }
        }
        let (mode, _) = counts.into_iter().max_by_key(|(_, count)| *count)?;

        const DAY: i64 = 86_400;
        match mode {
            60 => Some(Frequency::Minutely),
            3_600 => Some(Frequency::Hourly),
            DAY => Some(Frequency::Daily),
            d if d == 7 * DAY => Some(Frequency::Weekly),
            d if (28 * DAY..=31 * DAY).contains(&d) => Some(Frequency::Monthly),
            d if (89 * DAY..=92 * DAY).contains(&d) => Some(Frequency::Quarterly),
            d if (365 * DAY..=366 * DAY).contains(&d) => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
