//! Recurrence-rule parsing and occurrence evaluation.
//!
//! Supports the RFC-5545 subset the templates use: `FREQ` with `INTERVAL`,
//! `BYDAY` (single weekday), `BYMONTHDAY` (positive day or `-1` for the last
//! day of the month), `BYMONTH`, `COUNT`, and `UNTIL`. Evaluation is anchored
//! at the template's start date, so interval-based rules stay aligned to the
//! weeks/months the series began on.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

use super::dates;

/// Upper bound on candidate scans when stepping over skipped cycles
/// (short months, non-leap Feb 29).
const MAX_SCAN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A parsed recurrence rule. Construct via [`RecurrenceRule::parse`] or
/// [`RecurrenceRule::parse_or_default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    pub by_day: Option<Weekday>,
    pub by_month_day: Option<i32>,
    pub by_month: Option<u32>,
    pub count: Option<u32>,
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("rule has no FREQ part")]
    MissingFrequency,
    #[error("unsupported rule part `{0}`")]
    UnsupportedPart(String),
    #[error("invalid value `{1}` for {0}")]
    InvalidValue(&'static str, String),
}

impl RecurrenceRule {
    /// The recovery rule for malformed strings: monthly on the 1st.
    pub fn default_monthly() -> Self {
        Self {
            freq: Frequency::Monthly,
            interval: 1,
            by_day: None,
            by_month_day: Some(1),
            by_month: None,
            count: None,
            until: None,
        }
    }

    /// Parses a rule string such as `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO`.
    ///
    /// An optional `RRULE:` prefix is accepted and ignored.
    pub fn parse(input: &str) -> Result<Self, RuleParseError> {
        let body = input.trim().strip_prefix("RRULE:").unwrap_or(input.trim());
        let mut freq = None;
        let mut interval = 1u32;
        let mut by_day = None;
        let mut by_month_day = None;
        let mut by_month = None;
        let mut count = None;
        let mut until = None;

        for part in body.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RuleParseError::UnsupportedPart(part.to_string()))?;
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => {
                    freq = Some(match value.trim().to_ascii_uppercase().as_str() {
                        "DAILY" => Frequency::Daily,
                        "WEEKLY" => Frequency::Weekly,
                        "MONTHLY" => Frequency::Monthly,
                        "YEARLY" => Frequency::Yearly,
                        other => {
                            return Err(RuleParseError::InvalidValue("FREQ", other.to_string()))
                        }
                    });
                }
                "INTERVAL" => {
                    interval = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|i| *i >= 1)
                        .ok_or_else(|| {
                            RuleParseError::InvalidValue("INTERVAL", value.to_string())
                        })?;
                }
                "BYDAY" => by_day = Some(parse_weekday(value)?),
                "BYMONTHDAY" => {
                    let day = value.trim().parse::<i32>().map_err(|_| {
                        RuleParseError::InvalidValue("BYMONTHDAY", value.to_string())
                    })?;
                    if day == 0 || day > 31 || day < -1 {
                        return Err(RuleParseError::InvalidValue("BYMONTHDAY", value.to_string()));
                    }
                    by_month_day = Some(day);
                }
                "BYMONTH" => {
                    let month = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|m| (1..=12).contains(m))
                        .ok_or_else(|| {
                            RuleParseError::InvalidValue("BYMONTH", value.to_string())
                        })?;
                    by_month = Some(month);
                }
                "COUNT" => {
                    count = Some(value.trim().parse::<u32>().map_err(|_| {
                        RuleParseError::InvalidValue("COUNT", value.to_string())
                    })?);
                }
                "UNTIL" => until = Some(parse_until(value)?),
                _ => return Err(RuleParseError::UnsupportedPart(key.to_string())),
            }
        }

        Ok(Self {
            freq: freq.ok_or(RuleParseError::MissingFrequency)?,
            interval,
            by_day,
            by_month_day,
            by_month,
            count,
            until,
        })
    }

    /// Parses a rule string, falling back to [`RecurrenceRule::default_monthly`]
    /// with a warning when the string is malformed. Never fails.
    pub fn parse_or_default(input: &str) -> Self {
        match Self::parse(input) {
            Ok(rule) => rule,
            Err(err) => {
                tracing::warn!(rule = input, %err, "malformed recurrence rule, using monthly default");
                Self::default_monthly()
            }
        }
    }

    /// Raw candidate for cycle `k` counted from `anchor`.
    ///
    /// `None` means the cycle has no valid date (short month, non-leap year)
    /// or the candidate would precede the anchor; such cycles are skipped.
    fn candidate(&self, anchor: NaiveDate, k: u64) -> Option<NaiveDate> {
        let candidate = match self.freq {
            Frequency::Daily => {
                Some(anchor + Duration::days(k as i64 * self.interval as i64))
            }
            Frequency::Weekly => {
                let base = dates::week_start(anchor);
                let weekday = self.by_day.unwrap_or_else(|| anchor.weekday());
                Some(
                    base + Duration::weeks(k as i64 * self.interval as i64)
                        + Duration::days(weekday.num_days_from_monday() as i64),
                )
            }
            Frequency::Monthly => {
                let index = dates::month_index(anchor) + k as i64 * self.interval as i64;
                let (year, month) = dates::month_from_index(index);
                self.resolve_day(year, month, anchor.day())
            }
            Frequency::Yearly => {
                let year = anchor.year() + (k as i64 * self.interval as i64) as i32;
                let month = self.by_month.unwrap_or_else(|| anchor.month());
                self.resolve_day(year, month, anchor.day())
            }
        };
        candidate.filter(|date| *date >= anchor)
    }

    fn resolve_day(&self, year: i32, month: u32, anchor_day: u32) -> Option<NaiveDate> {
        match self.by_month_day {
            Some(-1) => dates::last_day_of_month(year, month),
            Some(day) => NaiveDate::from_ymd_opt(year, month, day as u32),
            None => NaiveDate::from_ymd_opt(year, month, anchor_day),
        }
    }

    /// First occurrence strictly after `from`, re-anchored at `anchor`.
    ///
    /// Returns `None` when the rule is exhausted (`COUNT` spent or `UNTIL`
    /// passed); the template layer decides what to do with exhaustion.
    pub fn next_after(&self, from: NaiveDate, anchor: NaiveDate) -> Option<NaiveDate> {
        let mut k = if self.count.is_some() {
            // COUNT rules index occurrences from the anchor, so enumerate
            // every cycle to keep the occurrence number accurate.
            0
        } else {
            self.first_cycle_near(from, anchor)
        };
        let mut seen = 0u32;
        let budget = self
            .count
            .map(|c| c as usize + MAX_SCAN)
            .unwrap_or(MAX_SCAN);

        for _ in 0..budget {
            let candidate = self.candidate(anchor, k);
            k += 1;
            let Some(date) = candidate else { continue };
            if let Some(count) = self.count {
                seen += 1;
                if seen > count {
                    return None;
                }
            }
            if let Some(until) = self.until {
                if date > until {
                    return None;
                }
            }
            if date > from {
                return Some(date);
            }
        }
        None
    }

    /// Cheap lower bound on the cycle index whose candidate could follow
    /// `from`, so long-lived daily/weekly rules do not scan from their epoch.
    fn first_cycle_near(&self, from: NaiveDate, anchor: NaiveDate) -> u64 {
        let estimate = match self.freq {
            Frequency::Daily => {
                (from - anchor).num_days().div_euclid(self.interval as i64)
            }
            Frequency::Weekly => (from - dates::week_start(anchor))
                .num_days()
                .div_euclid(7 * self.interval as i64),
            Frequency::Monthly => (dates::month_index(from) - dates::month_index(anchor))
                .div_euclid(self.interval as i64),
            Frequency::Yearly => {
                ((from.year() - anchor.year()) as i64).div_euclid(self.interval as i64)
            }
        };
        estimate.saturating_sub(1).max(0) as u64
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, RuleParseError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(RuleParseError::InvalidValue("BYDAY", other.to_string())),
    }
}

fn parse_until(value: &str) -> Result<NaiveDate, RuleParseError> {
    let raw = value.trim();
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .map_err(|_| RuleParseError::InvalidValue("UNTIL", value.to_string()))
}
