use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Number of months covered by the default period catalog (two halves each).
pub const DEFAULT_CATALOG_MONTHS: u32 = 6;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period key must look like <half>-<year>-<month>, got `{0}`")]
    Malformed(String),
    #[error("unknown half `{0}`, expected `primera` or `segunda`")]
    UnknownHalf(String),
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
}

/// Half of a month (quincena).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString)]
pub enum Half {
    #[strum(serialize = "primera")]
    First,
    #[strum(serialize = "segunda")]
    Second,
}

impl Half {
    fn title(self) -> &'static str {
        match self {
            Half::First => "Primera",
            Half::Second => "Segunda",
        }
    }
}

/// A validated half-month. Only [`PayPeriod::new`], parsing and
/// [`PayPeriod::recent`] build one, so the month is always in 1..=12.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PayPeriod {
    half: Half,
    year: i32,
    month: u32,
}

impl PayPeriod {
    pub fn new(half: Half, year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { half, year, month })
    }

    /// Machine key, e.g. `primera-2026-01`.
    pub fn key(&self) -> String {
        format!("{}-{:04}-{:02}", self.half, self.year, self.month)
    }

    /// Human label, e.g. `Primera Quincena Enero 2026`.
    pub fn label(&self) -> String {
        format!(
            "{} Quincena {} {}",
            self.half.title(),
            MONTH_NAMES[(self.month - 1) as usize],
            self.year
        )
    }

    /// Periods of the last `months` months, newest month first, first half
    /// before second half within a month.
    pub fn recent(today: NaiveDate, months: u32) -> Vec<PayPeriod> {
        let current = today.year() * 12 + today.month0() as i32;

        (0..months as i32)
            .flat_map(|back| {
                let index = current - back;
                let year = index.div_euclid(12);
                let month = index.rem_euclid(12) as u32 + 1;
                [Half::First, Half::Second].map(|half| PayPeriod { half, year, month })
            })
            .collect()
    }
}

impl FromStr for PayPeriod {
    type Err = PeriodError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(key.to_string());

        let mut parts = key.splitn(3, '-');
        let (half, year, month) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(y), Some(m)) => (h, y, m),
            _ => return Err(malformed()),
        };

        let half = Half::from_str(half).map_err(|_| PeriodError::UnknownHalf(half.to_string()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;

        PayPeriod::new(half, year, month)
    }
}

/// Catalog entry offered to administrators and employees.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodOption {
    #[schema(example = "primera-2026-01")]
    pub value: String,
    #[schema(example = "Primera Quincena Enero 2026")]
    pub label: String,
}

impl From<PayPeriod> for PeriodOption {
    fn from(period: PayPeriod) -> Self {
        Self {
            value: period.key(),
            label: period.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_label() {
        let period = PayPeriod::new(Half::First, 2026, 1).unwrap();
        assert_eq!(period.key(), "primera-2026-01");
        assert_eq!(period.label(), "Primera Quincena Enero 2026");

        let period = PayPeriod::new(Half::Second, 2025, 12).unwrap();
        assert_eq!(period.key(), "segunda-2025-12");
        assert_eq!(period.label(), "Segunda Quincena Diciembre 2025");
    }

    #[test]
    fn parses_its_own_keys() {
        let period: PayPeriod = "segunda-2026-03".parse().unwrap();
        assert_eq!(period, PayPeriod::new(Half::Second, 2026, 3).unwrap());
        assert_eq!(period.key(), "segunda-2026-03");
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(
            "tercera-2026-01".parse::<PayPeriod>(),
            Err(PeriodError::UnknownHalf("tercera".into()))
        );
        assert_eq!(
            "primera-2026-13".parse::<PayPeriod>(),
            Err(PeriodError::MonthOutOfRange(13))
        );
        assert!(matches!(
            "primera_quincena_01_2026".parse::<PayPeriod>(),
            Err(PeriodError::Malformed(_))
        ));
        assert!(matches!(
            "primera-26-1".parse::<PayPeriod>(),
            Err(PeriodError::Malformed(_))
        ));
        assert!(matches!(
            "primera".parse::<PayPeriod>(),
            Err(PeriodError::Malformed(_))
        ));
    }

    #[test]
    fn recent_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        let keys: Vec<String> = PayPeriod::recent(today, 3).iter().map(PayPeriod::key).collect();

        assert_eq!(
            keys,
            vec![
                "primera-2026-02",
                "segunda-2026-02",
                "primera-2026-01",
                "segunda-2026-01",
                "primera-2025-12",
                "segunda-2025-12",
            ]
        );
    }

    #[test]
    fn every_buildable_period_has_a_label() {
        assert_eq!(
            PayPeriod::new(Half::First, 2026, 0),
            Err(PeriodError::MonthOutOfRange(0))
        );
        assert_eq!(
            "primera-2026-00".parse::<PayPeriod>(),
            Err(PeriodError::MonthOutOfRange(0))
        );

        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        for period in PayPeriod::recent(today, 24) {
            let parsed: PayPeriod = period.key().parse().unwrap();
            assert_eq!(parsed.label(), period.label());
        }
    }

    #[test]
    fn default_catalog_has_twelve_periods() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(PayPeriod::recent(today, DEFAULT_CATALOG_MONTHS).len(), 12);
    }
}
