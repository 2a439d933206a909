use time::macros::format_description;
use time::Date;

use crate::ValidationError;

/// Parse a `YYYY-MM-DD` market date. A longer timestamp is accepted when it
/// starts with a calendar date (`2024-01-02T00:00:00` or `2024-01-02 00:00:00`).
pub fn parse_market_date(input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// One daily OHLC observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Column-oriented daily price history, chronologically ordered.
///
/// All columns always have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceHistory {
    dates: Vec<Date>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
}

impl PriceHistory {
    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Result<Self, ValidationError> {
        let rows = rows.into_iter();
        let (capacity, _) = rows.size_hint();
        let mut history = Self {
            dates: Vec::with_capacity(capacity),
            open: Vec::with_capacity(capacity),
            high: Vec::with_capacity(capacity),
            low: Vec::with_capacity(capacity),
            close: Vec::with_capacity(capacity),
        };

        for (index, row) in rows.enumerate() {
            validate_finite("Open", row.open)?;
            validate_finite("High", row.high)?;
            validate_finite("Low", row.low)?;
            validate_finite("Close", row.close)?;
            if history.dates.last().is_some_and(|previous| row.date < *previous) {
                return Err(ValidationError::UnorderedDates { index });
            }

            history.dates.push(row.date);
            history.open.push(row.open);
            history.high.push(row.high);
            history.low.push(row.low);
            history.close.push(row.close);
        }

        Ok(history)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }
}

/// 52-week low/high bounds reported alongside a history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range52 {
    pub min: f64,
    pub max: f64,
}

impl Range52 {
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        validate_finite("min52", min)?;
        validate_finite("max52", max)?;
        if min > max {
            return Err(ValidationError::InvalidRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Self { min, max })
    }
}

/// Forecast prices for the days following the last history date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prediction {
    dates: Vec<Date>,
    prices: Vec<f64>,
}

impl Prediction {
    pub fn from_points(
        points: impl IntoIterator<Item = (Date, f64)>,
    ) -> Result<Self, ValidationError> {
        let mut prediction = Self::default();
        for (index, (date, price)) in points.into_iter().enumerate() {
            validate_finite("predicted_price", price)?;
            if prediction.dates.last().is_some_and(|previous| date < *previous) {
                return Err(ValidationError::UnorderedDates { index });
            }
            prediction.dates.push(date);
            prediction.prices.push(price);
        }
        Ok(prediction)
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Mean predicted price, `None` for an empty forecast.
    pub fn average(&self) -> Option<f64> {
        if self.prices.is_empty() {
            return None;
        }
        Some(self.prices.iter().sum::<f64>() / self.prices.len() as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.prices.iter().copied().reduce(f64::max)
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn row(date: Date, close: f64) -> PriceRow {
        PriceRow {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn parses_plain_and_timestamp_dates() {
        assert_eq!(parse_market_date("2024-01-01"), Ok(date!(2024 - 01 - 01)));
        assert_eq!(
            parse_market_date("2024-03-15T00:00:00"),
            Ok(date!(2024 - 03 - 15))
        );
        assert!(matches!(
            parse_market_date("01/02/2024"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn history_columns_stay_aligned() {
        let history = PriceHistory::from_rows([
            row(date!(2024 - 01 - 01), 10.0),
            row(date!(2024 - 01 - 02), 11.0),
        ])
        .expect("ordered rows");

        assert_eq!(history.len(), 2);
        assert_eq!(history.high(), &[11.0, 12.0]);
        assert_eq!(history.low(), &[9.0, 10.0]);
        assert_eq!(history.dates().len(), history.close().len());
    }

    #[test]
    fn history_rejects_out_of_order_rows() {
        let error = PriceHistory::from_rows([
            row(date!(2024 - 01 - 02), 10.0),
            row(date!(2024 - 01 - 01), 11.0),
        ])
        .expect_err("dates go backwards");
        assert_eq!(error, ValidationError::UnorderedDates { index: 1 });
    }

    #[test]
    fn history_rejects_non_finite_prices() {
        let mut bad = row(date!(2024 - 01 - 01), 10.0);
        bad.high = f64::NAN;
        assert_eq!(
            PriceHistory::from_rows([bad]),
            Err(ValidationError::NonFiniteValue { field: "High" })
        );
    }

    #[test]
    fn range_requires_min_not_above_max() {
        assert!(Range52::new(0.5, 2.0).is_ok());
        assert!(matches!(
            Range52::new(3.0, 2.0),
            Err(ValidationError::InvalidRange { .. })
        ));
    }

    #[test]
    fn prediction_summary_statistics() {
        let prediction = Prediction::from_points([
            (date!(2024 - 01 - 02), 10.0),
            (date!(2024 - 01 - 03), 14.0),
            (date!(2024 - 01 - 04), 12.0),
        ])
        .expect("valid forecast");

        assert_eq!(prediction.average(), Some(12.0));
        assert_eq!(prediction.max(), Some(14.0));

        let empty = Prediction::default();
        assert_eq!(empty.average(), None);
        assert_eq!(empty.max(), None);
    }
}
