//! Feature construction for the next-day close regression.
//!
//! The model was fitted on lagged technical indicators. At serving time only
//! the current session's open/high/low are known, so the indicators are
//! approximated from the session's typical price with fixed ratios and the
//! momentum oscillators are held at neutral values.

use super::feature_schema::{FEATURE_COUNT, FEATURE_NAMES, FeatureSchema};
use crate::domain::errors::PredictionError;
use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Default scale applied to the raw high-low change.
pub const DEFAULT_PRICE_CHANGE_SCALE: f64 = 0.001;

const SMA_5_RATIO: f64 = 0.99;
const SMA_10_RATIO: f64 = 0.98;
const SMA_20_RATIO: f64 = 0.97;
const EMA_20_RATIO: f64 = 0.975;
const MACD_STUB: f64 = 0.5;
const MACD_SIGNAL_STUB: f64 = 0.4;
const MACD_DIFF_STUB: f64 = 0.1;
const RSI_STUB: f64 = 50.0;
const ATR_RANGE_RATIO: f64 = 0.1;
const MONTH_END_FROM_DAY: u32 = 28;
const MONTH_START_UNTIL_DAY: u32 = 3;

/// Raw session prices supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MarketInput {
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

impl MarketInput {
    pub fn new(open: f64, high: f64, low: f64) -> Self {
        Self { open, high, low }
    }
}

/// Intermediate price quantities the features are derived from.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DerivedPrices {
    pub current_price: f64,
    pub price_change: f64,
    pub price_range: f64,
}

impl DerivedPrices {
    pub fn from_input(input: &MarketInput) -> Self {
        let spread = input.high - input.low;
        Self {
            current_price: (input.open + input.high + input.low) / 3.0,
            price_change: spread,
            price_range: spread,
        }
    }
}

/// Named feature values in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in builder order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FeatureSchema.position(name).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    /// Values rearranged into the order given by `names`.
    pub fn reindexed<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, PredictionError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let value = self.get(name).ok_or_else(|| PredictionError::MissingFeature {
                    name: name.to_string(),
                })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(PredictionError::NonFiniteFeature {
                        name: name.to_string(),
                    })
                }
            })
            .collect()
    }

    /// Fails on the first non-finite value.
    pub fn ensure_finite(&self) -> Result<(), PredictionError> {
        match self.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(PredictionError::NonFiniteFeature {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Maps session prices and a reference date to a [`FeatureVector`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder {
    price_change_scale: f64,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_CHANGE_SCALE)
    }
}

impl FeatureBuilder {
    pub fn new(price_change_scale: f64) -> Self {
        Self { price_change_scale }
    }

    pub fn price_change_scale(&self) -> f64 {
        self.price_change_scale
    }

    pub fn build(&self, input: &MarketInput, date: NaiveDate) -> FeatureVector {
        let prices = DerivedPrices::from_input(input);
        let day = date.day();

        FeatureVector::from_values([
            prices.current_price * SMA_5_RATIO,
            prices.current_price * SMA_10_RATIO,
            prices.price_change * self.price_change_scale,
            prices.current_price * SMA_20_RATIO,
            prices.current_price * EMA_20_RATIO,
            MACD_STUB,
            MACD_SIGNAL_STUB,
            MACD_DIFF_STUB,
            RSI_STUB,
            prices.price_range * ATR_RANGE_RATIO,
            f64::from(date.year()),
            f64::from(date.month()),
            f64::from(day),
            f64::from(date.weekday().num_days_from_monday()),
            if day >= MONTH_END_FROM_DAY { 1.0 } else { 0.0 },
            if day <= MONTH_START_UNTIL_DAY { 1.0 } else { 0.0 },
        ])
    }
}
