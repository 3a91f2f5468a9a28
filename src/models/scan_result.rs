use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BiasType, Indicator, IndicatorSeries, IndicatorSet};

/// Raw response of the scan collaborator, exactly as it arrives on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<PredictionRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ScanMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRow {
    pub timestamp: i64,
    pub predicted_bias: BiasType,
    pub actual_direction: BiasType,
    /// 1 when the prediction was right, 0 otherwise.
    pub accuracy: u8,
    pub price_at_prediction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_at_validation: Option<f64>,
    #[serde(default)]
    pub indicators: HashMap<String, IndicatorSeries>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetrics {
    pub total_predictions: u32,
    pub correct_count: u32,
    pub accuracy_percentage: f64,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan failed: {message}")]
    Failed { message: String },
    #[error("Scan response has no results")]
    MissingResults,
    #[error("No predictions found")]
    NoPredictions,
    #[error("Scan response has no metrics")]
    MissingMetrics,
    #[error("Malformed scan response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One prediction point, without its indicator payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub timestamp: i64,
    pub predicted_bias: BiasType,
    pub actual_direction: BiasType,
    pub correct: bool,
    pub price_at_prediction: f64,
    pub price_at_validation: Option<f64>,
}

/// A validated scan result. Replaces the previous one wholesale.
#[derive(Debug, Clone)]
pub struct ScanResult {
    predictions: Vec<Prediction>,
    metrics: ScanMetrics,
    indicators: IndicatorSet,
}

impl ScanResponse {
    /// Checks the response shape and normalises it into a [`ScanResult`].
    pub fn into_result(self) -> Result<ScanResult, ScanError> {
        if !self.success {
            return Err(ScanError::Failed {
                message: self
                    .message
                    .unwrap_or_else(|| "no message from scanner".to_string()),
            });
        }
        let rows = self.results.ok_or(ScanError::MissingResults)?;
        if rows.is_empty() {
            return Err(ScanError::NoPredictions);
        }
        let metrics = self.metrics.ok_or(ScanError::MissingMetrics)?;

        let mut indicators = IndicatorSet::new();
        let mut predictions = Vec::with_capacity(rows.len());
        for row in rows {
            for (key, series) in &row.indicators {
                indicators.merge(key.as_str(), series);
            }
            predictions.push(Prediction {
                timestamp: row.timestamp,
                predicted_bias: row.predicted_bias,
                actual_direction: row.actual_direction,
                correct: row.accuracy > 0,
                price_at_prediction: row.price_at_prediction,
                price_at_validation: row.price_at_validation,
            });
        }
        predictions.sort_by_key(|p| p.timestamp);

        Ok(ScanResult {
            predictions,
            metrics,
            indicators,
        })
    }
}

pub fn parse_scan_response(json: &str) -> Result<ScanResult, ScanError> {
    serde_json::from_str::<ScanResponse>(json)?.into_result()
}

impl ScanResult {
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn metrics(&self) -> ScanMetrics {
        self.metrics
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    /// Prediction closest in time to `timestamp`. Ties go to the earlier one.
    pub fn nearest_prediction(&self, timestamp: i64) -> Option<&Prediction> {
        let idx = self.predictions.partition_point(|p| p.timestamp < timestamp);
        let after = self.predictions.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.predictions.get(i));
        match (before, after) {
            (Some(b), Some(a)) => {
                if timestamp - b.timestamp <= a.timestamp - timestamp {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (b, a) => b.or(a),
        }
    }

    /// Price line for the chart: the result's close series when it carries one,
    /// otherwise the prices at each prediction.
    pub fn price_line(&self) -> Vec<(i64, f64)> {
        if let Some(close) = Indicator::Close
            .series_key(0.0)
            .and_then(|k| self.indicators.get(&k))
            .filter(|s| !s.is_empty())
        {
            return close
                .points()
                .iter()
                .map(|p| (p.timestamp, p.value))
                .collect();
        }
        self.predictions
            .iter()
            .map(|p| (p.timestamp, p.price_at_prediction))
            .collect()
    }

    pub fn time_span(&self) -> Option<(i64, i64)> {
        Some((
            self.predictions.first()?.timestamp,
            self.predictions.last()?.timestamp,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: &str =
        r#""metrics": {"totalPredictions": 2, "correctCount": 1, "accuracyPercentage": 50.0}"#;

    fn row(ts: i64, price: f64, sma: &str) -> String {
        format!(
            r#"{{"timestamp": {ts}, "predictedBias": "bullish", "actualDirection": "bearish",
                "accuracy": 0, "priceAtPrediction": {price},
                "indicators": {{"sma_20": {sma}}}}}"#
        )
    }

    #[test]
    fn empty_results_is_no_predictions() {
        let json = format!(r#"{{"success": true, "results": [], {METRICS}}}"#);
        assert!(matches!(
            parse_scan_response(&json),
            Err(ScanError::NoPredictions)
        ));
    }

    #[test]
    fn missing_metrics_is_distinct_from_no_predictions() {
        let json = format!(
            r#"{{"success": true, "results": [{}]}}"#,
            row(1, 10.0, "[]")
        );
        let err = parse_scan_response(&json).unwrap_err();
        assert!(matches!(err, ScanError::MissingMetrics));
        assert_ne!(err.to_string(), ScanError::NoPredictions.to_string());
    }

    #[test]
    fn missing_results_and_failure_are_reported() {
        assert!(matches!(
            parse_scan_response(&format!(r#"{{"success": true, {METRICS}}}"#)),
            Err(ScanError::MissingResults)
        ));
        let err = parse_scan_response(r#"{"success": false, "message": "bad pair"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Scan failed: bad pair");
        assert!(matches!(
            parse_scan_response("{not json"),
            Err(ScanError::Malformed(_))
        ));
    }

    #[test]
    fn indicator_series_merge_across_rows() {
        let json = format!(
            r#"{{"success": true, "results": [{}, {}], {METRICS}}}"#,
            row(
                200,
                11.0,
                r#"[{"timestamp": 2, "value": 2.0}, {"timestamp": 3, "value": 3.0}]"#
            ),
            row(
                100,
                10.0,
                r#"[{"timestamp": 1, "value": 1.0}, {"timestamp": 2, "value": 2.0}]"#
            ),
        );
        let result = parse_scan_response(&json).unwrap();
        let sma = result.indicators().get("sma_20").unwrap();
        let ts: Vec<i64> = sma.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(ts, vec![1, 2, 3]);

        assert_eq!(result.predictions()[0].timestamp, 100);
        assert!(!result.predictions()[0].correct);
        assert_eq!(result.metrics().total_predictions, 2);
        assert_eq!(result.time_span(), Some((100, 200)));
    }

    #[test]
    fn nearest_prediction_and_price_line_fallback() {
        let json = format!(
            r#"{{"success": true, "results": [{}, {}], {METRICS}}}"#,
            row(100, 10.0, "[]"),
            row(200, 20.0, "[]"),
        );
        let result = parse_scan_response(&json).unwrap();
        assert_eq!(result.nearest_prediction(140).map(|p| p.timestamp), Some(100));
        assert_eq!(result.nearest_prediction(160).map(|p| p.timestamp), Some(200));
        assert_eq!(result.nearest_prediction(999).map(|p| p.timestamp), Some(200));
        assert_eq!(result.price_line(), vec![(100, 10.0), (200, 20.0)]);
    }
}
