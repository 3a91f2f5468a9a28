// Native-only code i.e. gated in mod.rs by #[cfg(not(target_arch = "wasm32"))] so no need to gate internally here

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::DF;
use crate::domain::Formula;
use crate::models::{ScanResult, parse_scan_response};

/// Payload handed to the scanner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest<'a> {
    pub formulas: &'a [Formula],
    pub include_neutral: bool,
}

/// Abstract interface for running formulas against history.
#[async_trait]
pub trait ScanProvider: Send + Sync {
    async fn scan(&self, request: &ScanRequest<'_>) -> Result<ScanResult>;

    /// Short name for logs and the status bar.
    fn describe(&self) -> String;
}

/// Replays a scan response saved to disk. The formulas are not consulted.
pub struct FileScanProvider {
    path: PathBuf,
}

impl FileScanProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScanProvider for FileScanProvider {
    async fn scan(&self, _request: &ScanRequest<'_>) -> Result<ScanResult> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read scan results from {}", self.path.display()))?;
        let result = parse_scan_response(&json)?;
        Ok(result)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Runs an external scanner: request JSON on stdin, response JSON on stdout.
pub struct ProcessScanProvider {
    program: String,
    args: Vec<String>,
}

impl ProcessScanProvider {
    /// Splits a command line on whitespace. The first word is the program.
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| anyhow!("Scanner command is empty"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

#[async_trait]
impl ScanProvider for ProcessScanProvider {
    async fn scan(&self, request: &ScanRequest<'_>) -> Result<ScanResult> {
        let payload = serde_json::to_vec(request).context("Failed to encode scan request")?;

        if DF.log_scan {
            log::info!(
                "Scanning {} formulas with `{}`",
                request.formulas.len(),
                self.describe()
            );
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn scanner `{}`", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .context("Failed to write scan request")?;
            // Dropping stdin closes the pipe so the scanner sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for scanner")?;
        if !output.status.success() {
            return Err(anyhow!(
                "Scanner exited with {}\nstderr:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let result = parse_scan_response(&json)?;
        Ok(result)
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BiasType, Indicator, Operator, Timeframe};

    const RESPONSE: &str = r#"{
        "success": true,
        "results": [
            {"timestamp": 1000, "predictedBias": "bullish", "actualDirection": "bullish",
             "accuracy": 1, "priceAtPrediction": 10.0,
             "indicators": {"sma_20": [{"timestamp": 1000, "value": 9.5}]}}
        ],
        "metrics": {"totalPredictions": 1, "correctCount": 1, "accuracyPercentage": 100.0}
    }"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bias_scope_{}_{}", std::process::id(), name))
    }

    #[test]
    fn command_line_is_split_into_program_and_args() {
        let p = ProcessScanProvider::parse("  python3 scan.py --fast ").unwrap();
        assert_eq!(p.program, "python3");
        assert_eq!(p.args, vec!["scan.py", "--fast"]);
        assert_eq!(p.describe(), "python3 scan.py --fast");
        assert!(ProcessScanProvider::parse("   ").is_err());
    }

    #[test]
    fn request_serialises_camel_case() {
        let formula = Formula {
            bias_type: Some(BiasType::Bullish),
            timeframe: Some(Timeframe::H1),
            indicator1: Some(Indicator::Close),
            indicator1_param: "0".into(),
            operator: Some(Operator::Gt),
            indicator2: Some(Indicator::Sma),
            indicator2_param: "20".into(),
        };
        let formulas = [formula];
        let json = serde_json::to_string(&ScanRequest {
            formulas: &formulas,
            include_neutral: false,
        })
        .unwrap();
        assert!(json.contains("\"includeNeutral\":false"));
        assert!(json.contains("\"indicator1Param\":\"0\""));
    }

    #[tokio::test]
    async fn file_provider_replays_saved_response() {
        let path = temp_path("replay.json");
        tokio::fs::write(&path, RESPONSE).await.unwrap();
        let provider = FileScanProvider::new(&path);
        let result = provider
            .scan(&ScanRequest {
                formulas: &[],
                include_neutral: false,
            })
            .await
            .unwrap();
        assert_eq!(result.predictions().len(), 1);
        assert!(result.indicators().get("sma_20").is_some());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn file_provider_reports_missing_file() {
        let provider = FileScanProvider::new(temp_path("does_not_exist.json"));
        let err = provider
            .scan(&ScanRequest {
                formulas: &[],
                include_neutral: false,
            })
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read scan results"));
    }
}
