//! Line-delimited JSON server over stdio
//!
//! Each request is one JSON object per line:
//! `{"id": 1, "method": "analyze", "params": {"channel_id": "UC..."}}`.
//! Each response is one line, either `{"id", "result"}` or
//! `{"id", "error": {"code", "message"}}`.
//!
//! Methods: `analyze`, `get_result`, `list_results`, `score_transcript`.

use crate::pipeline::{AnalysisRequest, Analyzer, PipelineError, UNKNOWN_INFLUENCER};
use crate::reporters::render_json_compact;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tracing::{debug, error, info};

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const ANALYSIS_FAILED: i64 = -32000;
const STORAGE_FAILED: i64 = -32001;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Error returned to the client
#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn invalid_params(e: impl std::fmt::Display) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: format!("Invalid params: {e}"),
        }
    }
}

impl From<PipelineError> for RpcError {
    fn from(e: PipelineError) -> Self {
        let code = match &e {
            PipelineError::EmptyChannelId | PipelineError::ZeroMaxVideos => INVALID_PARAMS,
            PipelineError::Catalog { .. } => ANALYSIS_FAILED,
            PipelineError::Storage(_) => STORAGE_FAILED,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl From<crate::storage::StorageError> for RpcError {
    fn from(e: crate::storage::StorageError) -> Self {
        PipelineError::from(e).into()
    }
}

#[derive(Debug, Deserialize)]
struct ChannelParams {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ScoreParams {
    transcript: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    historical_accuracy: Option<f64>,
}

pub struct Server {
    analyzer: Analyzer,
}

impl Server {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Serve stdin/stdout until EOF
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    pub fn run(&self, reader: impl BufRead, mut writer: impl Write) -> Result<()> {
        info!("Credence server started");

        for line in reader.lines() {
            let line = line.context("Failed to read request")?;
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received: {}", line);

            let response = self.handle_line(&line);
            let response_str = render_json_compact(&response)?;
            debug!("Sending: {}", response_str);
            writeln!(writer, "{}", response_str)?;
            writer.flush()?;
        }

        info!("Input closed, server stopping");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> Value {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                error!("Malformed request: {}", e);
                return json!({
                    "id": null,
                    "error": {"code": PARSE_ERROR, "message": format!("Invalid request: {e}")}
                });
            }
        };

        match self.dispatch(&request.method, request.params) {
            Ok(result) => json!({"id": request.id, "result": result}),
            Err(e) => {
                error!("{} failed: {}", request.method, e.message);
                json!({
                    "id": request.id,
                    "error": {"code": e.code, "message": e.message}
                })
            }
        }
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "analyze" => self.handle_analyze(params),
            "get_result" => self.handle_get_result(params),
            "list_results" => self.handle_list_results(),
            "score_transcript" => self.handle_score_transcript(params),
            _ => Err(RpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Unknown method: {method}"),
            }),
        }
    }

    fn handle_analyze(&self, params: Value) -> Result<Value, RpcError> {
        let request: AnalysisRequest =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;
        let result = self.analyzer.analyze(&request)?;
        to_value(&result)
    }

    fn handle_get_result(&self, params: Value) -> Result<Value, RpcError> {
        let params: ChannelParams =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;
        match self.analyzer.store().get_result(&params.channel_id)? {
            Some(stored) => to_value(&stored),
            None => Ok(Value::Null),
        }
    }

    fn handle_list_results(&self) -> Result<Value, RpcError> {
        to_value(&self.analyzer.store().list_results()?)
    }

    fn handle_score_transcript(&self, params: Value) -> Result<Value, RpcError> {
        let params: ScoreParams =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;

        let historical_accuracy = match params.historical_accuracy {
            Some(acc) if acc.is_finite() && (0.0..=100.0).contains(&acc) => acc,
            Some(acc) => {
                return Err(RpcError::invalid_params(format!(
                    "historical_accuracy must be between 0 and 100, got {acc}"
                )))
            }
            None => match &params.channel_id {
                Some(channel_id) => self.analyzer.store().historical_accuracy(channel_id)?,
                None => crate::storage::DEFAULT_HISTORICAL_ACCURACY,
            },
        };

        let result = self.analyzer.assessor().assess(
            params.name.as_deref(),
            params.channel_id.as_deref().unwrap_or(""),
            &params.transcript,
            historical_accuracy,
        );
        to_value(&result)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError {
        code: ANALYSIS_FAILED,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Assessor;
    use crate::sources::{DirectoryTranscripts, StaticCatalog};
    use crate::storage::ResultStore;
    use tempfile::tempdir;

    fn server(dir: &std::path::Path) -> Server {
        let transcripts = dir.join("transcripts");
        std::fs::create_dir_all(&transcripts).unwrap();
        std::fs::write(
            transcripts.join("vid001.txt"),
            "Ethereum will definitely reach $10k. Liquidity and open interest keep rising.",
        )
        .unwrap();

        let analyzer = Analyzer::new(
            Assessor::default(),
            Box::new(StaticCatalog::from_urls(&[
                "https://www.youtube.com/watch?v=vid001",
                "https://www.youtube.com/watch?v=vid002",
            ])),
            Box::new(DirectoryTranscripts::new(transcripts)),
            ResultStore::new(dir.join("data")),
        );
        Server::new(analyzer)
    }

    fn exchange(server: &Server, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.run(input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_analyze_then_get_result() {
        let dir = tempdir().unwrap();
        let server = server(dir.path());
        let responses = exchange(
            &server,
            concat!(
                r#"{"id": 1, "method": "analyze", "params": {"channel_id": "UCeth", "name": "Eth Guy"}}"#,
                "\n\n",
                r#"{"id": 2, "method": "get_result", "params": {"channel_id": "UCeth"}}"#,
                "\n",
                r#"{"id": 3, "method": "list_results"}"#,
                "\n",
            ),
        );

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        let result = &responses[0]["result"];
        assert_eq!(result["influencer_name"], "Eth Guy");
        assert_eq!(result["analysis_summary"]["videos_analyzed"], 1);
        assert_eq!(result["analysis_summary"]["videos_failed"], 1);

        assert_eq!(responses[1]["result"]["channel_id"], "UCeth");
        assert!(responses[1]["result"]["analyzed_at"].is_string());
        assert!(responses[2]["result"]["UCeth"].is_object());
    }

    #[test]
    fn test_analyze_zero_max_videos_is_invalid() {
        let dir = tempdir().unwrap();
        let server = server(dir.path());
        let responses = exchange(
            &server,
            concat!(
                r#"{"id": 1, "method": "analyze", "params": {"channel_id": "UCeth"}}"#,
                "\n",
                r#"{"id": 2, "method": "analyze", "params": {"channel_id": "UCeth", "max_videos": 0}}"#,
                "\n",
                r#"{"id": 3, "method": "get_result", "params": {"channel_id": "UCeth"}}"#,
                "\n",
            ),
        );

        assert_eq!(responses[1]["error"]["code"], INVALID_PARAMS);
        assert!(responses[1]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("max_videos"));
        let stored = &responses[2]["result"];
        assert_eq!(stored["analysis_summary"]["videos_analyzed"], 1);
        assert!(stored["metrics"]["word_count"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_score_transcript() {
        let dir = tempdir().unwrap();
        let server = server(dir.path());
        let responses = exchange(
            &server,
            r#"{"id": "a", "method": "score_transcript", "params": {"transcript": "it will definitely moon, guaranteed", "historical_accuracy": 40}}"#,
        );
        let result = &responses[0]["result"];
        assert_eq!(responses[0]["id"], "a");
        assert_eq!(result["historical_accuracy"], 40.0);
        assert!(result["metrics"]["certainty_index"].as_f64().unwrap() > 50.0);
        assert_eq!(result["influencer_name"], UNKNOWN_INFLUENCER);

        // Scoring never persists
        let store = ResultStore::new(dir.path().join("data"));
        assert!(store.list_results().unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        let dir = tempdir().unwrap();
        let server = server(dir.path());
        let responses = exchange(
            &server,
            concat!(
                "not json\n",
                r#"{"id": 1, "method": "explode"}"#,
                "\n",
                r#"{"id": 2, "method": "analyze", "params": {}}"#,
                "\n",
                r#"{"id": 3, "method": "score_transcript", "params": {"transcript": "x", "historical_accuracy": 140}}"#,
                "\n",
                r#"{"id": 4, "method": "get_result", "params": {"channel_id": "UCnone"}}"#,
                "\n",
            ),
        );

        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[2]["error"]["code"], INVALID_PARAMS);
        assert_eq!(responses[3]["error"]["code"], INVALID_PARAMS);
        assert!(responses[3].get("result").is_none());
        assert!(responses[4]["result"].is_null());
    }
}
