use crate::state::messages::{LoadRequest, LoadResponse};
use anyhow::Context;
use log::{debug, error};
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Offline fallback so the map has something to show without a data file.
const DEMO_MATCHES_JSON: &str = include_str!("../../demo_matches.json");

pub struct LoaderWorker {
    matches_path: Option<PathBuf>,
    requests: mpsc::Receiver<LoadRequest>,
    responses: mpsc::Sender<LoadResponse>,
}

impl LoaderWorker {
    pub fn new(
        matches_path: Option<PathBuf>,
        requests: mpsc::Receiver<LoadRequest>,
        responses: mpsc::Sender<LoadResponse>,
    ) -> Self {
        Self { matches_path, requests, responses }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let result = match request {
                LoadRequest::LoadMatches => self.handle_load_matches().await,
            };

            debug!("load request complete");
            let response = result.unwrap_or_else(|err| LoadResponse::Error {
                message: format!("{err:#}"),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send load response: {e}");
                break;
            }
        }
    }

    async fn handle_load_matches(&self) -> anyhow::Result<LoadResponse> {
        let Some(path) = &self.matches_path else {
            debug!("no match file configured; using demo data");
            let raw = parse_matches(DEMO_MATCHES_JSON).context("embedded demo data")?;
            return Ok(LoadResponse::MatchesLoaded { raw, source: "demo data".into() });
        };

        debug!("loading matches from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let raw = parse_matches(&content).with_context(|| format!("invalid match json at {}", path.display()))?;
        Ok(LoadResponse::MatchesLoaded { raw, source: path.display().to_string() })
    }
}

/// Only checks that the text is JSON; shape problems are the session's concern.
fn parse_matches(content: &str) -> anyhow::Result<Value> {
    Ok(serde_json::from_str(content)?)
}
