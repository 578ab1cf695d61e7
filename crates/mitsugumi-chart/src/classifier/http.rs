//! HTTP-backed split classifier.
//!
//! Posts the whole batch as one JSON request to a model server and expects
//! an index-aligned array of predictions back. The request timeout
//! configured here is the caller-level bound on the pipeline's single
//! suspension point.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Prediction, SplitClassifier, SplitPair};

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    pairs: &'a [SplitPair],
}

#[derive(Deserialize)]
struct ClassifyResponse {
    predictions: Vec<Prediction>,
}

pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    id: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let id = format!("http:{}", endpoint);
        Ok(Self { client, endpoint, id })
    }
}

#[async_trait]
impl SplitClassifier for HttpClassifier {
    fn classifier_id(&self) -> &str {
        &self.id
    }

    async fn classify_batch(&self, pairs: &[SplitPair]) -> Result<Vec<Prediction>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { pairs })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("classifier returned HTTP {}", status));
        }
        let body: ClassifyResponse = response.json().await?;
        if body.predictions.len() != pairs.len() {
            return Err(anyhow!(
                "classifier returned {} predictions for {} pairs",
                body.predictions.len(),
                pairs.len()
            ));
        }
        Ok(body.predictions)
    }
}
