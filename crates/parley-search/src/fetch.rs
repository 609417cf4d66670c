// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use parley_core::ParleyError;
use serde::de::DeserializeOwned;
use tracing::warn;

/// GETs `url` and decodes a JSON body, labelling failures with `source`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    source: &str,
) -> Result<T, ParleyError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ParleyError::Search {
            message: format!("{source} request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(source, status = %status, body = %body, "search source returned an error");
        return Err(ParleyError::Search {
            message: format!("{source} returned {status}"),
            source: None,
        });
    }

    response.json().await.map_err(|e| ParleyError::Search {
        message: format!("failed to parse {source} response: {e}"),
        source: Some(Box::new(e)),
    })
}
