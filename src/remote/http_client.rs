use super::*;

/// Maps a raw HTTP outcome onto the API result shape.
///
/// 200 with an empty body is `{}`. 400 and 500 carry a `{err, desc}` body.
/// Any other status becomes a synthetic `BadStatus` failure so callers only
/// deal with one failure shape.
pub fn normalize_response(status: u16, body: &[u8]) -> Result<serde_json::Value, ApiError> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::Value::Object(Default::default()))
    } else {
        serde_json::from_slice::<serde_json::Value>(body)
    };

    match status {
        200 => parsed.map_err(|err| ApiError::transport(format!("invalid json: {err}"))),
        400 | 500 => {
            let value = parsed.map_err(|err| ApiError::transport(format!("invalid json: {err}")))?;
            let failure = serde_json::from_value::<Failure>(value).unwrap_or_else(|_| Failure {
                err: "BadBody".to_string(),
                desc: format!("the server failed with status {status}"),
                status: Some(status),
            });
            Err(ApiError::Failure(failure))
        }
        other => Err(ApiError::Failure(Failure::bad_status(other))),
    }
}

impl ApiClient {
    pub(super) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::transport(format!("bad url for {path}: {err}")))
    }

    pub(super) async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let req = self.client.get(self.url(path)?);
        self.execute(path, req).await
    }

    pub(super) async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ApiError> {
        let req = self.client.post(self.url(path)?).json(body);
        self.execute(path, req).await
    }

    async fn execute(
        &self,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = req.send().await.map_err(ApiError::transport)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(ApiError::transport)?;
        let out = normalize_response(status, &body);
        if let Err(err) = &out {
            tracing::debug!(path, status, "request failed: {err}");
        }
        out
    }
}
