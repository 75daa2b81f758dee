//! The LLM implementation

use crate::{Gemini, Request};
use anyhow::Result;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{LLM, Message, Response, StreamChunk};

impl Gemini {
    /// One completion request, no retry.
    async fn complete_once(&self, body: &Request) -> Result<Response> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("response ({status}): {text}");

        if !status.is_success() {
            anyhow::bail!("gemini api error {status}: {text}");
        }
        serde_json::from_str(&text).map_err(Into::into)
    }
}

impl LLM for Gemini {
    /// The chat configuration.
    type ChatConfig = Request;

    /// Send a completion request, retrying transport failures up to the
    /// configured retry budget.
    async fn complete(&self, req: &Request, messages: &[Message]) -> Result<Response> {
        let body = req.messages(messages);
        tracing::debug!("request: {}", serde_json::to_string(&body)?);

        let mut attempt = 0;
        loop {
            match self.complete_once(&body).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < body.max_retries => {
                    attempt += 1;
                    tracing::warn!("completion attempt {attempt} failed: {e}; retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send a completion request with streaming
    fn stream(
        &self,
        req: Request,
        messages: &[Message],
    ) -> impl Stream<Item = Result<StreamChunk>> + Send {
        let body = req.messages(messages).stream_mode();
        tracing::debug!(
            "request: {}",
            serde_json::to_string(&body).unwrap_or_default()
        );
        let request = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&body);

        try_stream! {
            let response = request.send().await?;
            let status = response.status();
            tracing::debug!("gemini api responded with status {status}");

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                Err(anyhow::anyhow!("gemini api error {status}: {text}"))?;
                return;
            }

            let mut stream = response.bytes_stream();
            // SSE frames can split anywhere across byte chunks; carry the
            // incomplete tail between reads.
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!("gemini stream error: {e:?}");
                        Err(e)?
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_owned();
                    buffer.drain(..=pos);

                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();
                    if data.is_empty() || data == "[DONE]" {
                        continue;
                    }

                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(chunk) => yield chunk,
                        Err(e) => {
                            tracing::warn!("failed to parse stream chunk: {e}, data: {data}")
                        }
                    }
                }
            }
        }
    }
}
