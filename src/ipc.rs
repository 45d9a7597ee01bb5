//! Line-oriented sidecar protocol.
//!
//! Every frame is one line of standard base64 wrapping a UTF-8 JSON document.
//! Requests are tagged by `command`, responses by `status`. A frame that cannot
//! be decoded gets an error response; the loop only ends at EOF.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{handle_compile, ping, CompileRequest};

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid base64 frame: {0}")]
    Base64(String),

    #[error("Frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid request: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Request {
    Compile(CompileRequest),
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Success { result: serde_json::Value },
    Error { error: String },
}

impl Response {
    pub fn error(error: impl ToString) -> Self {
        Response::Error {
            error: error.to_string(),
        }
    }
}

pub fn encode_frame<T: Serialize>(value: &T) -> Result<String, FrameError> {
    let json = serde_json::to_string(value)?;
    Ok(base64_simd::STANDARD.encode_to_string(json.as_bytes()))
}

pub fn decode_frame<T: for<'de> Deserialize<'de>>(line: &str) -> Result<T, FrameError> {
    let bytes = base64_simd::STANDARD
        .decode_to_vec(line.trim().as_bytes())
        .map_err(|e| FrameError::Base64(e.to_string()))?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

pub async fn dispatch(request: Request) -> Response {
    match request {
        Request::Compile(request) => {
            let response = handle_compile(&request).await;
            match serde_json::to_value(response) {
                Ok(result) => Response::Success { result },
                Err(e) => Response::error(e),
            }
        }
        Request::Ping { message } => Response::Success {
            result: serde_json::json!({ "message": ping(message.as_deref()) }),
        },
    }
}

/// Serve frames from `reader` until EOF, answering each on `writer`.
pub async fn serve<R, W>(reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match decode_frame::<Request>(&line) {
            Ok(request) => dispatch(request).await,
            Err(e) => {
                tracing::warn!("rejected frame: {}", e);
                Response::error(e)
            }
        };
        let frame = encode_frame(&response)?;
        writer.write_all(frame.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_tags() {
        let ping: Request = serde_json::from_value(json!({"command": "ping"})).unwrap();
        assert_eq!(ping, Request::Ping { message: None });

        let compile: Request = serde_json::from_value(json!({
            "command": "compile",
            "serializedVFS": [],
            "entryPoint": "/src/widget/index.tsx"
        }))
        .unwrap();
        assert!(matches!(compile, Request::Compile(_)));

        assert!(serde_json::from_value::<Request>(json!({"command": "reboot"})).is_err());
    }

    #[test]
    fn test_response_tags() {
        assert_eq!(
            serde_json::to_value(Response::error("boom")).unwrap(),
            json!({"status": "error", "error": "boom"})
        );
        assert_eq!(
            serde_json::to_value(Response::Success { result: json!(1) }).unwrap(),
            json!({"status": "success", "result": 1})
        );
    }

    #[test]
    fn test_frame_is_base64_json() {
        let frame = encode_frame(&json!({"command": "ping"})).unwrap();
        assert_eq!(frame, "eyJjb21tYW5kIjoicGluZyJ9");
        let request: Request = decode_frame(&format!("{frame}\r\n")).unwrap();
        assert_eq!(request, Request::Ping { message: None });
        assert!(matches!(
            decode_frame::<Request>("not base64!"),
            Err(FrameError::Base64(_))
        ));
    }

    #[tokio::test]
    async fn test_serve_loop() {
        let mut input = String::new();
        input.push_str(&encode_frame(&json!({"command": "ping", "message": "test"})).unwrap());
        input.push('\n');
        input.push_str("garbage\n\n");
        input.push_str(&encode_frame(&json!({"command": "ping"})).unwrap());
        input.push('\n');

        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<Response> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| decode_frame(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(
            responses[0],
            Response::Success {
                result: json!({"message": "pong, test"})
            }
        );
        assert!(matches!(responses[1], Response::Error { .. }));
        assert_eq!(
            responses[2],
            Response::Success {
                result: json!({"message": "pong, qYp-mini"})
            }
        );
    }
}
