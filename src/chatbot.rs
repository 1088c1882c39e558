use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use anyhow::{Result, anyhow};

use crate::session::Message;

pub const MESSAGE_PATH: &str = "/customer_support/chatbot/message";
pub const CLEAR_PATH: &str = "/customer_support/chatbot/clear";

#[derive(Serialize)]
struct RpcCall<T: Serialize> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
}

impl<T: Serialize> RpcCall<T> {
    fn new(params: T) -> Self {
        Self { jsonrpc: "2.0", method: "call", params }
    }
}

#[derive(Serialize)]
struct MessageParams<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct EmptyParams {}

/// How a single message exchange ended. Transport failures are folded in here
/// rather than surfaced as errors, so every variant maps to exactly one
/// rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The server produced a reply.
    Reply(String),
    /// The server reported an application error, either inside the result
    /// object or as a top-level error message.
    ServerError(String),
    /// A result was present but carried neither a reply nor an error.
    UnexpectedShape,
    /// Neither a result nor a usable error was present.
    NoResponse,
    /// The request itself failed: connection error or undecodable body.
    Transport(String),
}

impl ReplyOutcome {
    pub fn into_message(self) -> Message {
        match self {
            ReplyOutcome::Reply(text) => Message::bot(text),
            ReplyOutcome::ServerError(text) => Message::error(format!("Error: {text}")),
            ReplyOutcome::UnexpectedShape => Message::error("Error: unexpected response format"),
            ReplyOutcome::NoResponse => Message::error("Error: could not get response"),
            ReplyOutcome::Transport(desc) => Message::error(format!("Error: {desc}")),
        }
    }
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one user message and classify whatever comes back. Never fails:
    /// transport problems become a `Transport` outcome.
    pub async fn send_message(&self, message: &str) -> ReplyOutcome {
        let url = format!("{}{}", self.base_url, MESSAGE_PATH);
        let call = RpcCall::new(MessageParams { message });

        match self.post(&url, &call).await {
            Ok(body) => interpret_response(&body),
            Err(err) => ReplyOutcome::Transport(err.to_string()),
        }
    }

    /// Ask the server to drop its side of the conversation history.
    pub async fn clear_history(&self) -> Result<()> {
        let url = format!("{}{}", self.base_url, CLEAR_PATH);
        let body = self.post(&url, &RpcCall::new(EmptyParams {})).await?;

        if body.pointer("/result/success").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(anyhow!("server did not confirm the history clear"))
        }
    }

    async fn post<T: Serialize>(&self, url: &str, call: &RpcCall<T>) -> Result<Value> {
        // Application errors arrive in the body, not the status line, so the
        // body is decoded regardless of status.
        let response = self.client.post(url).json(call).send().await?;
        let body = response.json().await?;
        Ok(body)
    }
}

/// Classify a decoded response body.
///
/// Precedence: result.reply, then result.error, then an unexpected result
/// shape, then a top-level error.message, then nothing usable at all. A JSON
/// null result counts as absent. The two catch-all cases stay distinct; both
/// are observable.
pub fn interpret_response(body: &Value) -> ReplyOutcome {
    match body.get("result").filter(|result| !result.is_null()) {
        Some(result) => {
            if let Some(reply) = result.get("reply").and_then(Value::as_str) {
                ReplyOutcome::Reply(reply.to_string())
            } else if let Some(error) = result.get("error").and_then(Value::as_str) {
                ReplyOutcome::ServerError(error.to_string())
            } else {
                ReplyOutcome::UnexpectedShape
            }
        }
        None => {
            let message = body
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str);
            match message {
                Some(message) => ReplyOutcome::ServerError(message.to_string()),
                None => ReplyOutcome::NoResponse,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use serde_json::json;

    #[test]
    fn test_interpret_reply() {
        let body = json!({"result": {"reply": "Hi"}});
        assert_eq!(interpret_response(&body), ReplyOutcome::Reply("Hi".to_string()));
    }

    #[test]
    fn test_interpret_result_error() {
        let body = json!({"result": {"error": "bad input"}});
        assert_eq!(
            interpret_response(&body),
            ReplyOutcome::ServerError("bad input".to_string())
        );
    }

    #[test]
    fn test_interpret_unexpected_result_shape() {
        assert_eq!(
            interpret_response(&json!({"result": {"status": "ok"}})),
            ReplyOutcome::UnexpectedShape
        );
        // A result that is not even an object lands in the same bucket.
        assert_eq!(
            interpret_response(&json!({"result": "done"})),
            ReplyOutcome::UnexpectedShape
        );
        // So does a non-string reply.
        assert_eq!(
            interpret_response(&json!({"result": {"reply": 42}})),
            ReplyOutcome::UnexpectedShape
        );
    }

    #[test]
    fn test_interpret_top_level_error() {
        let body = json!({"error": {"message": "down"}});
        assert_eq!(
            interpret_response(&body),
            ReplyOutcome::ServerError("down".to_string())
        );
    }

    #[test]
    fn test_interpret_null_result_falls_through_to_error() {
        let body = json!({"result": null, "error": {"message": "down"}});
        assert_eq!(
            interpret_response(&body),
            ReplyOutcome::ServerError("down".to_string())
        );
    }

    #[test]
    fn test_interpret_nothing_usable() {
        assert_eq!(interpret_response(&json!({})), ReplyOutcome::NoResponse);
        assert_eq!(
            interpret_response(&json!({"error": {"code": 200}})),
            ReplyOutcome::NoResponse
        );
    }

    #[test]
    fn test_outcome_message_texts() {
        let bot = ReplyOutcome::Reply("Hi".to_string()).into_message();
        assert_eq!(bot.role, Role::Bot);
        assert_eq!(bot.text, "Hi");

        let server = ReplyOutcome::ServerError("bad input".to_string()).into_message();
        assert_eq!(server.role, Role::Error);
        assert_eq!(server.text, "Error: bad input");

        let shape = ReplyOutcome::UnexpectedShape.into_message();
        assert_eq!(shape.role, Role::Error);
        assert_eq!(shape.text, "Error: unexpected response format");

        let missing = ReplyOutcome::NoResponse.into_message();
        assert_eq!(missing.role, Role::Error);
        assert_eq!(missing.text, "Error: could not get response");

        let transport = ReplyOutcome::Transport("timeout".to_string()).into_message();
        assert_eq!(transport.role, Role::Error);
        assert_eq!(transport.text, "Error: timeout");
    }
}
