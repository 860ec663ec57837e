//! Chat completions client.
//!
//! A session is nothing more than the system message built from the
//! session context; every `send` posts that message plus the command line,
//! so replacing the session after `cd` costs no network round trip.

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use shelltutor_terminal::{ResponseEngine, SessionContext, SessionHandle, guide_prompt};
use shelltutor_types::config::EngineConfig;
use shelltutor_types::error::{Result, TutorError};

/// Upper bound on error-body text carried into an error message.
const MAX_ERROR_BODY: usize = 512;

const GUIDE_SYSTEM: &str = "You are a patient teacher of the Linux command line.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Response engine backed by a chat completions API.
pub struct ChatEngine {
    agent: ureq::Agent,
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl ChatEngine {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
        temperature: f32,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("shelltutor/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            url: completions_url(endpoint),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature,
        }
    }

    /// Build from config, reading the API key from the configured
    /// environment variable. A missing key is an initialization failure.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                TutorError::Init(format!(
                    "API key not set; export {} or run with --offline",
                    config.api_key_env
                ))
            })?;
        info!("Using {} at {}", config.model, config.endpoint);
        Ok(Self::new(
            &config.endpoint,
            &config.model,
            &api_key,
            Duration::from_secs(config.timeout_secs),
            config.temperature,
        ))
    }

    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };
        debug!("POST {} ({} chars)", self.url, user.len());

        let response = self
            .agent
            .post(&self.url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(describe_error)?;
        let parsed: ChatResponse = response
            .into_json()
            .map_err(|e| TutorError::Remote(format!("malformed response: {e}")))?;
        extract_content(parsed)
    }
}

impl ResponseEngine for ChatEngine {
    fn create_session(&self, context: SessionContext) -> Result<SessionHandle> {
        Ok(SessionHandle::new(context))
    }

    fn send(&self, session: &SessionHandle, line: &str) -> Result<String> {
        self.complete(&session.context().description, line)
    }

    fn generate_guide(&self, goal: &str) -> Result<String> {
        self.complete(GUIDE_SYSTEM, &guide_prompt(goal))
    }
}

/// `https://host/v1/` -> `https://host/v1/chat/completions`.
fn completions_url(endpoint: &str) -> String {
    format!("{}/chat/completions", endpoint.trim_end_matches('/'))
}

fn extract_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| strip_fences(text.trim()).to_string())
        .ok_or_else(|| TutorError::Remote("response contained no message".to_string()))
}

/// Models sometimes wrap terminal output in a markdown code fence despite
/// being told not to.
fn strip_fences(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // Drop an info string such as ```bash.
    match inner.split_once('\n') {
        Some((info, rest)) if !info.contains(' ') => rest.trim_end_matches('\n'),
        _ => inner.trim(),
    }
}

fn describe_error(err: ureq::Error) -> TutorError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY).collect());
            TutorError::Remote(format!("HTTP {code}: {}", detail.trim()))
        },
        ureq::Error::Transport(t) => TutorError::Remote(t.to_string()),
    }
}
