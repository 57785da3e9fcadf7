//! Wire protocol: one command per line, one reply per command, replies
//! terminated by a single blank line.
//!
//! Two dialects share the socket. A line containing `=` is the key-value
//! dialect (`acao=...;chave=valor;...`); anything else is the legacy
//! pipe dialect (`OPERATION|arg1|arg2|...`).

use std::collections::HashMap;

/// A decoded inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Key-value dialect. `action` is lower-cased; `params` keys are
    /// lower-cased and trimmed, values trimmed.
    KeyValue {
        action: String,
        params: HashMap<String, String>,
    },
    /// Pipe dialect. `action` is upper-cased; args keep their raw text.
    Pipe { action: String, args: Vec<String> },
}

/// Decodes one request line. Decoding never fails: malformed key-value
/// pairs are dropped, and an unknown action is the dispatcher's problem.
pub fn decode(line: &str) -> Command {
    if line.contains('=') {
        let mut params = HashMap::new();
        for pair in line.split(';') {
            if let Some((key, value)) = pair.split_once('=') {
                params.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
        let action = params.remove("acao").unwrap_or_default().to_lowercase();
        Command::KeyValue { action, params }
    } else {
        let mut parts = line.split('|').map(str::to_string);
        let action = parts.next().unwrap_or_default().trim().to_uppercase();
        Command::Pipe {
            action,
            args: parts.collect(),
        }
    }
}

/// An outbound reply, prior to framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Pipe-dialect success envelope: `SUCCESS|<payload>`.
    PipeSuccess(String),
    /// Raw text body (key-value successes and report bodies).
    Text(String),
    /// Placeholder for key-value actions the frontend exposes but the
    /// server has not implemented.
    InDevelopment(String),
    /// Error envelope shared by both dialects: `ERROR|<message>`.
    Error(String),
}

impl Reply {
    pub fn render(&self) -> String {
        match self {
            Reply::PipeSuccess(payload) => format!("SUCCESS|{}", payload),
            Reply::Text(body) => body.clone(),
            Reply::InDevelopment(action) => {
                format!("FUNCIONALIDADE_EM_DESENVOLVIMENTO|{}", action)
            }
            Reply::Error(message) => format!("ERROR|{}", message),
        }
    }
}
