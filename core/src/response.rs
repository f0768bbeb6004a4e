//! Response — the uniform result type for executed commands.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status")]
pub enum Response {
    #[serde(rename = "ok")]
    Ok { output: String },

    #[serde(rename = "error")]
    Error { message: String },
}


impl Response {
    pub fn ok(output: impl Into<String>) -> Response {
        Response::Ok {
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Response {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    /// The payload string, regardless of variant.
    pub fn text(&self) -> &str {
        match self {
            Response::Ok { output } => output,
            Response::Error { message } => message,
        }
    }
}
