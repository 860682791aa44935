//! Command parameters and their multipart encoding.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tgpoll_core::error::TgPollError;

/// Value of a single command parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandParam {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Structured value sent JSON-encoded (e.g. `reply_markup`).
    Json(Value),
    File(InputFile),
}

/// Binary upload.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl InputFile {
    pub fn new(data: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            mime_type: None,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl CommandParam {
    /// Form field text for non-file values.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Json(v) => Some(v.to_string()),
            Self::File(_) => None,
        }
    }

    fn into_part(self) -> Result<Part, TgPollError> {
        match self {
            Self::File(file) => {
                let part = Part::bytes(file.data).file_name(file.file_name);
                match file.mime_type {
                    Some(mime) => part
                        .mime_str(&mime)
                        .map_err(|e| TgPollError::Http(format!("invalid mime type '{mime}': {e}"))),
                    None => Ok(part),
                }
            }
            other => Ok(Part::text(other.as_text().unwrap_or_default())),
        }
    }
}

impl From<&str> for CommandParam {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CommandParam {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CommandParam {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for CommandParam {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<f64> for CommandParam {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for CommandParam {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<InputFile> for CommandParam {
    fn from(file: InputFile) -> Self {
        Self::File(file)
    }
}

impl From<Value> for CommandParam {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Self::Text(s),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(ref n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Integer(i),
                (None, Some(f)) => Self::Float(f),
                _ => Self::Json(v),
            },
            other => Self::Json(other),
        }
    }
}

/// Encode parameters as multipart fields, one per key, in order.
///
/// `None` when there are no parameters: an empty multipart body has no
/// closing boundary, so such requests go out without a body instead.
pub(crate) fn build_form<I, K, V>(params: I) -> Result<Option<Form>, TgPollError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<CommandParam>,
{
    params.into_iter().try_fold(None, |form: Option<Form>, (key, value)| {
        let part = value.into().into_part()?;
        Ok(Some(form.unwrap_or_default().part(key.into(), part)))
    })
}
