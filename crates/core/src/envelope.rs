//! Outward-facing result envelopes
//!
//! Every result leaving the core is one of three shapes: data with a
//! message, a bare message, or an error `{code, status, message}`.

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope<T: Serialize> {
    Data {
        code: u16,
        status: &'static str,
        message: String,
        data: T,
    },
    Message {
        code: u16,
        status: &'static str,
        message: String,
    },
    Error {
        code: u16,
        status: &'static str,
        message: String,
    },
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Envelope::Data {
            code: 200,
            status: "status ok",
            message: message.into(),
            data,
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Envelope::Data {
            code: 201,
            status: "status created",
            message: message.into(),
            data,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Envelope::Message {
            code: 200,
            status: "status ok",
            message: message.into(),
        }
    }

    pub fn error(err: &Error) -> Self {
        let kind = err.kind();
        Envelope::Error {
            code: kind.code(),
            status: kind.status(),
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Envelope::Data { code, .. }
            | Envelope::Message { code, .. }
            | Envelope::Error { code, .. } => *code,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error { .. })
    }
}

impl<T: Serialize> From<Error> for Envelope<T> {
    fn from(err: Error) -> Self {
        Envelope::error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_shape() {
        let env = Envelope::ok("items fetched", vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"code": 200, "status": "status ok", "message": "items fetched", "data": [1, 2]})
        );
    }

    #[test]
    fn test_message_shape_has_no_data() {
        let env: Envelope<()> = Envelope::message("logged out");
        let value = serde_json::to_value(&env).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["message"], "logged out");
    }

    #[test]
    fn test_error_shape() {
        let env: Envelope<()> = Error::not_found("item 9").into();
        assert!(env.is_error());
        assert_eq!(env.code(), 404);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"code": 404, "status": "status not found", "message": "Not found: item 9 not found"})
        );
    }
}
