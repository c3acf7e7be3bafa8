//! Replayable request payloads.
//!
//! `reqwest`'s multipart form is consumed when a request is sent, so a
//! request that may be replayed after a credential refresh cannot hold one
//! directly. [`Payload`] keeps the declarative form data and builds a fresh
//! body for every attempt.

use serde::Serialize;

use crate::error::ApiError;

/// The body of an outbound API call.
#[derive(Debug, Clone)]
pub enum Payload {
    /// No body (GET, DELETE, bodyless POST).
    Empty,
    /// A JSON body; sends `Content-Type: application/json`.
    Json(serde_json::Value),
    /// A multipart form (e.g. image upload). No content type is forced;
    /// `reqwest` frames the parts itself.
    Multipart(Vec<FormPart>),
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    name: String,
    kind: FormPartKind,
}

#[derive(Debug, Clone)]
enum FormPartKind {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl FormPart {
    /// A plain text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FormPartKind::Text(value.into()),
        }
    }

    /// A file field with its original file name.
    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: FormPartKind::File {
                file_name: file_name.into(),
                bytes,
            },
        }
    }
}

impl Payload {
    /// Serialize `body` into a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serde`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        Ok(Self::Json(serde_json::to_value(body)?))
    }

    /// Attach this payload to a request builder, constructing a fresh body.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Empty => request,
            Self::Json(value) => request.json(value),
            Self::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match &part.kind {
                        FormPartKind::Text(value) => form.text(part.name.clone(), value.clone()),
                        FormPartKind::File { file_name, bytes } => form.part(
                            part.name.clone(),
                            reqwest::multipart::Part::bytes(bytes.clone())
                                .file_name(file_name.clone()),
                        ),
                    };
                }
                request.multipart(form)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_payload_from_struct() {
        #[derive(Serialize)]
        struct Body {
            name: &'static str,
        }

        let payload = Payload::json(&Body { name: "linen shirt" }).unwrap();
        let Payload::Json(value) = payload else {
            panic!("expected JSON payload");
        };
        assert_eq!(value["name"], "linen shirt");
    }

    #[test]
    fn test_multipart_parts_are_cloneable() {
        // Replay depends on rebuilding the form from retained parts.
        let payload = Payload::Multipart(vec![
            FormPart::text("productId", "p-1"),
            FormPart::file("images", "front.jpg", vec![0xFF, 0xD8]),
        ]);
        let replayed = payload.clone();
        assert!(matches!(replayed, Payload::Multipart(parts) if parts.len() == 2));
    }
}
