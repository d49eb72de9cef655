//! Outbound body classification.
//!
//! A request body can be read only once, so the forwarding shape is decided
//! from the method and `Content-Type` first ([`BodyKind::classify`]) and the
//! body is consumed exactly once afterwards ([`BodyKind::read`]).

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method};

use crate::http::response::GatewayError;

const MULTIPART_FORM: &str = "multipart/form-data";

/// How an inbound body will be forwarded, decided before it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// Nothing is forwarded (GET, DELETE).
    Empty,
    /// Opaque payload forwarded as `application/json`.
    Json,
    /// Multipart upload forwarded byte-for-byte with its original content type.
    Multipart(HeaderValue),
}

impl BodyKind {
    pub fn classify(method: &Method, headers: &HeaderMap) -> Self {
        if *method == Method::GET || *method == Method::DELETE || *method == Method::HEAD {
            return BodyKind::Empty;
        }

        if *method == Method::POST {
            if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
                let is_multipart = content_type
                    .to_str()
                    .map(|v| {
                        v.trim_start()
                            .to_ascii_lowercase()
                            .starts_with(MULTIPART_FORM)
                    })
                    .unwrap_or(false);
                if is_multipart {
                    return BodyKind::Multipart(content_type.clone());
                }
            }
        }

        BodyKind::Json
    }

    /// Consume the body according to this kind.
    pub async fn read(self, body: Body, limit: usize) -> Result<OutboundBody, GatewayError> {
        match self {
            BodyKind::Empty => Ok(OutboundBody::Empty),
            BodyKind::Json => Ok(OutboundBody::Json(collect(body, limit).await?)),
            BodyKind::Multipart(content_type) => Ok(OutboundBody::Multipart {
                content_type,
                payload: collect(body, limit).await?,
            }),
        }
    }
}

async fn collect(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(GatewayError::RequestBody)
}

/// A body that has been read and is ready to send upstream.
#[derive(Debug, Clone)]
pub enum OutboundBody {
    Empty,
    Json(Bytes),
    Multipart { content_type: HeaderValue, payload: Bytes },
}

impl OutboundBody {
    /// Label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            OutboundBody::Empty => "empty",
            OutboundBody::Json(_) => "json",
            OutboundBody::Multipart { .. } => "multipart",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutboundBody::Empty => 0,
            OutboundBody::Json(bytes) => bytes.len(),
            OutboundBody::Multipart { payload, .. } => payload.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put the body and its content type on an outbound request.
    pub fn attach(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            OutboundBody::Empty => builder,
            OutboundBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes),
            OutboundBody::Multipart {
                content_type,
                payload,
            } => builder.header(header::CONTENT_TYPE, content_type).body(payload),
        }
    }
}
