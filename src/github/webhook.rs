//! Webhook delivery verification and payload types.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw body and sends
//! the hex digest in `X-Hub-Signature-256` as `sha256=<hex>`. Verification
//! must happen on the raw bytes before any JSON parsing.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use super::ProjectCard;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const EVENT_HEADER: &str = "x-github-event";

/// A rejected delivery. Surfaced to the sender as a 400 with the message
/// as the body; everything else about a delivery is fire-and-forget.
#[derive(Debug, Error)]
pub enum PayloadInvalid {
    #[error("missing {SIGNATURE_HEADER} header")]
    MissingSignature,

    #[error("malformed signature header")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("failed to parse webhook payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Verify a delivery signature against the shared secret.
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), PayloadInvalid> {
    let header = header.ok_or(PayloadInvalid::MissingSignature)?;
    let hex_digest = header
        .strip_prefix("sha256=")
        .ok_or(PayloadInvalid::MalformedSignature)?;
    let expected = hex::decode(hex_digest).map_err(|_| PayloadInvalid::MalformedSignature)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| PayloadInvalid::MalformedSignature)?;
    mac.update(body);
    // verify_slice is constant-time.
    mac.verify_slice(&expected)
        .map_err(|_| PayloadInvalid::SignatureMismatch)
}

/// Compute the `sha256=<hex>` signature value for a body. Used by tests to
/// produce valid deliveries.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

// ── Payload types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// The issue embedded in an issues event (subset of fields).
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// Canonical API URL; cards reference it through `content_url`.
    pub url: String,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub assignees: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesEvent {
    pub action: String,
    pub issue: Issue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCardEvent {
    pub action: String,
    pub project_card: ProjectCard,
    #[serde(default)]
    pub organization: Option<Account>,
}
