use axum::{
    async_trait,
    body::to_bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
};
use ring::signature::{UnparsedPublicKey, ED25519};
use tracing::warn;

use super::dto::Interaction;
use crate::state::AppState;

const MAX_BODY: usize = 64 * 1024;

/// Checks Discord's Ed25519 request signatures against the application public key.
#[derive(Clone)]
pub struct SignatureVerifier {
    public_key: Vec<u8>,
}

impl SignatureVerifier {
    pub fn from_hex(public_key: &str) -> anyhow::Result<Self> {
        let public_key = hex::decode(public_key.trim())
            .map_err(|e| anyhow::anyhow!("PUBLIC_KEY is not hex: {e}"))?;
        anyhow::ensure!(public_key.len() == 32, "PUBLIC_KEY must be 32 bytes");
        Ok(Self { public_key })
    }

    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .is_ok()
    }
}

/// Interaction payload whose signature has been verified.
pub struct VerifiedInteraction(pub Interaction);

#[async_trait]
impl FromRequest<AppState> for VerifiedInteraction {
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let (signature, timestamp) = signature_headers(&parts.headers)
            .ok_or((StatusCode::UNAUTHORIZED, "missing signature headers".to_string()))?;

        let body = to_bytes(body, MAX_BODY)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "unreadable body".to_string()))?;

        if !state.verifier.verify(timestamp, &body, signature) {
            warn!("interaction signature rejected");
            return Err((StatusCode::UNAUTHORIZED, "invalid request signature".into()));
        }

        let interaction = serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("malformed interaction: {e}")))?;
        Ok(VerifiedInteraction(interaction))
    }
}

fn signature_headers(headers: &HeaderMap) -> Option<(&str, &str)> {
    let signature = headers.get("x-signature-ed25519")?.to_str().ok()?;
    let timestamp = headers.get("x-signature-timestamp")?.to_str().ok()?;
    Some((signature, timestamp))
}
