//! Billing webhook. The third-party subscription service posts events
//! here. Requests carry an `x-webhook-signature` header holding
//! base64(HMAC-SHA256(body, secret)); anything that fails verification is
//! rejected before the payload is parsed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use crate::state::AppState;
use typeb_core::config::Config;
use typeb_core::entitlement::{self, BillingEvent, Entitlement};
use typeb_core::TypebError;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature value a well-behaved sender would attach.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn verify(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), TypebError> {
    let header = header.ok_or(TypebError::WebhookSignature)?;
    let claimed = base64::engine::general_purpose::STANDARD
        .decode(header)
        .map_err(|_| TypebError::WebhookSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    // Constant-time comparison via the hmac crate.
    mac.verify_slice(&claimed)
        .map_err(|_| TypebError::WebhookSignature)
}

/// POST /api/billing/webhook: verify, then apply the entitlement change.
/// An unconfigured secret rejects everything; the webhook is never open.
pub async fn billing_webhook(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Entitlement>, AppError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let root = app.root.clone();
    let entitlement = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let Some(secret) = config.webhook_secret() else {
            tracing::error!("billing webhook called but no secret is configured");
            return Err(TypebError::WebhookSignature);
        };
        verify(&secret, &body, header.as_deref())?;

        // A signed but malformed payload is the sender's fault, so it maps
        // to 400 rather than a retryable 500.
        let event: BillingEvent = serde_json::from_slice(&body)
            .map_err(|e| TypebError::InvalidValue(format!("malformed billing payload: {e}")))?;
        entitlement::apply_event(&root, &event)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(entitlement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let sig = sign("secret", b"{\"id\":\"evt-1\"}");
        verify("secret", b"{\"id\":\"evt-1\"}", Some(&sig)).unwrap();
    }

    #[test]
    fn tampered_body_rejected() {
        let sig = sign("secret", b"original");
        let err = verify("secret", b"tampered", Some(&sig)).unwrap_err();
        assert!(matches!(err, TypebError::WebhookSignature));
    }

    #[test]
    fn wrong_secret_rejected() {
        let sig = sign("other", b"body");
        assert!(verify("secret", b"body", Some(&sig)).is_err());
    }

    #[test]
    fn missing_header_rejected() {
        assert!(verify("secret", b"body", None).is_err());
    }

    #[test]
    fn garbage_header_rejected() {
        assert!(verify("secret", b"body", Some("not-base64!!")).is_err());
    }
}
