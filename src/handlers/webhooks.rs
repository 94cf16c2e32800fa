use crate::{
    database::connection::DbPool,
    models::config::AppConfig,
    models::donation::{Donation, DonationError, ProviderRef, VerificationOutcome},
    models::payment::{Payment, PaymentStatus},
    requests::webhook::{WhatsappEnvelope, WhopEnvelope, WhopEvent, WhopEventData},
    services::notifications,
    settings::Settings,
    utils::{helpers::ApiResponse, signature},
};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};
use uuid::Uuid;

const WHATSAPP_CONNECTED_KEY: &str = "whatsapp_connected";

/// Payment-provider callback. Response codes are part of the provider
/// contract: 4xx/5xx only for requests that should not have been sent
/// (or a broken deployment); once the signature checks out the event is
/// acked with 200 no matter what, so a processing bug never turns into a
/// retry storm.
pub async fn whop(
    req: HttpRequest,
    body: web::Bytes,
    pool: web::Data<DbPool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse> {
    let Some((id, timestamp, signature_header)) = signature_headers(&req) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Missing signature headers".to_string(),
        )));
    };

    let Some(secret) = settings.whop_webhook_secret.as_deref() else {
        error!("Webhook secret is not configured, refusing delivery {}", id);
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Webhook secret not configured".to_string(),
            )),
        );
    };

    // The raw bytes are what was signed; parsing first and re-encoding
    // would break verification.
    if !signature::verify(&id, &timestamp, &body, secret, &signature_header) {
        warn!("Rejected webhook delivery {} with invalid signature", id);
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::<()>::error("Invalid signature".to_string())));
    }

    let envelope: WhopEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Webhook delivery {} carried invalid JSON: {}", id, e);
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("Invalid JSON body".to_string())));
        }
    };

    match WhopEvent::from_envelope(envelope) {
        WhopEvent::PaymentSucceeded(data) => {
            process_payment_event(&pool, data, true, PaymentStatus::Completed).await
        }
        WhopEvent::PaymentFailed(data) => {
            process_payment_event(&pool, data, false, PaymentStatus::Failed).await
        }
        WhopEvent::PaymentRefunded(data) => {
            process_payment_event(&pool, data, false, PaymentStatus::Refunded).await
        }
        WhopEvent::Unrecognized(event) => {
            info!("Ignoring unhandled webhook event: {}", event);
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Acknowledged".to_string())))
}

fn signature_headers(req: &HttpRequest) -> Option<(String, String, String)> {
    let get = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    Some((get("svix-id")?, get("svix-timestamp")?, get("svix-signature")?))
}

/// Maps an authenticated provider event onto the donation state machine.
/// Every failure below this point is logged and swallowed; the caller
/// acks the delivery regardless.
async fn process_payment_event(
    pool: &DbPool,
    data: WhopEventData,
    verified: bool,
    payment_status: PaymentStatus,
) {
    let Some(raw_donation_id) = data.metadata.donation_id.as_deref() else {
        info!("Webhook event carries no donationId metadata, ignoring");
        return;
    };

    let donation_id = match Uuid::parse_str(raw_donation_id) {
        Ok(donation_id) => donation_id,
        Err(_) => {
            warn!("Webhook carries malformed donationId {:?}, ignoring", raw_donation_id);
            return;
        }
    };

    let provider_payment_id = data.id.as_deref().unwrap_or("unknown");
    let notes = format!(
        "Provider payment {} reported as {}",
        provider_payment_id, payment_status
    );
    // Keep the provider's own status string when it sends one, otherwise
    // fall back to the mapped payment status.
    let provider_status = data
        .status
        .clone()
        .unwrap_or_else(|| payment_status.to_string());
    let provider = data.id.clone().map(|payment_id| ProviderRef {
        payment_id,
        status: provider_status,
    });

    match Donation::apply_verification(pool, donation_id, verified, &notes, None, provider).await {
        Ok(VerificationOutcome::Applied(donation)) => {
            info!(
                "Donation {} moved to {} by provider webhook",
                donation.id, donation.status
            );
            if let Err(e) =
                Payment::record_provider_status(pool, donation_id, data.id.as_deref(), payment_status)
                    .await
            {
                error!(
                    "Failed to record provider status for donation {}: {}",
                    donation_id, e
                );
            }
            notifications::deliver_queued(pool, donation_id).await;
        }
        Ok(VerificationOutcome::AlreadyFinal(donation)) => {
            info!(
                "Donation {} already {}, webhook delivery ignored",
                donation.id, donation.status
            );
        }
        Err(DonationError::NotFound { id }) => {
            warn!("Webhook references unknown donation {}, ignoring", id);
        }
        Err(e) => {
            error!("Failed to process webhook for donation {}: {}", donation_id, e);
        }
    }
}

/// Messaging-provider session callback. Shares the webhook response
/// discipline: 401 for a bad secret, 400 for unparseable JSON, 200 for
/// everything else including storage failures.
pub async fn whatsapp(
    req: HttpRequest,
    body: web::Bytes,
    pool: web::Data<DbPool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse> {
    if let Some(secret) = settings.whatsapp_webhook_secret.as_deref() {
        let provided = req
            .headers()
            .get("X-Webhook-Secret")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let matches: bool = provided.as_bytes().ct_eq(secret.as_bytes()).into();
        if !matches {
            warn!("Rejected messaging webhook with bad secret");
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error("Invalid webhook secret".to_string())));
        }
    }

    let envelope: WhatsappEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Messaging webhook carried invalid JSON: {}", e);
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("Invalid JSON body".to_string())));
        }
    };

    if envelope.event == "session.status" && envelope.data.status.as_deref() == Some("connected") {
        match AppConfig::set(&pool, WHATSAPP_CONNECTED_KEY, "true").await {
            Ok(_) => info!("Messaging session marked connected"),
            Err(e) => error!("Failed to persist messaging session state: {}", e),
        }
    } else {
        info!("Ignoring messaging webhook event: {}", envelope.event);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Acknowledged".to_string())))
}
