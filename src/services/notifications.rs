use crate::database::connection::DbPool;
use crate::models::{notification::Notification, user::User};
use crate::services::email::EmailService;
use tracing::{error, warn};
use uuid::Uuid;

/// Attempts delivery of every queued notification for a donation.
///
/// Called after the verification transaction commits. Delivery is
/// best-effort: a failure leaves the row queued for a later attempt and
/// never propagates to the caller, so webhook and admin flows ack
/// regardless of SMTP health.
pub async fn deliver_queued(pool: &DbPool, donation_id: Uuid) {
    let queued = match Notification::find_queued_for_donation(pool, donation_id).await {
        Ok(queued) => queued,
        Err(e) => {
            error!(
                "Failed to load queued notifications for donation {}: {}",
                donation_id, e
            );
            return;
        }
    };

    if queued.is_empty() {
        return;
    }

    let email_service = match EmailService::new() {
        Ok(service) => service,
        Err(e) => {
            warn!("Email delivery unavailable, notifications stay queued: {}", e);
            return;
        }
    };

    for notification in queued {
        let user = match User::find_by_id(pool, notification.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                error!(
                    "Notification {} references unknown user {}",
                    notification.id, notification.user_id
                );
                continue;
            }
            Err(e) => {
                error!("Failed to load recipient for notification {}: {}", notification.id, e);
                continue;
            }
        };

        let template =
            email_service.donation_status_template(&notification.subject, &notification.body);

        match email_service.send_email(&user.email, Some(&user.fullname), template) {
            Ok(()) => {
                if let Err(e) = Notification::mark_sent(pool, notification.id).await {
                    error!("Failed to mark notification {} sent: {}", notification.id, e);
                }
            }
            Err(e) => {
                error!("Failed to deliver notification {}: {}", notification.id, e);
            }
        }
    }
}
