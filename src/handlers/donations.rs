use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::donation::{
        CreateDonation, Donation, DonationError, PaymentMethod, VerificationOutcome,
    },
    models::payment::{CreatePayment, Payment},
    models::project::Project,
    requests::donation::{DonationRequest, ReceiptRequest, VerifyDonationRequest},
    services::notifications,
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<DonationRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Creating donation for user: {}", user.user_id);

    match Project::find_by_id(&pool, request.project_id).await {
        Ok(Some(project)) if project.is_active => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Project is not accepting donations".to_string(),
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
                "Project not found".to_string(),
            )));
        }
        Err(e) => {
            error!("Error checking project: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to verify project".to_string(),
                )),
            );
        }
    }

    let create_donation = CreateDonation {
        donor_id: user.user_id,
        project_id: request.project_id,
        amount: request.amount,
        currency: request.currency.clone(),
        covers_fees: request.covers_fees,
        payment_method: request.payment_method,
    };

    match Donation::create(&pool, create_donation).await {
        Ok(donation) => {
            info!("Successfully created donation with ID: {}", donation.id);

            // Card payments get their provider-side transaction record up
            // front; the webhook fills in the provider's numbers later.
            if donation.payment_method == PaymentMethod::CardProvider {
                let create_payment = CreatePayment {
                    donation_id: donation.id,
                    gross_amount: donation.amount,
                    platform_fee: 0,
                    processing_fee: 0,
                };
                if let Err(e) = Payment::create(&pool, create_payment).await {
                    error!("Failed to create payment record for donation {}: {}", donation.id, e);
                }
            }

            Ok(HttpResponse::Created().json(ApiResponse::success(donation)))
        }
        Err(DonationError::Database(e)) => {
            error!("Database error creating donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create donation".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error creating donation: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn get_donation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let donation_id = path.into_inner();
    info!("Getting donation {}", donation_id);

    match Donation::find_by_id(&pool, donation_id).await {
        Ok(Some(donation)) => {
            if donation.donor_id != user.user_id && !user.user_role.is_admin() {
                return Ok(HttpResponse::Forbidden()
                    .json(ApiResponse::<()>::error("Access denied".to_string())));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(donation)))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "Donation not found".to_string(),
        ))),
        Err(DonationError::Database(e)) => {
            error!("Database error getting donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error getting donation: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn mine(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    info!("Getting all donations for user: {}", user.user_id);

    match Donation::find_by_donor(&pool, user.user_id).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(DonationError::Database(e)) => {
            error!("Database error getting user donations: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error getting user donations: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn all(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    info!("Getting all donations");

    match Donation::find_all(&pool).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(DonationError::Database(e)) => {
            error!("Database error getting all donations: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error getting all donations: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn submit_receipt(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<ReceiptRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let donation_id = path.into_inner();
    info!(
        "Submitting receipt for donation {} by user: {}",
        donation_id, user.user_id
    );

    match Donation::find_by_id(&pool, donation_id).await {
        Ok(Some(existing)) => {
            if existing.donor_id != user.user_id {
                return Ok(HttpResponse::Forbidden()
                    .json(ApiResponse::<()>::error("Access denied".to_string())));
            }
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
                "Donation not found".to_string(),
            )));
        }
        Err(e) => {
            error!("Error checking donation ownership: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to verify donation".to_string(),
                )),
            );
        }
    }

    match Donation::submit_receipt(&pool, donation_id, &request.receipt_url).await {
        Ok(donation) => {
            info!("Receipt recorded for donation: {}", donation_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(donation)))
        }
        Err(DonationError::NotFound { id }) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Donation {} not found", id)),
        )),
        Err(DonationError::Database(e)) => {
            error!("Database error recording receipt: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to record receipt".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error recording receipt: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn verify(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<VerifyDonationRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let donation_id = path.into_inner();

    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    info!(
        "Admin {} verifying donation {} (verified: {})",
        user.user_id, donation_id, request.verified
    );

    let notes = request.notes.clone().unwrap_or_else(|| {
        if request.verified {
            "Verified by administrator".to_string()
        } else {
            "Rejected by administrator".to_string()
        }
    });

    match Donation::apply_verification(
        &pool,
        donation_id,
        request.verified,
        &notes,
        Some(user.user_id),
        None,
    )
    .await
    {
        Ok(VerificationOutcome::Applied(donation)) => {
            info!("Donation {} moved to {}", donation.id, donation.status);
            notifications::deliver_queued(&pool, donation.id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(donation)))
        }
        Ok(VerificationOutcome::AlreadyFinal(donation)) => {
            info!(
                "Donation {} already {}, verification unchanged",
                donation.id, donation.status
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                donation,
                "Donation already finalized".to_string(),
            )))
        }
        Err(DonationError::NotFound { id }) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Donation {} not found", id)),
        )),
        Err(DonationError::Database(e)) => {
            error!("Database error verifying donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to verify donation".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error verifying donation: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}
