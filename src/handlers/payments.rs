use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::donation::Donation,
    models::payment::{Payment, PaymentError},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn get_by_donation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let donation_id = path.into_inner();
    info!("Getting payment record for donation {}", donation_id);

    match Donation::find_by_id(&pool, donation_id).await {
        Ok(Some(donation)) => {
            if donation.donor_id != user.user_id && !user.user_role.is_admin() {
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

    match Payment::find_by_donation(&pool, donation_id).await {
        Ok(Some(payment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(payment))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "No payment record for this donation".to_string(),
        ))),
        Err(PaymentError::Database(e)) => {
            error!("Database error getting payment: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve payment".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error getting payment: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}
