use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::donation::SUPPORTED_CURRENCY,
    models::project::{CreateProject, Project, ProjectError, UpdateProject},
    requests::project::{ProjectRequest, UpdateProjectRequest},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn index(pool: web::Data<DbPool>) -> Result<HttpResponse> {
    info!("Listing active projects");

    match Project::find_active(&pool).await {
        Ok(projects) => Ok(HttpResponse::Ok().json(ApiResponse::success(projects))),
        Err(ProjectError::Database(e)) => {
            error!("Database error listing projects: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve projects".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error listing projects: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn all(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    match Project::find_all(&pool).await {
        Ok(projects) => Ok(HttpResponse::Ok().json(ApiResponse::success(projects))),
        Err(ProjectError::Database(e)) => {
            error!("Database error listing all projects: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve projects".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error listing all projects: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn get_project(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let project_id = path.into_inner();
    info!("Getting project {}", project_id);

    match Project::find_by_id(&pool, project_id).await {
        Ok(Some(project)) => Ok(HttpResponse::Ok().json(ApiResponse::success(project))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "Project not found".to_string(),
        ))),
        Err(ProjectError::Database(e)) => {
            error!("Database error getting project: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve project".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error getting project: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<ProjectRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    info!("Creating project for admin: {}", user.user_id);

    let create_project = CreateProject {
        created_by: user.user_id,
        title: request.title.clone(),
        description: request.description.clone(),
        goal_amount: request.goal_amount,
        currency: request
            .currency
            .clone()
            .unwrap_or_else(|| SUPPORTED_CURRENCY.to_string()),
    };

    match Project::create(&pool, create_project).await {
        Ok(project) => {
            info!("Successfully created project with ID: {}", project.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(project)))
        }
        Err(ProjectError::Database(e)) => {
            error!("Database error creating project: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create project".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error creating project: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateProjectRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let project_id = path.into_inner();

    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    info!("Updating project {} for admin: {}", project_id, user.user_id);

    let update_data = UpdateProject {
        title: request.title.clone(),
        description: request.description.clone(),
        goal_amount: request.goal_amount,
        is_active: request.is_active,
    };

    match Project::update(&pool, project_id, update_data).await {
        Ok(project) => {
            info!("Successfully updated project: {}", project_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(project)))
        }
        Err(ProjectError::NotFound { id }) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Project {} not found", id)),
        )),
        Err(ProjectError::NoUpdateFields) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::<()>::error("No fields provided for update".to_string()),
        )),
        Err(ProjectError::Database(e)) => {
            error!("Database error updating project: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update project".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error updating project: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let project_id = path.into_inner();

    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    info!("Deleting project {} for admin: {}", project_id, user.user_id);

    match Project::delete(&pool, project_id).await {
        Ok(()) => {
            info!("Successfully deleted project: {}", project_id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success(())))
        }
        Err(ProjectError::NotFound { id }) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Project {} not found", id)),
        )),
        Err(ProjectError::HasDonations) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::<()>::error("Project has donations and cannot be deleted".to_string()),
        )),
        Err(ProjectError::Database(e)) => {
            error!("Database error deleting project: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to delete project".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error deleting project: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}
