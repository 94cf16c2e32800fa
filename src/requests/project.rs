use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<i64>,
    pub is_active: Option<bool>,
}
