use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub expertise: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInstructorRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub expertise: Option<String>,
    pub profile_image: Option<String>,
}
