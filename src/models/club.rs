// src/models/club.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,

    #[schema(example = "Padel Club Mirasierra")]
    pub name: String,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: Uuid,
    pub club_id: Uuid,

    #[schema(example = 3)]
    pub number: i32,

    #[schema(example = "Pista central")]
    pub name: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: Uuid,
    pub club_id: Uuid,

    #[schema(example = "Carlos M.")]
    pub name: String,

    pub created_at: Option<DateTime<Utc>>,
}
