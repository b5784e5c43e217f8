use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable daily schedule. Times are clock times with no date attached;
/// `end_time < start_time` means the shift crosses midnight.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftTemplate {
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }
}
