use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Employee, Employment};
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub company_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetailResponse {
    pub employee: Employee,
    pub employment: Option<Employment>,
    pub government_ids_valid: bool,
}

/// SSS numbers look like NN-NNNNNNN-N and TINs like NNN-NNN-NNN-NNN.
fn government_ids_valid(employee: &Employee) -> bool {
    let sss_re = regex::Regex::new(r"^\d{2}-\d{7}-\d$").expect("sss pattern");
    let tin_re = regex::Regex::new(r"^\d{3}-\d{3}-\d{3}-\d{3}$").expect("tin pattern");

    let sss_ok = employee
        .sss_no
        .as_deref()
        .map(|v| sss_re.is_match(v))
        .unwrap_or(true);
    let tin_ok = employee
        .tin_no
        .as_deref()
        .map(|v| tin_re.is_match(v))
        .unwrap_or(true);

    sss_ok && tin_ok
}

pub async fn get_employees(
    claims: Claims,
    repo: web::Data<EmployeeRepository>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can list employees".to_string(),
        ));
    }

    let employees = repo.list_by_company(query.company_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employees)))
}

pub async fn get_employee(
    claims: Claims,
    repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can view employees".to_string(),
        ));
    }

    let id = path.into_inner();
    let employee = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;
    let employment = repo.find_active_employment(id).await?;
    let ids_valid = government_ids_valid(&employee);

    Ok(HttpResponse::Ok().json(ApiResponse::success(EmployeeDetailResponse {
        employee,
        employment,
        government_ids_valid: ids_valid,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(sss: Option<&str>, tin: Option<&str>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employee_no: "EMP-0001".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            email: None,
            sss_no: sss.map(str::to_string),
            philhealth_no: None,
            pagibig_no: None,
            tin_no: tin.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn id_formats_are_checked_when_present() {
        assert!(government_ids_valid(&employee(
            Some("34-1234567-8"),
            Some("123-456-789-000")
        )));
        assert!(!government_ids_valid(&employee(Some("341234567"), None)));
        assert!(!government_ids_valid(&employee(
            None,
            Some("123456789000")
        )));
        // Absent IDs are not an error at this layer.
        assert!(government_ids_valid(&employee(None, None)));
    }
}
