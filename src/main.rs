use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use sweldo_be::database::{
    init_database,
    repositories::{
        AttendanceRepository, DeductionRepository, EmployeeRepository, HolidayRepository,
        LeaveRepository, OvertimeRepository, PayrollRepository, StatutoryRepository,
        UserRepository,
    },
};
use sweldo_be::handlers::{
    attendance, auth, contributions, employees, holidays, overtime, payroll, rates,
};
use sweldo_be::middleware::RequestId;
use sweldo_be::services::{AttendanceService, AuthService, PayrollService, StatutoryService};
use sweldo_be::{AppState, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("SweldoHR API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories
    let user_repository = UserRepository::new(pool.clone());
    let employee_repository = EmployeeRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());
    let overtime_repository = OvertimeRepository::new(pool.clone());
    let holiday_repository = HolidayRepository::new(pool.clone());
    let leave_repository = LeaveRepository::new(pool.clone());
    let statutory_repository = StatutoryRepository::new(pool.clone());
    let deduction_repository = DeductionRepository::new(pool.clone());
    let payroll_repository = PayrollRepository::new(pool.clone());

    // Services
    let auth_service = AuthService::new(user_repository.clone(), config.clone());
    let statutory_service = StatutoryService::new(statutory_repository.clone());
    let attendance_service = AttendanceService::new(
        attendance_repository.clone(),
        employee_repository.clone(),
        payroll_repository.clone(),
        leave_repository.clone(),
    );
    let payroll_service = PayrollService::new(
        pool.clone(),
        payroll_repository.clone(),
        employee_repository.clone(),
        overtime_repository.clone(),
        attendance_repository.clone(),
        deduction_repository.clone(),
        statutory_service.clone(),
    );

    let app_state = web::Data::new(AppState { auth_service });
    let employee_repo_data = web::Data::new(employee_repository);
    let attendance_repo_data = web::Data::new(attendance_repository);
    let overtime_repo_data = web::Data::new(overtime_repository);
    let holiday_repo_data = web::Data::new(holiday_repository);
    let statutory_repo_data = web::Data::new(statutory_repository);
    let payroll_repo_data = web::Data::new(payroll_repository);
    let statutory_service_data = web::Data::new(statutory_service);
    let attendance_service_data = web::Data::new(attendance_service);
    let payroll_service_data = web::Data::new(payroll_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(employee_repo_data.clone())
            .app_data(attendance_repo_data.clone())
            .app_data(overtime_repo_data.clone())
            .app_data(holiday_repo_data.clone())
            .app_data(statutory_repo_data.clone())
            .app_data(payroll_repo_data.clone())
            .app_data(statutory_service_data.clone())
            .app_data(attendance_service_data.clone())
            .app_data(payroll_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/attendance")
                            .route("", web::post().to(attendance::store_attendance))
                            .route("", web::get().to(attendance::get_attendance))
                            .route("/punch", web::post().to(attendance::punch))
                            .route("/import", web::post().to(attendance::import_attendance))
                            .route("/compute", web::get().to(attendance::compute_attendance))
                            .route("/{id}", web::put().to(attendance::update_attendance))
                            .route("/{id}", web::delete().to(attendance::delete_attendance)),
                    )
                    .service(
                        web::scope("/overtime")
                            .route("", web::post().to(overtime::create_overtime_request))
                            .route("", web::get().to(overtime::get_overtime_requests))
                            .route("/{id}", web::get().to(overtime::get_overtime_request))
                            .route(
                                "/{id}/approve",
                                web::post().to(overtime::approve_overtime_request),
                            )
                            .route(
                                "/{id}/reject",
                                web::post().to(overtime::reject_overtime_request),
                            ),
                    )
                    .service(
                        web::scope("/contributions")
                            .route("/calculate", web::get().to(contributions::calculate)),
                    )
                    .service(
                        web::scope("/tax")
                            .route("/calculate", web::get().to(contributions::calculate_tax)),
                    )
                    .service(web::scope("/overtime-pay").route(
                        "/preview",
                        web::get().to(contributions::preview_overtime_pay),
                    ))
                    .service(
                        web::scope("/payroll")
                            .route("", web::post().to(payroll::generate_payroll))
                            .route("", web::get().to(payroll::get_payrolls))
                            .route("/{id}", web::get().to(payroll::get_payroll))
                            .route("/{id}", web::delete().to(payroll::delete_payroll))
                            .route("/{id}/finalize", web::post().to(payroll::finalize_payroll))
                            .route(
                                "/{id}/mark-paid",
                                web::post().to(payroll::mark_payroll_paid),
                            ),
                    )
                    .service(
                        web::scope("/payslips")
                            .route("/{id}", web::put().to(payroll::update_payslip)),
                    )
                    .service(
                        web::scope("/employees")
                            .route("", web::get().to(employees::get_employees))
                            .route("/{id}", web::get().to(employees::get_employee)),
                    )
                    .service(
                        web::scope("/holidays")
                            .route("", web::get().to(holidays::get_holidays))
                            .route("", web::post().to(holidays::create_holiday)),
                    )
                    .service(
                        web::scope("/rates")
                            .route("/overtime", web::get().to(rates::get_overtime_rates))
                            .route(
                                "/overtime/{key}",
                                web::put().to(rates::update_overtime_rate),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
