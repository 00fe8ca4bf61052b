#[cfg(test)]
mod integration_tests {
    use crate::handlers::clients::CreateClientRequest;
    use crate::handlers::goals::CreateGoalRequest;
    use crate::handlers::prospects::{CreateProspectRequest, PromoteProspectRequest};
    use crate::handlers::services::CreateServiceRequest;
    use crate::handlers::tasks::{CreateTaskRequest, RecordActionRequest};
    use crate::identity::USER_ID_HEADER;
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn auth(user_id: i32) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        )
    }

    async fn create_client(server: &TestServer, actor: i32, legal_name: &str) -> i64 {
        let (name, value) = auth(actor);
        let response = server
            .post("/api/v1/clients")
            .add_header(name, value)
            .json(&CreateClientRequest {
                tax_id: "12.345.678/0001-95".to_string(),
                legal_name: legal_name.to_string(),
                address: "Av. Paulista 1000".to_string(),
                contact_name: "Ana".to_string(),
                contact_phone: "+55 11 99999-0000".to_string(),
                registered_by: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_identity_header_is_unauthorized() {
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/clients").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = auth(9999);
        let response = server.get("/api/v1/clients").add_header(name, value).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_representative_sees_only_own_clients() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;

        let (name, value) = auth(users.rep_id);
        let response = server.get("/api/v1/clients").add_header(name, value).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let (name, value) = auth(users.other_rep_id);
        let response = server.get("/api/v1/clients").add_header(name, value).await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());

        let (name, value) = auth(users.manager_id);
        let response = server.get("/api/v1/clients").add_header(name, value).await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_representative_filter_is_ignored_for_representatives() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;

        // A representative asking for another representative's portfolio
        // still gets their own.
        let (name, value) = auth(users.other_rep_id);
        let response = server
            .get(&format!("/api/v1/clients?representative={}", users.rep_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());

        // Management gets the filtered view.
        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!("/api/v1/clients?representative={}", users.rep_id))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_client_with_services_cannot_be_deleted() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let client_id = create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;

        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/services")
            .add_header(name, value)
            .json(&CreateServiceRequest {
                client_id: client_id as i32,
                service_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
                quantity: 2,
                value: Decimal::new(3500, 0),
                kind_id: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.manager_id);
        let response = server
            .delete(&format!("/api/v1/clients/{client_id}"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.dependents, Some(1));
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_duplicate_goal_is_rejected() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let client_id = create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;
        let request = CreateGoalRequest {
            client_id: client_id as i32,
            month: 3,
            year: 2025,
            business_days: None,
            value: Decimal::new(10000, 0),
        };

        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/goals")
            .add_header(name, value)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/goals")
            .add_header(name, value)
            .json(&request)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_goal_creation_requires_management() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let client_id = create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/goals")
            .add_header(name, value)
            .json(&CreateGoalRequest {
                client_id: client_id as i32,
                month: 3,
                year: 2025,
                business_days: None,
                value: Decimal::new(10000, 0),
            })
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_service_month_filter_requires_year() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.manager_id);
        let response = server
            .get("/api/v1/services?month=3")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_promote_prospect_creates_client_and_removes_prospect() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/prospects")
            .add_header(name, value)
            .json(&CreateProspectRequest {
                tax_id: Some("98.765.432/0001-10".to_string()),
                legal_name: "Viagens Beta SA".to_string(),
                contact_name: "Bruno".to_string(),
                contact_phone: "+55 21 98888-0000".to_string(),
                contact_email: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let prospect_id = body.data["id"].as_i64().unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospects/{prospect_id}/promote"))
            .add_header(name, value)
            .json(&PromoteProspectRequest {
                address: "Rua das Laranjeiras 52".to_string(),
                tax_id: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["legal_name"], "Viagens Beta SA");
        assert_eq!(body.data["tax_id"], "98765432000110");

        // The prospect record is gone once promoted.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!("/api/v1/prospects/{prospect_id}"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_promote_without_tax_id_is_rejected() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/prospects")
            .add_header(name, value)
            .json(&CreateProspectRequest {
                tax_id: None,
                legal_name: "Viagens Beta SA".to_string(),
                contact_name: "Bruno".to_string(),
                contact_phone: "+55 21 98888-0000".to_string(),
                contact_email: None,
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let prospect_id = body.data["id"].as_i64().unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospects/{prospect_id}/promote"))
            .add_header(name, value)
            .json(&PromoteProspectRequest {
                address: "Rua das Laranjeiras 52".to_string(),
                tax_id: None,
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Still a prospect.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!("/api/v1/prospects/{prospect_id}"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/tasks")
            .add_header(name, value)
            .json(&CreateTaskRequest {
                title: "Call the hotel chain".to_string(),
                description: String::new(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let task_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["status"], "NOT_STARTED");

        // Finishing before starting is an invalid transition.
        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/tasks/{task_id}/finish"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/tasks/{task_id}/start"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "STARTED");

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/tasks/{task_id}/finish"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "FINISHED");
    }

    #[tokio::test]
    async fn test_task_action_starts_the_task() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/tasks")
            .add_header(name, value)
            .json(&CreateTaskRequest {
                title: "Draft the proposal".to_string(),
                description: String::new(),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let task_id = body.data["id"].as_i64().unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/tasks/{task_id}/actions"))
            .add_header(name, value)
            .json(&RecordActionRequest {
                description: "Sent the first draft".to_string(),
                attachment: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!("/api/v1/tasks/{task_id}"))
            .add_header(name, value)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "STARTED");
    }

    #[tokio::test]
    async fn test_prospecting_case_flow() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/prospects")
            .add_header(name, value)
            .json(&CreateProspectRequest {
                tax_id: Some("98.765.432/0001-10".to_string()),
                legal_name: "Viagens Beta SA".to_string(),
                contact_name: "Bruno".to_string(),
                contact_phone: "+55 21 98888-0000".to_string(),
                contact_email: None,
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let prospect_id = body.data["id"].as_i64().unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .post("/api/v1/prospecting")
            .add_header(name, value)
            .json(&json!({
                "prospect_id": prospect_id,
                "kind_id": null,
                "duration_months": 12,
                "trips": 4,
                "avg_trip_value": "2500",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let case_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["status"], "NEW");
        assert_eq!(body.data["total_value"], "10000");
        assert_eq!(body.data["days_in_stage"], 0);
        let control = body.data["control_number"].as_str().unwrap();
        assert!(control.starts_with("PROSPEC-"));
        assert!(control.ends_with("/00001"));

        // Recording an action moves a NEW case to NEGOTIATING.
        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospecting/{case_id}/actions"))
            .add_header(name, value)
            .json(&RecordActionRequest {
                description: "First meeting scheduled".to_string(),
                attachment: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!("/api/v1/prospecting/{case_id}"))
            .add_header(name, value)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "NEGOTIATING");

        // An outcome outside the terminal set never deserializes.
        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospecting/{case_id}/finalize"))
            .add_header(name, value)
            .json(&json!({ "outcome": "NEGOTIATING" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospecting/{case_id}/finalize"))
            .add_header(name, value)
            .json(&json!({ "outcome": "CLOSED" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "CLOSED");
        // Stage age only exists while the case is open.
        assert!(body.data["days_in_stage"].is_null());

        // Finalizing twice is an invalid transition.
        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospecting/{case_id}/finalize"))
            .add_header(name, value)
            .json(&json!({ "outcome": "ABANDONED" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    async fn open_case(server: &TestServer, actor: i32) -> (i64, i64) {
        let (name, value) = auth(actor);
        let response = server
            .post("/api/v1/prospects")
            .add_header(name, value)
            .json(&CreateProspectRequest {
                tax_id: Some("98.765.432/0001-10".to_string()),
                legal_name: "Viagens Beta SA".to_string(),
                contact_name: "Bruno".to_string(),
                contact_phone: "+55 21 98888-0000".to_string(),
                contact_email: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let prospect_id = body.data["id"].as_i64().unwrap();

        let (name, value) = auth(actor);
        let response = server
            .post("/api/v1/prospecting")
            .add_header(name, value)
            .json(&json!({
                "prospect_id": prospect_id,
                "kind_id": null,
                "duration_months": 12,
                "trips": 4,
                "avg_trip_value": "2500",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        (prospect_id, body.data["id"].as_i64().unwrap())
    }

    #[tokio::test]
    async fn test_prospecting_actions_round_trip() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, case_id) = open_case(&server, users.rep_id).await;

        let (name, value) = auth(users.rep_id);
        let response = server
            .post(&format!("/api/v1/prospecting/{case_id}/actions"))
            .add_header(name, value)
            .json(&RecordActionRequest {
                description: "First meeting scheduled".to_string(),
                attachment: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        // Editing writes a synthetic diff action of its own.
        let (name, value) = auth(users.rep_id);
        let response = server
            .put(&format!("/api/v1/prospecting/{case_id}"))
            .add_header(name, value)
            .json(&json!({ "trips": 6 }))
            .await;
        response.assert_status(StatusCode::OK);

        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!("/api/v1/prospecting/{case_id}/actions"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0]["description"], "First meeting scheduled");
        let diff = body.data[1]["description"].as_str().unwrap();
        assert!(diff.starts_with("Updated: "));
        assert!(diff.contains("trips: 4 -> 6"));

        // Another representative cannot read the history.
        let (name, value) = auth(users.other_rep_id);
        let response = server
            .get(&format!("/api/v1/prospecting/{case_id}/actions"))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_prospect_listing_representative_filter() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        open_case(&server, users.rep_id).await;

        // A representative's filter request is dropped, not honored.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!(
                "/api/v1/prospects?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!(
                "/api/v1/prospects?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_funnel_dashboard_representative_filter() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        open_case(&server, users.rep_id).await;

        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!(
                "/api/v1/prospecting/dashboard?representative={}",
                users.rep_id
            ))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["snapshot"]["new_count"], 1);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!(
                "/api/v1/prospecting/dashboard?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["snapshot"]["new_count"], 0);

        // The case's owner keeps their own view despite the filter.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!(
                "/api/v1/prospecting/dashboard?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["snapshot"]["new_count"], 1);
    }

    #[tokio::test]
    async fn test_service_listing_representative_filter() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let client_id = create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;
        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/services")
            .add_header(name, value)
            .json(&CreateServiceRequest {
                client_id: client_id as i32,
                service_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
                quantity: 1,
                value: Decimal::new(1200, 0),
                kind_id: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!("/api/v1/services?representative={}", users.rep_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get(&format!(
                "/api/v1/services?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.data.is_empty());

        // A representative asking for someone else's services still gets
        // their own clients' services.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get(&format!(
                "/api/v1/services?representative={}",
                users.other_rep_id
            ))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_summary_attainment() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let client_id = create_client(&server, users.rep_id, "Empresa Alfa Ltda").await;

        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/goals")
            .add_header(name, value)
            .json(&CreateGoalRequest {
                client_id: client_id as i32,
                month: 3,
                year: 2025,
                business_days: None,
                value: Decimal::new(10000, 0),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.manager_id);
        let response = server
            .post("/api/v1/services")
            .add_header(name, value)
            .json(&CreateServiceRequest {
                client_id: client_id as i32,
                service_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
                quantity: 2,
                value: Decimal::new(7000, 0),
                kind_id: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get("/api/v1/dashboard/summary?granularity=month&year=2025&month=3")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let summary = &body.data["summary"];
        assert_eq!(summary["revenue"], "7000");
        assert_eq!(summary["goal"], "10000");
        assert_eq!(summary["attainment_pct"], 70.0);
        // Management identities also get the representative ranking.
        assert!(body.data["representatives"].is_array());
    }

    #[tokio::test]
    async fn test_dashboard_hides_ranking_from_representatives() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .get("/api/v1/dashboard/summary?granularity=month&year=2025&month=3")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.data.get("representatives").is_none());
    }

    #[tokio::test]
    async fn test_registry_rejects_malformed_tax_id() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.rep_id);
        let response = server
            .get("/api/v1/registry/123")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_registry_failure_is_an_outcome_not_an_error() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // The test registry points at a closed port with one attempt.
        let (name, value) = auth(users.rep_id);
        let response = server
            .get("/api/v1/registry/12345678000195")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["outcome"], "failed");
        assert_eq!(body.data["attempts"], 1);
    }

    #[tokio::test]
    async fn test_report_unknown_type_is_rejected() {
        let (app, users) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (name, value) = auth(users.manager_id);
        let response = server
            .get("/api/v1/reports?report_type=everything")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let (name, value) = auth(users.manager_id);
        let response = server
            .get("/api/v1/reports?report_type=client_registry")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
    }
}
