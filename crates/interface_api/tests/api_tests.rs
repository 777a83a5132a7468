//! HTTP tests of the API router over the in-memory engine harness

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{AgentId, Money, PolicyId};
use domain_lifecycle::harness::Harness;
use domain_party::{Actor, Customer};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::handlers::gateway::GATEWAY_SECRET_HEADER;
use interface_api::{create_router, AppState};

const JWT_SECRET: &str = "api-test-secret";
const GATEWAY_SECRET: &str = "gateway-test-secret";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn server(h: &Harness) -> TestServer {
    let config = ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        gateway_webhook_secret: GATEWAY_SECRET.to_string(),
        ..ApiConfig::default()
    };
    let app = create_router(AppState {
        engine: h.engine.clone(),
        config,
    });
    TestServer::new(app).unwrap()
}

fn bearer(actor: Actor) -> HeaderValue {
    let token = create_token(&actor, JWT_SECRET, 300).unwrap();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn gateway_secret(secret: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(GATEWAY_SECRET_HEADER),
        HeaderValue::from_static(secret),
    )
}

fn policy_id_of(body: &Value) -> PolicyId {
    serde_json::from_value(body["data"]["id"].clone()).unwrap()
}

/// Registers a 10-year, 100000, quarterly policy through the API
async fn register(h: &Harness, server: &TestServer, customer: &Customer) -> PolicyId {
    let offer = h.plan().await.unwrap();
    let response = server
        .post("/api/v1/policies")
        .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
        .json(&json!({
            "plan_id": offer.plan.id,
            "term_years": 10,
            "total_investment": 100_000,
            "payment_interval": "QUARTERLY",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    policy_id_of(&response.json::<Value>())
}

/// Records a gateway capture for the quoted amount and applies it
async fn pay(server: &TestServer, customer: &Customer, policy_id: PolicyId, charge_id: &str) -> Value {
    let quote = server
        .get(&format!("/api/v1/policies/{}/quote", policy_id.as_uuid()))
        .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
        .await;
    assert_eq!(quote.status_code(), StatusCode::OK);
    let total = quote.json::<Value>()["total"].clone();

    let (name, value) = gateway_secret(GATEWAY_SECRET);
    let capture = server
        .post("/api/v1/gateway/captures")
        .add_header(name, value)
        .json(&json!({
            "charge_id": charge_id,
            "policy_id": policy_id,
            "amount": total,
            "succeeded": true,
        }))
        .await;
    assert_eq!(capture.status_code(), StatusCode::CREATED);

    let response = server
        .post(&format!("/api/v1/policies/{}/payments", policy_id.as_uuid()))
        .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
        .json(&json!({ "charge_id": charge_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()
}

// ============================================================================
// Health and authentication
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints_are_public() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);

        let live = server.get("/health").await;
        assert_eq!(live.status_code(), StatusCode::OK);
        assert_eq!(live.json::<Value>()["status"], "healthy");

        let ready = server.get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::OK);
        assert_eq!(ready.json::<Value>()["status"], "ready");
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let h = Harness::on(date(2025, 1, 15));
        let response = server(&h).get("/api/v1/claims/pending").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_signed_with_another_secret_is_unauthorized() {
        let h = Harness::on(date(2025, 1, 15));
        let admin = h.admin().await.unwrap();
        let token = create_token(&Actor::Admin(admin.id), "someone-else", 300).unwrap();

        let response = server(&h)
            .get("/api/v1/claims/pending")
            .add_header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customers_only_read_their_own_policies() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let owner = h.customer().await.unwrap();
        let policy_id = register(&h, &server, &owner).await;
        let stranger = h.customer().await.unwrap();

        let own = server
            .get(&format!("/api/v1/policies/{}", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(owner.id)))
            .await;
        assert_eq!(own.status_code(), StatusCode::OK);

        let other = server
            .get(&format!("/api/v1/policies/{}", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(stranger.id)))
            .await;
        assert_eq!(other.status_code(), StatusCode::FORBIDDEN);

        let quote = server
            .get(&format!("/api/v1/policies/{}/quote", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(stranger.id)))
            .await;
        assert_eq!(quote.status_code(), StatusCode::FORBIDDEN);
    }
}

// ============================================================================
// Policies and payments
// ============================================================================

mod policy_tests {
    use super::*;

    #[tokio::test]
    async fn test_customer_registers_policy() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();

        let response = server
            .post("/api/v1/policies")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({
                "plan_id": offer.plan.id,
                "term_years": 10,
                "total_investment": 100_000,
                "payment_interval": "QUARTERLY",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["data"]["installment_amount"], 2500);
        assert_eq!(body["data"]["status"], "ACTIVE");
        assert_eq!(body["data"]["next_payment_date"], "2025-01-15");
        assert!(body["message"].as_str().unwrap().contains("registered"));
    }

    #[tokio::test]
    async fn test_unknown_interval_is_bad_request() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();

        let response = server
            .post("/api/v1/policies")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({
                "plan_id": offer.plan.id,
                "term_years": 10,
                "total_investment": 100_000,
                "payment_interval": "WEEKLY",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "invalid_interval");
    }

    #[tokio::test]
    async fn test_zero_term_fails_request_validation() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();

        let response = server
            .post("/api/v1/policies")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({
                "plan_id": offer.plan.id,
                "term_years": 0,
                "total_investment": 100_000,
                "payment_interval": "YEARLY",
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "validation_error");
        assert!(body["details"][0].as_str().unwrap().starts_with("term_years"));
    }

    #[tokio::test]
    async fn test_agent_registration_is_attributed_to_the_agent() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let agent = h.agent().await.unwrap();
        let offer = h.plan().await.unwrap();

        let response = server
            .post("/api/v1/policies")
            .add_header(AUTHORIZATION, bearer(Actor::Agent(agent.id)))
            .json(&json!({
                "customer_id": customer.id,
                "plan_id": offer.plan.id,
                "term_years": 10,
                "total_investment": 100_000,
                "payment_interval": "YEARLY",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let sold = server
            .get(&format!("/api/v1/agents/{}/policies", agent.id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Agent(agent.id)))
            .await;
        assert_eq!(sold.json::<Vec<Value>>().len(), 1);

        let other_agent = server
            .get(&format!("/api/v1/agents/{}/policies", agent.id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Agent(AgentId::new())))
            .await;
        assert_eq!(other_agent.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_quote_then_pay_advances_policy() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let policy_id = register(&h, &server, &customer).await;

        let body = pay(&server, &customer, policy_id, "ch_api_1").await;

        let paid: Money =
            serde_json::from_value(body["data"]["policy"]["total_amount_paid"].clone()).unwrap();
        assert_eq!(paid, Money::new(dec!(2500)));
        assert_eq!(body["data"]["policy"]["next_payment_date"], "2025-04-15");
        assert_eq!(body["data"]["expired"], false);

        let history = server
            .get(&format!("/api/v1/policies/{}/transactions", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .await;
        assert_eq!(history.json::<Vec<Value>>().len(), 1);
    }

    #[tokio::test]
    async fn test_uncaptured_charge_is_payment_required() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let policy_id = register(&h, &server, &customer).await;

        let response = server
            .post(&format!("/api/v1/policies/{}/payments", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({ "charge_id": "ch_never_captured" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(response.json::<Value>()["error"], "payment_not_captured");
    }

    #[tokio::test]
    async fn test_gateway_callback_requires_the_shared_secret() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let (name, value) = gateway_secret("wrong-secret");

        let response = server
            .post("/api/v1/gateway/captures")
            .add_header(name, value)
            .json(&json!({
                "charge_id": "ch_forged",
                "policy_id": PolicyId::new(),
                "amount": "2500.00",
                "succeeded": true,
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}

// ============================================================================
// Claims and withdrawals
// ============================================================================

mod resolution_tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_approval_is_admin_only_and_effect_once() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let admin = h.admin().await.unwrap();
        let policy_id = register(&h, &server, &customer).await;
        pay(&server, &customer, policy_id, "ch_claim_1").await;

        let submitted = server
            .post("/api/v1/claims")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({ "policy_id": policy_id, "explanation": "Hospitalised after an accident" }))
            .await;
        assert_eq!(submitted.status_code(), StatusCode::CREATED);
        let claim_id = submitted.json::<Value>()["data"]["id"].as_i64().unwrap();

        let pending = server
            .get("/api/v1/claims/pending")
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert_eq!(pending.json::<Vec<Value>>().len(), 1);

        let by_customer = server
            .post(&format!("/api/v1/claims/{claim_id}/approve"))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .await;
        assert_eq!(by_customer.status_code(), StatusCode::FORBIDDEN);

        let approved = server
            .post(&format!("/api/v1/claims/{claim_id}/approve"))
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert_eq!(approved.status_code(), StatusCode::OK);
        assert!(!approved.json::<Value>()["data"]["payout"].is_null());

        let again = server
            .post(&format!("/api/v1/claims/{claim_id}/approve"))
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert_eq!(again.status_code(), StatusCode::CONFLICT);
        assert_eq!(again.json::<Value>()["error"], "already_in_terminal_state");

        let policy = server
            .get(&format!("/api/v1/policies/{}", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .await;
        assert_eq!(policy.json::<Value>()["status"], "CLAIMED");
    }

    #[tokio::test]
    async fn test_empty_claim_explanation_is_rejected() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let policy_id = register(&h, &server, &customer).await;

        let response = server
            .post("/api/v1/claims")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({ "policy_id": policy_id, "explanation": "" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_withdrawal_approval_cancels_policy() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let admin = h.admin().await.unwrap();
        let policy_id = register(&h, &server, &customer).await;

        let requested = server
            .post("/api/v1/withdrawals")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({ "policy_id": policy_id }))
            .await;
        assert_eq!(requested.status_code(), StatusCode::CREATED);
        let request_id = requested.json::<Value>()["data"]["id"].as_i64().unwrap();

        let approved = server
            .post(&format!("/api/v1/withdrawals/{request_id}/approve"))
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert_eq!(approved.status_code(), StatusCode::OK);

        let policy = server
            .get(&format!("/api/v1/policies/{}", policy_id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert_eq!(policy.json::<Value>()["status"], "CANCELLED");

        let pending = server
            .get("/api/v1/withdrawals/pending")
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .await;
        assert!(pending.json::<Vec<Value>>().is_empty());
    }
}

// ============================================================================
// Settings and commissions
// ============================================================================

mod settings_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_publishes_tax_setting() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let admin = h.admin().await.unwrap();
        let customer = h.customer().await.unwrap();

        let by_customer = server
            .post("/api/v1/settings/tax")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .json(&json!({ "tax_percentage": "5" }))
            .await;
        assert_eq!(by_customer.status_code(), StatusCode::FORBIDDEN);

        let out_of_range = server
            .post("/api/v1/settings/tax")
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .json(&json!({ "tax_percentage": "101" }))
            .await;
        assert_eq!(out_of_range.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let published = server
            .post("/api/v1/settings/tax")
            .add_header(AUTHORIZATION, bearer(Actor::Admin(admin.id)))
            .json(&json!({ "tax_percentage": "5" }))
            .await;
        assert_eq!(published.status_code(), StatusCode::CREATED);

        let current = server
            .get("/api/v1/settings")
            .add_header(AUTHORIZATION, bearer(Actor::Customer(customer.id)))
            .await;
        let body = current.json::<Value>();
        assert!(!body["tax"].is_null());
        assert!(body["insurance"].is_null());
    }

    #[tokio::test]
    async fn test_agent_reads_commission_summary() {
        let h = Harness::on(date(2025, 1, 15));
        let server = server(&h);
        let customer = h.customer().await.unwrap();
        let agent = h.agent().await.unwrap();
        let offer = h.plan().await.unwrap();

        let registered = server
            .post("/api/v1/policies")
            .add_header(AUTHORIZATION, bearer(Actor::Agent(agent.id)))
            .json(&json!({
                "customer_id": customer.id,
                "plan_id": offer.plan.id,
                "term_years": 10,
                "total_investment": 100_000,
                "payment_interval": "YEARLY",
            }))
            .await;
        assert_eq!(registered.status_code(), StatusCode::CREATED);

        let summary = server
            .get(&format!("/api/v1/agents/{}/commission-summary", agent.id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Agent(agent.id)))
            .await;
        assert_eq!(summary.status_code(), StatusCode::OK);
        assert_eq!(summary.json::<Value>()["sold_policy_count"], 1);

        let lines = server
            .get(&format!("/api/v1/agents/{}/commissions", agent.id.as_uuid()))
            .add_header(AUTHORIZATION, bearer(Actor::Agent(agent.id)))
            .await;
        let lines = lines.json::<Vec<Value>>();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["commission"], 5);
    }
}
