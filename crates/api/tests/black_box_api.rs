use billbook_core::TenantId;
use billbook_infra::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = billbook_api::app::build_app(&AppConfig::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client that names `tenant` on every request.
fn client_for(tenant: TenantId) -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "x-tenant-id",
        reqwest::header::HeaderValue::from_str(&tenant.to_string()).unwrap(),
    );
    reqwest::Client::builder().default_headers(headers).build().unwrap()
}

fn money(v: &Value) -> f64 {
    v.as_str().expect("money is serialized as a string").parse().unwrap()
}

fn party(name: &str, gstin: &str) -> Value {
    json!({
        "name": name,
        "isGstRegistered": "Yes",
        "gstin": gstin,
        "email": format!("accounts@{}.in", name.to_lowercase().replace(' ', "")),
        "phone": "080 4000 0000",
        "address": { "line1": "12 MG Road", "city": "Bengaluru", "state": "Karnataka", "pincode": "560001" }
    })
}

async fn create(client: &reqwest::Client, server: &TestServer, path: &str, body: Value) -> Value {
    let res = client.post(server.url(path)).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "POST {path}");
    res.json().await.unwrap()
}

/// Entity and same-state customer; returns their ids.
async fn seed_parties(client: &reqwest::Client, server: &TestServer) -> (String, String) {
    let entity = create(client, server, "/entities", party("Acme Traders", "29AAGCB7383J1Z4")).await;
    let customer = create(client, server, "/customers", party("Bangalore Retail", "29AAACB1234C1Z5")).await;
    (
        entity["id"].as_str().unwrap().to_string(),
        customer["id"].as_str().unwrap().to_string(),
    )
}

fn invoice_body(entity_id: &str, customer_id: &str, kind: &str) -> Value {
    json!({
        "type": kind,
        "entityId": entity_id,
        "customerId": customer_id,
        "invoiceDate": "2024-01-01",
        "paymentTerms": 30,
        "items": [
            { "description": "Widget", "quantity": 2, "rate": "100", "gstRate": 18 }
        ]
    })
}

#[tokio::test]
async fn health_needs_no_tenant() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_header_required_for_scoped_endpoints() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/invoices")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_tenant");

    let res = client
        .get(server.url("/invoices"))
        .header("x-tenant-id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn party_crud_and_duplicate_names() {
    let server = TestServer::spawn().await;
    let client = client_for(TenantId::new());

    let created = create(&client, &server, "/customers", party("Bangalore Retail", "29aaacb1234c1z5")).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["gstin"], "29AAACB1234C1Z5");
    assert_eq!(created["pan"], "AAACB1234C");
    assert_eq!(created["placeOfSupply"], "Karnataka");

    let dup = client
        .post(server.url("/customers"))
        .json(&party("bangalore retail", "29AAACB1234C1Z5"))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::BAD_REQUEST);

    let listed: Vec<Value> = client
        .get(server.url("/customers?q=bang"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let mut renamed = party("Bangalore Retail Pvt", "29AAACB1234C1Z5");
    renamed["phone"] = json!("080 1111 2222");
    let res = client
        .put(server.url(&format!("/customers/{id}")))
        .json(&renamed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = client
        .get(server.url(&format!("/customers/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Bangalore Retail Pvt");

    let res = client.delete(server.url(&format!("/customers/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.get(server.url(&format!("/customers/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_party_is_rejected() {
    let server = TestServer::spawn().await;
    let client = client_for(TenantId::new());

    let mut bad = party("Acme", "29AAGCB7383J1Z4");
    bad["email"] = json!("");
    let res = client.post(server.url("/entities")).json(&bad).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let mut unregistered = party("Globex", "29AAGCB7383J1Z4");
    unregistered["isGstRegistered"] = json!("No");
    unregistered["gstin"] = Value::Null;
    unregistered["pan"] = json!("AAGCB7383J");
    unregistered["placeOfSupply"] = json!("Atlantis");
    let res = client.post(server.url("/entities")).json(&unregistered).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Atlantis"));

    let listed: Vec<Value> = client.get(server.url("/entities")).send().await.unwrap().json().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn invoice_lifecycle_over_http() {
    let server = TestServer::spawn().await;
    let client = client_for(TenantId::new());
    let (entity_id, customer_id) = seed_parties(&client, &server).await;

    let preview: Value = client
        .post(server.url("/invoices/preview"))
        .json(&invoice_body(&entity_id, &customer_id, "Invoice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(preview["dueDate"], "2024-01-31");
    assert_eq!(money(&preview["totals"]["cgst"]), 18.0);

    let created = create(&client, &server, "/invoices", invoice_body(&entity_id, &customer_id, "Invoice")).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "Draft");
    assert_eq!(created["editable"], true);
    assert!(created["invoiceNumber"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(money(&created["taxableTotal"]), 200.0);
    assert_eq!(money(&created["sgst"]), 18.0);
    assert_eq!(money(&created["igst"]), 0.0);
    assert_eq!(money(&created["total"]), 236.0);

    // Draft cannot jump to Paid.
    let res = client
        .post(server.url(&format!("/invoices/{id}/status")))
        .json(&json!({ "status": "Paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");

    let sent: Value = client
        .post(server.url(&format!("/invoices/{id}/status")))
        .json(&json!({ "action": "mark_sent" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sent["status"], "Sent");
    assert_eq!(sent["editable"], false);
    assert_eq!(sent["availableActions"][0]["action"], "mark_paid");

    // Locked once sent.
    let res = client
        .put(server.url(&format!("/invoices/{id}")))
        .json(&invoice_body(&entity_id, &customer_id, "Invoice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let doc: Value = client
        .get(server.url(&format!("/invoices/{id}/document")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["header"]["entityName"], "Acme Traders");
    assert_eq!(doc["billedTo"]["gstin"], "29AAACB1234C1Z5");
    assert_eq!(money(&doc["lines"][0]["amount"]), 200.0);

    let aging: Value = client
        .get(server.url("/reports/aging?today=2024-03-01"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(aging["buckets"][1]["bucket"], "1-30");
    assert_eq!(aging["buckets"][1]["count"], 1);
    assert_eq!(money(&aging["outstandingTotal"]), 236.0);

    let grouped: Vec<Value> = client
        .get(server.url("/reports/grouped?by=customer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0]["name"], "Bangalore Retail");

    let res = client
        .post(server.url(&format!("/invoices/{id}/status")))
        .json(&json!({ "status": "Paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let listed: Vec<Value> = client
        .get(server.url("/invoices?status=Paid"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["availableActions"], json!([]));
}

#[tokio::test]
async fn invoice_with_unknown_customer_is_rejected() {
    let server = TestServer::spawn().await;
    let client = client_for(TenantId::new());
    let (entity_id, _) = seed_parties(&client, &server).await;

    let res = client
        .post(server.url("/invoices"))
        .json(&invoice_body(&entity_id, &TenantId::new().to_string(), "Invoice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url("/reports/grouped?by=colour"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenant_isolation_blocks_cross_tenant_reads_and_writes() {
    let server = TestServer::spawn().await;
    let tenant_a = client_for(TenantId::new());
    let tenant_b = client_for(TenantId::new());

    let (entity_id, customer_id) = seed_parties(&tenant_a, &server).await;
    let created = create(&tenant_a, &server, "/invoices", invoice_body(&entity_id, &customer_id, "Proforma")).await;
    assert_eq!(created["status"], "Proforma");
    let id = created["id"].as_str().unwrap();

    let res = tenant_b.get(server.url(&format!("/invoices/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = tenant_b
        .post(server.url(&format!("/invoices/{id}/status")))
        .json(&json!({ "status": "Invoiced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let listed: Vec<Value> = tenant_b
        .get(server.url("/invoices"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    // Same names are fine in another tenant.
    seed_parties(&tenant_b, &server).await;
}
