//! Delivery lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives quote, create,
//! status polling, cancel and listing over real HTTP with `UreqTransport`.
//! The server state handle lets the test advance a delivery the way a
//! courier would.

use postmates_core::{
    ApiError, ClientConfig, Delivery, DeliveryQuote, DeliveryStatus, ErrorCode, Location,
    PostmatesClient, Transport, UreqTransport,
};

fn start_server() -> (String, mock_server::Db) {
    let _ = env_logger::builder().is_test(true).try_init();

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let db = mock_server::Db::default();
    let state = db.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), db)
}

fn client(base_url: &str, api_key: &str) -> PostmatesClient<UreqTransport> {
    PostmatesClient::new(ClientConfig::new(api_key, "cus_test").with_base_url(base_url))
}

fn set_status(db: &mock_server::Db, id: &str, status: &str) {
    db.blocking_write().deliveries.get_mut(id).unwrap().status = status.to_string();
}

const PICKUP_ADDRESS: &str = "20 McAllister St, San Francisco, CA";
const DROPOFF_ADDRESS: &str = "101 Market St, San Francisco, CA";

fn pickup() -> Location {
    Location::new("Alice", PICKUP_ADDRESS, "415-555-0100").with_business_name("Alice's Bakery")
}

fn dropoff() -> Location {
    Location::new("Bob", DROPOFF_ADDRESS, "415-555-0101").with_notes("Front desk")
}

#[test]
fn quoted_delivery_lifecycle() {
    let (base_url, db) = start_server();
    let client = client(&base_url, "test_key");

    // Step 1: quote.
    let quote = DeliveryQuote::request(&client, PICKUP_ADDRESS, DROPOFF_ADDRESS).unwrap();
    assert!(quote.quote_id().starts_with("dqt_"));
    assert_eq!(quote.fee(), mock_server::DEFAULT_FEE);
    assert!(!quote.expired());

    // Step 2: create with the quote attached.
    let quote_id = quote.quote_id().to_string();
    let mut delivery = Delivery::new("a box of cookies", pickup(), dropoff(), Some(quote));
    delivery.create(&client).unwrap();
    assert_eq!(delivery.status(), &DeliveryStatus::Pending);
    let id = delivery.delivery_id().unwrap().to_string();
    assert_eq!(db.blocking_read().deliveries[&id].quote_id.as_deref(), Some(quote_id.as_str()));
    assert!(delivery.pickup_eta().is_some());
    assert_eq!(delivery.currency(), Some("usd"));

    // Step 3: second create is rejected locally.
    let err = delivery.create(&client).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Step 4: courier picks up; polling sees it.
    set_status(&db, &id, "pickup");
    delivery.update_status(&client).unwrap();
    assert_eq!(delivery.status(), &DeliveryStatus::Pickup);

    // Step 5: cancel.
    delivery.cancel(&client).unwrap();
    assert_eq!(delivery.status(), &DeliveryStatus::Canceled);
    assert!(delivery.complete());

    // Step 6: cancel again is rejected locally.
    let err = delivery.cancel(&client).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Step 7: listing shows the delivery.
    let list = client.list_deliveries(true).unwrap();
    assert_eq!(list.data.len(), 1);
    assert_eq!(list.data[0].id, id);
    assert_eq!(list.data[0].status, DeliveryStatus::Canceled);
}

#[test]
fn unquoted_delivery_is_delivered() {
    let (base_url, db) = start_server();
    let client = client(&base_url, "test_key");

    let mut delivery = Delivery::new("flowers", pickup(), dropoff(), None);
    delivery.create(&client).unwrap();
    let id = delivery.delivery_id().unwrap().to_string();

    set_status(&db, &id, "delivered");
    delivery.update_status(&client).unwrap();
    assert_eq!(delivery.status(), &DeliveryStatus::Delivered);

    let err = delivery.cancel(&client).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
fn server_side_cancel_refusal_keeps_state() {
    let (base_url, db) = start_server();
    let client = client(&base_url, "test_key");

    let mut delivery = Delivery::new("flowers", pickup(), dropoff(), None);
    delivery.create(&client).unwrap();
    let id = delivery.delivery_id().unwrap().to_string();

    // Locally still pending, but the server has moved on.
    set_status(&db, &id, "dropoff");
    let before = delivery.clone();
    let err = delivery.cancel(&client).unwrap_err();
    assert_eq!(err.code(), Some(&ErrorCode::Text("noncancelable_delivery".to_string())));
    assert_eq!(delivery, before);
}

#[test]
fn structured_errors_surface_kind_and_code() {
    let (base_url, _db) = start_server();

    let err = client(&base_url, "test_key").request_quote(PICKUP_ADDRESS, "").unwrap_err();
    assert_eq!(err.kind(), Some("error"));
    assert_eq!(err.code(), Some(&ErrorCode::Text("invalid_params".to_string())));

    let err = client(&base_url, "test_key").get_delivery("del_missing").unwrap_err();
    assert_eq!(err.code(), Some(&ErrorCode::Text("not_found".to_string())));

    let err = client(&base_url, "").list_deliveries(false).unwrap_err();
    assert_eq!(err.code(), Some(&ErrorCode::Text("unauthorized".to_string())));
}

#[test]
fn connection_failure_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(&format!("http://{addr}"), "test_key")
        .get_delivery("del_1")
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn ureq_transport_returns_status_and_body_only() {
    let (base_url, _db) = start_server();
    let client = client(&base_url, "test_key");

    let response = UreqTransport::new()
        .execute(client.build_list_deliveries(false))
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(response.headers.is_empty());
    let list = client.parse_list_deliveries(response).unwrap();
    assert!(list.data.is_empty());

    // Error statuses come back as responses, not transport errors.
    let response = UreqTransport::new()
        .execute(client.build_get_delivery("del_missing"))
        .unwrap();
    assert_eq!(response.status, 404);
    assert!(response.body.contains("not_found"));
}
