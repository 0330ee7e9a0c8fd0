use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use taxi_fleet_model::{DriverId, DriverRegistration, NewCar, NewManufacturer};
use taxi_fleet_server::{build_router, ApiConfig, AppState};
use taxi_fleet_store::FleetStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PASSWORD: &str = "s3cret-pass";

struct Reply {
    status: u16,
    head: String,
    body: Value,
}

impl Reply {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }

    fn session_cookie(&self) -> Option<String> {
        self.header("set-cookie")
            .and_then(|v| v.split(';').next().map(str::to_string))
            .filter(|c| c.starts_with("taxi_session=") && c.len() > "taxi_session=".len())
    }

    fn error_code(&self) -> Option<&str> {
        self.body.pointer("/error/code").and_then(Value::as_str)
    }
}

async fn spawn_app(api: ApiConfig) -> (SocketAddr, Arc<FleetStore>) {
    let store = Arc::new(FleetStore::open_in_memory().expect("store"));
    let app = build_router(AppState::with_config(Arc::clone(&store), api));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, store)
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> Reply {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        req.push_str("\r\n");
    }
    stream.write_all(req.as_bytes()).await.expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    Reply {
        status,
        head: head.to_string(),
        body: serde_json::from_str(body).unwrap_or(Value::Null),
    }
}

fn register(store: &FleetStore, username: &str, license: &str, staff: bool) -> i64 {
    let input = DriverRegistration {
        username: username.to_string(),
        password1: PASSWORD.to_string(),
        password2: PASSWORD.to_string(),
        license_number: license.to_string(),
        ..DriverRegistration::default()
    }
    .validate()
    .expect("valid registration")
    .with_staff(staff);
    store.register_driver(&input).expect("register").id.get()
}

async fn login(addr: SocketAddr, username: &str) -> String {
    let body = json!({"username": username, "password": PASSWORD}).to_string();
    let reply = send(addr, "POST", "/accounts/login/", &[], Some(&body)).await;
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location").as_deref(), Some("/"));
    reply.session_cookie().expect("session cookie")
}

#[tokio::test]
async fn home_counts_visits_per_session() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    register(&store, "alice", "ABC12345", false);

    let first = send(addr, "GET", "/", &[], None).await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body["num_visits"], json!(1));
    assert_eq!(first.body["num_drivers"], json!(1));
    let cookie = first.session_cookie().expect("new session cookie");

    let second = send(addr, "GET", "/", &[("Cookie", cookie.as_str())], None).await;
    assert_eq!(second.body["num_visits"], json!(2));
    assert!(second.session_cookie().is_none());

    let other = send(addr, "GET", "/", &[], None).await;
    assert_eq!(other.body["num_visits"], json!(1));
}

#[tokio::test]
async fn anonymous_visit_counter_expires_on_short_ttl() {
    let api = ApiConfig {
        anonymous_session_ttl: std::time::Duration::from_millis(50),
        ..ApiConfig::default()
    };
    let (addr, _store) = spawn_app(api).await;
    let first = send(addr, "GET", "/", &[], None).await;
    let cookie = first.session_cookie().expect("new session cookie");

    tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    let later = send(addr, "GET", "/", &[("Cookie", cookie.as_str())], None).await;
    assert_eq!(later.body["num_visits"], json!(1));
    assert!(later.session_cookie().is_some());
}

#[tokio::test]
async fn protected_routes_require_login() {
    let (addr, _store) = spawn_app(ApiConfig::default()).await;
    for (method, path, body) in [
        ("GET", "/cars/1/", None),
        ("GET", "/drivers/1/", None),
        ("GET", "/manufacturers/create/", None),
        ("POST", "/manufacturers/create/", Some(r#"{"name":"BMW","country":"Germany"}"#)),
        ("POST", "/cars/1/toggle-assign/", None),
        ("GET", "/drivers/abc/delete/", None),
    ] {
        let reply = send(addr, method, path, &[], body).await;
        assert_eq!(reply.status, 401, "{method} {path}");
        assert_eq!(reply.error_code(), Some("Unauthorized"));
        assert_eq!(reply.body["error"]["details"]["login"], json!("/accounts/login/"));
    }

    let listing = send(addr, "GET", "/cars/", &[], None).await;
    assert_eq!(listing.status, 200);
}

#[tokio::test]
async fn request_id_is_echoed_in_header_and_error_body() {
    let (addr, _store) = spawn_app(ApiConfig::default()).await;
    let reply = send(addr, "GET", "/cars/1/", &[("x-request-id", "req-fixed-1")], None).await;
    assert_eq!(reply.header("x-request-id").as_deref(), Some("req-fixed-1"));
    assert_eq!(reply.body["error"]["request_id"], json!("req-fixed-1"));

    let generated = send(addr, "GET", "/manufacturers/", &[], None).await;
    assert!(generated
        .header("x-request-id")
        .is_some_and(|id| id.starts_with("req-")));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    register(&store, "alice", "ABC12345", false);
    let body = json!({"username": "alice", "password": "wrong-password"}).to_string();
    let reply = send(addr, "POST", "/accounts/login/", &[], Some(&body)).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error_code(), Some("ValidationFailed"));
    assert!(reply.session_cookie().is_none());

    let malformed = send(addr, "POST", "/accounts/login/", &[], Some("{not json")).await;
    assert_eq!(malformed.status, 400);
    assert_eq!(
        malformed.body["error"]["details"]["field_errors"][0]["code"],
        json!("invalid_body")
    );
}

#[tokio::test]
async fn manufacturer_car_and_toggle_flow() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    let alice = register(&store, "alice", "ABC12345", false);
    let cookie = login(addr, "alice").await;
    let auth = [("Cookie", cookie.as_str())];

    let form = send(addr, "GET", "/manufacturers/create/", &[auth[0], ("Referer", "/manufacturers/?page=2")], None).await;
    assert_eq!(form.status, 200);
    assert_eq!(form.body["previous"], json!("/manufacturers/?page=2"));

    let created = send(
        addr,
        "POST",
        "/manufacturers/create/",
        &auth,
        Some(r#"{"name":"Toyota","country":"Japan"}"#),
    )
    .await;
    assert_eq!(created.status, 303);
    assert_eq!(created.header("location").as_deref(), Some("/manufacturers/"));
    assert_eq!(created.body["redirect"], json!("/manufacturers/"));

    let duplicate = send(
        addr,
        "POST",
        "/manufacturers/create/",
        &auth,
        Some(r#"{"name":"Toyota","country":"Japan"}"#),
    )
    .await;
    assert_eq!(duplicate.status, 409);
    assert_eq!(duplicate.error_code(), Some("ConstraintViolation"));
    assert_eq!(
        duplicate.body["error"]["details"]["field_errors"][0]["field"],
        json!("name")
    );

    let manufacturers = send(addr, "GET", "/manufacturers/", &[], None).await;
    let manufacturer_id = manufacturers.body["items"][0]["id"].as_i64().expect("id");

    let car_form = send(addr, "GET", "/cars/create/", &auth, None).await;
    assert_eq!(car_form.body["choices"]["manufacturers"][0]["id"], json!(manufacturer_id));

    let car_body = json!({"model": "Corolla", "manufacturer": manufacturer_id, "drivers": []}).to_string();
    let car = send(addr, "POST", "/cars/create/", &auth, Some(&car_body)).await;
    assert_eq!(car.status, 303);
    assert_eq!(car.header("location").as_deref(), Some("/cars/"));

    let cars = send(addr, "GET", "/cars/", &[], None).await;
    assert_eq!(cars.body["items"][0]["manufacturer"]["name"], json!("Toyota"));
    let car_id = cars.body["items"][0]["id"].as_i64().expect("car id");
    let detail_path = format!("/cars/{car_id}/");

    let before = send(addr, "GET", &detail_path, &auth, None).await;
    assert_eq!(before.body["user_is_owner"], json!(false));

    let toggle_path = format!("/cars/{car_id}/toggle-assign/");
    let toggled = send(addr, "POST", &toggle_path, &auth, None).await;
    assert_eq!(toggled.status, 303);
    assert_eq!(toggled.header("location").as_deref(), Some(detail_path.as_str()));
    let after = send(addr, "GET", &detail_path, &auth, None).await;
    assert_eq!(after.body["user_is_owner"], json!(true));
    assert_eq!(after.body["drivers"][0]["id"], json!(alice));

    send(addr, "POST", &toggle_path, &auth, None).await;
    let restored = send(addr, "GET", &detail_path, &auth, None).await;
    assert_eq!(restored.body["user_is_owner"], json!(false));

    let missing = send(addr, "POST", "/cars/999/toggle-assign/", &auth, None).await;
    assert_eq!(missing.status, 404);
    let malformed = send(addr, "GET", "/cars/abc/", &auth, None).await;
    assert_eq!(malformed.status, 404);

    let deleted = send(addr, "POST", &format!("/manufacturers/{manufacturer_id}/delete/"), &auth, None).await;
    assert_eq!(deleted.status, 303);
    let gone = send(addr, "GET", &detail_path, &auth, None).await;
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn deleting_car_redirects_to_list_and_keeps_drivers() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    let alice = register(&store, "alice", "ABC12345", false);
    let toyota = store
        .create_manufacturer(&NewManufacturer::new("Toyota", "Japan").expect("valid"))
        .expect("create")
        .id;
    let corolla = store
        .create_car(
            &NewCar::new("Corolla", toyota, [DriverId::new(alice)]).expect("valid car"),
        )
        .expect("create car");
    let cookie = login(addr, "alice").await;
    let auth = [("Cookie", cookie.as_str())];
    let delete_path = format!("/cars/{}/delete/", corolla.get());

    let confirm = send(addr, "GET", &delete_path, &auth, None).await;
    assert_eq!(confirm.status, 200);
    assert_eq!(confirm.body["object"]["model"], json!("Corolla"));

    let deleted = send(addr, "POST", &delete_path, &auth, None).await;
    assert_eq!(deleted.status, 303);
    assert_eq!(deleted.header("location").as_deref(), Some("/cars/"));
    assert_eq!(deleted.body["redirect"], json!("/cars/"));

    let gone = send(addr, "GET", &format!("/cars/{}/", corolla.get()), &auth, None).await;
    assert_eq!(gone.status, 404);
    let again = send(addr, "POST", &delete_path, &auth, None).await;
    assert_eq!(again.status, 404);

    let driver = send(addr, "GET", &format!("/drivers/{alice}/"), &auth, None).await;
    assert_eq!(driver.status, 200);
    assert_eq!(driver.body["cars"], json!([]));
    assert!(!store
        .is_car_driver(DriverId::new(alice), corolla)
        .expect("membership"));
}

#[tokio::test]
async fn list_pagination_and_missing_pages() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    for name in ["Audi", "BMW", "Citroen", "Dacia", "Ford", "Honda"] {
        store
            .create_manufacturer(&NewManufacturer::new(name, "Somewhere").expect("valid"))
            .expect("create");
    }

    let second = send(addr, "GET", "/manufacturers/?page=2", &[], None).await;
    assert_eq!(second.status, 200);
    assert_eq!(second.body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(second.body["items"][0]["name"], json!("Honda"));
    assert_eq!(second.body["page"]["has_previous"], json!(true));

    let last = send(addr, "GET", "/manufacturers/?page=last", &[], None).await;
    assert_eq!(last.body["page"]["number"], json!(2));

    for page in ["3", "abc", "0"] {
        let reply = send(addr, "GET", &format!("/manufacturers/?page={page}"), &[], None).await;
        assert_eq!(reply.status, 404, "page={page}");
        assert_eq!(reply.error_code(), Some("NotFound"));
    }

    let empty = send(addr, "GET", "/cars/", &[], None).await;
    assert_eq!(empty.status, 200);
    assert_eq!(empty.body["page"]["number"], json!(1));
}

#[tokio::test]
async fn driver_registration_and_license_update_validate() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    let alice = register(&store, "alice", "ABC12345", false);
    let cookie = login(addr, "alice").await;
    let auth = [("Cookie", cookie.as_str())];

    let bad = json!({
        "username": "bob",
        "password1": "first-password",
        "password2": "other-password",
        "license_number": "abc12345"
    })
    .to_string();
    let reply = send(addr, "POST", "/drivers/create/", &auth, Some(&bad)).await;
    assert_eq!(reply.status, 400);
    let fields: Vec<&str> = reply.body["error"]["details"]["field_errors"]
        .as_array()
        .expect("field errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"license_number"));
    assert!(fields.contains(&"password2"));

    let duplicate = json!({
        "username": "bob",
        "password1": PASSWORD,
        "password2": PASSWORD,
        "license_number": "ABC12345"
    })
    .to_string();
    let reply = send(addr, "POST", "/drivers/create/", &auth, Some(&duplicate)).await;
    assert_eq!(reply.status, 409);
    assert_eq!(
        reply.body["error"]["details"]["field_errors"][0]["field"],
        json!("license_number")
    );

    let good = duplicate.replace("ABC12345", "XYZ98765");
    let reply = send(addr, "POST", "/drivers/create/", &auth, Some(&good)).await;
    assert_eq!(reply.status, 303);
    let location = reply.header("location").expect("location");
    assert!(location.starts_with("/drivers/"));

    let update_path = format!("/drivers/{alice}/update/");
    let rejected = send(addr, "POST", &update_path, &auth, Some(r#"{"license_number":"AB123456"}"#)).await;
    assert_eq!(rejected.status, 400);
    let accepted = send(addr, "POST", &update_path, &auth, Some(r#"{"license_number":"QWE11111"}"#)).await;
    assert_eq!(accepted.status, 303);
    assert_eq!(accepted.header("location").as_deref(), Some("/drivers/"));

    let listing = send(addr, "GET", "/drivers/", &auth, None).await;
    assert_eq!(listing.body["current_user"], json!(alice));
    assert_eq!(listing.body["items"][0]["license_number"], json!("QWE11111"));
}

#[tokio::test]
async fn admin_requires_staff() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    register(&store, "alice", "ABC12345", false);
    register(&store, "root", "ADM00000", true);

    let anonymous = send(addr, "GET", "/admin/", &[], None).await;
    assert_eq!(anonymous.status, 401);

    let alice = login(addr, "alice").await;
    let denied = send(addr, "GET", "/admin/", &[("Cookie", alice.as_str())], None).await;
    assert_eq!(denied.status, 403);
    assert_eq!(denied.error_code(), Some("Forbidden"));

    let root = login(addr, "root").await;
    let auth = [("Cookie", root.as_str())];
    let index = send(addr, "GET", "/admin/", &auth, None).await;
    assert_eq!(index.status, 200);
    assert_eq!(index.body["user"]["username"], json!("root"));
    assert_eq!(index.body["models"].as_array().map(Vec::len), Some(3));

    let drivers = send(addr, "GET", "/admin/taxi/driver/", &auth, None).await;
    assert_eq!(drivers.status, 200);
    assert!(drivers.body["items"][0].get("license_number").is_some());
    assert!(drivers.body["items"][0].get("date_joined").is_none());

    let cars = send(addr, "GET", "/admin/taxi/car/?q=cor&manufacturer=1", &auth, None).await;
    assert_eq!(cars.status, 200);
    assert_eq!(cars.body["admin"]["search_fields"], json!(["model"]));

    let unsupported = send(addr, "GET", "/admin/taxi/manufacturer/?q=bmw", &auth, None).await;
    assert_eq!(unsupported.status, 400);
    assert_eq!(unsupported.error_code(), Some("InvalidQueryParameter"));

    let unknown = send(addr, "GET", "/admin/taxi/passenger/", &auth, None).await;
    assert_eq!(unknown.status, 404);
}

#[tokio::test]
async fn logout_ends_authentication() {
    let (addr, store) = spawn_app(ApiConfig::default()).await;
    register(&store, "alice", "ABC12345", false);
    let cookie = login(addr, "alice").await;
    let out = send(addr, "POST", "/accounts/logout/", &[("Cookie", cookie.as_str())], None).await;
    assert_eq!(out.status, 303);
    assert_eq!(out.header("location").as_deref(), Some("/accounts/login/"));
    let after = send(addr, "GET", "/cars/1/", &[("Cookie", cookie.as_str())], None).await;
    assert_eq!(after.status, 401);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let api = ApiConfig {
        max_body_bytes: 64,
        ..ApiConfig::default()
    };
    let (addr, _store) = spawn_app(api).await;
    let body = json!({"username": "x".repeat(200), "password": "y"}).to_string();
    let reply = send(addr, "POST", "/accounts/login/", &[], Some(&body)).await;
    assert_eq!(reply.status, 413);
    assert_eq!(reply.error_code(), Some("PayloadTooLarge"));
}
