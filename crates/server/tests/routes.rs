use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderValue, Request, StatusCode, header},
    response::Response,
};
use database::{
    db::create_connection,
    services::{ReservationService, UserService},
};
use migration::{Migrator, MigratorTrait};
use models::mail::MailData;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use server::{config::Config, mail::MailQueue, state::AppState};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@here.com";
const ADMIN_PASSWORD: &str = "password";
const OWNER_EMAIL: &str = "owner@here.com";

/// Drives the router like a browser, keeping the session cookie between requests
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap();

        self.send(request).await
    }

    async fn login(&mut self) {
        let response = self
            .post_form(
                "/user/login",
                &format!("email={ADMIN_EMAIL}&password={ADMIN_PASSWORD}"),
            )
            .await;
        assert_eq!(location(&response), "/");
    }
}

async fn setup() -> (Client, DatabaseConnection, UnboundedReceiver<MailData>) {
    let db = create_connection("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    UserService::ensure_admin(&db, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    let config = Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        in_production: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        mail_from: "me@here.com".to_string(),
        owner_email: OWNER_EMAIL.to_string(),
        email_template_dir: PathBuf::from("./email-templates"),
        session_lifetime_hours: 24,
        admin_email: None,
        admin_password: None,
    };

    let (mailer, receiver) = MailQueue::new();
    let state = AppState {
        db: db.clone(),
        config: Arc::new(config),
        mailer,
    };

    let client = Client {
        app: server::app(state),
        cookie: None,
    };

    (client, db, receiver)
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// Searches 2050-01-01..2050-01-03 and picks `room_id`
async fn pick_room(client: &mut Client, room_id: i32) {
    let response = client
        .post_form(
            "/search-availability",
            "start_date=2050-01-01&end_date=2050-01-03",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = json(response).await;
    assert_eq!(page["template"], "choose-room.page");
    assert_eq!(page["data"]["rooms"].as_array().unwrap().len(), 2);

    let response = client.get(&format!("/choose-room/{room_id}")).await;
    assert_eq!(location(&response), "/make-reservation");
}

const GUEST_FORM: &str = "first_name=John&last_name=Smith&email=john%40smith.com&phone=555-1234\
                          &start_date=2050-01-01&end_date=2050-01-03&room_id=1";

#[tokio::test]
async fn test_health() {
    let (mut client, _db, _mail) = setup().await;

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_home_page_payload() {
    let (mut client, _db, _mail) = setup().await;

    let page = json(client.get("/").await).await;
    assert_eq!(page["template"], "home.page");
    assert_eq!(page["is_authenticated"], false);
    assert!(page["flash"]["error"].is_null());
}

#[tokio::test]
async fn test_unparseable_search_dates_redirect_home() {
    let (mut client, _db, _mail) = setup().await;

    let response = client
        .post_form("/search-availability", "start_date=tomorrow&end_date=2050-01-03")
        .await;
    assert_eq!(location(&response), "/");

    let page = json(client.get("/").await).await;
    assert_eq!(page["flash"]["error"], "Can't parse dates");
}

#[tokio::test]
async fn test_booking_flow() {
    let (mut client, db, mut mail) = setup().await;
    pick_room(&mut client, 1).await;

    let page = json(client.get("/make-reservation").await).await;
    assert_eq!(page["template"], "make-reservation.page");
    assert_eq!(page["string_map"]["start_date"], "2050-01-01");
    assert_eq!(page["data"]["reservation"]["room_name"], "General's Quarters");

    let response = client.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/reservation-summary");

    let page = json(client.get("/reservation-summary").await).await;
    assert_eq!(page["template"], "reservation-summary.page");
    assert_eq!(page["data"]["reservation"]["room_name"], "General's Quarters");
    assert_eq!(page["data"]["reservation"]["reservation"]["first_name"], "John");
    assert_eq!(page["string_map"]["end_date"], "2050-01-03");

    // The summary is shown once
    let response = client.get("/reservation-summary").await;
    assert_eq!(location(&response), "/");

    let guest = mail.try_recv().unwrap();
    assert_eq!(guest.to, "john@smith.com");
    assert_eq!(guest.from, "me@here.com");
    let owner = mail.try_recv().unwrap();
    assert_eq!(owner.to, OWNER_EMAIL);
    assert!(mail.try_recv().is_err());

    let stored = ReservationService::all(&db).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].reservation.phone, "555-1234");
    assert!(!stored[0].reservation.processed);
}

#[tokio::test]
async fn test_invalid_guest_form_is_rendered_again() {
    let (mut client, db, mut mail) = setup().await;
    pick_room(&mut client, 1).await;

    let response = client
        .post_form(
            "/make-reservation",
            "first_name=J&last_name=Smith&email=john%40smith.com\
             &start_date=2050-01-01&end_date=2050-01-03&room_id=1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = json(response).await;
    assert_eq!(page["template"], "make-reservation.page");
    assert!(page["form"]["errors"]["first_name"].is_array());
    assert!(page["form"]["errors"]["last_name"].is_null());
    assert_eq!(page["form"]["values"]["first_name"], "J");

    assert!(ReservationService::all(&db).await.unwrap().is_empty());
    assert!(mail.try_recv().is_err());
}

#[tokio::test]
async fn test_booked_room_drops_out_of_search() {
    let (mut client, _db, _mail) = setup().await;
    pick_room(&mut client, 1).await;
    client.get("/make-reservation").await;
    client.post_form("/make-reservation", GUEST_FORM).await;

    let page = json(
        client
            .post_form(
                "/search-availability",
                "start_date=2050-01-02&end_date=2050-01-04",
            )
            .await,
    )
    .await;
    let rooms = page["data"]["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], 2);

    // Checkout day is free again
    let page = json(
        client
            .post_form(
                "/search-availability",
                "start_date=2050-01-03&end_date=2050-01-05",
            )
            .await,
    )
    .await;
    assert_eq!(page["data"]["rooms"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_double_booking_is_refused() {
    let (mut client, db, _mail) = setup().await;
    pick_room(&mut client, 1).await;
    client.post_form("/make-reservation", GUEST_FORM).await;

    let response = client.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/search-availability");

    let page = json(client.get("/search-availability").await).await;
    assert_eq!(
        page["flash"]["error"],
        "This room is no longer available for the selected dates"
    );
    assert_eq!(ReservationService::all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_make_reservation_needs_a_draft() {
    let (mut client, _db, _mail) = setup().await;

    let response = client.get("/make-reservation").await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_book_room_from_room_page() {
    let (mut client, _db, _mail) = setup().await;

    let response = client.get("/book-room?id=2&s=2050-02-01&e=2050-02-05").await;
    assert_eq!(location(&response), "/make-reservation");

    let page = json(client.get("/make-reservation").await).await;
    assert_eq!(page["data"]["reservation"]["room_name"], "Major's Suite");
    assert_eq!(page["string_map"]["end_date"], "2050-02-05");

    let response = client.get("/book-room?id=2&s=2050-02-01").await;
    assert_eq!(location(&response), "/search-availability");
}

#[tokio::test]
async fn test_availability_json() {
    let (mut client, _db, _mail) = setup().await;
    pick_room(&mut client, 1).await;
    client.post_form("/make-reservation", GUEST_FORM).await;

    let taken = json(
        client
            .post_form(
                "/search-availability-json",
                "start_date=2050-01-02&end_date=2050-01-04&room_id=1",
            )
            .await,
    )
    .await;
    assert_eq!(taken["ok"], false);
    assert_eq!(taken["message"], "");
    assert_eq!(taken["room_id"], "1");

    let free = json(
        client
            .post_form(
                "/search-availability-json",
                "start_date=2050-01-02&end_date=2050-01-04&room_id=2",
            )
            .await,
    )
    .await;
    assert_eq!(free["ok"], true);

    let invalid = json(
        client
            .post_form(
                "/search-availability-json",
                "start_date=2050-01-04&end_date=2050-01-02&room_id=2",
            )
            .await,
    )
    .await;
    assert_eq!(invalid["ok"], false);
    assert_ne!(invalid["message"], "");
}

#[tokio::test]
async fn test_admin_requires_login() {
    let (mut client, _db, _mail) = setup().await;

    let response = client.get("/admin/dashboard").await;
    assert_eq!(location(&response), "/user/login");

    let page = json(client.get("/user/login").await).await;
    assert_eq!(page["flash"]["error"], "You first have to log in");
}

#[tokio::test]
async fn test_login_and_logout() {
    let (mut client, _db, _mail) = setup().await;

    let response = client
        .post_form("/user/login", "email=admin%40here.com&password=wrong")
        .await;
    assert_eq!(location(&response), "/user/login");

    let page = json(client.get("/user/login").await).await;
    assert_eq!(page["flash"]["error"], "Invalid login credentials");
    assert_eq!(page["is_authenticated"], false);

    client.login().await;
    let page = json(client.get("/admin/dashboard").await).await;
    assert_eq!(page["template"], "admin-dashboard.page");
    assert_eq!(page["flash"]["flash"], "Logged in successfully");
    assert_eq!(page["is_authenticated"], true);

    let response = client.get("/user/logout").await;
    assert_eq!(location(&response), "/user/login");

    let response = client.get("/admin/dashboard").await;
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn test_invalid_login_form_hides_password() {
    let (mut client, _db, _mail) = setup().await;

    let response = client
        .post_form("/user/login", "email=not-an-email&password=secret")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = json(response).await;
    assert!(page["form"]["errors"]["email"].is_array());
    assert!(page["form"]["values"]["password"].is_null());
}

#[tokio::test]
async fn test_admin_reservation_lifecycle() {
    let (mut client, db, _mail) = setup().await;
    pick_room(&mut client, 1).await;
    client.post_form("/make-reservation", GUEST_FORM).await;
    let id = ReservationService::all(&db).await.unwrap()[0].reservation.id;

    client.login().await;

    let page = json(client.get("/admin/new-reservations").await).await;
    assert_eq!(page["data"]["reservations"].as_array().unwrap().len(), 1);

    let page = json(
        client
            .get(&format!("/admin/reservations/new/{id}?y=2050&m=01"))
            .await,
    )
    .await;
    assert_eq!(page["template"], "admin-reservations-show.page");
    assert_eq!(page["string_map"]["src"], "new");
    assert_eq!(page["string_map"]["year"], "2050");

    let response = client
        .post_form(
            &format!("/admin/reservations/all/{id}"),
            "first_name=Jane&last_name=Smith&email=jane%40smith.com&phone=555&y=&m=",
        )
        .await;
    assert_eq!(location(&response), "/admin/all-reservations");

    let response = client
        .get(&format!("/admin/process-reservation/new/{id}"))
        .await;
    assert_eq!(location(&response), "/admin/new-reservations");

    let page = json(client.get("/admin/new-reservations").await).await;
    assert!(page["data"]["reservations"].as_array().unwrap().is_empty());
    assert_eq!(page["flash"]["flash"], "Reservation marked as processed");

    let stored = ReservationService::get(&db, id).await.unwrap();
    assert_eq!(stored.reservation.first_name, "Jane");
    assert!(stored.reservation.processed);

    let response = client
        .get(&format!("/admin/delete-reservation/calendar/{id}?y=2050&m=01"))
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2050&m=01");
    assert!(ReservationService::all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_missing_reservation_flashes_error() {
    let (mut client, _db, _mail) = setup().await;
    client.login().await;

    let response = client.get("/admin/delete-reservation/all/999").await;
    assert_eq!(location(&response), "/admin/all-reservations");

    let page = json(client.get("/admin/all-reservations").await).await;
    assert_eq!(page["flash"]["error"], "Reservation not found");

    let response = client.get("/admin/delete-reservation/elsewhere/1").await;
    assert_eq!(location(&response), "/admin/dashboard");
}

#[tokio::test]
async fn test_calendar_blocks_round_trip() {
    let (mut client, _db, _mail) = setup().await;
    client.login().await;

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(page["template"], "admin-reservations-calendar.page");
    assert_eq!(page["int_map"]["days_in_month"], 31);
    assert_eq!(page["string_map"]["current_month"], "01");
    assert_eq!(page["string_map"]["last_month"], "12");
    assert_eq!(page["string_map"]["last_month_year"], "2049");
    assert_eq!(page["data"]["block_map_1"]["2050-01-05"], 0);

    let response = client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&add_block_1_2050-01-05=on",
        )
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2050&m=1");

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(page["flash"]["flash"], "Changes saved");
    let block_id = page["data"]["block_map_1"]["2050-01-05"].as_i64().unwrap();
    assert_ne!(block_id, 0);
    assert_eq!(page["data"]["reservation_map_1"]["2050-01-05"], 0);

    // Keeping the block leaves it in place
    client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&remove_block_1_2050-01-05=on",
        )
        .await;
    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(page["data"]["block_map_1"]["2050-01-05"], block_id);

    // Leaving out the keep field removes it
    client
        .post_form("/admin/reservations-calendar", "y=2050&m=1")
        .await;
    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(page["data"]["block_map_1"]["2050-01-05"], 0);
}

#[tokio::test]
async fn test_calendar_rejects_malformed_submission() {
    let (mut client, _db, _mail) = setup().await;
    client.login().await;
    client.get("/admin/reservations-calendar?y=2050&m=1").await;

    let response = client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&add_block_1_notadate=on&add_block_2_2050-01-10=on",
        )
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2050&m=1");

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(
        page["flash"]["error"],
        "Malformed calendar field: \"add_block_1_notadate\""
    );
    assert_eq!(page["data"]["block_map_2"]["2050-01-10"], 0);

    let response = client
        .post_form("/admin/reservations-calendar", "m=1")
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar");

    let page = json(client.get("/admin/reservations-calendar").await).await;
    assert_eq!(page["flash"]["error"], "Missing year");
}

#[tokio::test]
async fn test_calendar_rejects_invalid_month() {
    let (mut client, _db, _mail) = setup().await;
    client.login().await;

    let response = client.get("/admin/reservations-calendar?y=2050&m=13").await;
    assert_eq!(location(&response), "/admin/reservations-calendar");

    let page = json(client.get("/admin/reservations-calendar").await).await;
    assert_eq!(page["template"], "admin-reservations-calendar.page");
    assert_eq!(page["flash"]["error"], "Invalid month: \"13\"");

    let response = client.get("/admin/reservations-calendar?y=abc&m=1").await;
    assert_eq!(location(&response), "/admin/reservations-calendar");

    let response = client
        .post_form("/admin/reservations-calendar", "y=2050&m=13")
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar");
}

#[tokio::test]
async fn test_calendar_empty_keep_field_removes_block() {
    let (mut client, _db, _mail) = setup().await;
    client.login().await;
    client.get("/admin/reservations-calendar?y=2050&m=1").await;
    client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&add_block_1_2050-01-05=on",
        )
        .await;

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_ne!(page["data"]["block_map_1"]["2050-01-05"], 0);

    client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&remove_block_1_2050-01-05=",
        )
        .await;
    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_eq!(page["data"]["block_map_1"]["2050-01-05"], 0);
}

#[tokio::test]
async fn test_block_over_reservation_saves_nothing() {
    let (mut client, _db, _mail) = setup().await;
    pick_room(&mut client, 1).await;
    client.post_form("/make-reservation", GUEST_FORM).await;
    client.login().await;

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert_ne!(page["data"]["reservation_map_1"]["2050-01-01"], 0);

    let response = client
        .post_form(
            "/admin/reservations-calendar",
            "y=2050&m=1&add_block_2_2050-01-10=on&add_block_1_2050-01-02=on",
        )
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2050&m=1");

    let page = json(client.get("/admin/reservations-calendar?y=2050&m=1").await).await;
    assert!(page["flash"]["error"].is_string());
    assert_eq!(page["data"]["block_map_2"]["2050-01-10"], 0);
}
