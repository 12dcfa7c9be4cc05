//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives core-built requests
//! over real HTTP using ureq. The session decisions (`Tokens`, `CsrfCache`,
//! `next_step`) are applied by hand here the way the site's executor applies
//! them, so schema drift and status mapping are caught end-to-end.

use std::time::Instant;

use carte_core::admin::ItemForm;
use carte_core::auth::next_step;
use carte_core::{
    ApiError, Attempt, CarteClient, CsrfCache, HttpRequest, HttpResponse, LoginRequest,
    OptionType, OptionValue, Step, Tokens, CSRF_HEADER,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut builder = ureq::http::Request::builder()
        .method(req.method.as_str())
        .uri(&req.path);
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let mut response = match req.body {
        Some(body) => agent.run(builder.body(body).unwrap()),
        None => agent.run(builder.body(()).unwrap()),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> CarteClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    CarteClient::new(&format!("http://{addr}/"))
}

fn sign_in(client: &CarteClient) -> (Tokens, CsrfCache) {
    let login = LoginRequest {
        email: mock_server::ADMIN_EMAIL.to_string(),
        password: mock_server::ADMIN_PASSWORD.to_string(),
    };
    let response = execute(client.build_login(&login).unwrap());
    let tokens = Tokens::from_login(&client.parse_login(response).unwrap());

    let mut csrf = CsrfCache::default();
    let token = client
        .parse_csrf_token(execute(client.build_csrf_token()))
        .unwrap();
    csrf.store(token, Instant::now());
    (tokens, csrf)
}

fn decorate(mut request: HttpRequest, tokens: &Tokens, csrf: &CsrfCache) -> HttpRequest {
    tokens.authorize(&mut request);
    if request.method.is_state_changing() {
        if let Some(token) = csrf.token(Instant::now()) {
            request.set_header(CSRF_HEADER, token);
        }
    }
    request
}

#[test]
fn public_reads() {
    let client = start_server();

    let categories = client
        .parse_list_categories(execute(client.build_list_categories()))
        .unwrap();
    let tabs = carte_core::menu::main_categories(&categories);
    let names: Vec<&str> = tabs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Pizza du moment", "Nos pizzas", "Boissons"]);

    let pizzas = client
        .parse_get_category(execute(client.build_get_category("cat-pizzas")))
        .unwrap();
    assert_eq!(pizzas.children.len(), 2);

    let items = client
        .parse_list_items(execute(client.build_list_items()))
        .unwrap();
    let margherita = items.iter().find(|i| i.id == "margherita").unwrap();
    assert!(margherita.is_vegetarian());
    assert_eq!(margherita.allergens(), ["Gluten", "Lait"]);

    let moment = client
        .parse_pizza_moment(execute(client.build_pizza_moment()))
        .unwrap();
    assert_eq!(moment[0].name, "La Forestière");

    let promos = client
        .parse_promo_events(execute(client.build_promo_events()))
        .unwrap();
    assert_eq!(promos.len(), 1);

    let header = client
        .parse_header_announcements(execute(client.build_header_announcements()))
        .unwrap();
    assert_eq!(header.len(), 2);

    let business = client
        .parse_list_business(execute(client.build_list_business()))
        .unwrap();
    assert_eq!(business[0].name, "Pizza Le Duc");

    let err = client
        .parse_get_item(execute(client.build_get_item("ghost")))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn item_lifecycle() {
    let client = start_server();
    let (tokens, csrf) = sign_in(&client);

    // Step 1: build the payload through the admin form.
    let mut form = ItemForm::new();
    form.name = "Calzone".to_string();
    form.category_id = "cat-tomate".to_string();
    form.variant_mut(0).unwrap().price = 13.0;
    form.add_option(OptionType::Allergenes);
    form.toggle_option_value(OptionType::Allergenes, "Lait", true);
    let payload = form.to_payload().unwrap();

    // Step 2: create.
    let req = decorate(client.build_create_item(&payload).unwrap(), &tokens, &csrf);
    let created = client.parse_create_item(execute(req)).unwrap();
    assert_eq!(created.name, "Calzone");
    assert_eq!(created.category.as_ref().unwrap().name, "Base tomate");
    assert_eq!(
        created.option_value(OptionType::Allergenes),
        Some(OptionValue::Many(vec!["Lait".to_string()]))
    );

    // Step 3: edit round-trips through the form.
    let mut form = ItemForm::from_item(&created);
    form.name = "Calzone maison".to_string();
    form.status = "Inactive".to_string();
    let req = decorate(
        client.build_update_item(&created.id, &form.to_payload().unwrap()).unwrap(),
        &tokens,
        &csrf,
    );
    let updated = client.parse_update_item(execute(req)).unwrap();
    assert_eq!(updated.name, "Calzone maison");
    assert_eq!(updated.variants.len(), 1);
    assert_eq!(updated.options.len(), 1);

    // Step 4: delete, then the item is gone.
    let req = decorate(client.build_delete_item(&created.id), &tokens, &csrf);
    client.parse_delete_item(execute(req)).unwrap();
    let err = client
        .parse_get_item(execute(client.build_get_item(&created.id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 5: delete again.
    let req = decorate(client.build_delete_item(&created.id), &tokens, &csrf);
    let err = client.parse_delete_item(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn backend_messages_surface_in_errors() {
    let client = start_server();
    let (tokens, csrf) = sign_in(&client);

    let req = decorate(client.build_delete_category("cat-pizzas"), &tokens, &csrf);
    let err = client.parse_delete_category(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 409, .. }));
    assert!(err.server_message().unwrap().contains("sous-catégories"));
}

#[test]
fn missing_csrf_asks_for_a_refetch() {
    let client = start_server();
    let (tokens, _) = sign_in(&client);

    let req = decorate(client.build_delete_event("evt-old"), &tokens, &CsrfCache::default());
    let response = execute(req);
    assert_eq!(next_step(&response, Attempt::default()), Step::RefetchCsrf);

    let err = client.parse_delete_event(response).unwrap_err();
    assert_eq!(
        err,
        ApiError::CsrfRejected {
            message: "Invalid CSRF token".to_string()
        }
    );
}

#[test]
fn expired_access_token_recovers_after_refresh() {
    let client = start_server();
    let (mut tokens, csrf) = sign_in(&client);

    execute(HttpRequest {
        method: carte_core::HttpMethod::Post,
        path: format!("{}/api/test/expire-tokens", client.base_url()),
        headers: Vec::new(),
        body: None,
    });

    let response = execute(decorate(client.build_delete_event("evt-old"), &tokens, &csrf));
    assert_eq!(next_step(&response, Attempt::default()), Step::Refresh);

    let old_refresh = tokens.refresh.clone().unwrap();
    let refreshed = client
        .parse_refresh(execute(client.build_refresh(&old_refresh).unwrap()))
        .unwrap();
    tokens.apply_refresh(refreshed);
    assert_ne!(tokens.refresh.as_deref(), Some(old_refresh.as_str()));

    let retry = Attempt {
        auth_retried: true,
        ..Attempt::default()
    };
    let response = execute(decorate(client.build_delete_event("evt-old"), &tokens, &csrf));
    assert_eq!(next_step(&response, retry), Step::Return);
    client.parse_delete_event(response).unwrap();

    // The rotated-away refresh token is refused.
    let err = client
        .parse_refresh(execute(client.build_refresh(&old_refresh).unwrap()))
        .unwrap_err();
    assert!(err.is_auth_failure());
}
