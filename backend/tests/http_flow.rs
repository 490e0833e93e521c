//! End-to-end HTTP flow over the in-memory document store.

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use postboard::domain::ports::DocumentStore;
use postboard::domain::{
    AccountService, AccountStore, FollowGraph, IdentityResolver, PostService, PostStore,
};
use postboard::inbound::http::accounts::{current_user, login, logout, signup, update_profile};
use postboard::inbound::http::json_error_handler;
use postboard::inbound::http::posts::{create_post, list_posts};
use postboard::inbound::http::session_config::SessionSettings;
use postboard::inbound::http::state::HttpState;
use postboard::inbound::http::users::{
    follow, following_status, unfollow, user_posts, view_profile,
};
use postboard::outbound::persistence::InMemoryDocumentStore;
use postboard::outbound::security::PlaintextPasswordHasher;
use postboard::Trace;
use rstest::rstest;
use serde_json::{Value, json};

fn state() -> HttpState {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    let resolver = IdentityResolver::new(store.clone());
    let graph = FollowGraph::new(store.clone(), resolver.clone());
    let accounts = AccountService::new(
        AccountStore::new(store.clone(), resolver.clone()),
        resolver.clone(),
        graph.clone(),
        Arc::new(PlaintextPasswordHasher),
    );
    let posts = PostService::new(PostStore::new(store), resolver);
    HttpState::from_services(accounts, graph, posts)
}

fn session() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .wrap(session().middleware())
                        .service(signup)
                        .service(login)
                        .service(logout)
                        .service(current_user)
                        .service(update_profile)
                        .service(view_profile)
                        .service(follow)
                        .service(unfollow)
                        .service(following_status)
                        .service(user_posts)
                        .service(create_post)
                        .service(list_posts),
                ),
        )
        .await
    };
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

fn signup_body(email: &str, first: &str) -> Value {
    json!({
        "email": email,
        "password": "correct horse",
        "confirmPassword": "correct horse",
        "firstName": first,
        "lastName": "Tester"
    })
}

#[rstest]
#[actix_web::test]
async fn signup_login_follow_and_post() {
    let app = app!();

    let mut ids = Vec::new();
    for (email, first) in [("ada@example.com", "Ada"), ("grace@example.com", "Grace")] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(signup_body(email, first))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        ids.push(body["id"].as_str().expect("id").to_owned());
    }
    let grace = ids.pop().expect("grace id");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ada@example.com", "password": "correct horse"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["name"], "Ada Tester");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/users/{grace}/follow"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "success");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{grace}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["isFollowing"], true);
    assert_eq!(body["isMe"], false);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .cookie(cookie.clone())
            .set_json(json!({"content": "first post"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/posts")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["author"], "Ada Tester");
    assert_eq!(body[0]["content"], "first post");
}

#[rstest]
#[actix_web::test]
async fn duplicate_signup_conflicts() {
    let app = app!();
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(signup_body("ada@example.com", "Ada"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }
}

#[rstest]
#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let app = app!();
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(signup_body("ada@example.com", "Ada"))
            .to_request(),
    )
    .await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ada@example.com", "password": "wrong horse"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
}
