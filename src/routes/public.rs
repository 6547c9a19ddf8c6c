use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::{self, CurrentUser},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login_form).post(login_submit))
        .route("/register", get(register_form).post(register_submit))
        .route("/logout", get(logout))
}

#[derive(Template)]
#[template(path = "index.html")]
struct LandingTemplate {
    logged_in: bool,
    username: String,
}

async fn landing(current: CurrentUser) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LandingTemplate {
        logged_in: current.is_authenticated(),
        username: current
            .0
            .map(|user| user.username)
            .unwrap_or_default(),
    })
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    show_error: bool,
    error_message: String,
    username: String,
}

async fn login_form(current: CurrentUser) -> Response {
    if current.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    AskamaTemplateResponse::into_response(LoginTemplate {
        show_error: false,
        error_message: String::new(),
        username: String::new(),
    })
}

#[derive(Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
}

async fn login_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: PrivateCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    if current.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }
    match auth::authenticate_user(&state, &form.username, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, user.id).await?;
            Ok((
                auth::apply_session_cookie(jar, &session_id, state.config.session_ttl_days),
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(AppError::Unauthorized) => Ok(render_login_error(
            form.username,
            "Login Unsuccessful. Please check username and password".into(),
        )),
        Err(AppError::BadRequest(msg)) => Ok(render_login_error(form.username, msg)),
        Err(err) => Err(err),
    }
}

fn render_login_error(username: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(LoginTemplate {
            show_error: true,
            error_message: message,
            username,
        }),
    )
        .into_response()
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    show_error: bool,
    error_message: String,
    username: String,
}

async fn register_form(current: CurrentUser) -> Response {
    if current.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    AskamaTemplateResponse::into_response(RegisterTemplate {
        show_error: false,
        error_message: String::new(),
        username: String::new(),
    })
}

async fn register_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: PrivateCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    if current.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }
    match auth::register_user(&state, &form.username, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, user.id).await?;
            Ok((
                auth::apply_session_cookie(jar, &session_id, state.config.session_ttl_days),
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(AppError::BadRequest(msg)) => Ok(render_register_error(form.username, msg)),
        Err(err) => Err(err),
    }
}

fn render_register_error(username: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(RegisterTemplate {
            show_error: true,
            error_message: message,
            username,
        }),
    )
        .into_response()
}

async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    if let Some(user) = current.0 {
        info!(user_id = user.id, "user logged out");
    }
    Ok((auth::clear_session_cookie(jar), Redirect::to("/")))
}
