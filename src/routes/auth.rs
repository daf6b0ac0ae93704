use askama::Template;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{create_session, delete_session};
use crate::db::users::{self, NewUser};
use crate::error::{AppError, AppResult};
use crate::extractors::session_token;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/register.html")]
struct RegisterTemplate {
    error: String,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
struct LoginTemplate {
    error: String,
    notice: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
struct LoginQuery {
    registered: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

async fn register_page() -> Html<impl Template> {
    Html(RegisterTemplate {
        error: String::new(),
    })
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if form.first_name.trim().is_empty()
        || form.last_name.trim().is_empty()
        || form.email.trim().is_empty()
        || form.password.is_empty()
    {
        return Ok(Html(RegisterTemplate {
            error: "All fields are required".to_string(),
        })
        .into_response());
    }

    let new_user = NewUser {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        password_hash: hash_password(&form.password)?,
    };

    match users::create_user(&state.db, new_user) {
        Ok(user) => {
            tracing::info!("Registered new user {}", user.id);
            Ok(Redirect::to("/login?registered=1").into_response())
        }
        Err(AppError::Conflict(msg)) => {
            Ok(Html(RegisterTemplate { error: msg }).into_response())
        }
        Err(e) => Err(e),
    }
}

async fn login_page(Query(query): Query<LoginQuery>) -> Html<impl Template> {
    let notice = if query.registered.is_some() {
        "Account created successfully! Please log in.".to_string()
    } else {
        String::new()
    };
    Html(LoginTemplate {
        error: String::new(),
        notice,
    })
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let email = form.email.trim().to_lowercase();

    // Unknown email and wrong password take the same path
    let user = users::find_by_email(&state.db, &email)?;
    let authenticated = user
        .as_ref()
        .filter(|u| verify_password(&form.password, &u.password_hash));

    let Some(user) = authenticated else {
        return Ok(Html(LoginTemplate {
            error: "Invalid email or password".to_string(),
            notice: String::new(),
        })
        .into_response());
    };

    let token = create_session(&state.db, &user.id, state.config.auth.session_hours)?;
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        state.config.auth.cookie_name,
        token,
        state.config.auth.session_hours * 3600
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to("/feed/for_you"),
    )
        .into_response())
}

async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> AppResult<Response> {
    // Drop the session row, then expire the cookie either way
    if let Some(token) = session_token(&headers, &state.config.auth.cookie_name) {
        delete_session(&state.db, token)?;
    }
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        state.config.auth.cookie_name
    );
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response())
}
