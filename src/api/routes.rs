use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, Redirect};
use axum::routing::{any, get, post};
use axum::{Json, Router};

use super::error::ApiError;
use super::extractor::BearerUser;
use super::state::AppState;
use super::types::{InfoResponse, LoginForm, LoginResponse, UserResponse, WebModuleResponse};
use crate::directory::Directory;
use crate::store::UserStore;
use crate::token::campaign_category_code;
use crate::types::User;
use crate::version::VersionCache;

/// Where `/api/3/login/donate` redirects to.
pub const DONATE_URL: &str = "https://www.buymeacoffee.com/vfosnar";

/// Longest accepted username or password, exclusive.
const MAX_CREDENTIAL_LEN: usize = 256;

const HOME_HTML: &str = include_str!("home.html");

/// Create the mock API router.
pub fn router<D, S>(versions: VersionCache<D>, store: S) -> Router
where
    D: Directory,
    S: UserStore,
{
    let state = AppState {
        versions,
        store: Arc::new(store),
    };

    Router::new()
        .route("/", get(home))
        .route("/api/3", get(info::<D, S>))
        .route("/api/login", post(login::<D, S>))
        .route("/api/3/user", get(user))
        .route("/api/3/register-notification", any(register_notification))
        .route("/api/3/webmodule", get(webmodule))
        .route("/api/3/logintoken", get(login_token))
        .route("/api/3/login/donate", get(donate))
        .fallback(unhandled)
        .with_state(state)
}

async fn home() -> Html<&'static str> {
    Html(HOME_HTML)
}

// ── Instance info ──────────────────────────────────────────────────

async fn info<D: Directory, S: UserStore>(
    State(state): State<AppState<D, S>>,
) -> Json<InfoResponse> {
    Json(state.versions.read().into())
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<D: Directory, S: UserStore>(
    State(state): State<AppState<D, S>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Form(form) = form.map_err(|_| ApiError::BadRequest("unreadable login form"))?;

    let user = match form.grant_type.as_deref() {
        Some("password") => {
            let username = form
                .username
                .filter(|u| u.len() < MAX_CREDENTIAL_LEN)
                .ok_or(ApiError::BadRequest("missing or oversized username"))?;
            let password = form
                .password
                .filter(|p| p.len() < MAX_CREDENTIAL_LEN)
                .ok_or(ApiError::BadRequest("missing or oversized password"))?;
            password_login(state.store.as_ref(), &username, &password)?
        }
        Some("refresh_token") => {
            let refresh_token = form
                .refresh_token
                .ok_or(ApiError::BadRequest("missing refresh_token"))?;
            state
                .store
                .user_by_refresh_token(&refresh_token)
                .ok_or(ApiError::BadRequest("unknown refresh_token"))?
        }
        _ => return Err(ApiError::BadRequest("unsupported grant_type")),
    };

    Ok(Json(LoginResponse::new(state.versions.read(), user)))
}

/// Log in by name, creating the user on first sight.
///
/// Repeat logins overwrite the class name and keep the tokens.
fn password_login<S: UserStore>(
    store: &S,
    username: &str,
    class_name: &str,
) -> Result<User, ApiError> {
    if let Some(user) = store.set_class_name(username, class_name) {
        return Ok(user);
    }

    let user = User::new(username, class_name);
    match store.add_user(user.clone()) {
        Ok(()) => {
            tracing::info!(username, "Created user");
            Ok(user)
        }
        // Another login for the same name won the race.
        Err(crate::Error::UserExists(_)) => store
            .set_class_name(username, class_name)
            .ok_or_else(|| ApiError::Internal(format!("user {username} vanished"))),
        Err(e) => Err(e.into()),
    }
}

// ── Authenticated user ─────────────────────────────────────────────

async fn user(BearerUser(user): BearerUser) -> Result<Json<UserResponse>, ApiError> {
    let code = campaign_category_code()?;
    Ok(Json(UserResponse::new(&user, code)))
}

// ── Static endpoints ───────────────────────────────────────────────

/// Clients refuse to reauthenticate unless this answers 200; the body is ignored.
async fn register_notification() -> StatusCode {
    StatusCode::OK
}

async fn webmodule() -> Json<WebModuleResponse> {
    Json(WebModuleResponse::default())
}

/// Clients build `/api/3/login/<token>` web login links from this value.
async fn login_token() -> Json<&'static str> {
    Json("donate")
}

async fn donate() -> Redirect {
    Redirect::temporary(DONATE_URL)
}

async fn unhandled(uri: Uri) -> StatusCode {
    tracing::warn!(path = %uri, "Unhandled path");
    StatusCode::BAD_REQUEST
}
