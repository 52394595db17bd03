use crate::errors::AppError;
use crate::models::{ActionRequest, ScanErrorRequest, ScanRequest};
use crate::session::{ScanOutcome, SessionView};
use crate::state::AppState;
use crate::storage::persist_preferences;
use crate::ui::render_scan_page;
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Local;
use std::time::Instant;
use tracing::{debug, info};

pub async fn scan_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return Redirect::to(&state.config.login_path).into_response();
    };
    let view = {
        let mut session = state.session.lock().await;
        session.set_credential(&token);
        session.view(Instant::now())
    };
    Html(render_scan_page(&view)).into_response()
}

pub async fn back(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config.back_path)
}

pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, AppError> {
    let token = session_token(&headers).ok_or_else(AppError::unauthorized)?;
    let mut session = state.session.lock().await;
    session.set_credential(&token);
    Ok(Json(session.view(Instant::now())))
}

pub async fn action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ActionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let token = session_token(&headers).ok_or_else(AppError::unauthorized)?;
    let view = apply_action(&state, &token, payload).await?;
    Ok(Json(view))
}

pub async fn page_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<ActionRequest>,
) -> Result<Redirect, AppError> {
    let Some(token) = session_token(&headers) else {
        return Ok(Redirect::to(&state.config.login_path));
    };
    apply_action(&state, &token, payload).await?;
    Ok(Redirect::to("/scan"))
}

pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<SessionView>, AppError> {
    let token = session_token(&headers).ok_or_else(AppError::unauthorized)?;
    let clock = Instant::now();
    let mut session = state.session.lock().await;
    session.set_credential(&token);
    match session.handle_scan(&payload.text, clock) {
        ScanOutcome::Selected(id) => {
            info!(student_id = %id, "student selected from scan");
            state.syncer.wake();
        }
        ScanOutcome::Invalid => info!("scan did not contain a student id"),
        ScanOutcome::Repeated => {}
    }
    Ok(Json(session.view(clock)))
}

pub async fn scan_error(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ScanErrorRequest>,
) -> Result<Json<SessionView>, AppError> {
    let token = session_token(&headers).ok_or_else(AppError::unauthorized)?;
    let clock = Instant::now();
    let mut session = state.session.lock().await;
    session.set_credential(&token);
    session.handle_scan_error(&payload.error, clock);
    Ok(Json(session.view(clock)))
}

/// The page regained focus: fetch now rather than on the next tick.
pub async fn focus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, AppError> {
    let token = session_token(&headers).ok_or_else(AppError::unauthorized)?;
    let mut session = state.session.lock().await;
    session.set_credential(&token);
    state.syncer.wake();
    Ok(Json(session.view(Instant::now())))
}

async fn apply_action(
    state: &AppState,
    token: &str,
    payload: ActionRequest,
) -> Result<SessionView, AppError> {
    let clock = Instant::now();
    let mut session = state.session.lock().await;
    session.set_credential(token);

    let mut edit = None;
    let mut wake = false;
    let mut persist = false;

    match payload.action.trim() {
        "type" => session.type_identifier(payload.value.as_deref().unwrap_or_default()),
        "search" => {
            if let Some(value) = payload.value.as_deref() {
                session.type_identifier(value);
            }
            wake = session.submit_search();
        }
        "week" => {
            persist = session.select_week(payload.value);
            wake = persist;
        }
        "center" => persist = session.select_center(payload.value),
        "attendance" => edit = session.toggle_attendance(Local::now().naive_local(), clock).ok(),
        "homework" => edit = session.toggle_homework(clock).ok(),
        "payment" => edit = session.toggle_payment(clock).ok(),
        "quiz_input" => session.set_quiz_input(payload.score, payload.out_of),
        "quiz" => {
            if payload.score.is_some() || payload.out_of.is_some() {
                session.set_quiz_input(payload.score, payload.out_of);
            }
            edit = session.submit_quiz(clock).ok();
        }
        other => {
            return Err(AppError::bad_request(format!("unknown action '{other}'")));
        }
    }

    if persist {
        persist_preferences(&state.config.prefs_path, &session.preferences()).await?;
    }
    if let Some(edit) = edit {
        debug!(student_id = %edit.student_id, kind = edit.request.kind(), "edit applied locally");
        state.syncer.dispatch(edit);
    }
    if wake {
        state.syncer.wake();
    }

    Ok(session.view(clock))
}

/// Reads the operator credential from the `token` cookie or a bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)?
                .to_str()
                .ok()?
                .strip_prefix("Bearer ")
                .map(str::to_string)
        })
        .filter(|token| !token.trim().is_empty())
}
