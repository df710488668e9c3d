//! Session HTTP routes under `/api/sessions`, plus device resumption.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::domain::colors::JassColor;
use crate::domain::game::Declaration;
use crate::domain::history::Direction;
use crate::domain::settings::GameSettings;
use crate::domain::snapshot::SessionView;
use crate::domain::tally::{Denomination, TallyShape};
use crate::domain::team::TeamPosition;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::session_id::{parse_path_id, SessionId};
use crate::extractors::ValidatedJson;
use crate::services::sessions::ResumeOutcome;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionRequest {
    participant_ids: Vec<String>,
    #[serde(default)]
    settings: Option<GameSettings>,
    #[serde(default)]
    group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRoundRequest {
    acting: TeamPosition,
    color: String,
    raw_score: i32,
}

#[derive(Debug, Deserialize)]
struct DeclarationRequest {
    declaration: Declaration,
    team: TeamPosition,
}

#[derive(Debug, Deserialize)]
struct WeisRequest {
    team: TeamPosition,
    points: u32,
}

#[derive(Debug, Deserialize)]
struct HistoryRequest {
    direction: Direction,
}

#[derive(Debug, Deserialize)]
struct TallyQuery {
    team: TeamPosition,
    #[serde(default)]
    denomination: Option<Denomination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeRequest {
    #[serde(default)]
    participant_id: Option<String>,
    /// Candidate records pushed by a subscription; resolved without loading.
    #[serde(default)]
    candidates: Option<Vec<serde_json::Value>>,
}

/// Result of a mutation together with the session as it now stands.
#[derive(Debug, Serialize)]
struct Applied<T: Serialize> {
    outcome: T,
    session: SessionView,
}

#[derive(Debug, Serialize)]
struct TallyResponse {
    team: TeamPosition,
    shapes: Vec<TallyShape>,
}

fn applied<T: Serialize>((outcome, session): (T, SessionView)) -> HttpResponse {
    HttpResponse::Ok().json(Applied { outcome, session })
}

/// Stop tick tasks whose charge the mutation ended, e.g. when a game
/// completed under it.
fn sync_tickers<T>(app_state: &AppState, result: (T, SessionView)) -> (T, SessionView) {
    let stopped = app_state.ticker.retain(result.1.id, &result.1.charges);
    if stopped > 0 {
        debug!(session_id = %result.1.id, stopped, "charge tasks stopped");
    }
    result
}

fn charge_path(req: &HttpRequest) -> Result<(Declaration, TeamPosition), AppError> {
    let segment = |name: &str| {
        req.match_info().get(name).ok_or_else(|| {
            AppError::bad_request(ErrorCode::BadRequest, format!("Missing {name} parameter"))
        })
    };
    let action = segment("action")?
        .parse::<Declaration>()
        .map_err(|e| AppError::bad_request(ErrorCode::BadRequest, e))?;
    let team = segment("team")?
        .parse::<TeamPosition>()
        .map_err(|e| AppError::bad_request(ErrorCode::BadRequest, e))?;
    Ok((action, team))
}

/// POST /api/sessions
async fn start_session(
    body: ValidatedJson<StartSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let view = app_state.sessions.start_session(
        body.participant_ids,
        body.settings.unwrap_or_default(),
        body.group_id,
    )?;
    Ok(HttpResponse::Created().json(view))
}

/// GET /api/sessions/{session_id}
async fn get_session(
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(app_state.sessions.view(session_id.0)?))
}

/// POST /api/sessions/{session_id}/rounds
async fn submit_round(
    session_id: SessionId,
    body: ValidatedJson<SubmitRoundRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let color: JassColor = body.color.parse()?;
    let result = app_state
        .sessions
        .submit_round(session_id.0, body.acting, color, body.raw_score)?;
    Ok(applied(sync_tickers(&app_state, result)))
}

/// POST /api/sessions/{session_id}/declarations
///
/// Guard violations answer 200 with `applied: false`.
async fn declare(
    session_id: SessionId,
    body: ValidatedJson<DeclarationRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let result = app_state
        .sessions
        .declare(session_id.0, body.declaration, body.team)?;
    Ok(applied(sync_tickers(&app_state, result)))
}

/// POST /api/sessions/{session_id}/weis
async fn add_weis(
    session_id: SessionId,
    body: ValidatedJson<WeisRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let result = app_state
        .sessions
        .add_weis(session_id.0, body.team, body.points)?;
    Ok(applied(sync_tickers(&app_state, result)))
}

/// POST /api/sessions/{session_id}/history
async fn navigate(
    session_id: SessionId,
    body: ValidatedJson<HistoryRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let result = app_state.sessions.navigate(session_id.0, body.direction)?;
    Ok(applied(result))
}

/// GET /api/sessions/{session_id}/tally?team=top&denomination=100
async fn tally(
    req: HttpRequest,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = web::Query::<TallyQuery>::from_query(req.query_string())
        .map_err(|e| AppError::bad_request(ErrorCode::BadRequest, e.to_string()))?
        .into_inner();
    let shapes = app_state
        .sessions
        .tally(session_id.0, query.team, query.denomination)?;
    Ok(HttpResponse::Ok().json(TallyResponse {
        team: query.team,
        shapes,
    }))
}

/// POST /api/sessions/{session_id}/charges/{action}/{team}/press
async fn press_charge(
    req: HttpRequest,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (action, team) = charge_path(&req)?;
    let (started, session) = app_state
        .sessions
        .press_charge(session_id.0, action, team)?;
    if started {
        app_state.ticker.start(session_id.0, action, team);
    }
    Ok(applied((started, session)))
}

/// POST /api/sessions/{session_id}/charges/{action}/{team}/release
async fn release_charge(
    req: HttpRequest,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (action, team) = charge_path(&req)?;
    // The tick task goes first, whatever the release yields.
    app_state.ticker.stop(session_id.0, action, team);
    let result = app_state
        .sessions
        .release_charge(session_id.0, action, team)?;
    Ok(applied(sync_tickers(&app_state, result)))
}

/// POST /api/sessions/{session_id}/end
async fn end_session(
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stopped = app_state.ticker.stop_session(session_id.0);
    debug!(session_id = %session_id.0, stopped, "charge tasks stopped");
    Ok(HttpResponse::Ok().json(app_state.sessions.end_session(session_id.0)?))
}

/// POST /api/sessions/{session_id}/games/{game_id}/resume
async fn resume_game(
    req: HttpRequest,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let game_id = parse_path_id(&req, "game_id")?;
    let view = app_state.sessions.resume_game(session_id.0, game_id).await?;
    // Only a successful resume clears the board.
    app_state.ticker.stop_session(session_id.0);
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/resume
///
/// With `candidates`, resolves over the given records only. Otherwise looks
/// up the participant's active games and restores the selected one.
async fn resume(
    body: ValidatedJson<ResumeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let now = OffsetDateTime::now_utc();

    if let Some(candidates) = body.candidates {
        let report = app_state.sessions.resolve_raw_candidates(candidates, now);
        return Ok(HttpResponse::Ok().json(ResumeOutcome {
            report,
            session: None,
        }));
    }

    let participant_id = body
        .participant_id
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            AppError::invalid(
                ErrorCode::ValidationError,
                "participantId or candidates is required",
            )
        })?;
    let outcome = app_state.sessions.resume_for(&participant_id, now).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(start_session)))
        .service(web::resource("/{session_id}").route(web::get().to(get_session)))
        .service(web::resource("/{session_id}/rounds").route(web::post().to(submit_round)))
        .service(web::resource("/{session_id}/declarations").route(web::post().to(declare)))
        .service(web::resource("/{session_id}/weis").route(web::post().to(add_weis)))
        .service(web::resource("/{session_id}/history").route(web::post().to(navigate)))
        .service(web::resource("/{session_id}/tally").route(web::get().to(tally)))
        .service(
            web::resource("/{session_id}/charges/{action}/{team}/press")
                .route(web::post().to(press_charge)),
        )
        .service(
            web::resource("/{session_id}/charges/{action}/{team}/release")
                .route(web::post().to(release_charge)),
        )
        .service(web::resource("/{session_id}/end").route(web::post().to(end_session)))
        .service(
            web::resource("/{session_id}/games/{game_id}/resume")
                .route(web::post().to(resume_game)),
        );
}

pub fn configure_resume(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(resume)));
}
