//! Tic-Tac-Toe Web API
//!
//! Serves one shared [`Session`] over REST: the human moves a cursor or plays
//! a cell directly, the solver answers in the same request, and a finished
//! board clears itself after the reset delay. Finished games can optionally
//! be appended to a SQLite results table.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ttt_core::{Board, Coord, Mark, Outcome, Session, SessionConfig, SessionSnapshot, Turn};

// =============================================================================
// Results
// =============================================================================

/// SQLite log of finished games
struct ResultsDb {
    conn: Mutex<Connection>,
}

impl ResultsDb {
    /// Open (or create) the results database
    fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                outcome TEXT NOT NULL,
                human_moves INTEGER NOT NULL,
                finished_at_ms INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(ResultsDb { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, outcome: Outcome, human_moves: u32) -> Result<(), rusqlite::Error> {
        let finished_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        self.conn().execute(
            "INSERT INTO games (outcome, human_moves, finished_at_ms) VALUES (?1, ?2, ?3)",
            params![outcome.to_string(), human_moves, finished_at_ms],
        )?;
        Ok(())
    }

    fn tallies(&self) -> Result<ResultsModel, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT outcome, COUNT(*) FROM games GROUP BY outcome")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut model = ResultsModel {
            recording: true,
            ..Default::default()
        };
        for row in rows {
            let (outcome, count) = row?;
            let count = count as u64;
            match outcome.as_str() {
                "circle_win" => model.circle_wins = count,
                "cross_win" => model.cross_wins = count,
                "tied" => model.ties = count,
                _ => {}
            }
            model.games += count;
        }
        Ok(model)
    }
}

// =============================================================================
// Shared State
// =============================================================================

struct AppStateInner {
    session: Mutex<Session>,
    results: Option<ResultsDb>,
    started: Instant,
}

type AppState = Arc<AppStateInner>;

impl AppStateInner {
    fn new(config: SessionConfig, results: Option<ResultsDb>) -> ttt_core::Result<Self> {
        Ok(Self {
            session: Mutex::new(Session::new(config)?),
            results,
            started: Instant::now(),
        })
    }

    /// Server clock for the session
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Lock the session and let any pending auto-reset happen first
    fn session(&self) -> MutexGuard<'_, Session> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.tick(self.now());
        session
    }

    fn record_if_finished(&self, session: &Session, turn: &Turn) {
        if !turn.outcome.is_terminal() {
            return;
        }
        if let Some(results) = &self.results {
            if let Err(e) = results.record(turn.outcome, session.human_moves()) {
                warn!(error = %e, "failed to record finished game");
            }
        }
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct GameStateModel {
    #[serde(flatten)]
    state: SessionSnapshot,
    human: Mark,
    human_moves: u32,
    /// The move pair played by this request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    last_turn: Option<Turn>,
}

#[derive(Deserialize)]
struct CursorRequest {
    dx: i32,
    dy: i32,
}

#[derive(Deserialize)]
struct MoveRequest {
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize)]
struct StateModel {
    bits: u32,
}

#[derive(Serialize, Default)]
struct ResultsModel {
    /// False when the server runs without a results database
    recording: bool,
    games: u64,
    circle_wins: u64,
    cross_wins: u64,
    ties: u64,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
    uptime_secs: u64,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: detail.into(),
        }),
    )
}

fn session_to_model(session: &Session, last_turn: Option<Turn>) -> GameStateModel {
    GameStateModel {
        state: session.snapshot(),
        human: session.config().human,
        human_moves: session.human_moves(),
        last_turn,
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(session_to_model(&session, None))
}

async fn move_cursor(
    State(state): State<AppState>,
    Json(req): Json<CursorRequest>,
) -> Json<GameStateModel> {
    let mut session = state.session();
    session.move_cursor(req.dx, req.dy);
    Json(session_to_model(&session, None))
}

async fn confirm(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();

    if session.is_finished() {
        return Err(bad_request("Game is over, waiting for reset"));
    }
    let turn = session
        .confirm(state.now())
        .ok_or_else(|| bad_request(format!("Cell {} is taken", session.cursor())))?;

    state.record_if_finished(&session, &turn);
    Ok(Json(session_to_model(&session, Some(turn))))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    let cell = Coord::new(req.x, req.y);

    if session.is_finished() {
        return Err(bad_request("Game is over, waiting for reset"));
    }
    if !cell.in_range() {
        return Err(bad_request(format!("Cell {} is off the board", cell)));
    }
    let turn = session
        .play_at(cell, state.now())
        .ok_or_else(|| bad_request(format!("Cell {} is taken", cell)))?;

    state.record_if_finished(&session, &turn);
    Ok(Json(session_to_model(&session, Some(turn))))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset();
    Json(session_to_model(&session, None))
}

async fn export_state(State(state): State<AppState>) -> Json<StateModel> {
    let session = state.session();
    Json(StateModel {
        bits: session.board().to_bits(),
    })
}

async fn import_state(
    State(state): State<AppState>,
    Json(req): Json<StateModel>,
) -> Result<Json<GameStateModel>, ApiError> {
    let board = Board::from_bits(req.bits).map_err(|e| bad_request(e.to_string()))?;

    let mut session = state.session();
    session.load(board, state.now());
    info!(bits = req.bits, outcome = %board.outcome(), "board imported");
    Ok(Json(session_to_model(&session, None)))
}

async fn get_results(State(state): State<AppState>) -> Result<Json<ResultsModel>, ApiError> {
    drop(state.session());

    match &state.results {
        Some(results) => results.tallies().map(Json).map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorModel {
                    detail: e.to_string(),
                }),
            )
        }),
        None => Ok(Json(ResultsModel::default())),
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthModel> {
    drop(state.session());
    Json(HealthModel {
        status: "ok".to_string(),
        uptime_secs: state.now().as_secs(),
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/cursor", post(move_cursor))
        .route("/confirm", post(confirm))
        .route("/move", post(make_move))
        .route("/reset", post(reset_game))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
        .route("/results", get(get_results))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "ttt-api", about = "Tic-tac-toe session server")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "TTT_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Seconds a finished board stays up before it is cleared
    #[arg(long, env = "TTT_RESET_DELAY_SECS", default_value_t = 5)]
    reset_delay_secs: u64,

    /// Side the human plays (circle or cross)
    #[arg(long, env = "TTT_HUMAN", default_value = "circle")]
    human: Mark,

    /// SQLite file to append finished games to
    #[arg(long, env = "TTT_RESULTS_DB")]
    results_db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let results = match &cli.results_db {
        Some(path) => {
            let db = ResultsDb::open(path)
                .with_context(|| format!("failed to open results database {}", path.display()))?;
            info!(path = %path.display(), "recording finished games");
            Some(db)
        }
        None => {
            info!("no results database configured, finished games are not recorded");
            None
        }
    };

    let config = SessionConfig {
        reset_delay: Duration::from_secs(cli.reset_delay_secs),
        human: cli.human,
        ..Default::default()
    };
    let state: AppState = Arc::new(AppStateInner::new(config, results)?);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!(addr = %cli.bind, "tic-tac-toe API running");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
