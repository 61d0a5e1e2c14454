//! Axum web server with WebSocket streaming of player events.

use std::sync::Arc;
use tokio::sync::RwLock;

use algoviz_core::{Algorithm, Complexity, Family, GeneratorConfig, Snapshot, VisualModel};
use algoviz_player::{FrameRecorder, PanelView, Player, PlayerConfig, PlayerEvent, Progress, RunReport, SpeedLevel, StartOutcome};
use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::error::Result;
use crate::workbench::{AlgorithmRequest, Workbench};

/// Shared application state.
pub struct AppState {
    player: Player<FrameRecorder>,
    workbench: RwLock<Workbench>,
    config: VisConfig,
}

impl AppState {
    /// Prepare `request` and hand it to the player, unless a run is active.
    async fn start(&self, request: &AlgorithmRequest) -> Result<StartOutcome> {
        // the workbench lock keeps two starts from both seeing an idle player
        let mut workbench = self.workbench.write().await;
        if self.player.progress().await.status.is_active() {
            warn!(algorithm = ?request.algorithm, "start ignored: a run is active");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.settle(&mut workbench).await;
        let program = workbench.prepare(request)?;
        self.player.register_panel(program.listing()).await;
        let outcome = self.player.start(program).await;
        if outcome != StartOutcome::Started {
            workbench.discard();
        }
        Ok(outcome)
    }

    /// Commit the staged change of a completed run, or drop it if the run
    /// was stopped, reset or failed. Waits while a run is active.
    ///
    /// The caller holds the workbench write lock, so no run can start meanwhile.
    async fn settle(&self, workbench: &mut Workbench) {
        if !workbench.has_pending() || self.player.progress().await.status.is_active() {
            return;
        }
        if self.player.last_report().await.is_some() {
            workbench.commit();
        } else {
            workbench.discard();
        }
    }
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    pub fn new(config: VisConfig) -> Result<Self> {
        let workbench = Workbench::new(GeneratorConfig {
            seed: config.seed,
            ..GeneratorConfig::default()
        })?;
        let player = Player::new(
            FrameRecorder::new(),
            PlayerConfig {
                speed_level: config.speed,
                ..PlayerConfig::default()
            },
        );
        Ok(Self {
            state: Arc::new(AppState {
                player,
                workbench: RwLock::new(workbench),
                config,
            }),
        })
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/api/status", get(status_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/structures", get(structures_handler))
            .route("/api/generate", post(generate_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/panels", get(panels_handler))
            .route("/api/player", get(progress_handler))
            .route("/api/player/start", post(start_handler))
            .route("/api/player/pause", post(pause_handler))
            .route("/api/player/resume", post(resume_handler))
            .route("/api/player/stop", post(stop_handler))
            .route("/api/player/reset", post(reset_handler))
            .route("/api/player/speed", post(speed_handler))
            .route("/api/player/report", get(report_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn serve(self) -> Result<()> {
        let addr = self.state.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Algorithm player running on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    seed: u64,
    player: Progress,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        seed: state.config.seed,
        player: state.player.progress().await,
    })
}

#[derive(Serialize)]
struct AlgorithmInfo {
    algorithm: Algorithm,
    family: Family,
    title: &'static str,
    complexity: Complexity,
}

async fn algorithms_handler() -> Json<Vec<AlgorithmInfo>> {
    Json(
        Algorithm::ALL
            .iter()
            .map(|&algorithm| AlgorithmInfo {
                algorithm,
                family: algorithm.family(),
                title: algorithm.listing().title,
                complexity: algorithm.complexity(),
            })
            .collect(),
    )
}

/// Current state of every structure operations carry forward.
#[derive(Serialize)]
struct Structures {
    tree: Snapshot,
    heap: Snapshot,
    trie: Snapshot,
    graph: Snapshot,
    segment: Option<Snapshot>,
}

impl Structures {
    fn of(workbench: &Workbench) -> Self {
        Self {
            tree: workbench.tree().snapshot(),
            heap: workbench.heap().snapshot(),
            trie: workbench.trie().snapshot(),
            graph: workbench.graph().snapshot(),
            segment: workbench.segment().map(|s| s.snapshot()),
        }
    }
}

async fn structures_handler(State(state): State<Arc<AppState>>) -> Json<Structures> {
    let mut workbench = state.workbench.write().await;
    state.settle(&mut workbench).await;
    Json(Structures::of(&workbench))
}

async fn generate_handler(State(state): State<Arc<AppState>>) -> Result<Json<Structures>> {
    let mut workbench = state.workbench.write().await;
    workbench.regenerate()?;
    Ok(Json(Structures::of(&workbench)))
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<Option<Snapshot>> {
    Json(state.player.snapshot().await)
}

async fn panels_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PanelView>> {
    Json(state.player.panels().await)
}

async fn progress_handler(State(state): State<Arc<AppState>>) -> Json<Progress> {
    Json(state.player.progress().await)
}

async fn report_handler(State(state): State<Arc<AppState>>) -> Json<Option<RunReport>> {
    Json(state.player.last_report().await)
}

#[derive(Serialize)]
struct StartResponse {
    accepted: bool,
    progress: Progress,
}

async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlgorithmRequest>,
) -> Result<Json<StartResponse>> {
    let outcome = state.start(&req).await?;
    Ok(Json(StartResponse {
        accepted: outcome == StartOutcome::Started,
        progress: state.player.progress().await,
    }))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<Progress> {
    Json(state.player.pause().await)
}

async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<Progress> {
    Json(state.player.resume().await)
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<Progress> {
    Json(state.player.stop().await)
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<Progress> {
    Json(state.player.reset().await)
}

/// Either a slider level (1 to 10) or an explicit delay.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpeedRequest {
    Level { level: u8 },
    Delay { ms: u64 },
}

#[derive(Serialize)]
struct SpeedResponse {
    speed_ms: u64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<SpeedResponse> {
    let speed_ms = match req {
        SpeedRequest::Level { level } => state.player.set_speed_level(SpeedLevel::new(level)).await,
        SpeedRequest::Delay { ms } => state.player.set_speed_ms(ms).await,
    };
    Json(SpeedResponse { speed_ms })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let mut events = state.player.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let hello = WsResponse::Status(state.player.progress().await);
    if send(&mut sender, &hello).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send(&mut sender, &WsResponse::Event(event)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging behind player events");
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = match serde_json::from_str::<WsCommand>(&text) {
                        Ok(cmd) => handle_ws_command(&state, cmd).await,
                        Err(e) => WsResponse::Error { message: e.to_string() },
                    };
                    if send(&mut sender, &response).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("websocket closed");
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, response: &WsResponse) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "dropping unserializable websocket message");
            Ok(())
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetStatus,
    GetPanels,
    Start(AlgorithmRequest),
    Pause,
    Resume,
    Stop,
    Reset,
    Speed { level: u8 },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Snapshot { snapshot: Option<Snapshot> },
    Status(Progress),
    Panels { panels: Vec<PanelView> },
    Event(PlayerEvent),
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    match cmd {
        WsCommand::GetSnapshot => WsResponse::Snapshot {
            snapshot: state.player.snapshot().await,
        },
        WsCommand::GetStatus => WsResponse::Status(state.player.progress().await),
        WsCommand::GetPanels => WsResponse::Panels {
            panels: state.player.panels().await,
        },
        WsCommand::Start(request) => match state.start(&request).await {
            Ok(_) => WsResponse::Status(state.player.progress().await),
            Err(e) => WsResponse::Error { message: e.to_string() },
        },
        WsCommand::Pause => WsResponse::Status(state.player.pause().await),
        WsCommand::Resume => WsResponse::Status(state.player.resume().await),
        WsCommand::Stop => WsResponse::Status(state.player.stop().await),
        WsCommand::Reset => WsResponse::Status(state.player.reset().await),
        WsCommand::Speed { level } => {
            state.player.set_speed_level(SpeedLevel::new(level)).await;
            WsResponse::Status(state.player.progress().await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_player::PlayerStatus;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> VisServer {
        VisServer::new(VisConfig::default()).unwrap()
    }

    async fn call(router: Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn status_reports_idle_player() {
        let (status, json) = call(server().router(), "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["player"]["status"], "idle");
        assert_eq!(json["seed"], 42);
    }

    #[tokio::test]
    async fn lists_every_algorithm() {
        let (_, json) = call(server().router(), "GET", "/api/algorithms", None).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), Algorithm::ALL.len());
        assert_eq!(list[0]["algorithm"], "bubble_sort");
        assert_eq!(list[0]["complexity"]["time"]["worst"], "O(n²)");
    }

    #[tokio::test]
    async fn bad_requests_are_rejected_before_playing() {
        let server = server();
        let (status, json) = call(
            server.router(),
            "POST",
            "/api/player/start",
            Some(serde_json::json!({ "algorithm": "bst_insert" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("value"));
        assert_eq!(server.state.player.progress().await.status, PlayerStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_not_accepted() {
        let server = server();
        let body = serde_json::json!({ "algorithm": "bubble_sort" });

        let (status, json) = call(server.router(), "POST", "/api/player/start", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["accepted"], true);
        assert_eq!(json["progress"]["algorithm"], "bubble_sort");

        let (_, json) = call(server.router(), "POST", "/api/player/start", Some(body)).await;
        assert_eq!(json["accepted"], false);

        let (_, json) = call(server.router(), "GET", "/api/panels", None).await;
        assert_eq!(json[0]["id"], "bubble_sort");

        let (_, json) = call(server.router(), "POST", "/api/player/stop", None).await;
        assert_eq!(json["status"], "stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn structures_change_only_when_the_run_completes() {
        let server = server();
        let (_, before) = call(server.router(), "GET", "/api/structures", None).await;
        let insert = serde_json::json!({ "algorithm": "bst_insert", "value": 1000 });

        let (_, json) = call(server.router(), "POST", "/api/player/start", Some(insert.clone())).await;
        assert_eq!(json["accepted"], true);
        let (_, during) = call(server.router(), "GET", "/api/structures", None).await;
        assert_eq!(during["tree"], before["tree"]);
        call(server.router(), "POST", "/api/player/stop", None).await;
        let (_, stopped) = call(server.router(), "GET", "/api/structures", None).await;
        assert_eq!(stopped["tree"], before["tree"]);

        let mut events = server.state.player.subscribe();
        call(server.router(), "POST", "/api/player/start", Some(insert)).await;
        while !matches!(events.recv().await.unwrap(), PlayerEvent::Completed { .. }) {}
        let (_, after) = call(server.router(), "GET", "/api/structures", None).await;
        assert_ne!(after["tree"], before["tree"]);
        assert!(server.state.workbench.read().await.tree().contains(1000));
    }

    #[tokio::test]
    async fn speed_accepts_level_or_delay() {
        let server = server();
        let (_, json) = call(server.router(), "POST", "/api/player/speed", Some(serde_json::json!({ "level": 10 }))).await;
        assert_eq!(json["speed_ms"], 50);
        let (_, json) = call(server.router(), "POST", "/api/player/speed", Some(serde_json::json!({ "ms": 10 }))).await;
        assert_eq!(json["speed_ms"], 50);
        let (_, json) = call(server.router(), "POST", "/api/player/speed", Some(serde_json::json!({ "level": 1 }))).await;
        assert_eq!(json["speed_ms"], 500);
    }

    #[tokio::test]
    async fn generate_replaces_structures() {
        let server = server();
        let (_, before) = call(server.router(), "GET", "/api/structures", None).await;
        let (status, after) = call(server.router(), "POST", "/api/generate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["tree"]["kind"], "tree");
        assert_eq!(after["graph"]["kind"], "graph");
        assert!(after["segment"].is_null());
        assert_ne!(before["graph"], after["graph"]);
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"start","algorithm":"dfs","start":2}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Start(AlgorithmRequest { start: Some(2), .. })));
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"speed","level":3}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Speed { level: 3 }));
    }
}
