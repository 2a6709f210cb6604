//! Code hunt in-browser WASM server.
//!
//! Teams play a fixed roster of mini-games; each win reveals one digit of
//! the team's secret code. The Web Worker bridge constructs one
//! `HuntServer` per browser session and forwards HTTP-like requests to
//! `handle_request`. Uses `matchit` for URL routing.
//!
//! Persistence goes through the bridge: slices read from `localStorage`
//! are handed to the constructor, and `take_pending_writes` (or
//! `POST /api/state/persist`) returns what must be written back.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod hunt;
pub mod routes;

use config::HuntConfig;
use hunt::minigame::MiniGameSession;
use hunt::progression::Progression;
use hunt::store::{pending_to_json, MemoryStore};

/// One browser session's hunt: controller, active mini-game, admin flag.
#[wasm_bindgen]
pub struct HuntServer {
    progression: Progression<MemoryStore>,
    active_game: Option<MiniGameSession>,
    is_admin: bool,
}

#[wasm_bindgen]
impl HuntServer {
    /// Build the server from a JSON config (empty for the reference hunt)
    /// and a JSON object of persisted slices (empty on first visit).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, persisted_json: &str) -> Result<HuntServer, String> {
        let config = HuntConfig::from_json(config_json).map_err(|e| e.to_string())?;
        Ok(Self::from_parts(config, MemoryStore::from_slices(persisted_json)))
    }

    /// Process an HTTP-like request and return an HTML fragment.
    ///
    /// # Arguments
    /// * `method`: HTTP method ("GET" or "POST")
    /// * `path`  : URL path (e.g., "/api/games")
    /// * `query` : Query string (e.g., "?game=3")
    /// * `body`  : Form-encoded request body. Empty string for GET requests.
    pub fn handle_request(&mut self, method: &str, path: &str, query: &str, body: &str) -> String {
        let mut router = matchit::Router::new();

        // Player routes
        router.insert("/api/teams", "teams").ok();
        router.insert("/api/teams/select", "teams_select").ok();
        router.insert("/api/games", "games").ok();
        router.insert("/api/games/completed", "games_completed").ok();
        router.insert("/api/games/launch", "games_launch").ok();
        router.insert("/api/games/win", "games_win").ok();
        router.insert("/api/games/restart", "games_restart").ok();
        router.insert("/api/games/complete", "games_complete").ok();
        router.insert("/api/progress", "progress").ok();
        router.insert("/api/progress/reset", "progress_reset").ok();
        router.insert("/api/victory", "victory").ok();

        // Admin routes
        router.insert("/api/admin/login", "admin_login").ok();
        router.insert("/api/admin/logout", "admin_logout").ok();
        router.insert("/api/admin/teams", "admin_teams").ok();
        router.insert("/api/admin/games/reset", "admin_games_reset").ok();

        // Persistence routes
        router.insert("/api/state", "state").ok();
        router.insert("/api/state/persist", "state_persist").ok();
        router.insert("/api/state/export", "state_export").ok();
        router.insert("/api/state/import", "state_import").ok();

        let p = &mut self.progression;
        match router.at(path) {
            Ok(matched) => match (*matched.value, method) {
                ("teams", "GET") => routes::teams::handle_list_get(p),
                ("teams_select", "POST") => routes::teams::handle_select_post(p, body),
                ("games", "GET") => routes::games::handle_hub_get(p),
                ("games_completed", "GET") => routes::games::handle_completed_get(p, query),
                ("games_launch", "POST") => {
                    routes::games::handle_launch_post(p, &mut self.active_game, body)
                }
                ("games_win", "POST") => {
                    routes::games::handle_win_post(p, &mut self.active_game, body)
                }
                ("games_restart", "POST") => {
                    routes::games::handle_restart_post(&mut self.active_game)
                }
                ("games_complete", "POST") => routes::games::handle_complete_post(p, body),
                ("progress", "GET") => routes::games::handle_progress_get(p),
                ("progress_reset", "POST") => {
                    routes::games::handle_reset_progress_post(p, &mut self.active_game)
                }
                ("victory", "GET") => routes::games::handle_victory_get(p),

                ("admin_login", "POST") => {
                    let credentials = &p.config().admin;
                    routes::admin::handle_login_post(credentials, &mut self.is_admin, body)
                }
                ("admin_logout", "POST") => routes::admin::handle_logout_post(&mut self.is_admin),
                ("admin_teams", "GET") => routes::admin::handle_teams_get(p, self.is_admin),
                ("admin_teams", "POST") => routes::admin::handle_teams_post(p, self.is_admin, body),
                ("admin_games_reset", "POST") => {
                    routes::admin::handle_reset_games_post(p, &mut self.active_game, self.is_admin)
                }

                ("state", "GET") => routes::state::handle_state_get(p),
                ("state_persist", "POST") => routes::state::handle_persist_post(p),
                ("state_export", "GET") => routes::state::handle_export_get(p),
                ("state_import", "POST") => routes::state::handle_import_post(p, body),

                _ => method_not_allowed(),
            },
            Err(_) => not_found(),
        }
    }

    /// Drain pending slice writes as a JSON object `{key: value}`.
    pub fn take_pending_writes(&mut self) -> String {
        let pending = self.progression.store_mut().take_pending();
        pending_to_json(&pending)
    }
}

impl HuntServer {
    pub fn from_parts(config: HuntConfig, store: MemoryStore) -> Self {
        Self {
            progression: Progression::load(config, store),
            active_game: None,
            is_admin: false,
        }
    }

    pub fn progression(&self) -> &Progression<MemoryStore> {
        &self.progression
    }
}

fn not_found() -> String {
    r#"<span class="text-red-500">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red-500">405 — method not allowed</span>"#.to_string()
}
