//! `/api/admin/*` routes: team management and game reset.
//!
//! Guarded by an in-memory admin flag set through `/api/admin/login`. The
//! flag is never persisted, so a reload logs the admin out.

use crate::config::AdminCredentials;
use crate::hunt::minigame::MiniGameSession;
use crate::hunt::progression::Progression;
use crate::hunt::store::Store;
use crate::hunt::team::{TeamId, TeamPatch};
use crate::routes::util::{
    error_fragment, escape_html, get_param, notice_fragment, parse_form_body,
};

fn forbidden() -> String {
    r#"<span class="text-red-500">403 — admin login required</span>"#.to_string()
}

// ── POST /api/admin/login ──────────────────────────────────────────

/// Handle POST /api/admin/login
/// Body: username={u}&password={p}
pub fn handle_login_post(
    credentials: &AdminCredentials,
    is_admin: &mut bool,
    body: &str,
) -> String {
    let params = parse_form_body(body);
    let username = get_param(&params, "username").unwrap_or("");
    let password = get_param(&params, "password").unwrap_or("");

    if username == credentials.username && password == credentials.password {
        *is_admin = true;
        tracing::info!("admin logged in");
        notice_fragment("Logged in successfully. Welcome to the admin dashboard.")
    } else {
        tracing::warn!("admin login rejected");
        error_fragment("Invalid credentials. Please try again.")
    }
}

// ── POST /api/admin/logout ─────────────────────────────────────────

pub fn handle_logout_post(is_admin: &mut bool) -> String {
    *is_admin = false;
    notice_fragment("You have been logged out successfully.")
}

// ── GET /api/admin/teams ───────────────────────────────────────────

/// Handle GET /api/admin/teams
/// Returns the team management table.
pub fn handle_teams_get<S: Store>(progression: &Progression<S>, is_admin: bool) -> String {
    if !is_admin {
        return forbidden();
    }
    render_team_table(progression)
}

// ── POST /api/admin/teams ──────────────────────────────────────────

/// Handle POST /api/admin/teams
/// Body params:
///   - action=add&name={n}&code={c}
///   - action=update&id={id}[&name={n}][&code={c}]
///   - action=delete&id={id}
///
/// Returns a status line followed by the re-rendered table.
pub fn handle_teams_post<S: Store>(
    progression: &mut Progression<S>,
    is_admin: bool,
    body: &str,
) -> String {
    if !is_admin {
        return forbidden();
    }
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");
    let id = get_param(&params, "id").map(TeamId::from);

    let status = match (action, id) {
        ("add", _) => {
            let name = get_param(&params, "name").unwrap_or("");
            let code = get_param(&params, "code").unwrap_or("");
            progression
                .add_team(name, code)
                .map(|_| format!("{} has been added successfully.", name.trim()))
        }
        ("update", Some(id)) => {
            let patch = TeamPatch {
                name: get_param(&params, "name").map(str::to_string),
                code: get_param(&params, "code").map(str::to_string),
            };
            progression
                .update_team(&id, patch)
                .map(|team| format!("{} has been updated successfully.", team.name))
        }
        ("delete", Some(id)) => progression
            .delete_team(&id)
            .map(|team| format!("{} has been removed successfully.", team.name)),
        ("update" | "delete", None) => return error_fragment("Missing id parameter"),
        _ => return error_fragment("Unknown action"),
    };

    let mut html = match status {
        Ok(message) => notice_fragment(&message),
        Err(e) => error_fragment(&e.to_string()),
    };
    html.push_str(&render_team_table(progression));
    html
}

// ── POST /api/admin/games/reset ────────────────────────────────────

/// Handle POST /api/admin/games/reset
/// Clears every game's completion. Teams and the selection are kept.
pub fn handle_reset_games_post<S: Store>(
    progression: &mut Progression<S>,
    active: &mut Option<MiniGameSession>,
    is_admin: bool,
) -> String {
    if !is_admin {
        return forbidden();
    }
    progression.reset_games();
    *active = None;
    notice_fragment("All games have been reset.")
}

fn render_team_table<S: Store>(progression: &Progression<S>) -> String {
    let code_len = progression.game_count();
    let mut html = String::with_capacity(4096);

    html.push_str(&format!(
        r##"<form class="flex gap-2 mb-4" hx-post="/api/admin/teams" hx-target="#admin-teams" hx-swap="innerHTML"><input type="hidden" name="action" value="add"><input class="bg-gray-900 border border-gray-700 text-white rounded px-2" name="name" placeholder="Team Name" required><input class="bg-gray-900 border border-gray-700 font-mono text-white rounded px-2" name="code" placeholder="{len}-digit code" maxlength="{len}" pattern="[0-9]{{{len}}}" required><button class="bg-purple-500 text-white rounded px-3 py-1" type="submit">Add Team</button></form>"##,
        len = code_len
    ));

    html.push_str(r#"<table class="w-full border border-gray-800">"#);
    html.push_str(r#"<thead class="bg-gray-900"><tr><th class="text-white text-left">Team Name</th><th class="text-white text-left">Team Code</th><th class="text-white text-right">Actions</th></tr></thead><tbody>"#);

    if progression.teams().is_empty() {
        html.push_str(r#"<tr><td colspan="3" class="text-center text-gray-500">No teams found. Add a team to get started.</td></tr>"#);
    }
    for team in progression.teams() {
        let id = escape_html(team.id.as_str());
        let name = escape_html(&team.name);
        let code = escape_html(&team.code);
        html.push_str(r#"<tr class="border-gray-800">"#);
        html.push_str(&format!(
            r##"<td colspan="2"><form class="flex gap-2" hx-post="/api/admin/teams" hx-target="#admin-teams" hx-swap="innerHTML"><input type="hidden" name="action" value="update"><input type="hidden" name="id" value="{id}"><input class="bg-transparent font-medium text-white" name="name" value="{name}" required><input class="bg-transparent font-mono text-cyan-400" name="code" value="{code}" maxlength="{len}" pattern="[0-9]{{{len}}}" required><button class="text-cyan-400" type="submit">Save</button></form></td>"##,
            id = id,
            name = name,
            code = code,
            len = code_len
        ));
        html.push_str(&format!(
            r##"<td class="text-right"><button class="text-red-500" hx-post="/api/admin/teams" hx-vals='{{"action":"delete","id":"{}"}}' hx-confirm="Are you sure you want to delete {}? This action cannot be undone." hx-target="#admin-teams" hx-swap="innerHTML">Delete</button></td>"##,
            id, name
        ));
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HuntConfig;
    use crate::hunt::store::MemoryStore;

    fn fresh() -> Progression<MemoryStore> {
        Progression::seeded(HuntConfig::default(), MemoryStore::new())
    }

    #[test]
    fn login_with_reference_credentials() {
        let mut admin = false;
        let creds = AdminCredentials::default();
        let html = handle_login_post(&creds, &mut admin, "username=admin&password=password123");
        assert!(html.contains("Logged in"));
        assert!(admin);

        handle_logout_post(&mut admin);
        assert!(!admin);
    }

    #[test]
    fn login_rejects_wrong_password() {
        let mut admin = false;
        let creds = AdminCredentials::default();
        let html = handle_login_post(&creds, &mut admin, "username=admin&password=nope");
        assert!(html.contains("Invalid credentials"));
        assert!(!admin);
    }

    #[test]
    fn admin_routes_require_login() {
        let mut p = fresh();
        assert!(handle_teams_get(&p, false).contains("403"));
        assert!(handle_teams_post(&mut p, false, "action=add&name=X&code=111111").contains("403"));
        assert!(handle_reset_games_post(&mut p, &mut None, false).contains("403"));
        assert_eq!(p.teams().len(), 4);
    }

    #[test]
    fn add_team_renders_table() {
        let mut p = fresh();
        let html = handle_teams_post(&mut p, true, "action=add&name=Team+E&code=555555");
        assert!(html.contains("Team E has been added"));
        assert!(html.contains("555555"));
        assert_eq!(p.teams().len(), 5);
    }

    #[test]
    fn add_team_with_short_code_fails() {
        let mut p = fresh();
        let html = handle_teams_post(&mut p, true, "action=add&name=Team+E&code=12345");
        assert!(html.contains("Code must be exactly 6 digits"));
        assert_eq!(p.teams().len(), 4);
    }

    #[test]
    fn update_and_delete_team() {
        let mut p = fresh();
        let html = handle_teams_post(&mut p, true, "action=update&id=1&name=Alpha");
        assert!(html.contains("Alpha has been updated"));
        assert_eq!(p.team(&"1".into()).unwrap().code, "123456");

        let html = handle_teams_post(&mut p, true, "action=delete&id=1");
        assert!(html.contains("Alpha has been removed"));
        assert!(p.team(&"1".into()).is_none());
    }

    #[test]
    fn delete_unknown_team_reports_not_found() {
        let mut p = fresh();
        let html = handle_teams_post(&mut p, true, "action=delete&id=nonexistent");
        assert!(html.contains("not found"));
        assert_eq!(p.teams().len(), 4);
    }

    #[test]
    fn padded_code_is_rejected() {
        let mut p = fresh();
        let html = handle_teams_post(&mut p, true, "action=add&name=Team+E&code=+123456+");
        assert!(html.contains("Code must be exactly 6 digits"));
        assert_eq!(p.teams().len(), 4);

        let html = handle_teams_post(&mut p, true, "action=update&id=1&code=%20123456");
        assert!(html.contains("Code must be exactly 6 digits"));
    }

    #[test]
    fn table_offers_add_and_edit_forms() {
        let html = handle_teams_get(&fresh(), true);
        assert_eq!(html.matches(r#"name="action" value="add""#).count(), 1);
        assert_eq!(html.matches(r#"name="action" value="update""#).count(), 4);
        assert!(html.contains(r#"name="id" value="3""#));
        assert!(html.contains(r#"name="code" value="901234""#));
        assert!(html.contains(r#"pattern="[0-9]{6}""#));
    }

    #[test]
    fn update_without_id() {
        let html = handle_teams_post(&mut fresh(), true, "action=update&name=X");
        assert!(html.contains("Missing id parameter"));
    }

    #[test]
    fn reset_games_keeps_selection() {
        let mut p = fresh();
        p.select_team(&"2".into()).unwrap();
        p.complete_game(1, '7');
        let html = handle_reset_games_post(&mut p, &mut None, true);
        assert!(html.contains("All games have been reset"));
        assert_eq!(p.completed_count(), 0);
        assert_eq!(p.selected_team().unwrap().name, "Team B");
    }
}
