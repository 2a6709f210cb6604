//! `/api/teams*` routes: player-facing team selection.

use crate::hunt::progression::Progression;
use crate::hunt::store::Store;
use crate::hunt::team::TeamId;
use crate::routes::util::{error_fragment, escape_html, get_param, parse_form_body};

// ── GET /api/teams ─────────────────────────────────────────────────

/// Handle GET /api/teams
/// Returns the team picker. The selected team is highlighted.
pub fn handle_list_get<S: Store>(progression: &Progression<S>) -> String {
    render_team_list(progression)
}

// ── POST /api/teams/select ─────────────────────────────────────────

/// Handle POST /api/teams/select
/// Body: team={id}
pub fn handle_select_post<S: Store>(progression: &mut Progression<S>, body: &str) -> String {
    let params = parse_form_body(body);
    let id = match get_param(&params, "team") {
        Some(id) if !id.is_empty() => TeamId::from(id),
        _ => return error_fragment("Missing team parameter"),
    };

    match progression.select_team(&id) {
        Ok(team) => {
            let mut html = format!(
                r#"<p class="text-center text-emerald-500 mb-2">You've joined {}.</p>"#,
                escape_html(&team.name)
            );
            html.push_str(&render_team_list(progression));
            html
        }
        Err(e) => error_fragment(&e.to_string()),
    }
}

fn render_team_list<S: Store>(progression: &Progression<S>) -> String {
    let teams = progression.teams();
    if teams.is_empty() {
        return r#"<p class="text-center text-gray-500">No teams available. Ask an administrator to add one.</p>"#
            .to_string();
    }

    let selected = progression.selected_team().map(|t| &t.id);
    let mut html = String::with_capacity(256 * teams.len());
    html.push_str(r#"<div class="grid grid-cols-1 md:grid-cols-2 gap-4">"#);
    for team in teams {
        let is_selected = selected == Some(&team.id);
        let border = if is_selected {
            "border-cyan-400 bg-cyan-950"
        } else {
            "border-gray-700 bg-gray-900"
        };
        html.push_str(&format!(
            r##"<button class="border rounded-lg p-4 text-left {}" hx-post="/api/teams/select" hx-vals='{{"team":"{}"}}' hx-target="#team-list" hx-swap="innerHTML">"##,
            border,
            escape_html(team.id.as_str())
        ));
        html.push_str(&format!(
            r#"<span class="text-lg font-bold text-white">{}</span>"#,
            escape_html(&team.name)
        ));
        if is_selected {
            html.push_str(r#" <span class="text-xs text-cyan-400">Selected</span>"#);
        }
        html.push_str("</button>");
    }
    html.push_str("</div>");
    html
}
