//! `/api/games*`, `/api/progress*`, and `/api/victory` routes: the
//! player's side of the hunt.
//!
//! The active mini-game session is owned by the server handle and passed
//! in, so the win guard survives across requests from the same tab.

use crate::hunt::minigame::{MiniGameSession, WinReport};
use crate::hunt::progression::{Phase, Progression};
use crate::hunt::roster::{Completion, Difficulty, Game};
use crate::hunt::store::Store;
use crate::routes::util::{
    error_fragment, escape_html, get_param, notice_fragment, parse_form_body, parse_query,
};

fn parse_game_id(params: &[(String, String)]) -> Option<u32> {
    get_param(params, "game").and_then(|s| s.trim().parse().ok())
}

// ── GET /api/games ─────────────────────────────────────────────────

/// Handle GET /api/games
/// Returns the game hub: team header, code progress, and one card per game.
pub fn handle_hub_get<S: Store>(progression: &Progression<S>) -> String {
    let Some(team) = progression.selected_team() else {
        return render_select_prompt();
    };

    let mut html = String::with_capacity(4096);
    html.push_str(&format!(
        r#"<header class="flex justify-between items-center mb-6"><h1 class="text-2xl font-bold text-white"><span class="text-purple-400">{}</span> - {}-Digit Challenge</h1>"#,
        escape_html(&team.name),
        progression.game_count()
    ));
    html.push_str(
        r##"<button class="border border-red-600 text-red-600 rounded px-3 py-1" hx-post="/api/progress/reset" hx-confirm="Are you sure you want to reset your progress?" hx-target="#hunt" hx-swap="innerHTML">Reset Progress</button></header>"##,
    );

    if progression.phase() == Phase::Won {
        html.push_str(
            r##"<div class="text-center mb-6"><button class="bg-cyan-400 text-black rounded px-4 py-2 font-bold" hx-get="/api/victory" hx-target="#hunt" hx-swap="innerHTML">All digits found! Claim your victory</button></div>"##,
        );
    }

    html.push_str(&render_progress(progression));
    html.push_str(r#"<h2 class="text-2xl font-bold my-6 text-white">Available Games</h2>"#);
    html.push_str(r#"<div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-6">"#);
    for game in progression.games() {
        html.push_str(&render_game_card(game));
    }
    html.push_str("</div>");
    html
}

fn render_select_prompt() -> String {
    r##"<div class="text-center text-gray-300"><p class="mb-4">Select a team to start the hunt.</p><button class="bg-purple-500 text-white rounded px-4 py-2" hx-get="/api/teams" hx-target="#team-list" hx-swap="innerHTML">Choose Team</button></div>"##
        .to_string()
}

fn render_game_card(game: &Game) -> String {
    let (badge_bg, badge_text) = match game.difficulty {
        Difficulty::Easy => ("bg-emerald-900", "text-emerald-300"),
        Difficulty::Medium => ("bg-yellow-900", "text-yellow-300"),
        Difficulty::Hard => ("bg-red-900", "text-red-300"),
    };

    let mut html = String::with_capacity(768);
    html.push_str(r#"<div class="border border-gray-800 rounded-lg p-4 bg-gray-900">"#);
    html.push_str(&format!(
        r#"<div class="flex justify-between"><h3 class="text-lg font-bold text-white">{}</h3><span class="text-xs rounded px-2 py-0.5 {} {}">{}</span></div>"#,
        escape_html(&game.title),
        badge_bg,
        badge_text,
        game.difficulty.as_str()
    ));
    html.push_str(&format!(
        r#"<p class="text-gray-400 text-sm my-2">{}</p>"#,
        escape_html(&game.description)
    ));
    match game.digit {
        Some(digit) if game.completed => {
            html.push_str(&format!(
                r#"<p class="text-cyan-400 font-bold">Completed - digit <span class="text-2xl">{}</span></p>"#,
                escape_html(&digit.to_string())
            ));
        }
        _ => {
            html.push_str(&format!(
                r##"<button class="bg-purple-500 text-white rounded px-3 py-1" hx-post="/api/games/launch" hx-vals='{{"game":"{}"}}' hx-target="#hunt" hx-swap="innerHTML">Play</button>"##,
                game.id
            ));
        }
    }
    html.push_str("</div>");
    html
}

// ── GET /api/games/completed ───────────────────────────────────────

/// Handle GET /api/games/completed?game={id}
/// Returns `true` or `false`. Unknown or missing ids read as `false`.
pub fn handle_completed_get<S: Store>(progression: &Progression<S>, query: &str) -> String {
    let params = parse_query(query);
    let completed = parse_game_id(&params).is_some_and(|id| progression.is_completed(id));
    completed.to_string()
}

// ── GET /api/progress ──────────────────────────────────────────────

/// Handle GET /api/progress
/// Returns the code progress panel for the selected team.
pub fn handle_progress_get<S: Store>(progression: &Progression<S>) -> String {
    if progression.selected_team().is_none() {
        return render_select_prompt();
    }
    render_progress(progression)
}

fn render_progress<S: Store>(progression: &Progression<S>) -> String {
    let total = progression.game_count();
    let completed = progression.completed_count();
    let remaining = progression.remaining();
    let percent = if total == 0 { 0 } else { completed * 100 / total };
    let team_name = progression
        .selected_team()
        .map(|t| escape_html(&t.name))
        .unwrap_or_default();

    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div class="border border-gray-800 rounded-lg bg-gray-900 p-4">"#);
    html.push_str(r#"<p class="text-xl text-purple-400">Team Code Progress</p>"#);
    html.push_str(&format!(
        r#"<p class="text-gray-400">{} | {} of {} Games Completed</p>"#,
        team_name, completed, total
    ));
    html.push_str(&format!(
        r#"<div class="w-full bg-gray-800 rounded-full h-2.5 my-4"><div class="bg-purple-500 h-2.5 rounded-full" style="width: {}%"></div></div>"#,
        percent
    ));

    html.push_str(&format!(
        r#"<div class="grid gap-2 mb-4" style="grid-template-columns: repeat({}, minmax(0, 1fr))">"#,
        total.max(1)
    ));
    for digit in progression.collected_digits() {
        match digit {
            Some(d) => html.push_str(&format!(
                r#"<div class="code-digit revealed border-2 border-cyan-400 text-cyan-400 text-2xl font-bold text-center rounded">{}</div>"#,
                escape_html(&d.to_string())
            )),
            None => html.push_str(
                r#"<div class="code-digit border-2 border-gray-700 text-gray-700 text-2xl font-bold text-center rounded">?</div>"#,
            ),
        }
    }
    html.push_str("</div>");

    let message = if remaining > 0 {
        format!(
            "Complete {} more game{} to reveal your team code!",
            remaining,
            if remaining > 1 { "s" } else { "" }
        )
    } else {
        "Team code complete! Head to the victory page!".to_string()
    };
    html.push_str(&format!(
        r#"<p class="text-center text-gray-400">{}</p>"#,
        message
    ));
    html.push_str("</div>");
    html
}

// ── POST /api/games/launch ─────────────────────────────────────────

/// Handle POST /api/games/launch
/// Body: game={id}
/// Starts a mini-game session, replacing any session still in progress.
pub fn handle_launch_post<S: Store>(
    progression: &Progression<S>,
    active: &mut Option<MiniGameSession>,
    body: &str,
) -> String {
    let params = parse_form_body(body);
    let Some(game_id) = parse_game_id(&params) else {
        return error_fragment("Missing or invalid game parameter");
    };

    match MiniGameSession::launch(progression, game_id) {
        Ok(session) => {
            let html = render_game_stage(progression, &session);
            *active = Some(session);
            html
        }
        Err(e) => error_fragment(&e.to_string()),
    }
}

fn render_game_stage<S: Store>(progression: &Progression<S>, session: &MiniGameSession) -> String {
    let title = progression
        .game(session.game_id())
        .map(|g| escape_html(&g.title))
        .unwrap_or_default();
    format!(
        r#"<div class="mini-game" data-game="{id}" data-kind="{kind}"><h2 class="text-2xl font-bold text-cyan-400 mb-4">{title}</h2><div id="mini-game-stage"></div></div>"#,
        id = session.game_id(),
        kind = session.kind().slug(),
        title = title
    )
}

// ── POST /api/games/win ────────────────────────────────────────────

/// Handle POST /api/games/win
/// Body: game={id} (optional; must match the active session when given)
/// The mini-game's `onWin` signal. Reveals the digit for the active game.
pub fn handle_win_post<S: Store>(
    progression: &mut Progression<S>,
    active: &mut Option<MiniGameSession>,
    body: &str,
) -> String {
    let params = parse_form_body(body);
    let Some(session) = active.as_mut() else {
        return error_fragment("No game in progress");
    };
    if let Some(game_id) = parse_game_id(&params) {
        if game_id != session.game_id() {
            return error_fragment("Win reported for a game that is not in progress");
        }
    }

    match session.on_win(progression) {
        Ok(WinReport::Revealed { digit, hunt_won }) => {
            let mut html = String::with_capacity(512);
            html.push_str(r#"<div class="text-center">"#);
            html.push_str(r#"<p class="text-3xl font-bold text-cyan-400">Game Complete!</p>"#);
            html.push_str(
                r#"<p class="text-gray-300">You've discovered a digit from your team code.</p>"#,
            );
            html.push_str(&format!(
                r#"<p class="revealed-digit text-7xl font-bold text-cyan-400 my-6">{}</p>"#,
                escape_html(&digit.to_string())
            ));
            let (target, label) = if hunt_won {
                ("/api/victory", "See your victory")
            } else {
                ("/api/games", "Continue")
            };
            html.push_str(&format!(
                r##"<button class="bg-cyan-400 text-black rounded px-4 py-2 w-full" hx-get="{}" hx-target="#hunt" hx-swap="innerHTML">{}</button>"##,
                target, label
            ));
            html.push_str("</div>");
            html
        }
        Ok(WinReport::AlreadyReported) => {
            notice_fragment("This game's digit has already been revealed.")
        }
        Err(e) => error_fragment(&e.to_string()),
    }
}

// ── POST /api/games/restart ────────────────────────────────────────

/// Handle POST /api/games/restart
/// The mini-game's `onRestart` signal. Carries no digit.
pub fn handle_restart_post(active: &mut Option<MiniGameSession>) -> String {
    let Some(session) = active.as_mut() else {
        return error_fragment("No game in progress");
    };
    if session.on_restart() {
        format!(
            r#"<span class="text-gray-400">Attempt {} started.</span>"#,
            session.restarts() + 1
        )
    } else {
        notice_fragment("This game is already won.")
    }
}

// ── POST /api/games/complete ───────────────────────────────────────

/// Handle POST /api/games/complete
/// Body: game={id}&digit={char}
/// Records a caller-supplied digit without going through a session.
pub fn handle_complete_post<S: Store>(progression: &mut Progression<S>, body: &str) -> String {
    let params = parse_form_body(body);
    let Some(game_id) = parse_game_id(&params) else {
        return error_fragment("Missing or invalid game parameter");
    };
    let mut chars = get_param(&params, "digit").unwrap_or("").chars();
    let digit = match (chars.next(), chars.next()) {
        (Some(d), None) => d,
        _ => return error_fragment("Digit must be a single character"),
    };

    match progression.complete_game(game_id, digit) {
        Completion::Recorded | Completion::AlreadyCompleted => render_progress(progression),
        Completion::UnknownGame => error_fragment(&format!("Unknown game {}", game_id)),
    }
}

// ── GET /api/victory ───────────────────────────────────────────────

/// Handle GET /api/victory
/// Returns the victory panel once every game is completed.
pub fn handle_victory_get<S: Store>(progression: &Progression<S>) -> String {
    let Some(team) = progression.selected_team() else {
        return render_select_prompt();
    };
    if !progression.has_won() {
        return format!(
            r##"<div class="text-center text-gray-300"><p class="mb-4">Not yet! {} game{} left.</p><button class="bg-purple-500 text-white rounded px-4 py-2" hx-get="/api/games" hx-target="#hunt" hx-swap="innerHTML">Back to Games</button></div>"##,
            progression.remaining(),
            if progression.remaining() == 1 { "" } else { "s" }
        );
    }

    let collected: String = progression.collected_digits().into_iter().flatten().collect();
    let name = escape_html(&team.name);
    let shout = escape_html(&team.name.to_uppercase());

    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div class="text-center">"#);
    html.push_str(r#"<h1 class="text-5xl font-bold text-cyan-400 mb-4">VICTORY!</h1>"#);
    html.push_str(&format!(
        r#"<h2 class="text-3xl font-bold text-pink-400 mb-8">{} TRIUMPHS!</h2>"#,
        shout
    ));
    html.push_str(&format!(
        r#"<p class="text-gray-300">Your Collected Code:</p><p class="collected-code font-mono text-4xl text-cyan-400 mb-6">{}</p>"#,
        escape_html(&collected)
    ));
    html.push_str(&format!(
        r#"<p class="text-gray-300">The {} Code:</p><p class="team-code font-mono text-4xl text-purple-400 mb-6">{}</p>"#,
        name,
        escape_html(&team.code)
    ));
    html.push_str(
        r##"<button class="bg-purple-500 text-white rounded px-4 py-2" hx-post="/api/progress/reset" hx-target="#hunt" hx-swap="innerHTML">Play Again</button>"##,
    );
    html.push_str("</div>");
    html
}

// ── POST /api/progress/reset ───────────────────────────────────────

/// Handle POST /api/progress/reset
/// Wipes game progress and the team selection, and drops any session.
pub fn handle_reset_progress_post<S: Store>(
    progression: &mut Progression<S>,
    active: &mut Option<MiniGameSession>,
) -> String {
    progression.reset_progress();
    *active = None;
    let mut html = notice_fragment("Your game progress has been reset.");
    html.push_str(&render_select_prompt());
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HuntConfig;
    use crate::hunt::store::MemoryStore;

    fn selected(team: &str) -> Progression<MemoryStore> {
        let mut p = Progression::seeded(HuntConfig::default(), MemoryStore::new());
        p.select_team(&team.into()).unwrap();
        p
    }

    #[test]
    fn hub_without_team_prompts_selection() {
        let p = Progression::seeded(HuntConfig::default(), MemoryStore::new());
        let html = handle_hub_get(&p);
        assert!(html.contains("Select a team"));
    }

    #[test]
    fn hub_lists_all_games() {
        let html = handle_hub_get(&selected("1"));
        assert!(html.contains("Team A"));
        assert!(html.contains("6-Digit Challenge"));
        assert!(html.contains("Memory Match"));
        assert!(html.contains("Code Breaker"));
        assert_eq!(html.matches("/api/games/launch").count(), 6);
    }

    #[test]
    fn completed_probe() {
        let mut p = selected("1");
        p.complete_game(4, '4');
        assert_eq!(handle_completed_get(&p, "?game=4"), "true");
        assert_eq!(handle_completed_get(&p, "?game=3"), "false");
        assert_eq!(handle_completed_get(&p, "?game=99"), "false");
        assert_eq!(handle_completed_get(&p, ""), "false");
    }

    #[test]
    fn progress_counts_and_masks_digits() {
        let mut p = selected("1");
        p.complete_game(1, '1');
        let html = handle_progress_get(&p);
        assert!(html.contains("1 of 6 Games Completed"));
        assert!(html.contains("Complete 5 more games"));
        assert_eq!(html.matches(">?</div>").count(), 5);
    }

    #[test]
    fn progress_singular_remaining() {
        let mut p = selected("1");
        for (game, digit) in (1..=5).zip("12345".chars()) {
            p.complete_game(game, digit);
        }
        let html = handle_progress_get(&p);
        assert!(html.contains("Complete 1 more game to reveal"));
    }

    #[test]
    fn launch_then_win_reveals_digit() {
        let mut p = selected("2");
        let mut active = None;
        let html = handle_launch_post(&p, &mut active, "game=2");
        assert!(html.contains("quick-math"));

        let html = handle_win_post(&mut p, &mut active, "game=2");
        assert!(html.contains("Game Complete!"));
        assert!(html.contains(">8</p>"));
        assert!(p.is_completed(2));

        let again = handle_win_post(&mut p, &mut active, "");
        assert!(again.contains("already been revealed"));
        assert_eq!(p.completed_count(), 1);
    }

    #[test]
    fn win_without_session_is_rejected() {
        let mut p = selected("1");
        let html = handle_win_post(&mut p, &mut None, "game=1");
        assert!(html.contains("No game in progress"));
        assert_eq!(p.completed_count(), 0);
    }

    #[test]
    fn win_for_other_game_is_rejected() {
        let mut p = selected("1");
        let mut active = None;
        handle_launch_post(&p, &mut active, "game=1");
        let html = handle_win_post(&mut p, &mut active, "game=3");
        assert!(html.contains("not in progress"));
        assert!(!p.is_completed(3));
    }

    #[test]
    fn launch_without_team_fails() {
        let p = Progression::seeded(HuntConfig::default(), MemoryStore::new());
        let mut active = None;
        let html = handle_launch_post(&p, &mut active, "game=1");
        assert!(html.contains("no team selected"));
        assert!(active.is_none());
    }

    #[test]
    fn restart_discards_attempt() {
        let p = selected("1");
        let mut active = None;
        handle_launch_post(&p, &mut active, "game=5");
        let html = handle_restart_post(&mut active);
        assert!(html.contains("Attempt 2 started"));
        assert!(!p.is_completed(5));
    }

    #[test]
    fn complete_post_validates_digit() {
        let mut p = selected("1");
        assert!(handle_complete_post(&mut p, "game=1&digit=12").contains("single character"));
        assert!(handle_complete_post(&mut p, "game=x&digit=1").contains("invalid game"));
        assert!(handle_complete_post(&mut p, "game=9&digit=1").contains("Unknown game 9"));
        let html = handle_complete_post(&mut p, "game=1&digit=1");
        assert!(html.contains("1 of 6 Games Completed"));
    }

    #[test]
    fn victory_requires_all_games() {
        let mut p = selected("1");
        assert!(handle_victory_get(&p).contains("Not yet! 6 games left."));
        for (game, digit) in (1..=6).zip("123456".chars()) {
            p.complete_game(game, digit);
        }
        let html = handle_victory_get(&p);
        assert!(html.contains("VICTORY!"));
        assert!(html.contains("TEAM A TRIUMPHS!"));
        assert!(html.contains(r#"collected-code font-mono text-4xl text-cyan-400 mb-6">123456<"#));
    }

    #[test]
    fn reset_progress_drops_session_and_selection() {
        let mut p = selected("1");
        let mut active = None;
        handle_launch_post(&p, &mut active, "game=1");
        let html = handle_reset_progress_post(&mut p, &mut active);
        assert!(html.contains("has been reset"));
        assert!(active.is_none());
        assert!(p.selected_team().is_none());
    }
}
