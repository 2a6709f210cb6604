//! `/api/state*` routes: persistence bridge, export, and import.

use crate::hunt::progression::Progression;
use crate::hunt::snapshot::Snapshot;
use crate::hunt::store::MemoryStore;
use crate::routes::util::{error_fragment, get_param, notice_fragment, parse_form_body};

// ── GET /api/state ─────────────────────────────────────────────────

/// Handle GET /api/state
/// Returns the full state as JSON, keyed like the persisted slices.
pub fn handle_state_get(progression: &Progression<MemoryStore>) -> String {
    progression.snapshot().to_json()
}

// ── POST /api/state/persist ────────────────────────────────────────

/// Handle POST /api/state/persist
/// Drains pending slice writes into a `<script>` that mirrors them into
/// `localStorage`. Empty when nothing changed.
pub fn handle_persist_post(progression: &mut Progression<MemoryStore>) -> String {
    let pending = progression.store_mut().take_pending();
    if pending.is_empty() {
        return String::new();
    }

    let mut html = String::from("<script>\n");
    for (key, value) in &pending {
        html.push_str(&format!(
            "localStorage.setItem({}, {});\n",
            js_string(key),
            js_string(value)
        ));
    }
    html.push_str("</script>");
    html
}

/// JSON string literal that is also safe inside an inline `<script>`.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}

// ── GET /api/state/export ──────────────────────────────────────────

/// Handle GET /api/state/export
/// Returns the snapshot as URL-safe base64 text.
pub fn handle_export_get(progression: &Progression<MemoryStore>) -> String {
    progression.export_snapshot()
}

// ── POST /api/state/import ─────────────────────────────────────────

/// Handle POST /api/state/import
/// Body: state={base64} or the raw base64 text.
pub fn handle_import_post(progression: &mut Progression<MemoryStore>, body: &str) -> String {
    let params = parse_form_body(body);
    let encoded = get_param(&params, "state").unwrap_or(body.trim());

    match Snapshot::decode(encoded).and_then(|snapshot| progression.import_snapshot(snapshot)) {
        Ok(()) => notice_fragment("Hunt data imported successfully"),
        Err(e) => error_fragment(&format!("Import failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HuntConfig;
    use crate::hunt::store::{Store, COMPLETED_GAMES_KEY, SELECTED_TEAM_KEY};

    fn fresh() -> Progression<MemoryStore> {
        Progression::seeded(HuntConfig::default(), MemoryStore::new())
    }

    #[test]
    fn state_json_has_every_slice() {
        let json = handle_state_get(&fresh());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["teams"].as_array().unwrap().len(), 4);
        assert!(value["selectedTeam"].is_null());
        assert_eq!(value["games"].as_array().unwrap().len(), 6);
        assert_eq!(value["completedGames"], 0);
    }

    #[test]
    fn persist_emits_set_item_and_drains() {
        let mut p = fresh();
        p.select_team(&"1".into()).unwrap();
        p.complete_game(1, '1');

        let html = handle_persist_post(&mut p);
        assert!(html.contains("localStorage.setItem"));
        assert!(html.contains(SELECTED_TEAM_KEY));
        assert!(html.contains(COMPLETED_GAMES_KEY));
        assert!(handle_persist_post(&mut p).is_empty());
    }

    #[test]
    fn persist_escapes_closing_tags() {
        let mut p = fresh();
        p.add_team("</script><b>", "111111").unwrap();
        let html = handle_persist_post(&mut p);
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn export_import_roundtrip() {
        let mut p = fresh();
        p.select_team(&"3".into()).unwrap();
        p.complete_game(2, '4');
        let exported = handle_export_get(&p);

        let mut q = fresh();
        let html = handle_import_post(&mut q, &format!("state={}", exported));
        assert!(html.contains("imported successfully"));
        assert_eq!(q.selected_team().unwrap().name, "Team C");
        assert_eq!(q.collected_digits()[1], Some('4'));
        assert_eq!(q.store().load(COMPLETED_GAMES_KEY).as_deref(), Some("1"));
    }

    #[test]
    fn import_accepts_raw_body() {
        let p = fresh();
        let mut q = fresh();
        q.add_team("Extra", "000000").unwrap();
        let html = handle_import_post(&mut q, &handle_export_get(&p));
        assert!(html.contains("imported successfully"));
        assert_eq!(q.teams().len(), 4);
    }

    #[test]
    fn import_garbage_fails() {
        let mut p = fresh();
        let html = handle_import_post(&mut p, "state=%%%");
        assert!(html.contains("Import failed"));
        assert_eq!(p.teams().len(), 4);
    }
}
