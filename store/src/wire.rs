//! JSON wire shapes: the durable snapshot and the client-facing state view.
//!
//! Both shapes share one set serializer, so persisted and transmitted sets
//! look identical: paths go out through the [`PathAliaser`] collaborator and
//! come back in through it on load.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use markset_types::{Marker, MarkerKind, MarkerSet, PathAliaser, SetName};

use crate::store::MarkerStore;

/// Structural failure of a snapshot document.
///
/// Raised only when the top-level shape itself is unreadable; malformed
/// individual entries are dropped instead (see [`LoadReport`]).
#[derive(Debug, thiserror::Error)]
#[error("malformed snapshot document: {source}")]
pub struct SnapshotError {
    #[from]
    source: serde_json::Error,
}

/// Outcome of a best-effort snapshot load: what survived, what was dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Sets successfully rebuilt.
    pub sets_loaded: usize,
    /// Set entries dropped as malformed.
    pub sets_dropped: usize,
    /// Marker entries dropped as malformed (within otherwise-valid sets).
    pub markers_dropped: usize,
}

impl LoadReport {
    #[must_use]
    pub fn dropped_any(&self) -> bool {
        self.sets_dropped > 0 || self.markers_dropped > 0
    }
}

/// Client-facing view of the store, pushed on every change.
///
/// Both fields are null when the store is empty. When non-empty, `names`
/// always lists every set name in store order; `markers` is present only
/// when the active selection resolves to an existing set. The client can
/// always list available sets but only renders markers for a genuinely
/// resolvable active set.
#[derive(Debug, Clone, Serialize)]
pub struct MarkersState {
    pub names: Option<Vec<String>>,
    pub markers: Option<Value>,
}

impl MarkersState {
    /// The `{names, markers}` object embedded in client payloads.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "names": self.names.clone(),
            "markers": self.markers.clone(),
        })
    }
}

#[derive(Deserialize)]
struct SnapshotDoc {
    active_set: String,
    sets: Vec<Value>,
}

#[derive(Deserialize)]
struct SetDoc {
    name: SetName,
    #[serde(default)]
    base_path: Option<String>,
    markers: Vec<Value>,
}

#[derive(Deserialize)]
struct MarkerDoc {
    #[serde(rename = "type")]
    kind: i64,
    path: String,
    line: u32,
    column: u32,
    message: String,
    show_error_list: bool,
}

impl MarkerStore {
    /// Full persisted form: `{active_set, sets}` with every set serialized.
    ///
    /// Used only for durable persistence; an empty selection is written as
    /// the empty string.
    #[must_use]
    pub fn snapshot(&self, aliaser: &dyn PathAliaser) -> Value {
        let sets: Vec<Value> = self
            .sets()
            .iter()
            .map(|set| set_to_json(set, aliaser))
            .collect();

        json!({
            "active_set": self.active_name().map_or("", SetName::as_str),
            "sets": sets,
        })
    }

    /// Client-facing form with the names/markers null asymmetry.
    #[must_use]
    pub fn state_view(&self, aliaser: &dyn PathAliaser) -> MarkersState {
        let mut state = MarkersState {
            names: None,
            markers: None,
        };

        if !self.is_empty() {
            state.names = Some(
                self.sets()
                    .iter()
                    .map(|set| set.name().as_str().to_string())
                    .collect(),
            );
            state.markers = self.active_set().map(|set| set_to_json(set, aliaser));
        }

        state
    }

    /// Rebuild the store from a persisted snapshot.
    ///
    /// The top-level shape (`active_set` string, `sets` array) is required;
    /// if it is unreadable the load fails and the store is left unmodified.
    /// Individual set and marker entries are parsed best-effort: a malformed
    /// entry is dropped with a warning and processing continues.
    pub fn load_snapshot(
        &mut self,
        snapshot: &Value,
        aliaser: &dyn PathAliaser,
    ) -> Result<LoadReport, SnapshotError> {
        let doc: SnapshotDoc = serde_json::from_value(snapshot.clone())?;

        let mut report = LoadReport::default();
        let mut sets: Vec<MarkerSet> = Vec::with_capacity(doc.sets.len());

        for entry in doc.sets {
            let Some(set) = parse_set(entry, aliaser, &mut report) else {
                report.sets_dropped += 1;
                continue;
            };

            // Uniqueness by name holds even for hand-edited files:
            // a duplicate entry replaces the earlier one, last write wins.
            match sets.iter().position(|s| s.name() == set.name()) {
                Some(index) => {
                    warn!(name = set.name().as_str(), "duplicate marker set in snapshot");
                    sets[index] = set;
                }
                None => sets.push(set),
            }
        }

        report.sets_loaded = sets.len();

        // Empty string means no selection; an unknown name is tolerated and
        // read as "no active set" by the resolving accessors.
        let active = SetName::new(doc.active_set).ok();
        self.set_state(active, sets);

        Ok(report)
    }
}

/// Serialize one set; shared by the snapshot and the client state view.
fn set_to_json(set: &MarkerSet, aliaser: &dyn PathAliaser) -> Value {
    let base_path = set.base_path().map(|path| {
        let mut aliased = aliaser.alias(path);
        // Trailing "/" so markers shortened against it don't re-display the
        // directory prefix.
        if !aliased.ends_with('/') {
            aliased.push('/');
        }
        aliased
    });

    let markers: Vec<Value> = set
        .markers()
        .iter()
        .map(|marker| marker_to_json(marker, aliaser))
        .collect();

    json!({
        "name": set.name().as_str(),
        "base_path": base_path,
        "markers": markers,
    })
}

fn marker_to_json(marker: &Marker, aliaser: &dyn PathAliaser) -> Value {
    json!({
        "type": marker.kind().wire_value(),
        "path": aliaser.alias(marker.path()),
        "line": marker.line(),
        "column": marker.column(),
        "message": marker.message(),
        "show_error_list": marker.show_in_error_list(),
    })
}

fn parse_set(entry: Value, aliaser: &dyn PathAliaser, report: &mut LoadReport) -> Option<MarkerSet> {
    let doc: SetDoc = match serde_json::from_value(entry) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("dropping malformed marker set entry: {err}");
            return None;
        }
    };

    let mut markers = Vec::with_capacity(doc.markers.len());
    for entry in doc.markers {
        match parse_marker(entry, aliaser) {
            Some(marker) => markers.push(marker),
            None => report.markers_dropped += 1,
        }
    }

    let base_path = doc
        .base_path
        .filter(|path| !path.is_empty())
        .map(|path| aliaser.resolve(&path));

    Some(MarkerSet::new(doc.name, base_path, markers))
}

fn parse_marker(entry: Value, aliaser: &dyn PathAliaser) -> Option<Marker> {
    let doc: MarkerDoc = match serde_json::from_value(entry) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("dropping malformed marker entry: {err}");
            return None;
        }
    };

    let Some(kind) = MarkerKind::from_wire(doc.kind) else {
        warn!(kind = doc.kind, "dropping marker with unknown kind");
        return None;
    };

    Some(Marker::new(
        kind,
        aliaser.resolve(&doc.path),
        doc.line,
        doc.column,
        doc.message,
        doc.show_error_list,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use markset_types::NoAlias;
    use std::path::PathBuf;

    fn make_marker(message: &str) -> Marker {
        Marker::new(
            MarkerKind::Error,
            PathBuf::from("/a.ts"),
            10,
            1,
            message.to_string(),
            true,
        )
    }

    fn make_set(name: &str, base_path: Option<&str>, markers: Vec<Marker>) -> MarkerSet {
        MarkerSet::new(
            SetName::new(name).unwrap(),
            base_path.map(PathBuf::from),
            markers,
        )
    }

    #[test]
    fn test_snapshot_shape() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", Some("/proj"), vec![make_marker("bad token")]));

        let snapshot = store.snapshot(&NoAlias);

        assert_eq!(snapshot["active_set"], "Lint");
        assert_eq!(snapshot["sets"].as_array().unwrap().len(), 1);
        let set = &snapshot["sets"][0];
        assert_eq!(set["name"], "Lint");
        assert_eq!(set["base_path"], "/proj/");
        let marker = &set["markers"][0];
        assert_eq!(marker["type"], 0);
        assert_eq!(marker["path"], "/a.ts");
        assert_eq!(marker["line"], 10);
        assert_eq!(marker["column"], 1);
        assert_eq!(marker["message"], "bad token");
        assert_eq!(marker["show_error_list"], true);
    }

    #[test]
    fn test_snapshot_empty_store() {
        let store = MarkerStore::new();
        let snapshot = store.snapshot(&NoAlias);
        assert_eq!(snapshot["active_set"], "");
        assert_eq!(snapshot["sets"], json!([]));
    }

    #[test]
    fn test_missing_base_path_serializes_as_null() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", None, Vec::new()));

        let snapshot = store.snapshot(&NoAlias);
        assert!(snapshot["sets"][0]["base_path"].is_null());
    }

    #[test]
    fn test_base_path_trailing_slash_not_doubled() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", Some("/proj/"), Vec::new()));

        let snapshot = store.snapshot(&NoAlias);
        assert_eq!(snapshot["sets"][0]["base_path"], "/proj/");
    }

    #[test]
    fn test_round_trip_reproduces_store() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", Some("/proj"), vec![make_marker("m1")]));
        store.publish(make_set("Build", None, vec![make_marker("m2"), make_marker("m3")]));
        store.activate("Lint");

        let snapshot = store.snapshot(&NoAlias);

        let mut restored = MarkerStore::new();
        let report = restored.load_snapshot(&snapshot, &NoAlias).unwrap();

        assert_eq!(report.sets_loaded, 2);
        assert!(!report.dropped_any());
        let names: Vec<&str> = restored.sets().iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, ["Lint", "Build"]);
        assert_eq!(restored.active_name().unwrap().as_str(), "Lint");
        assert_eq!(restored.sets()[1].markers().len(), 2);
        assert_eq!(restored.sets()[0].markers()[0].message(), "m1");
        assert_eq!(restored.sets()[0].base_path(), Some(PathBuf::from("/proj/").as_path()));
    }

    #[test]
    fn test_load_empty_active_means_no_selection() {
        let snapshot = json!({"active_set": "", "sets": []});
        let mut store = MarkerStore::new();
        store.load_snapshot(&snapshot, &NoAlias).unwrap();
        assert!(store.active_name().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_missing_top_level_field_fails_and_leaves_store_untouched() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Keep", None, Vec::new()));

        let snapshot = json!({"sets": []});
        assert!(store.load_snapshot(&snapshot, &NoAlias).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.active_name().unwrap().as_str(), "Keep");
    }

    #[test]
    fn test_load_drops_malformed_marker_keeps_rest() {
        let snapshot = json!({
            "active_set": "Lint",
            "sets": [{
                "name": "Lint",
                "base_path": null,
                "markers": [
                    {"type": 0, "path": "/a.ts", "line": 10, "column": 1,
                     "message": "good", "show_error_list": true},
                    {"type": 0, "path": "/b.ts", "line": "not a number",
                     "column": 1, "message": "bad", "show_error_list": true},
                    {"type": 1, "path": "/c.ts", "line": 2, "column": 3,
                     "message": "also good", "show_error_list": false},
                ],
            }],
        });

        let mut store = MarkerStore::new();
        let report = store.load_snapshot(&snapshot, &NoAlias).unwrap();

        assert_eq!(report.sets_loaded, 1);
        assert_eq!(report.markers_dropped, 1);
        let markers = store.sets()[0].markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].message(), "good");
        assert_eq!(markers[1].message(), "also good");
    }

    #[test]
    fn test_load_drops_marker_with_unknown_kind() {
        let snapshot = json!({
            "active_set": "",
            "sets": [{
                "name": "Lint",
                "base_path": null,
                "markers": [
                    {"type": 42, "path": "/a.ts", "line": 1, "column": 1,
                     "message": "m", "show_error_list": false},
                ],
            }],
        });

        let mut store = MarkerStore::new();
        let report = store.load_snapshot(&snapshot, &NoAlias).unwrap();
        assert_eq!(report.markers_dropped, 1);
        assert!(store.sets()[0].is_empty());
    }

    #[test]
    fn test_load_drops_malformed_set_keeps_rest() {
        let snapshot = json!({
            "active_set": "B",
            "sets": [
                {"name": "", "base_path": null, "markers": []},
                {"name": "B", "base_path": null, "markers": []},
                "not even an object",
            ],
        });

        let mut store = MarkerStore::new();
        let report = store.load_snapshot(&snapshot, &NoAlias).unwrap();

        assert_eq!(report.sets_loaded, 1);
        assert_eq!(report.sets_dropped, 2);
        assert_eq!(store.sets()[0].name().as_str(), "B");
        assert_eq!(store.active_set().unwrap().name().as_str(), "B");
    }

    #[test]
    fn test_load_duplicate_set_names_last_wins() {
        let snapshot = json!({
            "active_set": "Lint",
            "sets": [
                {"name": "Lint", "base_path": null, "markers": [
                    {"type": 0, "path": "/old.ts", "line": 1, "column": 1,
                     "message": "old", "show_error_list": false},
                ]},
                {"name": "Lint", "base_path": null, "markers": []},
            ],
        });

        let mut store = MarkerStore::new();
        let report = store.load_snapshot(&snapshot, &NoAlias).unwrap();
        assert_eq!(report.sets_loaded, 1);
        assert!(store.sets()[0].is_empty());
    }

    #[test]
    fn test_state_view_empty_store_is_all_null() {
        let store = MarkerStore::new();
        let state = store.state_view(&NoAlias);
        assert!(state.names.is_none());
        assert!(state.markers.is_none());

        let value = serde_json::to_value(&state).unwrap();
        assert!(value["names"].is_null());
        assert!(value["markers"].is_null());
    }

    #[test]
    fn test_state_view_unresolved_active_lists_names_only() {
        let mut store = MarkerStore::new();
        store.publish(make_set("A", None, Vec::new()));
        store.publish(make_set("B", None, Vec::new()));
        store.set_active_unchecked(SetName::new("gone").unwrap());

        let state = store.state_view(&NoAlias);
        assert_eq!(state.names.unwrap(), ["A", "B"]);
        assert!(state.markers.is_none());
    }

    #[test]
    fn test_state_view_publish_scenario() {
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", None, vec![make_marker("bad token")]));

        let state = store.state_view(&NoAlias);
        assert_eq!(state.names.unwrap(), ["Lint"]);

        let markers = state.markers.unwrap();
        assert_eq!(markers["name"], "Lint");
        let marker = &markers["markers"][0];
        assert_eq!(marker["type"], 0);
        assert_eq!(marker["path"], "/a.ts");
        assert_eq!(marker["line"], 10);
        assert_eq!(marker["column"], 1);
        assert_eq!(marker["message"], "bad token");
        assert_eq!(marker["show_error_list"], true);
    }

    struct TildeAlias;

    impl PathAliaser for TildeAlias {
        fn alias(&self, path: &std::path::Path) -> String {
            let text = path.display().to_string();
            text.strip_prefix("/home/user")
                .map_or(text.clone(), |rest| format!("~{rest}"))
        }

        fn resolve(&self, aliased: &str) -> PathBuf {
            aliased
                .strip_prefix('~')
                .map_or_else(|| PathBuf::from(aliased), |rest| {
                    PathBuf::from(format!("/home/user{rest}"))
                })
        }
    }

    #[test]
    fn test_paths_go_through_the_aliaser() {
        let marker = Marker::new(
            MarkerKind::Warning,
            PathBuf::from("/home/user/proj/a.rs"),
            1,
            1,
            "m".to_string(),
            false,
        );
        let mut store = MarkerStore::new();
        store.publish(make_set("Lint", Some("/home/user/proj"), vec![marker]));

        let snapshot = store.snapshot(&TildeAlias);
        assert_eq!(snapshot["sets"][0]["base_path"], "~/proj/");
        assert_eq!(snapshot["sets"][0]["markers"][0]["path"], "~/proj/a.rs");

        let mut restored = MarkerStore::new();
        restored.load_snapshot(&snapshot, &TildeAlias).unwrap();
        assert_eq!(
            restored.sets()[0].markers()[0].path(),
            PathBuf::from("/home/user/proj/a.rs").as_path()
        );
    }
}
