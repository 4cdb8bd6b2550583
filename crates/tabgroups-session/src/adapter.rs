//! Persistence Adapter
//!
//! Reads and writes the session record against durable storage and rebuilds
//! a `GroupStore` from it at startup. A corrupt or unreadable payload is
//! never allowed to block startup; it degrades to an empty record.

use std::collections::{HashMap, HashSet};

use tabgroups_groups::{GroupStore, Tab, TabId, WindowId};
use tabgroups_storage::Database;

use crate::error::SessionError;
use crate::record::SessionRecord;
use crate::Result;

/// Storage key the whole session record lives under.
const SESSION_KEY: &str = "session";

#[derive(Clone)]
pub struct PersistenceAdapter {
    db: Database,
}

impl PersistenceAdapter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load the persisted record. Never fails: a storage fault or corrupt
    /// payload yields an empty record and a warning.
    pub fn load(&self) -> SessionRecord {
        match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                SessionRecord::default()
            }
        }
    }

    fn try_load(&self) -> Result<SessionRecord> {
        let Some(payload) = self.db.get(SESSION_KEY)? else {
            return Ok(SessionRecord::default());
        };

        serde_json::from_str(&payload).map_err(|e| SessionError::CorruptRecord(e.to_string()))
    }

    /// Write the record atomically. Failures are the caller's retry concern;
    /// in-memory state stays the source of truth either way.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        self.db.set(SESSION_KEY, &payload)?;

        tracing::debug!(bytes = payload.len(), "Persisted session record");

        Ok(())
    }
}

/// One live tab considered for matching, claimed at most once.
struct Candidate {
    id: TabId,
    index: u32,
    key: String,
}

/// Rebuild a `GroupStore` from a persisted record and the currently open
/// tabs. Persisted proxies that match no open tab are dropped silently, as
/// are groups with no surviving member; live tabs nobody claims stay
/// ungrouped.
pub fn reconcile(record: &SessionRecord, live_tabs: &[Tab]) -> GroupStore {
    let mut store = GroupStore::new();
    for tab in live_tabs {
        store.upsert_tab(tab.clone());
    }

    // Live tabs by window, in strip order
    let mut candidates: HashMap<WindowId, Vec<Candidate>> = HashMap::new();
    for tab in live_tabs {
        candidates.entry(tab.window).or_default().push(Candidate {
            id: tab.id,
            index: tab.index,
            key: match_key(&tab.url),
        });
    }
    for tabs in candidates.values_mut() {
        tabs.sort_by_key(|c| c.index);
    }

    let mut claimed_windows: HashSet<WindowId> = HashSet::new();
    let mut claimed_tabs: HashSet<TabId> = HashSet::new();

    for entry in &record.windows {
        let Some(window) = best_window(entry, &candidates, &claimed_windows, &claimed_tabs) else {
            tracing::debug!("Dropping persisted window entry with no matching live window");
            continue;
        };
        claimed_windows.insert(window);

        let window_tabs = candidates.get(&window).map(Vec::as_slice).unwrap_or(&[]);

        for group in &entry.groups {
            let mut members = Vec::new();
            for proxy in &group.tabs {
                let key = match_key(&proxy.url);
                let hit = window_tabs
                    .iter()
                    .filter(|c| !claimed_tabs.contains(&c.id) && c.key == key)
                    .min_by_key(|c| {
                        // Closest position wins; earlier tab breaks ties
                        ((c.index as i64 - proxy.position_hint as i64).abs(), c.index)
                    })
                    .map(|c| c.id);
                if let Some(tab_id) = hit {
                    claimed_tabs.insert(tab_id);
                    members.push(tab_id);
                }
            }

            // A group whose persisted members all vanished is stale; one
            // persisted with no members was deliberately empty and is kept
            // until the user deletes it.
            if members.is_empty() && !group.tabs.is_empty() {
                tracing::debug!(group_id = %group.id, name = %group.name, "Dropping stale group");
                continue;
            }

            if let Err(e) = store.restore_group(window, group.id.clone(), &group.name, members) {
                tracing::warn!(group_id = %group.id, error = %e, "Failed to restore group");
            }
        }
    }

    store
}

/// Pick the unclaimed live window with the highest URL overlap against the
/// persisted window entry. `None` when nothing overlaps.
fn best_window(
    entry: &crate::record::WindowRecord,
    candidates: &HashMap<WindowId, Vec<Candidate>>,
    claimed_windows: &HashSet<WindowId>,
    claimed_tabs: &HashSet<TabId>,
) -> Option<WindowId> {
    let keys: Vec<String> = entry
        .groups
        .iter()
        .flat_map(|g| g.tabs.iter())
        .map(|p| match_key(&p.url))
        .collect();

    let mut scored: Vec<(usize, WindowId)> = candidates
        .iter()
        .filter(|(window, _)| !claimed_windows.contains(*window))
        .map(|(window, tabs)| {
            let score = keys
                .iter()
                .filter(|key| {
                    tabs.iter()
                        .any(|c| !claimed_tabs.contains(&c.id) && &c.key == *key)
                })
                .count();
            (score, *window)
        })
        .filter(|(score, _)| *score > 0)
        .collect();

    // Deterministic on equal scores
    scored.sort_by_key(|(score, window)| (std::cmp::Reverse(*score), *window));
    scored.first().map(|(_, window)| *window)
}

/// Correlation key for URL matching. Fragments change with in-page
/// navigation and are ignored; unparsable URLs match on the raw string.
fn match_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GroupRecord, TabProxy, WindowRecord};

    const W1: WindowId = WindowId(1);
    const W2: WindowId = WindowId(2);

    fn seeded_store() -> (GroupStore, Vec<Tab>) {
        let tabs = vec![
            Tab::new(TabId(1), W1, "A", "https://a.com/", 0),
            Tab::new(TabId(2), W1, "B", "https://b.com/", 1),
            Tab::new(TabId(3), W2, "C", "https://c.com/", 0),
        ];
        let mut store = GroupStore::new();
        for tab in &tabs {
            store.upsert_tab(tab.clone());
        }
        (store, tabs)
    }

    #[test]
    fn test_load_missing_record_is_empty() {
        let adapter = PersistenceAdapter::new(Database::open_in_memory().unwrap());
        assert!(adapter.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_payload_degrades_to_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set("session", "{not json at all").unwrap();

        let adapter = PersistenceAdapter::new(db);
        assert!(adapter.load().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let adapter = PersistenceAdapter::new(Database::open_in_memory().unwrap());

        let (mut store, _) = seeded_store();
        let group = store.create_group(W1, Some("Work")).unwrap();
        store.add_tab_to_group(&group.id, TabId(1)).unwrap();

        let record = SessionRecord::capture(&store);
        adapter.save(&record).unwrap();
        assert_eq!(adapter.load(), record);
    }

    #[test]
    fn test_reconcile_roundtrip_same_tabs() {
        let (mut store, tabs) = seeded_store();
        let work = store.create_group(W1, Some("Work")).unwrap();
        store.add_tab_to_group(&work.id, TabId(1)).unwrap();
        store.add_tab_to_group(&work.id, TabId(2)).unwrap();
        let play = store.create_group(W2, Some("Play")).unwrap();
        store.add_tab_to_group(&play.id, TabId(3)).unwrap();

        let record = SessionRecord::capture(&store);
        let restored = reconcile(&record, &tabs);

        let w1_groups = restored.groups_with_tabs(W1);
        assert_eq!(w1_groups.len(), 1);
        assert_eq!(w1_groups[0].id, work.id);
        assert_eq!(w1_groups[0].name, "Work");
        assert_eq!(
            w1_groups[0].tabs.iter().map(|t| t.url.as_str()).collect::<Vec<_>>(),
            vec!["https://a.com/", "https://b.com/"]
        );

        let w2_groups = restored.groups_with_tabs(W2);
        assert_eq!(w2_groups.len(), 1);
        assert_eq!(w2_groups[0].id, play.id);
    }

    #[test]
    fn test_reconcile_drops_stale_groups_silently() {
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![
                    GroupRecord {
                        id: "gone".into(),
                        name: "Closed long ago".into(),
                        tabs: vec![TabProxy { url: "https://dead.example/".into(), position_hint: 0 }],
                    },
                    GroupRecord {
                        id: "kept".into(),
                        name: "Work".into(),
                        tabs: vec![TabProxy { url: "https://a.com/".into(), position_hint: 0 }],
                    },
                ],
            }],
        };

        let live = vec![Tab::new(TabId(1), W1, "A", "https://a.com/", 0)];
        let restored = reconcile(&record, &live);

        let groups = restored.groups_with_tabs(W1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "kept");
        // The unmatched live state is otherwise untouched
        assert!(restored.tab(TabId(1)).is_some());
    }

    #[test]
    fn test_reconcile_retains_deliberately_empty_group() {
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![
                    GroupRecord {
                        id: "work".into(),
                        name: "Work".into(),
                        tabs: vec![TabProxy { url: "https://a.com/".into(), position_hint: 0 }],
                    },
                    // Saved with no members; must survive the restart
                    GroupRecord { id: "later".into(), name: "Later".into(), tabs: vec![] },
                ],
            }],
        };

        let live = vec![Tab::new(TabId(1), W1, "A", "https://a.com/", 0)];
        let restored = reconcile(&record, &live);

        let groups = restored.groups_with_tabs(W1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "work");
        assert_eq!(groups[1].id, "later");
        assert!(groups[1].tabs.is_empty());
    }

    #[test]
    fn test_reconcile_unmatched_live_tabs_stay_ungrouped() {
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![GroupRecord {
                    id: "g".into(),
                    name: "Work".into(),
                    tabs: vec![TabProxy { url: "https://a.com/".into(), position_hint: 0 }],
                }],
            }],
        };

        let live = vec![
            Tab::new(TabId(1), W1, "A", "https://a.com/", 0),
            Tab::new(TabId(2), W1, "New", "https://new.example/", 1),
        ];
        let restored = reconcile(&record, &live);

        let groups = restored.groups_with_tabs(W1);
        assert_eq!(groups[0].tabs.len(), 1);
        assert_eq!(groups[0].tabs[0].url, "https://a.com/");
    }

    #[test]
    fn test_reconcile_duplicate_urls_tie_break_on_position() {
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![
                    GroupRecord {
                        id: "first".into(),
                        name: "First".into(),
                        tabs: vec![TabProxy { url: "https://dup.com/".into(), position_hint: 0 }],
                    },
                    GroupRecord {
                        id: "second".into(),
                        name: "Second".into(),
                        tabs: vec![TabProxy { url: "https://dup.com/".into(), position_hint: 3 }],
                    },
                ],
            }],
        };

        let live = vec![
            Tab::new(TabId(10), W1, "Dup", "https://dup.com/", 0),
            Tab::new(TabId(11), W1, "Dup", "https://dup.com/", 3),
        ];
        let restored = reconcile(&record, &live);

        let groups = restored.groups_with_tabs(W1);
        assert_eq!(groups.len(), 2);
        let first = restored.group("first").unwrap();
        let second = restored.group("second").unwrap();
        assert_eq!(first.tabs, vec![TabId(10)]);
        assert_eq!(second.tabs, vec![TabId(11)]);
    }

    #[test]
    fn test_reconcile_ignores_url_fragment() {
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![GroupRecord {
                    id: "g".into(),
                    name: "Docs".into(),
                    tabs: vec![TabProxy { url: "https://a.com/page#intro".into(), position_hint: 0 }],
                }],
            }],
        };

        let live = vec![Tab::new(TabId(1), W1, "A", "https://a.com/page#usage", 0)];
        let restored = reconcile(&record, &live);

        assert_eq!(restored.groups_with_tabs(W1).len(), 1);
        assert_eq!(restored.group("g").unwrap().tabs, vec![TabId(1)]);
    }

    #[test]
    fn test_reconcile_matches_window_entry_by_overlap() {
        // Persisted entry for a window whose platform id changed: it should
        // land on whichever live window holds its tabs.
        let record = SessionRecord {
            windows: vec![WindowRecord {
                groups: vec![GroupRecord {
                    id: "g".into(),
                    name: "Work".into(),
                    tabs: vec![
                        TabProxy { url: "https://a.com/".into(), position_hint: 0 },
                        TabProxy { url: "https://b.com/".into(), position_hint: 1 },
                    ],
                }],
            }],
        };

        let live = vec![
            Tab::new(TabId(1), W1, "Other", "https://other.example/", 0),
            Tab::new(TabId(2), W2, "A", "https://a.com/", 0),
            Tab::new(TabId(3), W2, "B", "https://b.com/", 1),
        ];
        let restored = reconcile(&record, &live);

        assert!(restored.groups_with_tabs(W1).is_empty());
        let groups = restored.groups_with_tabs(W2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tabs.len(), 2);
    }
}
