#![allow(dead_code)]

/// A small project history.
///
/// - #1 bug, closed after 2 days (explicit `closed_date`)
/// - #2 bug + ui, closed after 10 days (inferred from events)
/// - #3 feature, closed, then reopened: unresolved, still `closed` state
/// - #4 feature, open since 2023-03-01
/// - #5 unlabeled, open
/// - #6 docs, closed after 4 days, reopened and closed again
/// - one malformed record (no `created_date`)
///
/// The latest event is 2023-04-01T00:00:00Z.
pub const PROJECT: &str = r#"[
  {"number": 1, "title": "crash on start", "creator": "alice", "state": "closed",
   "created_date": "2023-01-01T00:00:00Z", "closed_date": "2023-01-03T00:00:00Z",
   "labels": ["kind:bug", "priority:high"],
   "events": [{"event_type": "labeled", "event_date": "2023-01-01T01:00:00Z", "author": "bob",
               "label": "kind:bug"}]},
  {"number": 2, "title": "button misaligned", "creator": "bob", "state": "closed",
   "created_at": "2023-01-10T00:00:00Z",
   "labels": [{"name": "kind:bug"}, {"name": "area:ui"}],
   "events": [{"event_type": "Closed", "event_date": "2023-01-20T00:00:00Z", "author": "alice"}]},
  {"number": 3, "title": "dark mode", "creator": "alice", "state": "closed",
   "created_date": "2023-02-01T00:00:00Z",
   "labels": ["kind:feature"],
   "events": [{"event_type": "closed", "event_date": "2023-02-05T00:00:00Z", "author": "alice"},
              {"event_type": "reopened", "event_date": "2023-02-06T00:00:00Z", "author": "carol"}]},
  {"number": 4, "title": "export csv", "creator": "carol", "state": "open",
   "created_date": "2023-03-01T00:00:00Z",
   "labels": ["kind:feature", "area:ui"],
   "events": []},
  {"number": 5, "title": "question", "creator": "dave", "state": "open",
   "created_date": "2023-03-15T00:00:00Z",
   "labels": null,
   "events": [{"event_type": "commented", "event_date": "2023-04-01T00:00:00Z", "author": "alice"}]},
  {"number": 6, "title": "typo in readme", "creator": "alice", "state": "closed",
   "created_date": "2023-03-01T00:00:00Z",
   "labels": ["kind:docs"],
   "events": [{"event_type": "closed", "event_date": "2023-03-02T00:00:00Z"},
              {"event_type": "reopen", "event_date": "2023-03-03T00:00:00Z"},
              {"event_type": "closed", "event_date": "2023-03-05T00:00:00Z"},
              {"event_type": "closed", "event_date": "not a date"}]},
  {"number": 7, "state": "open", "labels": ["kind:bug"]}
]"#;

/// Two 2022 bug reports as JSON Lines: one open, one closed with date-only
/// timestamps and no `state`.
pub const JSONL: &str = r#"{"created_date": "2022-12-01T00:00:00Z", "state": "open", "labels": ["kind:bug"]}

{"created_date": "2022-12-02", "closed_date": "2022-12-04", "labels": ["kind:bug"], "events": [{"event_type": "closed", "event_date": "2022-12-04T00:00:00Z"}]}
"#;

/// Issues spread over 2022 and 2023.
///
/// - #1 bug, created 2022-11-05, closed 2022-11-10
/// - #2 feature, created 2022-12-01, open
/// - #3 bug, created 2023-02-10, open
/// - #4 docs, created 2023-03-20, closed 2023-03-25
///
/// The latest event is 2023-04-01T00:00:00Z.
pub const MULTI_YEAR: &str = r#"[
  {"number": 1, "creator": "alice", "state": "closed",
   "created_date": "2022-11-05T00:00:00Z", "closed_date": "2022-11-10T00:00:00Z",
   "labels": ["kind:bug"],
   "events": [{"event_type": "closed", "event_date": "2022-11-10T00:00:00Z", "author": "alice"}]},
  {"number": 2, "creator": "bob", "state": "open",
   "created_date": "2022-12-01T00:00:00Z",
   "labels": ["kind:feature"], "events": []},
  {"number": 3, "creator": "alice", "state": "open",
   "created_date": "2023-02-10T00:00:00Z",
   "labels": ["kind:bug"],
   "events": [{"event_type": "commented", "event_date": "2023-04-01T00:00:00Z", "author": "bob"}]},
  {"number": 4, "creator": "carol", "state": "closed",
   "created_date": "2023-03-20T00:00:00Z", "closed_date": "2023-03-25T00:00:00Z",
   "labels": ["kind:docs"], "events": []}
]"#;
