use super::*;
use crate::model::SaveStatus;
use crate::poller::PollCadence;
use crate::remote::Failure;
use serde_json::json;

const DELAY: Duration = Duration::from_secs(3);

fn schema() -> Schema {
    Schema::from_json(json!({
        "schema": {
            "pvp": {"access": "write", "type": {"name": "boolean", "default": true}, "label": "PvP", "desc": ""},
            "motd": {"access": "write", "type": {"name": "string", "default": "hi"}, "label": "MOTD", "desc": ""}
        },
        "create_properties": ["pvp"]
    }))
    .expect("schema")
}

fn session_with(saves: &[(&str, SaveStatus)]) -> Session {
    let poller = StatusPoller::with_cadence(PollCadence::with_jitter(|| 5));
    let mut s = Session::with_poller(
        SessionConfig {
            reconnect_delay: DELAY,
        },
        poller,
    );
    s.handle_event(AppEvent::Saves(Ok(saves
        .iter()
        .map(|(n, st)| SaveRecord::new(*n, *st))
        .collect())));
    s.handle_event(AppEvent::Schema(Ok(schema())));
    s.drain_effects();
    s
}

fn failure(err: &str) -> ApiError {
    ApiError::Failure(Failure {
        err: err.to_string(),
        desc: String::new(),
        status: None,
    })
}

fn status_map(entries: &[(&str, SaveStatus)]) -> StatusMap {
    entries.iter().map(|(n, s)| (n.to_string(), *s)).collect()
}

/// A poll result for a fetch issued before any local status write.
fn polled(map: StatusMap) -> AppEvent {
    AppEvent::Status {
        issued_at: 0,
        result: Ok(map),
    }
}

fn console_open(effects: &[Effect]) -> Option<&ConnectRequest> {
    effects.iter().find_map(|e| match e {
        Effect::OpenConsole(req) => Some(req),
        _ => None,
    })
}

#[test]
fn boot_queues_listing_and_schema() {
    let mut s = Session::new(SessionConfig::default());
    assert_eq!(s.screen(), Screen::Saves);
    assert!(s.poller().is_active());
    assert_eq!(s.drain_effects(), vec![Effect::ListSaves, Effect::LoadSchema]);
    assert!(s.drain_effects().is_empty());
}

#[test]
fn loading_save_offers_console_only() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    assert!(s.actions().modify && s.actions().delete);

    s.handle_event(polled(status_map(&[("world1", SaveStatus::Loading)])));
    let actions = s.actions();
    assert_eq!(actions.play, None);
    assert!(actions.console);
    assert!(!actions.modify && !actions.delete);
}

#[test]
fn delete_without_selection_is_refused() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    let history_len = s.history().len();
    assert!(!s.request_screen(Screen::Delete, false));
    assert_eq!(s.screen(), Screen::Saves);
    assert_eq!(s.history().len(), history_len);
    assert!(s.drain_effects().is_empty());
}

#[test]
fn console_needs_a_running_save() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    assert!(!s.request_screen(Screen::Console, false));
    assert!(s.console().is_none());
}

#[test]
fn console_lives_exactly_as_long_as_the_console_screen() {
    let mut s = session_with(&[("world1", SaveStatus::Online)]);
    s.select("world1");
    assert!(s.request_screen(Screen::Console, false));
    let effects = s.drain_effects();
    let req = console_open(&effects).expect("console dialed");
    assert_eq!((req.cursor, req.target.as_str()), (0, "world1"));
    assert!(s.console().is_some());
    assert!(!s.poller().is_active());

    assert!(s.navigate_back());
    assert_eq!(s.screen(), Screen::Saves);
    assert!(s.console().is_none());
    assert!(
        s.drain_effects()
            .contains(&Effect::CloseConsole { session: req.session })
    );
    assert!(s.poller().is_active());
}

#[test]
fn console_resumes_after_disconnect() {
    let mut s = session_with(&[("world1", SaveStatus::Online)]);
    s.select("world1");
    s.request_screen(Screen::Console, false);
    let req = console_open(&s.drain_effects()).cloned().expect("dial");

    let ev = |attempt, event| AppEvent::Console {
        session: req.session,
        attempt,
        event,
    };
    s.handle_event(ev(0, StreamEvent::Connected));
    s.handle_event(ev(0, StreamEvent::Chunk(b"A\nB".to_vec())));
    s.handle_event(ev(0, StreamEvent::Disconnected("reset".into())));

    let effects = s.drain_effects();
    let retry = console_open(&effects).expect("reconnect scheduled");
    assert_eq!(retry.cursor, 3);
    assert_eq!(retry.delay, Some(DELAY));

    s.handle_event(ev(1, StreamEvent::Connected));
    s.handle_event(ev(1, StreamEvent::Chunk(b"C".to_vec())));
    let console = s.console().expect("console open");
    assert_eq!(console.transcript().lines(), ["A", "B", "C"]);
    assert_eq!(console.cursor(), 4);
}

#[test]
fn events_from_a_closed_console_are_ignored() {
    let mut s = session_with(&[("world1", SaveStatus::Online)]);
    s.select("world1");
    s.request_screen(Screen::Console, false);
    let first = console_open(&s.drain_effects()).cloned().expect("dial");
    s.navigate_back();
    s.select("world1");
    s.request_screen(Screen::Console, false);
    s.drain_effects();

    s.handle_event(AppEvent::Console {
        session: first.session,
        attempt: 0,
        event: StreamEvent::Chunk(b"old".to_vec()),
    });
    assert!(s.console().expect("open").transcript().lines().is_empty());
}

#[test]
fn failed_create_keeps_form_open_and_registry_unchanged() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.request_screen(Screen::Create, false);
    s.drain_effects();
    s.create_form_mut().name = "bad name!".into();
    s.create_form_mut().version = "1.20.1".into();
    assert!(s.submit_create());
    assert!(s.is_busy());
    let effects = s.drain_effects();
    let Some(Effect::Perform { origin, action }) = effects.into_iter().next() else {
        panic!("create request expected");
    };

    s.handle_event(AppEvent::ActionFinished {
        origin,
        action,
        result: Err(failure("InvalidName")),
    });
    assert_eq!(s.screen(), Screen::Create);
    assert!(!s.is_busy());
    assert_eq!(s.registry().len(), 1);
    assert_eq!(s.create_form().name, "bad name!");
    let notice = s.notice().expect("error shown");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("InvalidName"));
}

#[test]
fn successful_create_selects_new_save_on_saves_screen() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.create_form_mut().name = "world2".into();
    s.create_form_mut().version = "1.20.1".into();
    s.submit_create();
    let Some(Effect::Perform { origin, action }) =
        s.drain_effects().into_iter().find(|e| matches!(e, Effect::Perform { .. }))
    else {
        panic!("create request expected");
    };

    let mut record = SaveRecord::new("world2", SaveStatus::Offline);
    record.metadata.insert("pvp".into(), json!(true));
    s.handle_event(AppEvent::ActionFinished {
        origin,
        action,
        result: Ok(Some(record)),
    });
    assert_eq!(s.screen(), Screen::Saves);
    assert_eq!(s.selected_name(), Some("world2"));
    assert!(s.create_form().name.is_empty());
}

#[test]
fn late_create_response_updates_registry_without_navigating() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.create_form_mut().name = "world2".into();
    s.create_form_mut().version = "1.20.1".into();
    s.submit_create();
    s.navigate_back();
    assert_eq!(s.screen(), Screen::Saves);

    s.handle_event(AppEvent::ActionFinished {
        origin: Screen::Create,
        action: Action::Create {
            name: "world2".into(),
            version: "1.20.1".into(),
            values: Values::new(),
        },
        result: Ok(None),
    });
    assert!(s.registry().contains("world2"));
    assert_eq!(s.selected_name(), None);
}

#[test]
fn invalid_create_field_is_focused_without_request() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.drain_effects();
    assert!(!s.submit_create());
    assert!(s.drain_effects().is_empty());
    assert_eq!(s.create_form().focus_row(), forms::CreateForm::NAME_ROW);
    assert!(!s.is_busy());
}

#[test]
fn delete_confirmation_names_the_save_and_removes_it() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    assert!(s.request_screen(Screen::Delete, false));
    assert!(s.delete_prompt().contains("world1"));
    assert!(s.confirm_delete());
    s.handle_event(AppEvent::ActionFinished {
        origin: Screen::Delete,
        action: Action::Delete {
            name: "world1".into(),
        },
        result: Ok(None),
    });
    assert_eq!(s.screen(), Screen::Saves);
    assert!(s.registry().is_empty());
    assert_eq!(s.selected_name(), None);
}

#[test]
fn modify_form_mirrors_metadata_and_merges_on_success() {
    let mut rec = SaveRecord::new("world1", SaveStatus::Offline);
    rec.metadata.insert("motd".into(), json!("welcome"));
    let mut s = session_with(&[]);
    s.handle_event(AppEvent::Saves(Ok(vec![rec])));
    s.select("world1");
    assert!(s.request_screen(Screen::Modify, false));
    assert_eq!(s.modify_form().target(), "world1");

    s.modify_form_mut().set_focus(0);
    assert!(s.submit_modify());
    let Some(Effect::Perform { origin, action }) = s.drain_effects().pop() else {
        panic!("modify request expected");
    };
    let Action::Modify { values, .. } = &action else {
        panic!("modify action expected");
    };
    assert_eq!(
        values.get("motd"),
        Some(&crate::model::schema::PropValue::Str("welcome".into()))
    );
    s.handle_event(AppEvent::ActionFinished {
        origin,
        action,
        result: Ok(None),
    });
    assert_eq!(s.screen(), Screen::Saves);
    let saved = s.registry().get("world1").expect("still there");
    assert_eq!(saved.metadata.get("pvp"), Some(&json!(true)));
}

#[test]
fn start_marks_save_loading() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    assert!(s.toggle_play());
    assert!(!s.toggle_play());
    s.handle_event(AppEvent::ActionFinished {
        origin: Screen::Saves,
        action: Action::Start {
            name: "world1".into(),
        },
        result: Ok(None),
    });
    assert_eq!(s.registry().status("world1"), Some(SaveStatus::Loading));
    assert!(s.actions().console);
    assert_eq!(s.actions().play, None);
}

#[test]
fn snapshot_fetched_before_a_start_does_not_undo_it() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    s.handle_event(AppEvent::Tick);
    assert_eq!(s.drain_effects(), vec![Effect::FetchStatus { issued_at: 0 }]);

    assert!(s.toggle_play());
    s.handle_event(AppEvent::ActionFinished {
        origin: Screen::Saves,
        action: Action::Start {
            name: "world1".into(),
        },
        result: Ok(None),
    });
    s.handle_event(polled(status_map(&[("world1", SaveStatus::Offline)])));

    assert_eq!(s.registry().status("world1"), Some(SaveStatus::Loading));
    assert_eq!(s.actions().play, None);
    assert_eq!(s.poller().cadence().pending_skip(), 0);

    // A fetch issued after the start is authoritative again.
    s.drain_effects();
    s.handle_event(AppEvent::Tick);
    assert_eq!(s.drain_effects(), vec![Effect::FetchStatus { issued_at: 1 }]);
    s.handle_event(AppEvent::Status {
        issued_at: 1,
        result: Ok(status_map(&[("world1", SaveStatus::Online)])),
    });
    assert_eq!(s.registry().status("world1"), Some(SaveStatus::Online));
}

#[test]
fn pending_start_does_not_block_the_create_form() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.handle_event(AppEvent::Versions(Ok(vec!["1.20.4".into()])));
    s.select("world1");
    assert!(s.toggle_play());
    assert!(s.is_busy());

    assert!(s.request_screen(Screen::Create, false));
    assert!(!s.is_busy());
    assert!(s.has_pending_action());
    s.create_form_mut().name = "world2".into();
    s.drain_effects();
    assert!(s.submit_create());
    assert!(s.is_busy());

    // The start answers; the create stays pending.
    s.handle_event(AppEvent::ActionFinished {
        origin: Screen::Saves,
        action: Action::Start {
            name: "world1".into(),
        },
        result: Ok(None),
    });
    assert!(s.is_busy());
    assert!(!s.submit_create());
}

#[test]
fn poll_ticks_respect_cadence_and_in_flight() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.handle_event(AppEvent::Tick);
    assert_eq!(s.drain_effects(), vec![Effect::FetchStatus { issued_at: 0 }]);
    s.handle_event(AppEvent::Tick);
    assert!(s.drain_effects().is_empty());

    s.handle_event(polled(StatusMap::new()));
    for _ in 0..5 {
        s.handle_event(AppEvent::Tick);
    }
    assert!(s.drain_effects().is_empty());
    s.handle_event(AppEvent::Tick);
    assert_eq!(s.drain_effects(), vec![Effect::FetchStatus { issued_at: 0 }]);
}

#[test]
fn poller_stops_off_the_saves_screen() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.drain_effects();
    s.handle_event(AppEvent::Tick);
    assert!(s.drain_effects().is_empty());
}

#[test]
fn reconcile_deselects_nothing_but_updates_status() {
    let mut s = session_with(&[("a", SaveStatus::Online), ("b", SaveStatus::Offline)]);
    s.select("a");
    let map = status_map(&[("b", SaveStatus::Online)]);
    s.handle_event(polled(map.clone()));
    s.handle_event(polled(map));
    assert_eq!(s.registry().status("a"), Some(SaveStatus::Offline));
    assert_eq!(s.registry().status("b"), Some(SaveStatus::Online));
    assert_eq!(s.selected_name(), Some("a"));
    assert!(s.actions().modify);
}

#[test]
fn filter_hides_and_drops_selection() {
    let mut s = session_with(&[("alpha", SaveStatus::Offline), ("beta", SaveStatus::Offline)]);
    s.select("beta");
    s.set_filter("al");
    assert_eq!(s.selected_name(), None);
    s.select("beta");
    assert_eq!(s.selected_name(), None);
    s.select_step(true);
    assert_eq!(s.selected_name(), Some("alpha"));
}

#[test]
fn back_replays_history_and_reports_exhaustion() {
    let mut s = session_with(&[("world1", SaveStatus::Offline)]);
    s.select("world1");
    s.request_screen(Screen::Modify, false);
    s.request_screen(Screen::Create, false);
    assert!(s.navigate_back());
    assert_eq!(s.screen(), Screen::Saves, "modify lost its selection");
    while s.navigate_back() {
        assert_eq!(s.screen(), Screen::Saves);
    }
    assert_eq!(s.history().index(), 0);
    assert!(!s.navigate_back());
}

#[test]
fn version_picker_fills_create_form() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.handle_event(AppEvent::Versions(Ok(vec!["1.20.1".into(), "1.19.4".into()])));
    assert_eq!(s.create_form().version, "1.20.1");

    assert!(s.pick_create_version());
    assert_eq!(s.screen(), Screen::Version);
    s.move_version_cursor(true);
    s.choose_version();
    assert_eq!(s.screen(), Screen::Create);
    assert_eq!(s.create_form().version, "1.19.4");
    assert_eq!(s.create_form().focus_row(), forms::CreateForm::VERSION_ROW);
}

#[test]
fn cancelled_version_picker_keeps_value() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.create_form_mut().version = "1.18".into();
    s.pick_create_version();
    s.finish_version_pick(None);
    assert_eq!(s.screen(), Screen::Create);
    assert_eq!(s.create_form().version, "1.18");
}

#[test]
fn leaving_version_screen_drops_callback() {
    let mut s = session_with(&[]);
    s.request_screen(Screen::Create, false);
    s.pick_create_version();
    assert!(s.request_screen(Screen::Saves, false));
    assert!(!s.request_screen(Screen::Version, false));
}
