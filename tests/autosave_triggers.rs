use std::sync::Arc;
use std::time::{Duration, Instant};

use field_companion::autosave::{save_now, AutoSaver, SaveTrigger};
use field_companion::persist::BoundedLocalStore;
use field_companion::state::{AppState, SharedState};
use field_companion::store::InMemoryDeviceStore;

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn set_teleprompter(shared: &SharedState, text: &str) {
    shared
        .with(|state| state.snapshot.teleprompter_content = text.to_string())
        .expect("lock");
}

#[test]
fn lifecycle_trigger_saves_without_waiting_for_interval() {
    let shared = SharedState::new(AppState::default());
    let store = Arc::new(BoundedLocalStore::new(InMemoryDeviceStore::new()));
    let saver = AutoSaver::spawn(shared.clone(), store.clone(), Duration::from_secs(3600))
        .expect("spawn");

    set_teleprompter(&shared, "after focus lost");
    saver.notify(SaveTrigger::FocusLost).expect("notify");
    assert!(wait_for(|| store.restore().teleprompter_content == "after focus lost"));

    set_teleprompter(&shared, "after hidden");
    saver.notify(SaveTrigger::Hidden).expect("notify");
    saver.notify(SaveTrigger::PageHide).expect("notify twice");
    assert!(wait_for(|| store.restore().teleprompter_content == "after hidden"));

    saver.shutdown().expect("shutdown");
}

#[test]
fn interval_tick_saves_latest_state() {
    let shared = SharedState::new(AppState::default());
    let store = Arc::new(BoundedLocalStore::new(InMemoryDeviceStore::new()));
    let saver = AutoSaver::spawn(shared.clone(), store.clone(), Duration::from_millis(20))
        .expect("spawn");

    set_teleprompter(&shared, "ticked");
    assert!(wait_for(|| store.restore().teleprompter_content == "ticked"));
    drop(saver);
}

#[test]
fn shutdown_performs_a_final_save() {
    let shared = SharedState::new(AppState::default());
    let store = Arc::new(BoundedLocalStore::new(InMemoryDeviceStore::new()));
    let saver = AutoSaver::spawn(shared.clone(), store.clone(), Duration::from_secs(3600))
        .expect("spawn");

    set_teleprompter(&shared, "last words");
    saver.shutdown().expect("shutdown");
    assert_eq!(store.restore().teleprompter_content, "last words");
}

#[test]
fn save_now_uses_the_same_write_path() {
    let shared = SharedState::new(AppState::default());
    let store = BoundedLocalStore::new(InMemoryDeviceStore::new());
    set_teleprompter(&shared, "manual");

    let outcome = save_now(&shared, &store, SaveTrigger::BeforeUnload).expect("save");
    assert!(outcome.is_saved());
    assert_eq!(store.restore().teleprompter_content, "manual");
}
