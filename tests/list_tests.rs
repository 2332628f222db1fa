use lhttp::{HeaderList, ListError, ListState};

fn initialized() -> HeaderList {
    let mut list = HeaderList::new();
    list.init().expect("init should succeed");
    list
}

// =========================================================================
// Initialization
// =========================================================================

#[test]
fn new_list_is_unset() {
    let list = HeaderList::new();
    assert_eq!(list.state(), ListState::Unset);
    assert_eq!(list.error(), ListError::None);
    assert!(list.is_empty());
}

#[test]
fn init_list() {
    let list = initialized();
    assert_eq!(list.state(), ListState::Initialized);
    assert_eq!(list.error(), ListError::None);
    assert_eq!(list.len(), 0);
    assert_eq!(list.iter().count(), 0);
}

// =========================================================================
// add
// =========================================================================

#[test]
fn add_nodes() {
    let mut list = initialized();
    assert_eq!(list.add("Host", "localhost:8080"), Ok(()));
    assert_eq!(list.add("Connection", "keep-alive"), Ok(()));
    assert_eq!(list.len(), 2);
}

#[test]
fn add_duplicate_key() {
    let mut list = initialized();
    list.add("Host", "localhost:8080").unwrap();
    list.add("Connection", "keep-alive").unwrap();

    assert_eq!(list.add("Host", "localhost:8080"), Err(ListError::KeyExists));
    assert_eq!(list.error(), ListError::KeyExists);
    assert_eq!(list.len(), 2);
}

#[test]
fn add_copies_its_arguments() {
    let mut list = initialized();
    let mut key = String::from("X-Key");
    let mut value = String::from("value");
    list.add(&key, &value).unwrap();
    key.clear();
    value.push_str("-changed");
    assert_eq!(list.get("X-Key"), Ok("value"));
}

#[test]
fn add_before_init() {
    let mut list = HeaderList::new();
    assert_eq!(list.add("Host", "h"), Err(ListError::NotInitialized));
    assert_eq!(list.error(), ListError::NotInitialized);
}

// =========================================================================
// get / contains
// =========================================================================

#[test]
fn get_existing_nodes() {
    let mut list = initialized();
    list.add("Host", "localhost:8080").unwrap();
    list.add("Connection", "keep-alive").unwrap();
    list.add("User-Agent", "curl/7.68.0").unwrap();

    assert_eq!(list.get("Host"), Ok("localhost:8080"));
    assert_eq!(list.get("Connection"), Ok("keep-alive"));
    assert_eq!(list.get("User-Agent"), Ok("curl/7.68.0"));
    assert_eq!(list.error(), ListError::None);
}

#[test]
fn get_missing_key_sets_key_not_found() {
    let mut list = initialized();
    list.add("Host", "h").unwrap();
    assert_eq!(list.get("Accept"), Err(ListError::KeyNotFound));
    assert_eq!(list.error(), ListError::KeyNotFound);
}

#[test]
fn get_is_case_sensitive() {
    let mut list = initialized();
    list.add("Host", "h").unwrap();
    assert_eq!(list.get("host"), Err(ListError::KeyNotFound));
}

#[test]
fn contains_never_records_not_found() {
    let mut list = initialized();
    list.add("Host", "h").unwrap();

    assert!(list.contains("Host"));
    assert_eq!(list.error(), ListError::None);

    let _ = list.get("Missing");
    assert_eq!(list.error(), ListError::KeyNotFound);

    assert!(!list.contains("Missing"));
    assert_eq!(list.error(), ListError::None);
}

#[test]
fn successful_get_clears_previous_error() {
    let mut list = initialized();
    list.add("A", "1").unwrap();
    let _ = list.add("A", "2");
    assert_eq!(list.error(), ListError::KeyExists);
    assert_eq!(list.get("A"), Ok("1"));
    assert_eq!(list.error(), ListError::None);
}

// =========================================================================
// free
// =========================================================================

#[test]
fn free_resets_to_unset() {
    let mut list = initialized();
    list.add("Host", "h").unwrap();
    list.add("Accept", "*/*").unwrap();

    list.free();
    assert_eq!(list.len(), 0);
    assert_eq!(list.state(), ListState::Unset);
    assert_eq!(list.get("Host"), Err(ListError::NotInitialized));

    assert_eq!(list.init(), Ok(()));
    assert_eq!(list.state(), ListState::Initialized);
    assert!(list.is_empty());
}

#[test]
fn free_is_idempotent() {
    let mut list = HeaderList::new();
    list.free();
    list.free();
    assert_eq!(list.state(), ListState::Unset);
}

#[test]
fn reinit_discards_contents() {
    let mut list = initialized();
    list.add("Host", "h").unwrap();
    list.init().unwrap();
    assert!(list.is_empty());
    assert_eq!(list.add("Host", "again"), Ok(()));
}

// =========================================================================
// Iteration
// =========================================================================

#[test]
fn iteration_follows_insertion_order() {
    let mut list = initialized();
    for (k, v) in [("c", "3"), ("a", "1"), ("b", "2")] {
        list.add(k, v).unwrap();
    }
    let keys: Vec<&str> = (&list).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["c", "a", "b"]);
}
