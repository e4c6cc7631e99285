use std::sync::Arc;

use assert_matches::assert_matches;

use auth_cell::{AuthError, LoginRequest, RegisterRequest, UserDirectoryService};
use shared_database::{RecordStore, Repository};
use shared_models::{UserFilter, UserRole};

fn register_request(username: &str, password: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        role: Some(role.to_string()),
    }
}

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
    }
}

#[tokio::test]
async fn register_returns_profile_and_stores_hash() {
    let store = RecordStore::in_memory();
    let service = UserDirectoryService::new(&store);

    let profile = service.register(register_request("alice", "pw", "patient")).await.unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.role, UserRole::Patient);

    let stored = store.users.list(&UserFilter::by_username("alice")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash, "pw");
    assert!(stored[0].password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let store = RecordStore::in_memory();
    let service = UserDirectoryService::new(&store);

    service.register(register_request("alice", "pw", "PATIENT")).await.unwrap();
    let second = service.register(register_request("alice", "other", "DOCTOR")).await;

    assert_matches!(second, Err(AuthError::UsernameTaken(name)) if name == "alice");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_username_have_one_winner() {
    let store = RecordStore::in_memory();
    let service = Arc::new(UserDirectoryService::new(&store));

    let attempts: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register(register_request("alice", "pw", "PATIENT")).await })
        })
        .collect();

    let mut results = Vec::new();
    for attempt in attempts {
        results.push(attempt.await.unwrap());
    }

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AuthError::UsernameTaken(name) if name == "alice")));

    let stored = store.users.list(&UserFilter::by_username("alice")).await.unwrap();
    assert_eq!(stored.len(), 1);
    service.login(login_request("alice", "pw")).await.unwrap();
}

#[tokio::test]
async fn register_rejects_missing_or_blank_fields() {
    let service = UserDirectoryService::new(&RecordStore::in_memory());

    let missing_role = RegisterRequest { role: None, ..register_request("bob", "pw", "") };
    assert_matches!(service.register(missing_role).await, Err(AuthError::InvalidArgument(_)));
    assert_matches!(
        service.register(register_request("  ", "pw", "PATIENT")).await,
        Err(AuthError::InvalidArgument(_))
    );
    assert_matches!(
        service.register(register_request("bob", "", "PATIENT")).await,
        Err(AuthError::InvalidArgument(_))
    );
    assert_matches!(
        service.register(register_request("bob", "pw", "nurse")).await,
        Err(AuthError::InvalidArgument(_))
    );
}

#[tokio::test]
async fn login_accepts_the_registered_password() {
    let service = UserDirectoryService::new(&RecordStore::in_memory());
    let registered = service.register(register_request("alice", "pw", "ADMIN")).await.unwrap();

    let profile = service.login(login_request("alice", "pw")).await.unwrap();
    assert_eq!(profile, registered);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let service = UserDirectoryService::new(&RecordStore::in_memory());
    service.register(register_request("alice", "pw", "PATIENT")).await.unwrap();

    let wrong_password = service.login(login_request("alice", "wrong")).await.unwrap_err();
    let unknown_user = service.login(login_request("mallory", "pw")).await.unwrap_err();

    assert_matches!(wrong_password, AuthError::InvalidCredentials);
    assert_matches!(unknown_user, AuthError::InvalidCredentials);
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn login_without_password_is_invalid_argument() {
    let service = UserDirectoryService::new(&RecordStore::in_memory());
    let request = LoginRequest { username: Some("alice".to_string()), password: None };

    assert_matches!(service.login(request).await, Err(AuthError::InvalidArgument(_)));
}
