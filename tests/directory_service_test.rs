use std::sync::Arc;

use uuid::Uuid;

use user_directory::bootstrap::{bootstrap, SeedConfig, ADMIN_ROLE_NAME, USER_ROLE_NAME};
use user_directory::directory_service::UserDirectoryService;
use user_directory::entities::{NewUser, Role, UserPatch};
use user_directory::errors_service::UserDirectoryError;
use user_directory::password::{BcryptPasswordHasher, PasswordHasherTrait};
use user_directory::repository::schema::init_schema;
use user_directory::repository::traits::RoleRepositoryTrait;
use user_directory::repository::{RoleRepository, UserRepository};
use user_directory::util::{connect, connect_in_memory};

type Service = UserDirectoryService<UserRepository, RoleRepository, BcryptPasswordHasher>;

async fn setup_service() -> Service {
    let pool = connect_in_memory().await.expect("in-memory pool");
    init_schema(&pool).await.expect("schema");

    UserDirectoryService::with_collaborators(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RoleRepository::new(pool)),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
    )
}

async fn seed_role(service: &Service, name: &str) -> Role {
    let row = service.role_repo.create_role(name).await.expect("role");
    Role {
        id: Uuid::parse_str(&row.id).expect("role id"),
        name: row.name,
    }
}

fn new_user(email: &str, password: &str, roles: Vec<Role>) -> NewUser {
    NewUser {
        name: "Jane".to_string(),
        surname: "Doe".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        roles,
    }
}

fn patch(email: &str, password: Option<&str>) -> UserPatch {
    UserPatch {
        name: "Jane".to_string(),
        surname: "Doe".to_string(),
        email: email.to_string(),
        password: password.map(|p| p.to_string()),
    }
}

#[tokio::test]
async fn created_password_is_salted_and_never_stored_in_cleartext() {
    let service = setup_service().await;

    let first = service
        .create_user(new_user("a@example.com", "hunter2", vec![]))
        .await
        .unwrap();
    let second = service
        .create_user(new_user("b@example.com", "hunter2", vec![]))
        .await
        .unwrap();

    assert_ne!(first.password_hash, "hunter2");
    assert_ne!(second.password_hash, "hunter2");
    // Salted: same plaintext, different stored values, both verifiable.
    assert_ne!(first.password_hash, second.password_hash);

    let hasher = BcryptPasswordHasher::with_cost(4);
    assert!(hasher
        .verify_password("hunter2", &first.password_hash)
        .unwrap());
    assert!(hasher
        .verify_password("hunter2", &second.password_hash)
        .unwrap());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_and_leaves_existing_user_unchanged() {
    let service = setup_service().await;

    let original = service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();

    let result = service.create_user(new_user("a@x.com", "pw2", vec![])).await;
    assert!(matches!(
        result,
        Err(UserDirectoryError::EmailAlreadyExists)
    ));

    let stored = service.get_user(original.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, original.password_hash);
    assert_eq!(stored.email, "a@x.com");
}

#[tokio::test]
async fn email_uniqueness_is_case_sensitive() {
    let service = setup_service().await;

    service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();

    // Exact-match comparison: a differently-cased address is a new user.
    let result = service.create_user(new_user("A@X.com", "pw2", vec![])).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn update_with_own_stored_hash_does_not_double_hash() {
    let service = setup_service().await;

    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();

    let updated = service
        .update_user(user.id, patch("a@x.com", Some(&user.password_hash)), &[])
        .await
        .unwrap();

    assert_eq!(updated.password_hash, user.password_hash);

    let stored = service.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, user.password_hash);
    assert!(BcryptPasswordHasher::with_cost(4)
        .verify_password("pw1", &stored.password_hash)
        .unwrap());
}

#[tokio::test]
async fn update_with_unknown_role_leaves_prior_role_set_intact() {
    let service = setup_service().await;

    let role = seed_role(&service, USER_ROLE_NAME).await;
    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![role.clone()]))
        .await
        .unwrap();
    assert_eq!(user.roles.len(), 1);

    let result = service
        .update_user(user.id, patch("b@x.com", None), &[role.id, Uuid::new_v4()])
        .await;
    assert!(matches!(result, Err(UserDirectoryError::NotFound)));

    // No partial clear: membership, email and hash all untouched.
    let stored = service.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "a@x.com");
    assert_eq!(stored.roles, vec![role]);
    assert_eq!(stored.password_hash, user.password_hash);
}

#[tokio::test]
async fn update_with_empty_role_list_clears_membership() {
    let service = setup_service().await;

    let role = seed_role(&service, USER_ROLE_NAME).await;
    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![role]))
        .await
        .unwrap();

    let updated = service
        .update_user(user.id, patch("a@x.com", None), &[])
        .await
        .unwrap();
    assert!(updated.roles.is_empty());

    let stored = service.get_user(user.id).await.unwrap().unwrap();
    assert!(stored.roles.is_empty());
}

#[tokio::test]
async fn update_replaces_entire_role_set() {
    let service = setup_service().await;

    let admin = seed_role(&service, ADMIN_ROLE_NAME).await;
    let standard = seed_role(&service, USER_ROLE_NAME).await;

    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![admin.clone()]))
        .await
        .unwrap();
    assert_eq!(user.roles, vec![admin]);

    let updated = service
        .update_user(user.id, patch("a@x.com", None), &[standard.id])
        .await
        .unwrap();
    assert_eq!(updated.roles, vec![standard.clone()]);

    let stored = service.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.roles, vec![standard]);
}

#[tokio::test]
async fn update_with_blank_email_is_rejected_and_changes_nothing() {
    let service = setup_service().await;

    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();

    let result = service.update_user(user.id, patch("   ", None), &[]).await;
    assert!(matches!(result, Err(UserDirectoryError::Validation(_))));

    let stored = service.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "a@x.com");
    assert_eq!(stored.password_hash, user.password_hash);
}

#[tokio::test]
async fn update_of_unknown_user_fails() {
    let service = setup_service().await;

    let result = service
        .update_user(Uuid::new_v4(), patch("a@x.com", None), &[])
        .await;

    assert!(matches!(result, Err(UserDirectoryError::NotFound)));
}

#[tokio::test]
async fn create_update_lookup_scenario() {
    let service = setup_service().await;

    let role = seed_role(&service, USER_ROLE_NAME).await;

    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();

    let duplicate = service.create_user(new_user("a@x.com", "pw1", vec![])).await;
    assert!(matches!(
        duplicate,
        Err(UserDirectoryError::EmailAlreadyExists)
    ));

    let updated = service
        .update_user(user.id, patch("b@x.com", Some("")), &[role.id])
        .await
        .unwrap();
    assert_eq!(updated.email, "b@x.com");
    // Empty password on update keeps the stored hash.
    assert_eq!(updated.password_hash, user.password_hash);

    assert!(service.get_user_by_email("a@x.com").await.unwrap().is_none());
    let found = service
        .get_user_by_email("b@x.com")
        .await
        .unwrap()
        .expect("updated user");
    assert_eq!(found.id, user.id);
    assert_eq!(found.roles, vec![role]);
}

#[tokio::test]
async fn delete_removes_user_but_keeps_roles() {
    let service = setup_service().await;

    let role = seed_role(&service, USER_ROLE_NAME).await;
    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![role.clone()]))
        .await
        .unwrap();

    service.delete_user(user.id).await.unwrap();
    assert!(service.get_user(user.id).await.unwrap().is_none());

    // Shared association: the role outlives its members.
    let catalog = service.get_roles().await.unwrap();
    assert_eq!(catalog, vec![role]);

    // Deleting again is a documented no-op.
    assert!(service.delete_user(user.id).await.is_ok());
}

#[tokio::test]
async fn authentication_lookup_returns_hash_and_roles() {
    let service = setup_service().await;

    let role = seed_role(&service, USER_ROLE_NAME).await;
    service
        .create_user(new_user("a@x.com", "pw1", vec![role.clone()]))
        .await
        .unwrap();

    let user = service.authentication_lookup("a@x.com").await.unwrap();
    assert_eq!(user.roles, vec![role]);
    assert!(BcryptPasswordHasher::with_cost(4)
        .verify_password("pw1", &user.password_hash)
        .unwrap());

    let miss = service.authentication_lookup("ghost@x.com").await;
    assert!(matches!(
        miss,
        Err(UserDirectoryError::AuthenticationLookup(_))
    ));
}

#[tokio::test]
async fn list_all_returns_users_with_their_roles() {
    let service = setup_service().await;

    let admin = seed_role(&service, ADMIN_ROLE_NAME).await;
    service
        .create_user(new_user("a@x.com", "pw1", vec![admin.clone()]))
        .await
        .unwrap();
    service
        .create_user(new_user("b@x.com", "pw2", vec![]))
        .await
        .unwrap();

    let users = service.get_users().await.unwrap();
    assert_eq!(users.len(), 2);

    let first = users.iter().find(|u| u.email == "a@x.com").unwrap();
    let second = users.iter().find(|u| u.email == "b@x.com").unwrap();
    assert_eq!(first.roles, vec![admin]);
    assert!(second.roles.is_empty());
}

#[tokio::test]
async fn connect_creates_missing_database_file() {
    let path = std::env::temp_dir().join(format!("user-directory-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());

    let pool = connect(&url).await.expect("file-backed pool");
    init_schema(&pool).await.expect("schema");

    let service = UserDirectoryService::with_collaborators(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RoleRepository::new(pool.clone())),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
    );

    let user = service
        .create_user(new_user("a@x.com", "pw1", vec![]))
        .await
        .unwrap();
    assert!(service.get_user(user.id).await.unwrap().is_some());

    pool.close().await;
    let _ = std::fs::remove_file(&path);
}

// ==================== BOOTSTRAP TESTS ====================

#[tokio::test]
async fn bootstrap_seeds_two_roles_and_two_users() {
    let service = setup_service().await;
    let config = SeedConfig::default();

    bootstrap(&service, &config).await.unwrap();

    let roles = service.get_roles().await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(roles.len(), 2);
    assert!(names.contains(&ADMIN_ROLE_NAME));
    assert!(names.contains(&USER_ROLE_NAME));

    let admin = service
        .get_user_by_email(&config.admin_email)
        .await
        .unwrap()
        .expect("seeded admin");
    assert_eq!(admin.roles.len(), 2);

    let user = service
        .get_user_by_email(&config.user_email)
        .await
        .unwrap()
        .expect("seeded user");
    assert_eq!(user.roles.len(), 1);
    assert_eq!(user.roles[0].name, USER_ROLE_NAME);

    // Seed passwords go through the normal hashing path.
    let hasher = BcryptPasswordHasher::with_cost(4);
    assert_ne!(admin.password_hash, config.admin_password);
    assert!(hasher
        .verify_password(&config.admin_password, &admin.password_hash)
        .unwrap());
}

#[tokio::test]
async fn bootstrap_twice_is_a_no_op() {
    let service = setup_service().await;
    let config = SeedConfig::default();

    bootstrap(&service, &config).await.unwrap();
    bootstrap(&service, &config).await.unwrap();

    assert_eq!(service.role_repo.count_roles().await.unwrap(), 2);
    assert_eq!(service.get_users().await.unwrap().len(), 2);
}
