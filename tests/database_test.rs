//! Postgres round-trip for the store implementations. These tests need a
//! reachable database and are ignored by default.

use chrono::Duration;
use uuid::Uuid;

use transit_auth::config::DatabaseConfig;
use transit_auth::models::{Role, User, VerificationCode};
use transit_auth::services::{CodeStore, Database, UserStore};
use transit_auth::utils::{hash_password, Password};

async fn connect() -> Database {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/transit_auth_test".to_string()),
        max_connections: 5,
        min_connections: 1,
    };

    let db = Database::connect(&config).await.expect("Failed to connect");
    db.run_migrations().await.expect("Failed to run migrations");
    db.health_check().await.expect("Database is not healthy");
    db
}

async fn seed_user(db: &Database) -> User {
    let hash = hash_password(&Password::new("password123".to_string())).unwrap();
    let user = User::new(
        format!("driver-{}@example.com", Uuid::new_v4()),
        hash,
        Role::Driver,
    );

    sqlx::query(
        "INSERT INTO users (user_id, email, password_hash, role_code, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user.user_id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role_code)
    .bind(user.created_at)
    .execute(db.pool())
    .await
    .expect("Failed to insert user");

    user
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn find_by_email_round_trips() {
    let db = connect().await;
    let user = seed_user(&db).await;

    let found = db.find_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.user_id);
    assert_eq!(found.role_code, "driver");

    assert!(db
        .find_by_email("missing@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn code_save_find_and_conditional_consume() {
    let db = connect().await;
    let user = seed_user(&db).await;

    let code = VerificationCode::new(user.user_id, "042137".to_string(), Duration::seconds(300));
    db.save(&code).await.unwrap();

    let found = db
        .find_unconsumed("042137", user.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.code_id, code.code_id);
    assert!(!found.consumed);

    // Another user never matches.
    assert!(db
        .find_unconsumed("042137", Uuid::new_v4())
        .await
        .unwrap()
        .is_none());

    // The guarded update transitions exactly once.
    assert!(db.consume(code.code_id).await.unwrap());
    assert!(!db.consume(code.code_id).await.unwrap());
    assert!(db
        .find_unconsumed("042137", user.user_id)
        .await
        .unwrap()
        .is_none());
}
