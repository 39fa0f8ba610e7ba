use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use transit_auth::config::JwtConfig;
use transit_auth::models::{Role, User};
use transit_auth::services::{
    AuthService, AuthSettings, EmailProvider, InMemoryCodeStore, InMemoryUserStore, JwtService,
    MockEmailService,
};
use transit_auth::utils::{hash_password, Password};

pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestHarness {
    pub auth: AuthService,
    pub users: Arc<InMemoryUserStore>,
    pub codes: Arc<InMemoryCodeStore>,
    pub email: Arc<MockEmailService>,
    pub jwt: JwtService,
    pub user_id: Uuid,
}

pub fn test_jwt() -> JwtService {
    JwtService::new(&JwtConfig {
        secret: "integration-test-secret-32-bytes!".to_string(),
        token_expiry_minutes: 60,
    })
}

pub fn seed_user(users: &InMemoryUserStore, email: &str, password: &str, role: Role) -> Uuid {
    let hash = hash_password(&Password::new(password.to_string())).unwrap();
    let user = User::new(email.to_string(), hash, role);
    let user_id = user.user_id;
    users.insert(user);
    user_id
}

/// Orchestrator wired to in-memory collaborators and a five minute TTL,
/// seeded with one driver account.
pub fn harness() -> TestHarness {
    transit_auth::observability::init_logging("error");

    let users = Arc::new(InMemoryUserStore::new());
    let codes = Arc::new(InMemoryCodeStore::new());
    let email = Arc::new(MockEmailService::new());
    let jwt = test_jwt();

    let user_id = seed_user(&users, TEST_EMAIL, TEST_PASSWORD, Role::Driver);

    let auth = AuthService::new(
        users.clone(),
        codes.clone(),
        email.clone(),
        jwt.clone(),
        AuthSettings {
            code_ttl: chrono::Duration::seconds(300),
        },
    );

    TestHarness {
        auth,
        users,
        codes,
        email,
        jwt,
        user_id,
    }
}

/// Notifier that always fails, for pinning the no-rollback behavior.
pub struct FailingEmailService;

#[async_trait]
impl EmailProvider for FailingEmailService {
    async fn send_verification_code(
        &self,
        _to_email: &str,
        _code: &str,
    ) -> Result<(), anyhow::Error> {
        Err(anyhow::anyhow!("SMTP relay unreachable"))
    }
}
