//! Bootstrap seeding of initial users
//!
//! Talks to the primary directly rather than through the query router, and has
//! its own bounded retry loop for a database that is still starting up.

use authgate_core::credentials::hash_password;
use authgate_core::{AuthgateError, Endpoint, SeedConfig, Settings};
use authgate_types::Role;
use sqlx::Connection;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::connectors::{classify_sqlx_error, PostgresConnector};

const UPSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    ON CONFLICT (username)
    DO UPDATE SET
        email = EXCLUDED.email,
        password_hash = EXCLUDED.password_hash
"#;

/// A user to insert or update, with a plaintext password
#[derive(Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SeedUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Parses `username:email:password`; the password may itself contain `:`
impl FromStr for SeedUser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(u), Some(e), Some(p)) if !u.is_empty() && !e.is_empty() && !p.is_empty() => {
                Ok(SeedUser::new(u, e, p))
            }
            _ => Err(format!(
                "Invalid seed user '{}': expected username:email:password",
                s.split(':').next().unwrap_or_default()
            )),
        }
    }
}

/// Inserts or updates the initial users on the primary
pub struct Seeder {
    connector: PostgresConnector,
    primary: Endpoint,
    policy: SeedConfig,
}

impl Seeder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            connector: PostgresConnector::new(&settings.database),
            primary: settings.database.endpoint(Role::Primary),
            policy: settings.seed.clone(),
        }
    }

    /// Upsert every user in one transaction, retrying while the primary is unreachable.
    ///
    /// Returns the number of users written.
    pub async fn seed(&self, users: &[SeedUser]) -> Result<usize, AuthgateError> {
        let primary = &self.primary;
        retry_unavailable(&self.policy, move |attempt| {
            info!(
                "Connecting to {} (attempt {}/{})",
                primary, attempt, self.policy.max_retries
            );
            self.seed_once(users)
        })
        .await
    }

    async fn seed_once(&self, users: &[SeedUser]) -> Result<usize, AuthgateError> {
        let mut conn = self.connector.connect(&self.primary).await?;
        let mut tx = conn.begin().await.map_err(classify_sqlx_error)?;

        for user in users {
            sqlx::query(UPSERT_USER)
                .bind(&user.username)
                .bind(&user.email)
                .bind(hash_password(&user.password))
                .execute(&mut *tx)
                .await
                .map_err(classify_sqlx_error)?;
            info!("User '{}' inserted/updated", user.username);
        }

        tx.commit().await.map_err(classify_sqlx_error)?;
        if let Err(e) = conn.close().await {
            debug!("Error closing seed connection: {}", e);
        }

        info!("Seeded {} user(s)", users.len());
        Ok(users.len())
    }
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. Attempts are numbered from 1.
pub async fn retry_unavailable<T, F, Fut>(policy: &SeedConfig, mut attempt: F) -> Result<T, AuthgateError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AuthgateError>>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut n = 1;

    loop {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && n < max_attempts => {
                warn!(
                    "Database not reachable ({}); retrying in {}s",
                    e, policy.retry_delay_secs
                );
                tokio::time::sleep(policy.retry_delay()).await;
                n += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    error!("Giving up after {} attempt(s)", n);
                }
                return Err(e);
            }
        }
    }
}
