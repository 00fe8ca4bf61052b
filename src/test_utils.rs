#[cfg(test)]
pub mod test_utils {
    use crate::lookup::RegistryClient;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use model::entities::profile::{ProfileStatus, Sector};
    use model::entities::{profile, user};
    use moka::future::Cache;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// User ids seeded by [`setup_test_app`].
    pub struct SeededUsers {
        /// A REPRESENTATIVE user
        pub rep_id: i32,
        /// A second REPRESENTATIVE user
        pub other_rep_id: i32,
        /// A COMMERCIAL (management) user
        pub manager_id: i32,
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Seed a user with an active profile, returning its id
    pub async fn seed_user(
        db: &DatabaseConnection,
        username: &str,
        sector: Sector,
        is_staff: bool,
    ) -> i32 {
        let user = user::ActiveModel {
            username: Set(username.to_string()),
            first_name: Set(username.to_string()),
            last_name: Set("Tester".to_string()),
            email: Set(None),
            is_active: Set(true),
            is_staff: Set(is_staff),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test user");

        profile::ActiveModel {
            user_id: Set(user.id),
            phone: Set(None),
            sector: Set(sector),
            status: Set(ProfileStatus::Active),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test profile");

        user.id
    }

    /// Create AppState for testing. The registry client points at a closed
    /// port with a single-attempt budget so nothing waits on the network.
    pub async fn setup_test_app_state() -> (AppState, SeededUsers) {
        let db = setup_test_db().await;

        let rep_id = seed_user(&db, "rep", Sector::Representative, false).await;
        let other_rep_id = seed_user(&db, "other_rep", Sector::Representative, false).await;
        let manager_id = seed_user(&db, "manager", Sector::Commercial, false).await;

        let cache = Cache::new(100);
        let registry =
            RegistryClient::with_policy("http://127.0.0.1:9", 1, Duration::from_millis(1));

        let state = AppState { db, cache, registry };
        let users = SeededUsers {
            rep_id,
            other_rep_id,
            manager_id,
        };
        (state, users)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> (Router, SeededUsers) {
        let _ = init_test_tracing();

        let (state, users) = setup_test_app_state().await;
        let router = create_router(state);
        (router, users)
    }
}
