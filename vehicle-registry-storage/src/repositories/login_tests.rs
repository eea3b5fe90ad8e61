/// Tests for login repository
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use vehicle_registry_core::login::{role, Login};

    async fn setup_test_db() -> (LoginRepository, SqlitePool) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to connect to test database");

        crate::migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        (LoginRepository::new(pool.clone()), pool)
    }

    async fn insert_login(pool: &SqlitePool, login: &Login) {
        sqlx::query("INSERT INTO login (id, username, password) VALUES (?1, ?2, ?3)")
            .bind(login.id.to_string())
            .bind(&login.username)
            .bind(&login.password)
            .execute(pool)
            .await
            .expect("Failed to insert login");
        for r in &login.roles {
            sqlx::query("INSERT INTO login_role (login_id, role) VALUES (?1, ?2)")
                .bind(login.id.to_string())
                .bind(r)
                .execute(pool)
                .await
                .expect("Failed to insert role");
        }
    }

    #[tokio::test]
    async fn test_find_by_username_with_roles() {
        let (repo, pool) = setup_test_db().await;
        let login = Login::new(
            "anna",
            "$2b$12$hash",
            vec![role::VEHICLE.to_string(), role::ADMIN.to_string()],
        );
        insert_login(&pool, &login).await;

        let found = repo
            .find_by_username("anna")
            .await
            .expect("Failed to query")
            .expect("Login not found");

        assert_eq!(found.id, login.id);
        assert_eq!(found.username, "anna");
        assert_eq!(found.password, "$2b$12$hash");
        assert_eq!(found.roles, vec!["ADMIN", "VEHICLE"]);
        assert!(found.is_admin());
    }

    #[tokio::test]
    async fn test_find_by_username_is_exact_and_case_sensitive() {
        let (repo, pool) = setup_test_db().await;
        insert_login(
            &pool,
            &Login::new("anna", "$2b$12$hash", vec![role::VEHICLE.to_string()]),
        )
        .await;

        assert!(repo.find_by_username("Anna").await.unwrap().is_none());
        assert!(repo.find_by_username("ann").await.unwrap().is_none());
        assert!(repo.find_by_username("anna").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_username_exists() {
        let (repo, pool) = setup_test_db().await;
        assert!(!repo.username_exists("anna").await.unwrap());

        insert_login(
            &pool,
            &Login::new("anna", "$2b$12$hash", vec![role::VEHICLE.to_string()]),
        )
        .await;

        assert!(repo.username_exists("anna").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
