/// Tests for write service
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::notify::{LogNotifier, Notifier, SendOutcome};
    use crate::repositories::{LoginRepository, VehicleRepository};
    use crate::services::{IdentityService, RawCredential};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use uuid::Uuid;
    use vehicle_registry_core::vehicle::{Vehicle, VehicleOwner, VehicleType};
    use vehicle_registry_core::version::format_token;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _vehicle: &Vehicle) -> SendOutcome {
            SendOutcome::SendFailed("mail server unreachable".to_string())
        }
    }

    async fn setup_test_service(
        notifier: Arc<dyn Notifier>,
    ) -> (VehicleWriteService, Arc<VehicleRepository>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to connect to test database");

        crate::migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let vehicles = Arc::new(VehicleRepository::new(pool.clone()));
        let identity = Arc::new(IdentityService::new(Arc::new(LoginRepository::new(pool))));
        let service = VehicleWriteService::new(Arc::clone(&vehicles), identity, notifier);
        (service, vehicles)
    }

    fn test_vehicle(plate: &str, username: &str) -> Vehicle {
        Vehicle::builder()
            .description("Van")
            .plate(plate)
            .mileage(0)
            .vehicle_type(VehicleType::Commercial)
            .owner(VehicleOwner::new("Anna", "Muster"))
            .username(username)
            .build()
            .unwrap()
    }

    fn test_credential(username: &str) -> RawCredential {
        RawCredential::new(username, "Sup3r-geheim")
    }

    #[tokio::test]
    async fn test_create_persists_vehicle_and_credential() {
        let (service, vehicles) = setup_test_service(Arc::new(LogNotifier)).await;

        let outcome = service
            .create(test_vehicle("KA X 7", "Anna"), &test_credential("Anna"))
            .await
            .unwrap();

        let CreateOutcome::Created(created) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        // The canonical lowercased username is carried on the vehicle.
        assert_eq!(created.username, "anna");

        let stored = vehicles.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.plate, "KA X 7");
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn test_create_collects_all_violations() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;

        let mut vehicle = test_vehicle("not a plate", "anna");
        vehicle.description = String::new();
        vehicle.mileage = -1;

        let outcome = service
            .create(vehicle, &test_credential("anna"))
            .await
            .unwrap();
        let CreateOutcome::Invalid(violations) = outcome else {
            panic!("expected Invalid, got {outcome:?}");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert!(fields.contains(&"description"));
        assert!(fields.contains(&"plate"));
        assert!(fields.contains(&"mileage"));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_plate_and_username() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;

        let outcome = service
            .create(test_vehicle("KA X 7", "anna"), &test_credential("anna"))
            .await
            .unwrap();
        assert_matches!(outcome, CreateOutcome::Created(_));

        let outcome = service
            .create(test_vehicle("KA X 7", "max"), &test_credential("max"))
            .await
            .unwrap();
        assert_eq!(outcome, CreateOutcome::PlateTaken("KA X 7".to_string()));

        let outcome = service
            .create(test_vehicle("M AB 123", "Anna"), &test_credential("Anna"))
            .await
            .unwrap();
        assert_eq!(outcome, CreateOutcome::UsernameTaken("anna".to_string()));
    }

    #[tokio::test]
    async fn test_create_rejects_weak_password() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;

        let outcome = service
            .create(
                test_vehicle("KA X 7", "anna"),
                &RawCredential::new("anna", "weak"),
            )
            .await
            .unwrap();
        assert_eq!(outcome, CreateOutcome::InvalidCredential);
    }

    #[tokio::test]
    async fn test_notification_failure_downgrades_but_persists() {
        let (service, vehicles) = setup_test_service(Arc::new(FailingNotifier)).await;

        let outcome = service
            .create(test_vehicle("KA X 7", "anna"), &test_credential("anna"))
            .await
            .unwrap();

        let CreateOutcome::CreatedWithoutNotification(created, reason) = outcome else {
            panic!("expected CreatedWithoutNotification, got {outcome:?}");
        };
        assert_eq!(reason, "mail server unreachable");
        assert!(vehicles.find_by_id(created.id).await.unwrap().is_some());
    }

    async fn create_vehicle(service: &VehicleWriteService, plate: &str, username: &str) -> Vehicle {
        match service
            .create(test_vehicle(plate, username), &test_credential(username))
            .await
            .unwrap()
        {
            CreateOutcome::Created(vehicle) => vehicle,
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_under_matching_token() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        let created = create_vehicle(&service, "KA X 7", "anna").await;

        let mut incoming = test_vehicle("KA X 7", "anna");
        incoming.mileage = 9_999_999;

        let outcome = service
            .update(created.id, &incoming, &format_token(0))
            .await
            .unwrap();
        let UpdateOutcome::Updated(updated) = outcome else {
            panic!("expected Updated, got {outcome:?}");
        };
        assert_eq!(updated.version, 1);
        assert_eq!(updated.mileage, 9_999_999);
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_mileage() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        let created = create_vehicle(&service, "KA X 7", "anna").await;

        let mut incoming = test_vehicle("KA X 7", "anna");
        incoming.mileage = 10_000_000;

        let outcome = service
            .update(created.id, &incoming, &format_token(0))
            .await
            .unwrap();
        let UpdateOutcome::Invalid(violations) = outcome else {
            panic!("expected Invalid, got {outcome:?}");
        };
        assert!(violations.iter().any(|v| v.field == "mileage"));
    }

    #[tokio::test]
    async fn test_update_version_guard() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        let created = create_vehicle(&service, "KA X 7", "anna").await;
        let incoming = test_vehicle("KA X 7", "anna");

        // Move the stored version to 1
        let outcome = service
            .update(created.id, &incoming, "\"0\"")
            .await
            .unwrap();
        assert_matches!(outcome, UpdateOutcome::Updated(_));

        let outcome = service
            .update(created.id, &incoming, "\"0\"")
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::VersionStale(0));

        let outcome = service.update(created.id, &incoming, "0").await.unwrap();
        assert_eq!(outcome, UpdateOutcome::VersionMalformed("0".to_string()));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        create_vehicle(&service, "KA X 7", "anna").await;

        let outcome = service
            .update(Uuid::new_v4(), &test_vehicle("KA X 7", "anna"), "\"0\"")
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_update_to_a_taken_plate() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        create_vehicle(&service, "KA X 7", "anna").await;
        let second = create_vehicle(&service, "M AB 123", "max").await;

        let incoming = test_vehicle("KA X 7", "max");
        let outcome = service
            .update(second.id, &incoming, &format_token(0))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::PlateTaken("KA X 7".to_string()));

        // The unchanged plate never triggers the check.
        let unchanged = test_vehicle("M AB 123", "max");
        let outcome = service
            .update(second.id, &unchanged, &format_token(0))
            .await
            .unwrap();
        assert_matches!(outcome, UpdateOutcome::Updated(_));
    }

    #[tokio::test]
    async fn test_delete_is_a_no_op_for_unknown_ids() {
        let (service, _vehicles) = setup_test_service(Arc::new(LogNotifier)).await;
        let created = create_vehicle(&service, "KA X 7", "anna").await;

        assert!(service.delete(created.id).await.unwrap());
        assert!(!service.delete(created.id).await.unwrap());
        assert!(!service.delete(Uuid::new_v4()).await.unwrap());
    }
}
