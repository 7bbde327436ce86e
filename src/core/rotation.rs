use crate::core::{DatabaseUser, ManagementApi, Project, SecretStore};
use crate::utils::error::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

const PASSWORD_BYTES: usize = 16;

/// 16 random bytes, URL-safe base64 without padding (22 characters).
pub fn generate_password() -> String {
    let mut bytes = [0u8; PASSWORD_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Secret Manager ids allow letters, digits, `-` and `_` only.
pub fn secret_id(user: &DatabaseUser) -> String {
    format!("{}-{}", user.group_id, user.username)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationStatus {
    Rotated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    pub username: String,
    pub database: String,
    pub status: RotationStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RotationSummary {
    pub outcomes: Vec<RotationOutcome>,
}

impl RotationSummary {
    pub fn rotated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RotationStatus::Rotated)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.rotated()
    }
}

/// Rotates every database user of a project and stores the new passwords.
///
/// A user whose password update is rejected is logged and skipped. A failure
/// to save a secret aborts the run, since that password is already live and
/// no longer recoverable.
pub struct CredentialRotator<'a, A: ManagementApi, S: SecretStore> {
    api: &'a A,
    secrets: &'a S,
    password_fn: fn() -> String,
}

impl<'a, A: ManagementApi, S: SecretStore> CredentialRotator<'a, A, S> {
    pub fn new(api: &'a A, secrets: &'a S) -> Self {
        Self {
            api,
            secrets,
            password_fn: generate_password,
        }
    }

    pub fn with_password_generator(mut self, password_fn: fn() -> String) -> Self {
        self.password_fn = password_fn;
        self
    }

    pub async fn rotate_project(&self, project: &Project) -> Result<RotationSummary> {
        let users = self.api.list_database_users(&project.id).await?;
        tracing::info!("Total users under {} ({}): {}", project.name, project.id, users.len());

        let mut summary = RotationSummary::default();
        for user in users {
            let password = (self.password_fn)();

            if let Err(e) = self.api.update_password(&project.id, &user, &password).await {
                tracing::warn!(
                    "Unable to change password of {} for the DB {}: {}",
                    user.username,
                    user.database_name,
                    e
                );
                summary.outcomes.push(RotationOutcome {
                    username: user.username,
                    database: user.database_name,
                    status: RotationStatus::Failed(e.to_string()),
                });
                continue;
            }

            let id = secret_id(&user);
            if let Err(e) = self.secrets.save_secret(&id, &password).await {
                tracing::error!(
                    "Secret store failed while saving {} for the DB {}; aborting rotation",
                    user.username,
                    user.database_name
                );
                return Err(e);
            }

            tracing::info!("🔑 Rotated {} ({}) -> secret {}", user.username, user.database_name, id);
            summary.outcomes.push(RotationOutcome {
                username: user.username,
                database: user.database_name,
                status: RotationStatus::Rotated,
            });
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cluster;
    use crate::utils::error::ReporterError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn user(name: &str) -> DatabaseUser {
        DatabaseUser {
            username: name.to_string(),
            database_name: "admin".to_string(),
            group_id: "5f1a".to_string(),
        }
    }

    fn project() -> Project {
        Project {
            id: "5f1a".to_string(),
            name: "billing".to_string(),
            org_id: None,
        }
    }

    struct MockApi {
        users: Vec<DatabaseUser>,
        reject: Vec<&'static str>,
        updated: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ManagementApi for MockApi {
        async fn project_by_name(&self, _name: &str) -> Result<Project> {
            Ok(project())
        }

        async fn list_clusters(&self, _project_id: &str) -> Result<Vec<Cluster>> {
            Ok(vec![])
        }

        async fn list_database_users(&self, _project_id: &str) -> Result<Vec<DatabaseUser>> {
            Ok(self.users.clone())
        }

        async fn update_password(&self, _project_id: &str, user: &DatabaseUser, password: &str) -> Result<()> {
            if self.reject.contains(&user.username.as_str()) {
                return Err(ReporterError::ApiStatusError {
                    status: 404,
                    body: "USER_NOT_FOUND".to_string(),
                });
            }
            self.updated
                .lock()
                .unwrap()
                .push((user.username.clone(), password.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockSecrets {
        fail_on: Option<&'static str>,
        saved: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SecretStore for MockSecrets {
        async fn save_secret(&self, secret_id: &str, payload: &str) -> Result<()> {
            if self.fail_on.is_some_and(|id| id == secret_id) {
                return Err(ReporterError::secret_store("permission denied"));
            }
            self.saved
                .lock()
                .unwrap()
                .push((secret_id.to_string(), payload.to_string()));
            Ok(())
        }
    }

    fn fixed_password() -> String {
        "fixed-password".to_string()
    }

    #[test]
    fn test_generate_password_shape() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_secret_id_sanitizes() {
        assert_eq!(secret_id(&user("app.reader@corp")), "5f1a-app_reader_corp");
        assert_eq!(secret_id(&user("svc_ingest")), "5f1a-svc_ingest");
    }

    #[tokio::test]
    async fn test_rotation_continues_after_user_failure() {
        let api = MockApi {
            users: vec![user("alice"), user("bob"), user("carol")],
            reject: vec!["bob"],
            updated: Mutex::new(vec![]),
        };
        let secrets = MockSecrets::default();
        let rotator = CredentialRotator::new(&api, &secrets).with_password_generator(fixed_password);

        let summary = rotator.rotate_project(&project()).await.unwrap();

        assert_eq!(summary.rotated(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(summary.outcomes[1].status, RotationStatus::Failed(_)));

        let saved = secrets.saved.lock().unwrap();
        assert_eq!(
            *saved,
            vec![
                ("5f1a-alice".to_string(), "fixed-password".to_string()),
                ("5f1a-carol".to_string(), "fixed-password".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_secret_failure_aborts_run() {
        let api = MockApi {
            users: vec![user("alice"), user("bob"), user("carol")],
            reject: vec![],
            updated: Mutex::new(vec![]),
        };
        let secrets = MockSecrets {
            fail_on: Some("5f1a-bob"),
            ..Default::default()
        };
        let rotator = CredentialRotator::new(&api, &secrets);

        let result = rotator.rotate_project(&project()).await;

        assert!(matches!(result, Err(ReporterError::SecretStoreError { .. })));
        // carol 不應該被處理
        let updated = api.updated.lock().unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(secrets.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stored_secret_matches_applied_password() {
        let api = MockApi {
            users: vec![user("alice")],
            reject: vec![],
            updated: Mutex::new(vec![]),
        };
        let secrets = MockSecrets::default();

        CredentialRotator::new(&api, &secrets)
            .rotate_project(&project())
            .await
            .unwrap();

        let applied = &api.updated.lock().unwrap()[0].1;
        let stored = &secrets.saved.lock().unwrap()[0].1;
        assert_eq!(applied, stored);
    }
}
