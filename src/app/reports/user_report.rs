use crate::core::{ColumnPolicy, ManagementApi, Project, Record, ReportKind, ReportSource};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const USER_COLUMNS: [&str; 4] = ["Username", "DatabaseName", "ProjectName", "ProjectId"];

/// Database users of a project. Passwords are never part of the listing.
pub struct UserReport<'a, A: ManagementApi> {
    api: &'a A,
    project: &'a Project,
}

impl<'a, A: ManagementApi> UserReport<'a, A> {
    pub fn new(api: &'a A, project: &'a Project) -> Self {
        Self { api, project }
    }
}

#[async_trait]
impl<A: ManagementApi> ReportSource for UserReport<'_, A> {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let users = self.api.list_database_users(&self.project.id).await?;
        Ok(users
            .into_iter()
            .map(|user| {
                Record::new()
                    .with("Username", user.username)
                    .with("DatabaseName", user.database_name)
                    .with("ProjectName", self.project.name.as_str())
                    .with("ProjectId", user.group_id)
            })
            .collect())
    }

    fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::Fixed(USER_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    fn kind(&self) -> ReportKind {
        ReportKind::UserInfo
    }

    fn context(&self) -> &str {
        &self.project.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reports::test_support::MockApi;
    use crate::core::{tabulator, DatabaseUser};

    #[tokio::test]
    async fn test_user_rows() {
        let api = MockApi::with_users(vec![DatabaseUser {
            username: "app-reader".to_string(),
            database_name: "admin".to_string(),
            group_id: "5f1a".to_string(),
        }]);
        let project = MockApi::project();
        let report = UserReport::new(&api, &project);

        let table = tabulator::build(&report.fetch().await.unwrap(), &report.column_policy());

        assert_eq!(table.header, USER_COLUMNS.to_vec());
        assert_eq!(table.rows, vec![vec!["app-reader", "admin", "billing", "5f1a"]]);
    }
}
