use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::pagination::OffsetWindow,
    application::repos::{EmployeesRepo, RepoError},
    domain::entities::{EmployeeRecord, NewEmployee},
};

use super::{INSERT_CHUNK, PostgresRepositories, map_sqlx_error, push_window};

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    page_id: String,
    name: String,
    role: String,
    profile_url: String,
}

impl From<EmployeeRow> for EmployeeRecord {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            name: row.name,
            role: row.role,
            profile_url: row.profile_url,
        }
    }
}

#[async_trait]
impl EmployeesRepo for PostgresRepositories {
    async fn insert_employees(&self, employees: &[NewEmployee]) -> Result<u64, RepoError> {
        let mut inserted = 0;
        for chunk in employees.chunks(INSERT_CHUNK) {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO employees (id, page_id, name, role, profile_url) ",
            );
            qb.push_values(chunk, |mut row, employee| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(employee.page_id.as_str())
                    .push_bind(employee.name.as_str())
                    .push_bind(employee.role.as_str())
                    .push_bind(employee.profile_url.as_str());
            });
            inserted += qb
                .build()
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?
                .rows_affected();
        }
        Ok(inserted)
    }

    async fn list_employees(
        &self,
        page_id: &str,
        window: OffsetWindow,
    ) -> Result<Vec<EmployeeRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, page_id, name, role, profile_url FROM employees WHERE page_id = ",
        );
        qb.push_bind(page_id);
        // Insertion order.
        qb.push(" ORDER BY seq");
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<EmployeeRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EmployeeRecord::from).collect())
    }
}
