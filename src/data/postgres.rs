use crate::{
    config::DbConfig,
    data::{Student, StudentStore},
    error::{
        GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu,
        StudentsResult,
    },
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

impl PostgresStudentStore {
    pub async fn new(options: PgPoolOptions, config: &DbConfig) -> StudentsResult<Self> {
        let pool = options
            .max_connections(config.max_connections())
            .connect(&config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;
        info!("Database migrations applied");

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> StudentsResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn list(&self) -> StudentsResult<Vec<Student>> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            r#"SELECT id, first_name, last_name, program FROM public."Student""#,
        )
        .fetch_all(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_by_id(&self, id: Uuid) -> StudentsResult<Option<Student>> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            r#"SELECT id, first_name, last_name, program FROM public."Student" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn add(&self, student: Student) -> StudentsResult<Student> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            r#"INSERT INTO public."Student" (id, first_name, last_name, program) VALUES ($1, $2, $3, $4) RETURNING id, first_name, last_name, program"#,
        )
        .bind(student.id)
        .bind(student.first_name)
        .bind(student.last_name)
        .bind(student.program)
        .fetch_one(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update(&self, student: Student) -> StudentsResult<Option<Student>> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            r#"UPDATE public."Student" SET first_name = $2, last_name = $3, program = $4 WHERE id = $1 RETURNING id, first_name, last_name, program"#,
        )
        .bind(student.id)
        .bind(student.first_name)
        .bind(student.last_name)
        .bind(student.program)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove(&self, id: Uuid) -> StudentsResult<bool> {
        let mut conn = self.get_connection().await?;

        let result = sqlx::query(r#"DELETE FROM public."Student" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
