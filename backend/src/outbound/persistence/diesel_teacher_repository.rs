//! PostgreSQL-backed teacher repository.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::{Teacher, TeacherFilter, TeacherId, TeacherProfile};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{TeacherRow, TeacherValues};
use super::pool::DbPool;
use super::schema::teachers;

/// Diesel-backed implementation of `RecordRepository<Teacher>`.
#[derive(Clone)]
pub struct DieselTeacherRepository {
    pool: DbPool,
}

impl DieselTeacherRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn values(profile: &TeacherProfile) -> TeacherValues<'_> {
    TeacherValues {
        firstname: &profile.firstname,
        lastname: &profile.lastname,
        email: &profile.email,
        subject: &profile.subject,
        phonenumber: profile.phonenumber.as_deref(),
        address: profile.address.as_deref(),
        hiredate: profile.hiredate,
        qualification: profile.qualification.as_deref(),
        bio: profile.bio.as_deref(),
        avatarurl: profile.avatarurl.as_deref(),
    }
}

fn row_to_teacher(row: TeacherRow) -> Teacher {
    Teacher {
        id: TeacherId::from_uuid(row.id),
        profile: TeacherProfile {
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            subject: row.subject,
            phonenumber: row.phonenumber,
            address: row.address,
            hiredate: row.hiredate,
            qualification: row.qualification,
            bio: row.bio,
            avatarurl: row.avatarurl,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl RecordRepository<Teacher> for DieselTeacherRepository {
    async fn list(&self, filter: &TeacherFilter) -> Result<Vec<Teacher>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = teachers::table
            .select(TeacherRow::as_select())
            .order((teachers::lastname.asc(), teachers::firstname.asc()))
            .into_boxed();
        if let Some(email) = &filter.email {
            query = query.filter(teachers::email.eq(email.clone()));
        }
        let rows: Vec<TeacherRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_teacher).collect())
    }

    async fn find_by_id(&self, id: TeacherId) -> Result<Option<Teacher>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = teachers::table
            .find(*id.as_uuid())
            .select(TeacherRow::as_select())
            .first::<TeacherRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_teacher))
    }

    async fn insert(&self, draft: &TeacherProfile) -> Result<Teacher, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(teachers::table)
            .values(&values(draft))
            .returning(TeacherRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_teacher)
            .map_err(map_diesel_error)
    }

    async fn replace(
        &self,
        id: TeacherId,
        draft: &TeacherProfile,
    ) -> Result<Option<Teacher>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(teachers::table.find(*id.as_uuid()))
            .set((&values(draft), teachers::updated_at.eq(Utc::now())))
            .returning(TeacherRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_teacher))
    }

    async fn delete(&self, id: TeacherId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(teachers::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
