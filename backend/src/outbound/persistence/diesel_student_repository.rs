//! PostgreSQL-backed student repository.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::{Student, StudentFilter, StudentId, StudentProfile};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{StudentRow, StudentValues};
use super::pool::DbPool;
use super::schema::{enrollments, students, teachers};

/// Diesel-backed implementation of `RecordRepository<Student>`.
#[derive(Clone)]
pub struct DieselStudentRepository {
    pool: DbPool,
}

impl DieselStudentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn values(profile: &StudentProfile) -> StudentValues<'_> {
    StudentValues {
        firstname: &profile.firstname,
        lastname: &profile.lastname,
        email: &profile.email,
        grade: &profile.grade,
        dateofbirth: profile.dateofbirth,
        address: profile.address.as_deref(),
        phonenumber: profile.phonenumber.as_deref(),
        enrollmentdate: profile.enrollmentdate,
        parentscontact: profile.parentscontact.as_deref(),
        notes: profile.notes.as_deref(),
        avatarurl: profile.avatarurl.as_deref(),
    }
}

fn row_to_student(row: StudentRow) -> Student {
    Student {
        id: StudentId::from_uuid(row.id),
        profile: StudentProfile {
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            grade: row.grade,
            dateofbirth: row.dateofbirth,
            address: row.address,
            phonenumber: row.phonenumber,
            enrollmentdate: row.enrollmentdate,
            parentscontact: row.parentscontact,
            notes: row.notes,
            avatarurl: row.avatarurl,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl RecordRepository<Student> for DieselStudentRepository {
    async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = students::table
            .select(StudentRow::as_select())
            .order((students::lastname.asc(), students::firstname.asc()))
            .into_boxed();
        if let Some(email) = &filter.email {
            query = query.filter(students::email.eq(email.clone()));
        }
        if let Some(teacher_id) = filter.teacher_id {
            query = query.filter(
                students::id.eq_any(
                    enrollments::table
                        .filter(enrollments::teacher_id.eq(*teacher_id.as_uuid()))
                        .select(enrollments::student_id),
                ),
            );
        }
        if let Some(teacher_email) = &filter.teacher_email {
            query = query.filter(
                students::id.eq_any(
                    enrollments::table
                        .filter(
                            enrollments::teacher_id.eq_any(
                                teachers::table
                                    .filter(teachers::email.eq(teacher_email.clone()))
                                    .select(teachers::id),
                            ),
                        )
                        .select(enrollments::student_id),
                ),
            );
        }

        let rows: Vec<StudentRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_student).collect())
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = students::table
            .find(*id.as_uuid())
            .select(StudentRow::as_select())
            .first::<StudentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_student))
    }

    async fn insert(&self, draft: &StudentProfile) -> Result<Student, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(students::table)
            .values(&values(draft))
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_student)
            .map_err(map_diesel_error)
    }

    async fn replace(
        &self,
        id: StudentId,
        draft: &StudentProfile,
    ) -> Result<Option<Student>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(students::table.find(*id.as_uuid()))
            .set((&values(draft), students::updated_at.eq(Utc::now())))
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_student))
    }

    async fn delete(&self, id: StudentId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(students::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
