//! PostgreSQL-backed course repository.
//!
//! Reads join `teachers` so every course carries its instructor's email and
//! name. Writes touch only `courses`; the foreign key rejects unknown
//! teachers.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::{Course, CourseDraft, CourseFilter, CourseId, TeacherId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CourseRow, CourseValues, TeacherRow};
use super::pool::DbPool;
use super::schema::{courses, teachers};

/// Diesel-backed implementation of `RecordRepository<Course>`.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn values(draft: &CourseDraft) -> CourseValues<'_> {
    CourseValues {
        title: &draft.title,
        course_code: &draft.course_code,
        description: &draft.description,
        credits: draft.credits,
        duration: &draft.duration,
        difficulty_level: &draft.difficulty_level,
        teacher_id: *draft.teacher_id.as_uuid(),
    }
}

fn rows_to_course((course, teacher): (CourseRow, TeacherRow)) -> Course {
    Course {
        id: CourseId::from_uuid(course.id),
        draft: CourseDraft {
            title: course.title,
            course_code: course.course_code,
            description: course.description,
            credits: course.credits,
            duration: course.duration,
            difficulty_level: course.difficulty_level,
            teacher_id: TeacherId::from_uuid(course.teacher_id),
        },
        teacher_email: teacher.email,
        teacher_firstname: teacher.firstname,
        teacher_lastname: teacher.lastname,
        created_at: course.created_at,
        updated_at: course.updated_at,
    }
}

async fn load_course(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Course>, RepositoryError> {
    let row = courses::table
        .inner_join(teachers::table)
        .filter(courses::id.eq(id))
        .select((CourseRow::as_select(), TeacherRow::as_select()))
        .first::<(CourseRow, TeacherRow)>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(row.map(rows_to_course))
}

#[async_trait]
impl RecordRepository<Course> for DieselCourseRepository {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = courses::table
            .inner_join(teachers::table)
            .select((CourseRow::as_select(), TeacherRow::as_select()))
            .order(courses::title.asc())
            .into_boxed();
        if let Some(teacher_id) = filter.teacher_id {
            query = query.filter(courses::teacher_id.eq(*teacher_id.as_uuid()));
        }
        if let Some(email) = &filter.teacher_email {
            query = query.filter(teachers::email.eq(email.clone()));
        }
        let rows: Vec<(CourseRow, TeacherRow)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(rows_to_course).collect())
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_course(&mut conn, *id.as_uuid()).await
    }

    async fn insert(&self, draft: &CourseDraft) -> Result<Course, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: Uuid = diesel::insert_into(courses::table)
            .values(&values(draft))
            .returning(courses::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_course(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::query("inserted course vanished"))
    }

    async fn replace(
        &self,
        id: CourseId,
        draft: &CourseDraft,
    ) -> Result<Option<Course>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(courses::table.find(*id.as_uuid()))
            .set((&values(draft), courses::updated_at.eq(Utc::now())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Ok(None);
        }
        load_course(&mut conn, *id.as_uuid()).await
    }

    async fn delete(&self, id: CourseId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(courses::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
