//! PostgreSQL-backed enrollment repository.
//!
//! Every read joins students, courses and teachers into an
//! [`EnrollmentView`]. The teacher is joined through `enrollments.teacher_id`,
//! not through the course.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::{
    CompletionStatus, CourseId, EnrollmentDraft, EnrollmentFilter, EnrollmentId, EnrollmentView,
    StudentId, TeacherId,
};

use super::error_mapping::{corrupt_column, map_diesel_error, map_pool_error};
use super::models::{CourseRow, EnrollmentRow, EnrollmentValues, StudentRow, TeacherRow};
use super::pool::DbPool;
use super::schema::{courses, enrollments, students, teachers};

type ViewRow = (EnrollmentRow, StudentRow, CourseRow, TeacherRow);

/// Diesel-backed implementation of `RecordRepository<EnrollmentView>`.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn values(draft: &EnrollmentDraft) -> EnrollmentValues<'_> {
    EnrollmentValues {
        student_id: *draft.student_id.as_uuid(),
        course_id: *draft.course_id.as_uuid(),
        teacher_id: *draft.teacher_id.as_uuid(),
        enrollment_date: draft.enrollment_date,
        completion_status: draft.completion_status.as_str(),
        grade: draft.grade.as_deref(),
        notes: draft.notes.as_deref(),
    }
}

fn rows_to_view((enrollment, student, course, teacher): ViewRow) -> Result<EnrollmentView, RepositoryError> {
    let completion_status = enrollment
        .completion_status
        .parse::<CompletionStatus>()
        .map_err(|err| corrupt_column("enrollments.completion_status", err))?;
    Ok(EnrollmentView {
        enrollment_id: EnrollmentId::from_uuid(enrollment.id),
        enrollment_date: enrollment.enrollment_date,
        completion_status,
        grade: enrollment.grade,
        notes: enrollment.notes,
        student_id: StudentId::from_uuid(student.id),
        student_first_name: student.firstname,
        student_last_name: student.lastname,
        student_email: student.email,
        course_id: CourseId::from_uuid(course.id),
        course_title: course.title,
        course_code: course.course_code,
        course_description: course.description,
        course_credits: course.credits,
        course_duration: course.duration,
        course_difficulty_level: course.difficulty_level,
        teacher_id: TeacherId::from_uuid(teacher.id),
        teacher_first_name: teacher.firstname,
        teacher_last_name: teacher.lastname,
        teacher_email: teacher.email,
        teacher_subject: teacher.subject,
    })
}

/// Joined select over the four tables, boxed so filters can be appended.
macro_rules! view_query {
    () => {
        enrollments::table
            .inner_join(students::table.on(students::id.eq(enrollments::student_id)))
            .inner_join(courses::table.on(courses::id.eq(enrollments::course_id)))
            .inner_join(teachers::table.on(teachers::id.eq(enrollments::teacher_id)))
            .select((
                EnrollmentRow::as_select(),
                StudentRow::as_select(),
                CourseRow::as_select(),
                TeacherRow::as_select(),
            ))
            .into_boxed()
    };
}

async fn load_view(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<EnrollmentView>, RepositoryError> {
    let row = view_query!()
        .filter(enrollments::id.eq(id))
        .first::<ViewRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    row.map(rows_to_view).transpose()
}

#[async_trait]
impl RecordRepository<EnrollmentView> for DieselEnrollmentRepository {
    async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = view_query!().order(enrollments::enrollment_date.desc());
        if let Some(student_id) = filter.student_id {
            query = query.filter(enrollments::student_id.eq(*student_id.as_uuid()));
        }
        if let Some(teacher_id) = filter.teacher_id {
            query = query.filter(enrollments::teacher_id.eq(*teacher_id.as_uuid()));
        }
        if let Some(email) = &filter.student_email {
            query = query.filter(students::email.eq(email.clone()));
        }
        if let Some(email) = &filter.teacher_email {
            query = query.filter(teachers::email.eq(email.clone()));
        }
        let rows: Vec<ViewRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(rows_to_view).collect()
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_view(&mut conn, *id.as_uuid()).await
    }

    async fn insert(&self, draft: &EnrollmentDraft) -> Result<EnrollmentView, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: Uuid = diesel::insert_into(enrollments::table)
            .values(&values(draft))
            .returning(enrollments::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_view(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::query("inserted enrollment vanished"))
    }

    async fn replace(
        &self,
        id: EnrollmentId,
        draft: &EnrollmentDraft,
    ) -> Result<Option<EnrollmentView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(enrollments::table.find(*id.as_uuid()))
            .set((&values(draft), enrollments::updated_at.eq(Utc::now())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Ok(None);
        }
        load_view(&mut conn, *id.as_uuid()).await
    }

    async fn delete(&self, id: EnrollmentId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(enrollments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
