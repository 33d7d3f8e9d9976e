//! `RecordRepository` implementations over the in-process tables.

use std::cmp::Reverse;

use async_trait::async_trait;

use super::{
    AccountRow, CourseRow, EnrollmentRow, MemoryStore, Tables, account_from_draft,
    foreign_key_violation, unique_email,
};
use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::{
    Account, AccountDraft, AccountFilter, Course, CourseDraft, CourseFilter, CourseId,
    EnrollmentDraft, EnrollmentFilter, EnrollmentId, EnrollmentView, Student, StudentFilter,
    StudentId, StudentProfile, Teacher, TeacherFilter, TeacherId, TeacherProfile, UserId,
};

fn teacher_id_for_email(tables: &Tables, email: &str) -> Option<TeacherId> {
    tables
        .teachers
        .iter()
        .find(|teacher| teacher.profile.email == email)
        .map(|teacher| teacher.id)
}

/// Resolve the teacher named by an id filter, an email filter, or both.
///
/// `Some(None)` means a filter was given but matches no teacher.
fn requested_teacher(
    tables: &Tables,
    id: Option<TeacherId>,
    email: Option<&String>,
) -> Option<Option<TeacherId>> {
    match (id, email) {
        (None, None) => None,
        (Some(id), None) => Some(Some(id)),
        (None, Some(email)) => Some(teacher_id_for_email(tables, email)),
        (Some(id), Some(email)) => {
            Some(teacher_id_for_email(tables, email).filter(|found| *found == id))
        }
    }
}

fn course_view(tables: &Tables, row: &CourseRow) -> Option<Course> {
    let teacher = tables
        .teachers
        .iter()
        .find(|teacher| teacher.id == row.draft.teacher_id)?;
    Some(Course {
        id: row.id,
        draft: row.draft.clone(),
        teacher_email: teacher.profile.email.clone(),
        teacher_firstname: teacher.profile.firstname.clone(),
        teacher_lastname: teacher.profile.lastname.clone(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn enrollment_view(tables: &Tables, row: &EnrollmentRow) -> Option<EnrollmentView> {
    let draft = &row.draft;
    let student = tables.students.iter().find(|s| s.id == draft.student_id)?;
    let course = tables.courses.iter().find(|c| c.id == draft.course_id)?;
    let teacher = tables.teachers.iter().find(|t| t.id == draft.teacher_id)?;
    Some(EnrollmentView {
        enrollment_id: row.id,
        enrollment_date: draft.enrollment_date,
        completion_status: draft.completion_status,
        grade: draft.grade.clone(),
        notes: draft.notes.clone(),
        student_id: student.id,
        student_first_name: student.profile.firstname.clone(),
        student_last_name: student.profile.lastname.clone(),
        student_email: student.profile.email.clone(),
        course_id: course.id,
        course_title: course.draft.title.clone(),
        course_code: course.draft.course_code.clone(),
        course_description: course.draft.description.clone(),
        course_credits: course.draft.credits,
        course_duration: course.draft.duration.clone(),
        course_difficulty_level: course.draft.difficulty_level.clone(),
        teacher_id: teacher.id,
        teacher_first_name: teacher.profile.firstname.clone(),
        teacher_last_name: teacher.profile.lastname.clone(),
        teacher_email: teacher.profile.email.clone(),
        teacher_subject: teacher.profile.subject.clone(),
    })
}

fn check_course_refs(tables: &Tables, draft: &CourseDraft) -> Result<(), RepositoryError> {
    if tables.teachers.iter().any(|t| t.id == draft.teacher_id) {
        Ok(())
    } else {
        Err(foreign_key_violation("courses", "teacher_id"))
    }
}

fn check_enrollment_refs(tables: &Tables, draft: &EnrollmentDraft) -> Result<(), RepositoryError> {
    if !tables.students.iter().any(|s| s.id == draft.student_id) {
        return Err(foreign_key_violation("enrollments", "student_id"));
    }
    if !tables.courses.iter().any(|c| c.id == draft.course_id) {
        return Err(foreign_key_violation("enrollments", "course_id"));
    }
    if !tables.teachers.iter().any(|t| t.id == draft.teacher_id) {
        return Err(foreign_key_violation("enrollments", "teacher_id"));
    }
    Ok(())
}

#[async_trait]
impl RecordRepository<Student> for MemoryStore {
    async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, RepositoryError> {
        let tables = self.lock()?;
        let teacher = requested_teacher(&tables, filter.teacher_id, filter.teacher_email.as_ref());
        let mut rows: Vec<Student> = tables
            .students
            .iter()
            .filter(|s| filter.email.as_ref().is_none_or(|e| &s.profile.email == e))
            .filter(|s| match teacher {
                None => true,
                Some(None) => false,
                Some(Some(teacher_id)) => tables
                    .enrollments
                    .iter()
                    .any(|e| e.draft.student_id == s.id && e.draft.teacher_id == teacher_id),
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.profile.lastname, &a.profile.firstname)
                .cmp(&(&b.profile.lastname, &b.profile.firstname))
        });
        Ok(rows)
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn insert(&self, draft: &StudentProfile) -> Result<Student, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        unique_email(tables.students.iter().map(|s| &s.profile.email), &draft.email, "students")?;
        let student = Student {
            id: StudentId::random(),
            profile: draft.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn replace(
        &self,
        id: StudentId,
        draft: &StudentProfile,
    ) -> Result<Option<Student>, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        unique_email(
            tables
                .students
                .iter()
                .filter(|s| s.id != id)
                .map(|s| &s.profile.email),
            &draft.email,
            "students",
        )?;
        Ok(tables.students.iter_mut().find(|s| s.id == id).map(|s| {
            s.profile = draft.clone();
            s.updated_at = now;
            s.clone()
        }))
    }

    async fn delete(&self, id: StudentId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        if tables.students.len() == before {
            return Ok(false);
        }
        tables.enrollments.retain(|e| e.draft.student_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RecordRepository<Teacher> for MemoryStore {
    async fn list(&self, filter: &TeacherFilter) -> Result<Vec<Teacher>, RepositoryError> {
        let tables = self.lock()?;
        let mut rows: Vec<Teacher> = tables
            .teachers
            .iter()
            .filter(|t| filter.email.as_ref().is_none_or(|e| &t.profile.email == e))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.profile.lastname, &a.profile.firstname)
                .cmp(&(&b.profile.lastname, &b.profile.firstname))
        });
        Ok(rows)
    }

    async fn find_by_id(&self, id: TeacherId) -> Result<Option<Teacher>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.teachers.iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, draft: &TeacherProfile) -> Result<Teacher, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        unique_email(tables.teachers.iter().map(|t| &t.profile.email), &draft.email, "teachers")?;
        let teacher = Teacher {
            id: TeacherId::random(),
            profile: draft.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.teachers.push(teacher.clone());
        Ok(teacher)
    }

    async fn replace(
        &self,
        id: TeacherId,
        draft: &TeacherProfile,
    ) -> Result<Option<Teacher>, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        unique_email(
            tables
                .teachers
                .iter()
                .filter(|t| t.id != id)
                .map(|t| &t.profile.email),
            &draft.email,
            "teachers",
        )?;
        Ok(tables.teachers.iter_mut().find(|t| t.id == id).map(|t| {
            t.profile = draft.clone();
            t.updated_at = now;
            t.clone()
        }))
    }

    async fn delete(&self, id: TeacherId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.teachers.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        let referenced = tables.courses.iter().any(|c| c.draft.teacher_id == id)
            || tables.enrollments.iter().any(|e| e.draft.teacher_id == id);
        if referenced {
            return Err(RepositoryError::query(
                "update or delete on table \"teachers\" violates foreign key constraint",
            ));
        }
        tables.teachers.retain(|t| t.id != id);
        Ok(true)
    }
}

#[async_trait]
impl RecordRepository<Course> for MemoryStore {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, RepositoryError> {
        let tables = self.lock()?;
        let teacher = requested_teacher(&tables, filter.teacher_id, filter.teacher_email.as_ref());
        let mut rows: Vec<Course> = tables
            .courses
            .iter()
            .filter(|c| match teacher {
                None => true,
                Some(None) => false,
                Some(Some(teacher_id)) => c.draft.teacher_id == teacher_id,
            })
            .filter_map(|c| course_view(&tables, c))
            .collect();
        rows.sort_by(|a, b| a.draft.title.cmp(&b.draft.title));
        Ok(rows)
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .courses
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| course_view(&tables, c)))
    }

    async fn insert(&self, draft: &CourseDraft) -> Result<Course, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        check_course_refs(&tables, draft)?;
        let row = CourseRow {
            id: CourseId::random(),
            draft: draft.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.courses.push(row.clone());
        course_view(&tables, &row).ok_or_else(|| foreign_key_violation("courses", "teacher_id"))
    }

    async fn replace(
        &self,
        id: CourseId,
        draft: &CourseDraft,
    ) -> Result<Option<Course>, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        check_course_refs(&tables, draft)?;
        let Some(row) = tables.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        row.draft = draft.clone();
        row.updated_at = now;
        let row = row.clone();
        Ok(course_view(&tables, &row))
    }

    async fn delete(&self, id: CourseId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != id);
        if tables.courses.len() == before {
            return Ok(false);
        }
        tables.enrollments.retain(|e| e.draft.course_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RecordRepository<EnrollmentView> for MemoryStore {
    async fn list(&self, filter: &EnrollmentFilter) -> Result<Vec<EnrollmentView>, RepositoryError> {
        let tables = self.lock()?;
        let mut rows: Vec<EnrollmentView> = tables
            .enrollments
            .iter()
            .filter_map(|row| enrollment_view(&tables, row))
            .filter(|v| filter.student_id.is_none_or(|id| v.student_id == id))
            .filter(|v| filter.teacher_id.is_none_or(|id| v.teacher_id == id))
            .filter(|v| filter.student_email.as_ref().is_none_or(|e| &v.student_email == e))
            .filter(|v| filter.teacher_email.as_ref().is_none_or(|e| &v.teacher_email == e))
            .collect();
        rows.sort_by_key(|v| Reverse(v.enrollment_date));
        Ok(rows)
    }

    async fn find_by_id(&self, id: EnrollmentId) -> Result<Option<EnrollmentView>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .enrollments
            .iter()
            .find(|row| row.id == id)
            .and_then(|row| enrollment_view(&tables, row)))
    }

    async fn insert(&self, draft: &EnrollmentDraft) -> Result<EnrollmentView, RepositoryError> {
        let mut tables = self.lock()?;
        check_enrollment_refs(&tables, draft)?;
        let row = EnrollmentRow {
            id: EnrollmentId::random(),
            draft: draft.clone(),
        };
        tables.enrollments.push(row.clone());
        enrollment_view(&tables, &row)
            .ok_or_else(|| foreign_key_violation("enrollments", "student_id"))
    }

    async fn replace(
        &self,
        id: EnrollmentId,
        draft: &EnrollmentDraft,
    ) -> Result<Option<EnrollmentView>, RepositoryError> {
        let mut tables = self.lock()?;
        check_enrollment_refs(&tables, draft)?;
        let Some(row) = tables.enrollments.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };
        row.draft = draft.clone();
        let row = row.clone();
        Ok(enrollment_view(&tables, &row))
    }

    async fn delete(&self, id: EnrollmentId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|row| row.id != id);
        Ok(tables.enrollments.len() != before)
    }
}

#[async_trait]
impl RecordRepository<Account> for MemoryStore {
    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let tables = self.lock()?;
        let mut rows: Vec<Account> = tables
            .users
            .iter()
            .map(|row| &row.account)
            .filter(|a| filter.role.is_none_or(|role| a.role == role))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|row| row.account.user_id == id)
            .map(|row| row.account.clone()))
    }

    async fn insert(&self, draft: &AccountDraft) -> Result<Account, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        Self::insert_account(&mut tables, draft, now)
    }

    async fn replace(
        &self,
        id: UserId,
        draft: &AccountDraft,
    ) -> Result<Option<Account>, RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        unique_email(
            tables
                .users
                .iter()
                .filter(|row| row.account.user_id != id)
                .map(|row| &row.account.email),
            &draft.email,
            "users",
        )?;
        let Some(row) = tables.users.iter_mut().find(|row| row.account.user_id == id) else {
            return Ok(None);
        };
        let AccountRow { account, password } = row;
        *account = account_from_draft(id, draft, account.created_at, now);
        if let Some(digest) = &draft.password {
            *password = digest.clone();
        }
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.users.len();
        tables.users.retain(|row| row.account.user_id != id);
        Ok(tables.users.len() != before)
    }
}
