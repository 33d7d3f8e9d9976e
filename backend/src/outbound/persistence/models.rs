//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain. `*Values` structs double as insert rows and full-replace
//! changesets, so `None` is written as `NULL` on update.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{courses, enrollments, students, teachers, users};

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentRow {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub grade: String,
    pub dateofbirth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phonenumber: Option<String>,
    pub enrollmentdate: Option<NaiveDate>,
    pub parentscontact: Option<String>,
    pub notes: Option<String>,
    pub avatarurl: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = students)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StudentValues<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub grade: &'a str,
    pub dateofbirth: Option<NaiveDate>,
    pub address: Option<&'a str>,
    pub phonenumber: Option<&'a str>,
    pub enrollmentdate: Option<NaiveDate>,
    pub parentscontact: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub avatarurl: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Teachers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeacherRow {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub subject: String,
    pub phonenumber: Option<String>,
    pub address: Option<String>,
    pub hiredate: Option<NaiveDate>,
    pub qualification: Option<String>,
    pub bio: Option<String>,
    pub avatarurl: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = teachers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TeacherValues<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub phonenumber: Option<&'a str>,
    pub address: Option<&'a str>,
    pub hiredate: Option<NaiveDate>,
    pub qualification: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatarurl: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub description: String,
    pub credits: i32,
    pub duration: String,
    pub difficulty_level: String,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseValues<'a> {
    pub title: &'a str,
    pub course_code: &'a str,
    pub description: &'a str,
    pub credits: i32,
    pub duration: &'a str,
    pub difficulty_level: &'a str,
    pub teacher_id: Uuid,
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub id: Uuid,
    pub enrollment_date: NaiveDate,
    pub completion_status: String,
    pub grade: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = enrollments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EnrollmentValues<'a> {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub teacher_id: Uuid,
    pub enrollment_date: NaiveDate,
    pub completion_status: &'a str,
    pub grade: Option<&'a str>,
    pub notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile columns of `users`; the digest is written separately.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct AccountValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub is_email_confirmed: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewAccountRow<'a> {
    #[diesel(embed)]
    pub values: AccountValues<'a>,
    pub password_hash: &'a str,
}
