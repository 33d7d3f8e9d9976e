//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Enrolled pupils.
    students (id) {
        id -> Uuid,
        firstname -> Varchar,
        lastname -> Varchar,
        email -> Text,
        grade -> Varchar,
        dateofbirth -> Nullable<Date>,
        address -> Nullable<Text>,
        phonenumber -> Nullable<Varchar>,
        enrollmentdate -> Nullable<Date>,
        parentscontact -> Nullable<Text>,
        notes -> Nullable<Text>,
        avatarurl -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Teaching staff.
    teachers (id) {
        id -> Uuid,
        firstname -> Varchar,
        lastname -> Varchar,
        email -> Text,
        subject -> Varchar,
        phonenumber -> Nullable<Varchar>,
        address -> Nullable<Text>,
        hiredate -> Nullable<Date>,
        qualification -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        avatarurl -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Course catalogue; `teacher_id` is `ON DELETE RESTRICT`.
    courses (id) {
        id -> Uuid,
        title -> Varchar,
        course_code -> Varchar,
        description -> Text,
        credits -> Int4,
        duration -> Varchar,
        difficulty_level -> Varchar,
        teacher_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student/course/teacher links with progress.
    enrollments (id) {
        id -> Uuid,
        student_id -> Uuid,
        course_id -> Uuid,
        teacher_id -> Uuid,
        enrollment_date -> Date,
        /// One of `Enrolled`, `In-Progress`, `Completed`, `Dropped`.
        completion_status -> Varchar,
        grade -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login accounts.
    users (user_id) {
        user_id -> Uuid,
        username -> Varchar,
        email -> Text,
        /// Argon2 PHC string.
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        /// One of `student`, `teacher`, `admin`.
        role -> Varchar,
        is_active -> Bool,
        is_email_confirmed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(courses -> teachers (teacher_id));

diesel::allow_tables_to_appear_in_same_query!(courses, enrollments, students, teachers, users,);
