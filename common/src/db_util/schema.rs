// Column types follow common/migrations/*/up.sql.

diesel::table! {
    schools (id) {
        id -> Integer,
        name -> Varchar,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Varchar,
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        role -> Varchar,
    }
}

diesel::table! {
    admins (id) {
        id -> Integer,
        user_id -> Integer,
        school_id -> Integer,
    }
}

diesel::table! {
    staff (id) {
        id -> Integer,
        user_id -> Integer,
        school_id -> Integer,
    }
}

diesel::table! {
    students (id) {
        id -> Integer,
        name -> Varchar,
        school_id -> Integer,
        active -> Bool,
    }
}

diesel::table! {
    reviews (id) {
        id -> Integer,
        staff_id -> Integer,
        student_id -> Integer,
        text -> Text,
        rating -> Integer,
        is_good -> Bool,
        created -> Timestamptz,
        edited -> Bool,
        deleted -> Bool,
    }
}

diesel::table! {
    votes (id) {
        id -> Integer,
        staff_id -> Integer,
        review_id -> Integer,
        value -> Varchar,
        time -> Timestamptz,
    }
}

diesel::table! {
    endorsements (id) {
        id -> Integer,
        staff_id -> Integer,
        student_id -> Integer,
        leadership -> Bool,
        respect -> Bool,
        punctuality -> Bool,
        participation -> Bool,
        teamwork -> Bool,
    }
}

diesel::table! {
    karma (student_id) {
        student_id -> Integer,
        score -> BigInt,
    }
}

diesel::table! {
    activity (id) {
        id -> Integer,
        user_id -> Integer,
        message -> Text,
        parameter -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(admins -> schools (school_id));
diesel::joinable!(admins -> users (user_id));
diesel::joinable!(staff -> schools (school_id));
diesel::joinable!(staff -> users (user_id));
diesel::joinable!(students -> schools (school_id));
diesel::joinable!(reviews -> staff (staff_id));
diesel::joinable!(reviews -> students (student_id));
diesel::joinable!(votes -> reviews (review_id));
diesel::joinable!(votes -> staff (staff_id));
diesel::joinable!(endorsements -> staff (staff_id));
diesel::joinable!(endorsements -> students (student_id));
diesel::joinable!(karma -> students (student_id));
diesel::joinable!(activity -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    schools,
    users,
    admins,
    staff,
    students,
    reviews,
    votes,
    endorsements,
    karma,
    activity,
);
