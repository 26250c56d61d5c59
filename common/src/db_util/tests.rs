//! Storage tests. These run against the database named by `DATABASE_URL`, with
//! the migrations applied, inside a transaction that is never committed. They
//! return early when the variable is unset.

use super::*;

const REVIEW_TEXT: &str =
    "Consistently prepared for class and helps classmates when they fall behind.";

fn open_test_connection() -> Option<PgConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    let mut conn = PgConnection::establish(&url).expect("DATABASE_URL is set but unreachable");
    conn.begin_test_transaction()
        .expect("could not open test transaction");
    Some(conn)
}

fn new_school(conn: &mut PgConnection, tag: &str) -> SchoolRecord {
    insert_school(conn, &format!("Test School {tag} {}", std::process::id()))
        .expect("insert school")
}

fn new_staff(conn: &mut PgConnection, school: &SchoolRecord, tag: &str) -> StaffRecord {
    let username = format!("{tag}{}", std::process::id());
    let input = RegistrationInput {
        school: school.name.clone(),
        email: format!("{username}@school.test"),
        username,
        first_name: "Test".to_string(),
        last_name: "Staff".to_string(),
    };
    register_staff(conn, &input).expect("register staff").1
}

fn review(rating: i64) -> ReviewInput {
    ReviewInput {
        text: REVIEW_TEXT.to_string(),
        rating,
    }
}

fn validation_error(err: &anyhow::Error) -> Option<&ValidationError> {
    err.downcast_ref::<ValidationError>()
}

#[test_log::test]
fn test_unique_violation_becomes_validation_error() {
    let violation = QueryError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new("duplicate key value violates unique constraint".to_string()),
    );
    let err = on_unique_violation(violation, |_| ValidationError::DuplicateStudent("Ada".to_string()));
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::DuplicateStudent("Ada".to_string()))
    );

    let err = on_unique_violation(QueryError::NotFound, |_| {
        ValidationError::DuplicateStudent("Ada".to_string())
    });
    assert!(is_not_found(&err));
}

#[test_log::test]
fn test_new_student_starts_at_baseline() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "baseline");

    let student = insert_student(&mut conn, &weights, school.school_id, "Ada Obi").unwrap();
    assert_eq!(get_karma(&mut conn, student.student_id).unwrap().score, weights.baseline);
    assert!(find_karma(&mut conn, student.student_id).unwrap().is_some());
    assert!(find_karma(&mut conn, i32::MAX as u32).unwrap().is_none());
}

#[test_log::test]
fn test_same_name_twice_in_one_school_is_rejected() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "dupe");
    let other = new_school(&mut conn, "dupe-other");

    insert_student(&mut conn, &weights, school.school_id, "Ada Obi").unwrap();
    let err = insert_student(&mut conn, &weights, school.school_id, " Ada Obi ").unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::DuplicateStudent("Ada Obi".to_string()))
    );
    // The same name at another school is a different student.
    insert_student(&mut conn, &weights, other.school_id, "Ada Obi").unwrap();

    let roster = get_students_in_school(&mut conn, school.school_id, false).unwrap();
    assert_eq!(roster.len(), 1);
}

#[test_log::test]
fn test_importing_a_roster_twice_adds_nobody() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "import");
    let names: Vec<String> = ["Ada Obi", "Chi Eze", "Ada Obi", "  "]
        .iter()
        .map(ToString::to_string)
        .collect();

    let first = import_students(&mut conn, &weights, school.school_id, &names).unwrap();
    assert_eq!(first.created, vec!["Ada Obi".to_string(), "Chi Eze".to_string()]);
    assert_eq!(first.skipped, vec!["Ada Obi".to_string()]);

    let second = import_students(&mut conn, &weights, school.school_id, &names).unwrap();
    assert!(second.created.is_empty());

    let roster = get_students_in_school(&mut conn, school.school_id, false).unwrap();
    assert_eq!(roster.len(), 2);
    for student in &roster {
        assert_eq!(get_karma(&mut conn, student.student_id).unwrap().score, weights.baseline);
    }
}

#[test_log::test]
fn test_vote_round_trip_recomputes_karma() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "votes");
    let author = new_staff(&mut conn, &school, "votesauthor");
    let voter = new_staff(&mut conn, &school, "votesvoter");
    let student = insert_student(&mut conn, &weights, school.school_id, "Tunde Bello").unwrap();
    let written = insert_review(&mut conn, &weights, &author, student.student_id, &review(4)).unwrap();
    let score = |conn: &mut PgConnection| get_karma(conn, student.student_id).unwrap().score;
    assert_eq!(score(&mut conn), 150);

    let (action, votes) = cast_vote(&mut conn, &weights, &voter, written.review_id, VoteValue::Up).unwrap();
    assert_eq!(action, VoteAction::Insert(VoteValue::Up));
    assert_eq!(votes, VoteCount { upvotes: 1, downvotes: 0 });
    assert_eq!(score(&mut conn), 155);

    let (action, votes) = cast_vote(&mut conn, &weights, &voter, written.review_id, VoteValue::Down).unwrap();
    assert_eq!(action, VoteAction::Replace(VoteValue::Down));
    assert_eq!(votes, VoteCount { upvotes: 0, downvotes: 1 });
    assert_eq!(score(&mut conn), 145);

    let (action, votes) = cast_vote(&mut conn, &weights, &voter, written.review_id, VoteValue::Down).unwrap();
    assert_eq!(action, VoteAction::Clear);
    assert_eq!(votes, VoteCount::default());
    assert_eq!(score(&mut conn), 150);
    assert!(get_vote(&mut conn, &voter, written.review_id).unwrap().is_none());
}

#[test_log::test]
fn test_edit_and_delete_recompute_karma() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "edits");
    let author = new_staff(&mut conn, &school, "editsauthor");
    let student = insert_student(&mut conn, &weights, school.school_id, "Chi Eze").unwrap();
    let written = insert_review(&mut conn, &weights, &author, student.student_id, &review(5)).unwrap();
    assert_eq!(get_karma(&mut conn, student.student_id).unwrap().score, 150);

    let edited = edit_review(&mut conn, &weights, written.review_id, &review(1)).unwrap();
    assert!(edited.edited);
    assert!(!edited.is_good);
    assert_eq!(get_karma(&mut conn, student.student_id).unwrap().score, 50);

    let err = edit_review(&mut conn, &weights, written.review_id, &review(3)).unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::AlreadyEdited));

    delete_review(&mut conn, &weights, written.review_id).unwrap();
    assert_eq!(get_karma(&mut conn, student.student_id).unwrap().score, 100);
    assert!(get_reviews_for_student(&mut conn, student.student_id).unwrap().is_empty());

    let err = cast_vote(&mut conn, &weights, &author, written.review_id, VoteValue::Up).unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::ReviewDeleted));
}

#[test_log::test]
fn test_inactive_students_leave_the_leaderboard() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let weights = KarmaWeights::default();
    let school = new_school(&mut conn, "active");
    let ada = insert_student(&mut conn, &weights, school.school_id, "Ada Obi").unwrap();
    let chi = insert_student(&mut conn, &weights, school.school_id, "Chi Eze").unwrap();

    let board = get_leaderboard(&mut conn, school.school_id).unwrap();
    assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 1]);

    let updated = set_student_active(&mut conn, ada.student_id, false).unwrap();
    assert!(!updated.active);
    let board = get_leaderboard(&mut conn, school.school_id).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].student_id, chi.student_id);
    assert_eq!(get_students_in_school(&mut conn, school.school_id, true).unwrap().len(), 1);
    assert_eq!(get_students_in_school(&mut conn, school.school_id, false).unwrap().len(), 2);
}

#[test_log::test]
fn test_duplicate_registration_is_rejected() {
    let Some(mut conn) = open_test_connection() else {
        return;
    };
    let school = new_school(&mut conn, "register");
    let staff = new_staff(&mut conn, &school, "registerdupe");
    let user = get_user_by_id(&mut conn, staff.user_id).unwrap();

    let input = RegistrationInput {
        school: school.name.clone(),
        email: user.email.to_uppercase(),
        username: format!("{}-other", user.username),
        first_name: "Other".to_string(),
        last_name: "Person".to_string(),
    };
    let err = register_staff(&mut conn, &input).unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::DuplicateEmail(user.email.clone()))
    );
}
