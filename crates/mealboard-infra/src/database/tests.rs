use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use mealboard_core::domain::{Post, User};
use mealboard_core::ports::{PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn user_model(id: i64, email: &str) -> user::Model {
    user::Model {
        id,
        first_name: "Casey".to_owned(),
        last_name: "Western".to_owned(),
        email: email.to_owned(),
        password_hash: "$argon2id$fake".to_owned(),
        meal_plan: true,
        receives_notifications: true,
        is_active: true,
        created_at: Utc::now().into(),
    }
}

fn post_model(id: i64, reporter_id: i64) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        kind: post::Kind::FreeFood,
        title: "Test Post".to_owned(),
        description: Some("Content".to_owned()),
        building_code: "KSL".to_owned(),
        lat: 41.507354,
        lng: -81.609313,
        reporter_id,
        created_at: now.into(),
        expires_at: (now + chrono::Duration::hours(1)).into(),
        is_expired: false,
        is_flagged: false,
        flag_count: 0,
    }
}

#[tokio::test]
async fn test_find_user_by_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(7, "casey@example.edu")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result: Option<User> = repo.find_by_email("casey@example.edu").await.unwrap();

    let found = result.unwrap();
    assert_eq!(found.id, 7);
    assert_eq!(found.email, "casey@example.edu");
    assert!(found.is_active);
}

#[tokio::test]
async fn test_find_post_by_id_joins_reporter() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![(
            post_model(3, 7),
            user_model(7, "casey@example.edu"),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let view = repo.find_by_id(3).await.unwrap().unwrap();
    let fetched: Post = view.post;

    assert_eq!(fetched.id, 3);
    assert_eq!(fetched.title, "Test Post");
    assert_eq!(fetched.location.building_code, "KSL");

    let reporter = view.reporter.unwrap();
    assert_eq!(reporter.first_name, "Casey");
    assert_eq!(reporter.email, "casey@example.edu");
}

#[tokio::test]
async fn test_increment_flag_returns_fresh_count() {
    let mut flagged = post_model(3, 7);
    flagged.is_flagged = true;
    flagged.flag_count = 4;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult { last_insert_id: 0, rows_affected: 1 }])
        .append_query_results(vec![vec![flagged]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let count = repo.increment_flag(3).await.unwrap();
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_increment_flag_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult { last_insert_id: 0, rows_affected: 0 }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let err = repo.increment_flag(99).await.unwrap_err();
    assert!(matches!(err, mealboard_core::error::RepoError::NotFound));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult { last_insert_id: 0, rows_affected: 0 }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let err = repo.delete(99).await.unwrap_err();
    assert!(matches!(err, mealboard_core::error::RepoError::NotFound));
}
