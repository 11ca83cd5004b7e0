//! Integration tests for linking tags to todos.

use std::collections::HashMap;

use ticklist_db::test_fixtures::TestDatabase;
use ticklist_db::{AddTagsRequest, Error, TagRepository, TodoRepository};
use uuid::Uuid;

fn request(names: &[&str]) -> AddTagsRequest {
    AddTagsRequest {
        names: names.iter().map(|n| n.to_string()).collect(),
        colors: HashMap::new(),
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_duplicate_names_create_one_tag_and_one_link() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;

    let outcome = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Frontend", "Frontend"]))
        .await
        .expect("add tags");

    assert!(outcome.success);
    assert_eq!(outcome.added.len(), 1);
    assert!(outcome.added[0].created);
    assert!(outcome.skipped.is_empty());
    assert_eq!(test_db.tag_count().await, 1);
    assert_eq!(test_db.link_count(todo.id).await, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_relinking_reports_skipped() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;
    let tags = &test_db.db.tags;

    let first = tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Backend"]))
        .await
        .expect("first add");
    let second = tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Backend"]))
        .await
        .expect("second add");

    assert_eq!(first.added.len(), 1);
    assert!(second.added.is_empty());
    assert_eq!(second.skipped.len(), 1);
    assert!(!second.skipped[0].created);
    assert_eq!(second.skipped[0].tag_id, first.added[0].tag_id);
    assert_eq!(test_db.link_count(todo.id).await, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_existing_tag_is_reused_across_todos() {
    let test_db = TestDatabase::new().await;
    let first_todo = test_db.todo("Read a book").await;
    let second_todo = test_db.todo("Exercise").await;
    let tags = &test_db.db.tags;

    let first = tags
        .add_tags_to_todo(&test_db.user_id, first_todo.id, request(&["urgent"]))
        .await
        .expect("first add");
    let second = tags
        .add_tags_to_todo(&test_db.user_id, second_todo.id, request(&["urgent"]))
        .await
        .expect("second add");

    assert!(first.added[0].created);
    assert!(!second.added[0].created);
    assert_eq!(first.added[0].tag_id, second.added[0].tag_id);
    assert_eq!(test_db.tag_count().await, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_bad_color_rejects_only_that_tag() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Walk the dog").await;

    let mut req = request(&["Tanstack", "polly", "Hono"]);
    req.colors.insert("polly".to_string(), "#22".to_string());
    req.colors.insert("Hono".to_string(), "#FF6600".to_string());

    let outcome = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, req)
        .await
        .expect("add tags");

    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].name, "polly");
    let added: Vec<_> = outcome.added.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(added, vec!["Tanstack", "Hono"]);
    assert_eq!(outcome.added[1].color, "#FF6600");
    assert_eq!(test_db.link_count(todo.id).await, 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_unknown_todo_writes_nothing() {
    let test_db = TestDatabase::new().await;
    let missing = Uuid::new_v4();

    let err = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, missing, request(&["X"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TodoNotFound(id) if id == missing));
    assert_eq!(test_db.tag_count().await, 0);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_other_users_todo_is_not_found() {
    let owner = TestDatabase::new().await;
    let intruder = TestDatabase::new().await;
    let todo = owner.todo("Buy groceries").await;

    let err = intruder
        .db
        .tags
        .add_tags_to_todo(&intruder.user_id, todo.id, request(&["mine"]))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(owner.link_count(todo.id).await, 0);

    intruder.cleanup().await;
    owner.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_blank_names_are_a_validation_error() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;

    let err = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["", "   "]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_tag_names_are_case_sensitive() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;

    let outcome = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Frontend", "frontend"]))
        .await
        .expect("add tags");

    assert_eq!(outcome.added.len(), 2);
    assert_eq!(test_db.tag_count().await, 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_deleting_todo_keeps_tags() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;
    test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Frontend", "Backend"]))
        .await
        .expect("add tags");

    let deleted = test_db
        .db
        .todos
        .delete(&test_db.user_id, todo.id)
        .await
        .expect("delete todo");

    assert!(deleted);
    assert_eq!(test_db.link_count(todo.id).await, 0);
    assert_eq!(test_db.tag_count().await, 2);

    let listed = test_db.db.tags.list(&test_db.user_id).await.expect("list");
    assert!(listed.iter().all(|t| t.todo_count == 0));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_nul_in_one_name_rejects_only_that_name() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;

    let outcome = test_db
        .db
        .tags
        .add_tags_to_todo(
            &test_db.user_id,
            todo.id,
            request(&["Frontend", "bad\u{0}name", "Backend"]),
        )
        .await
        .expect("add tags");

    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].name, "bad\u{0}name");
    let added: Vec<_> = outcome.added.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(added, vec!["Frontend", "Backend"]);
    assert_eq!(test_db.link_count(todo.id).await, 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_database_failure_rolls_back_whole_batch() {
    let test_db = TestDatabase::new().await;
    let todo = test_db.todo("Write code").await;

    // Fails inserts of "Boom" for this user only, so parallel tests are unaffected.
    let suffix = Uuid::new_v4().simple().to_string();
    let function = format!("reject_boom_{}", suffix);
    let trigger = format!("reject_boom_trg_{}", suffix);
    sqlx::query(&format!(
        r#"
        CREATE FUNCTION {function}() RETURNS trigger LANGUAGE plpgsql AS $$
        BEGIN
            IF NEW.user_id = '{user}' AND NEW.name = 'Boom' THEN
                RAISE EXCEPTION 'tag insert rejected';
            END IF;
            RETURN NEW;
        END
        $$
        "#,
        function = function,
        user = test_db.user_id,
    ))
    .execute(test_db.pool())
    .await
    .expect("create trigger function");
    sqlx::query(&format!(
        "CREATE TRIGGER {} BEFORE INSERT ON tags FOR EACH ROW EXECUTE FUNCTION {}()",
        trigger, function
    ))
    .execute(test_db.pool())
    .await
    .expect("create trigger");

    let result = test_db
        .db
        .tags
        .add_tags_to_todo(&test_db.user_id, todo.id, request(&["Frontend", "Boom", "Backend"]))
        .await;

    sqlx::query(&format!("DROP TRIGGER {} ON tags", trigger))
        .execute(test_db.pool())
        .await
        .expect("drop trigger");
    sqlx::query(&format!("DROP FUNCTION {}()", function))
        .execute(test_db.pool())
        .await
        .expect("drop trigger function");

    assert!(matches!(result, Err(Error::Database(_))));
    assert_eq!(test_db.link_count(todo.id).await, 0);
    assert_eq!(test_db.tag_count().await, 0);

    test_db.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_concurrent_adds_create_one_tag_and_one_link_each() {
    let test_db = TestDatabase::new().await;
    let mut todos = Vec::new();
    for i in 0..8 {
        todos.push(test_db.todo(&format!("Todo {}", i)).await);
    }
    let names = ["Frontend", "Backend", "urgent", "Hono", "polly"];

    let mut handles = Vec::new();
    for i in 0..32 {
        let tags = test_db.db.tags.clone();
        let user_id = test_db.user_id.clone();
        let todo_id = todos[i % todos.len()].id;
        handles.push(tokio::spawn(async move {
            tags.add_tags_to_todo(&user_id, todo_id, request(&names)).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.expect("task panicked").expect("add tags");
        assert!(outcome.success);
        assert_eq!(outcome.added.len() + outcome.skipped.len(), names.len());
    }

    assert_eq!(test_db.tag_count().await, names.len() as i64);
    for todo in &todos {
        assert_eq!(test_db.link_count(todo.id).await, names.len() as i64);
    }

    test_db.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_linking_survives_concurrent_tag_delete() {
    let test_db = TestDatabase::new().await;
    let anchor = test_db.todo("Anchor").await;
    let target = test_db.todo("Target").await;
    let tags = &test_db.db.tags;

    for _ in 0..20 {
        let seeded = tags
            .add_tags_to_todo(&test_db.user_id, anchor.id, request(&["Flaky"]))
            .await
            .expect("seed tag");
        let tag_id = seeded
            .added
            .iter()
            .chain(&seeded.skipped)
            .next()
            .expect("seeded link")
            .tag_id;

        let (linked, deleted) = tokio::join!(
            tags.add_tags_to_todo(&test_db.user_id, target.id, request(&["Flaky"])),
            tags.delete(&test_db.user_id, tag_id),
        );

        deleted.expect("delete tag");
        let linked = linked.expect("link while the tag is deleted");
        assert!(linked.success);
    }

    test_db.cleanup().await;
}
