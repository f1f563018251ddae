use crm_core::repository::{UserListQuery, UserReader};

mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new("test_in_memory_connection.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn migrations_leave_an_empty_schema() {
    let test_db = common::TestDb::new("test_migrated_schema.db");
    let (total, users) = test_db.repo().list_users(UserListQuery::new()).unwrap();
    assert_eq!(total, 0);
    assert!(users.is_empty());
}
