//! PostgreSQL user directory against a real database.
//!
//! Run with: cargo test -p domain_notifications --test directory_test -- --ignored

use domain_notifications::{PgUserDirectory, UserDirectory};
use test_utils::{TestDataBuilder, TestDatabase};

#[tokio::test]
#[ignore]
async fn test_resolves_contacts_and_drops_unknown_ids() {
    let db = TestDatabase::new().await;
    let data = TestDataBuilder::from_test_name("directory_lookup");
    let ids = data.user_ids(4);

    db.seed_user(&ids[0], Some(&data.email(0)), Some(&data.phone(0)))
        .await;
    db.seed_user(&ids[1], Some(&data.email(1)), None).await;
    db.seed_user(&ids[2], None, Some(&data.phone(2))).await;

    let directory = PgUserDirectory::new(db.connection());

    let mut emails = directory.emails_by_ids(&ids).await.unwrap();
    emails.sort();
    let mut expected = vec![data.email(0), data.email(1)];
    expected.sort();
    assert_eq!(emails, expected);

    let mut phones = directory.phones_by_ids(&ids).await.unwrap();
    phones.sort();
    let mut expected = vec![data.phone(0), data.phone(2)];
    expected.sort();
    assert_eq!(phones, expected);
}

#[tokio::test]
#[ignore]
async fn test_unresolvable_ids_yield_empty_result() {
    let db = TestDatabase::new().await;
    let data = TestDataBuilder::from_test_name("directory_missing");

    let directory = PgUserDirectory::new(db.connection());
    let emails = directory.emails_by_ids(&data.user_ids(2)).await.unwrap();

    assert!(emails.is_empty());
}
