//! Behaviour every `RecordGroupStore` must share, run against each backend

use crate::repository::{
    Field, GroupId, JoinRow, NewRecord, Pagination, Predicate, QueryPredicate, RecordGroupStore,
    RepositoryErrorKind, SortKey,
};
use crate::seed;

fn names(rows: &[JoinRow]) -> Vec<&str> {
    rows.iter().map(|row| row.record_name.as_str()).collect()
}

/// Seed `store` with the four-record fixture and check every query shape against it
pub(crate) async fn run<S: RecordGroupStore>(store: &S) {
    let seeded = seed::fixture(store).await.unwrap();
    let team_b = seeded.groups[1].id;
    let all = QueryPredicate::match_all();

    // Unfiltered, unsorted: every record in id order with its group attached
    let rows = store.query_join(&all, None, None).await.unwrap();
    assert_eq!(names(&rows), ["member1", "member2", "member3", "member4"]);
    assert_eq!(rows[2].group_id, Some(team_b.0));
    assert_eq!(rows[2].group_name.as_deref(), Some("teamB"));
    assert_eq!(rows[3].record_age, 40);
    assert_eq!(store.count(&all).await.unwrap(), 4);

    let adults = all.clone().and(Predicate::gte(Field::RecordAge, 20));
    let rows = store.query_join(&adults, None, None).await.unwrap();
    assert_eq!(names(&rows), ["member2", "member3", "member4"]);
    assert_eq!(store.count(&adults).await.unwrap(), 3);

    let in_b = all.clone().and(Predicate::eq(Field::GroupName, "teamB"));
    assert_eq!(store.count(&in_b).await.unwrap(), 2);

    let none = all
        .clone()
        .and(Predicate::eq(Field::RecordName, "member1"))
        .and(Predicate::gte(Field::RecordAge, 15));
    assert!(store.query_join(&none, None, None).await.unwrap().is_empty());
    assert_eq!(store.count(&none).await.unwrap(), 0);

    // Windows
    let rows = store
        .query_join(&all, None, Some(Pagination::new(1, 2)))
        .await
        .unwrap();
    assert_eq!(names(&rows), ["member2", "member3"]);

    let (rows, total) = store
        .query_join_with_count(&all, None, Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(names(&rows), ["member2", "member3"]);
    assert_eq!(total, 4);

    let (rows, total) = store
        .query_join_with_count(&adults, None, Pagination::new(10, 5))
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, store.count(&adults).await.unwrap());

    let (rows, total) = store
        .query_join_with_count(&none, None, Pagination::first_page(5))
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 0);

    // Sorting, with record id breaking ties
    let rows = store
        .query_join(&all, Some(&SortKey::desc(Field::RecordAge)), None)
        .await
        .unwrap();
    assert_eq!(names(&rows), ["member4", "member3", "member2", "member1"]);

    let rows = store
        .query_join(&all, Some(&SortKey::desc(Field::GroupName)), None)
        .await
        .unwrap();
    assert_eq!(names(&rows), ["member3", "member4", "member1", "member2"]);

    let rows = store
        .query_join(
            &all,
            Some(&SortKey::desc(Field::GroupName)),
            Some(Pagination::new(1, 2)),
        )
        .await
        .unwrap();
    assert_eq!(names(&rows), ["member4", "member1"]);

    // Referential integrity
    let err = store
        .insert_record(NewRecord::new("orphan", 1, GroupId(i64::MAX)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, RepositoryErrorKind::ConstraintViolation);
    assert_eq!(store.count(&all).await.unwrap(), 4);
}
