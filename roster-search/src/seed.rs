//! Sample data for local runs and tests

use serde::Serialize;

use crate::repository::{Group, NewGroup, NewRecord, Record, RecordGroupStore, RepositoryResult};

/// Rows created by a seeding run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub groups: Vec<Group>,
    pub records: Vec<Record>,
}

/// Two groups and four records: member1..member4 aged 10, 20, 30, 40, the first two in
/// teamA and the rest in teamB
pub async fn fixture<S: RecordGroupStore>(store: &S) -> RepositoryResult<SeedSummary> {
    let team_a = store.insert_group(NewGroup::new("teamA")).await?;
    let team_b = store.insert_group(NewGroup::new("teamB")).await?;

    let mut records = Vec::with_capacity(4);
    for (name, age, group) in [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ] {
        records.push(store.insert_record(NewRecord::new(name, age, group.id)).await?);
    }

    tracing::info!(records = records.len(), "seeded fixture data");
    Ok(SeedSummary {
        groups: vec![team_a, team_b],
        records,
    })
}

/// Two groups and 99 records: member{i} has age i and belongs to teamA when i is even,
/// teamB when odd
pub async fn demo<S: RecordGroupStore>(store: &S) -> RepositoryResult<SeedSummary> {
    let team_a = store.insert_group(NewGroup::new("teamA")).await?;
    let team_b = store.insert_group(NewGroup::new("teamB")).await?;

    let mut records = Vec::with_capacity(99);
    for i in 1..=99 {
        let group = if i % 2 == 0 { &team_a } else { &team_b };
        records.push(
            store
                .insert_record(NewRecord::new(format!("member{i}"), i, group.id))
                .await?,
        );
    }

    tracing::info!(records = records.len(), "seeded demo data");
    Ok(SeedSummary {
        groups: vec![team_a, team_b],
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_fixture_layout() {
        let store = MemoryStore::new();
        let summary = fixture(&store).await.unwrap();

        assert_eq!(summary.groups.len(), 2);
        let ages: Vec<i32> = summary.records.iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![10, 20, 30, 40]);

        let team_a = summary.groups[0].id;
        let in_a = summary
            .records
            .iter()
            .filter(|r| r.group_id == team_a)
            .count();
        assert_eq!(in_a, 2);
    }

    #[tokio::test]
    async fn test_demo_alternates_groups() {
        let store = MemoryStore::new();
        let summary = demo(&store).await.unwrap();

        assert_eq!(summary.records.len(), 99);
        assert_eq!(store.record_count().await, 99);

        let (team_a, team_b) = (summary.groups[0].id, summary.groups[1].id);
        for record in &summary.records {
            let expected = if record.age % 2 == 0 { team_a } else { team_b };
            assert_eq!(record.group_id, expected, "{}", record.name);
        }
        assert_eq!(summary.records[41].name, "member42");
    }
}
