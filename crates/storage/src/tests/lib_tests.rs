use super::*;
use chrono::TimeZone;

fn new_job(title: &str, job_type: &str, location: &str, tags: &[&str], day: u32) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: "Acme".to_string(),
        location: location.to_string(),
        job_type: job_type.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        posting_date: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
    }
}

async fn seeded() -> Storage {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_job(new_job("Actuarial Intern", "Internship", "Remote", &["life", "pricing"], 1))
        .await
        .expect("insert");
    storage
        .insert_job(new_job("Pricing Actuary", "Full-time", "London", &["pricing"], 3))
        .await
        .expect("insert");
    storage
        .insert_job(new_job("Reserving Analyst", "Full-time", "Remote", &["p&c", "reserving"], 2))
        .await
        .expect("insert");
    storage
}

fn titles(jobs: &[JobPosting]) -> Vec<&str> {
    jobs.iter().map(|job| job.title.as_str()).collect()
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("jobboard_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("jobs.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn insert_assigns_id_and_round_trips_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .insert_job(new_job("Engineer", "Full-time", "Remote", &["a", "b", "a"], 5))
        .await
        .expect("insert");
    assert!(created.id.0 > 0);
    assert_eq!(created.tags, vec!["a", "b", "a"]);

    let fetched = storage
        .get_job(created.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn empty_tags_round_trip_as_empty_list() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage
        .insert_job(new_job("Engineer", "", "Remote", &[], 5))
        .await
        .expect("insert");
    assert!(created.tags.is_empty());
    assert_eq!(created.job_type, "");
}

#[tokio::test]
async fn lists_newest_first_by_default_and_oldest_first_on_request() {
    let storage = seeded().await;

    let newest = storage
        .list_jobs(&FilterSelection::default())
        .await
        .expect("list");
    assert_eq!(
        titles(&newest),
        vec!["Pricing Actuary", "Reserving Analyst", "Actuarial Intern"]
    );

    let oldest = storage
        .list_jobs(&FilterSelection {
            sort: SortOrder::OldestFirst,
            ..FilterSelection::default()
        })
        .await
        .expect("list");
    assert_eq!(
        titles(&oldest),
        vec!["Actuarial Intern", "Reserving Analyst", "Pricing Actuary"]
    );
}

#[tokio::test]
async fn filters_combine_job_type_location_and_tag() {
    let storage = seeded().await;

    let full_time_remote = storage
        .list_jobs(&FilterSelection {
            job_type: "Full-time".into(),
            location: "Remote".into(),
            ..FilterSelection::default()
        })
        .await
        .expect("list");
    assert_eq!(titles(&full_time_remote), vec!["Reserving Analyst"]);

    let pricing = storage
        .list_jobs(&FilterSelection {
            tag: "PRICING".into(),
            ..FilterSelection::default()
        })
        .await
        .expect("list");
    assert_eq!(titles(&pricing), vec!["Pricing Actuary", "Actuarial Intern"]);
}

#[tokio::test]
async fn tag_filter_treats_like_wildcards_literally() {
    let storage = seeded().await;
    let none = storage
        .list_jobs(&FilterSelection {
            tag: "%".into(),
            ..FilterSelection::default()
        })
        .await
        .expect("list");
    assert!(none.is_empty());

    let ampersand = storage
        .list_jobs(&FilterSelection {
            tag: "p&c".into(),
            ..FilterSelection::default()
        })
        .await
        .expect("list");
    assert_eq!(titles(&ampersand), vec!["Reserving Analyst"]);
}

#[tokio::test]
async fn update_changes_only_present_fields() {
    let storage = seeded().await;
    let target = storage
        .find_job_by_identity("Pricing Actuary", "Acme", "London")
        .await
        .expect("lookup")
        .expect("present");

    let updated = storage
        .update_job(
            target,
            JobChanges {
                location: Some("Remote".into()),
                tags: Some(vec!["x".into(), "y".into()]),
                ..JobChanges::default()
            },
        )
        .await
        .expect("update")
        .expect("present");
    assert_eq!(updated.title, "Pricing Actuary");
    assert_eq!(updated.location, "Remote");
    assert_eq!(updated.job_type, "Full-time");
    assert_eq!(updated.tags, vec!["x", "y"]);
}

#[tokio::test]
async fn update_and_delete_report_unknown_ids() {
    let storage = seeded().await;
    let missing = storage
        .update_job(
            JobId(999),
            JobChanges {
                title: Some("ghost".into()),
                ..JobChanges::default()
            },
        )
        .await
        .expect("update");
    assert!(missing.is_none());
    assert!(!storage.delete_job(JobId(999)).await.expect("delete"));
}

#[tokio::test]
async fn delete_removes_row_and_purge_clears_table() {
    let storage = seeded().await;
    let target = storage
        .find_job_by_identity("Actuarial Intern", "Acme", "Remote")
        .await
        .expect("lookup")
        .expect("present");
    assert!(storage.delete_job(target).await.expect("delete"));
    assert!(storage.get_job(target).await.expect("get").is_none());

    assert_eq!(storage.delete_all_jobs().await.expect("purge"), 2);
    assert!(storage
        .list_jobs(&FilterSelection::default())
        .await
        .expect("list")
        .is_empty());
}
