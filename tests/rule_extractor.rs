// tests/rule_extractor.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use insightboard::engine::JobManager;
use insightboard::errors::InsightError;
use insightboard::extract::{check_extracted, ExtractorBackend, RuleExtractor};
use insightboard::types::{JobStatus, Priority, TaskStatus};
use insightboard_test_utils::builders::{service_section, TaskRecordBuilder};
use insightboard_test_utils::{init_tracing, with_timeout};

use common::TestResult;

const TRANSCRIPT: &str = r#"
Standup, Monday.
Alice: we keep seeing Stripe failures under load.
Action items:
- [T1] (urgent) Fix Stripe failures under load
- [T2] (high) Add load test to CI (after: T1)
3. [T3] Review launch blog post (depends on: T2, T9)
Bob: thanks all.
"#;

#[test]
fn action_lines_become_records() -> TestResult {
    let extractor = RuleExtractor::new(Priority::Low)?;

    let records = extractor.parse(TRANSCRIPT)?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, "T1");
    assert_eq!(records[0].priority, Priority::Urgent);
    assert_eq!(records[0].description, "Fix Stripe failures under load");
    assert!(records[0].dependencies.is_empty());

    assert_eq!(records[1].priority, Priority::High);
    assert_eq!(records[1].description, "Add load test to CI");
    assert_eq!(records[1].dependencies, vec!["T1".to_string()]);

    assert_eq!(records[2].priority, Priority::Low);
    assert_eq!(
        records[2].dependencies,
        vec!["T2".to_string(), "T9".to_string()]
    );
    Ok(())
}

#[test]
fn json_lists_are_accepted_bare_or_wrapped() -> TestResult {
    let extractor = RuleExtractor::new(Priority::Medium)?;

    let bare = extractor.parse(
        r#"[{"id": "A", "description": "write doc"},
            {"id": "B", "description": "review doc", "priority": "high", "dependencies": ["A"]}]"#,
    )?;
    let wrapped = extractor.parse(
        r#"{"tasks": [{"id": "A", "description": "write doc"},
            {"id": "B", "description": "review doc", "priority": "high", "dependencies": ["A"]}]}"#,
    )?;

    assert_eq!(bare, wrapped);
    assert_eq!(bare[0].priority, Priority::Medium);
    assert_eq!(bare[1].priority, Priority::High);
    assert_eq!(bare[1].dependencies, vec!["A".to_string()]);
    Ok(())
}

#[test]
fn malformed_json_is_an_extraction_error() -> TestResult {
    let extractor = RuleExtractor::new(Priority::Medium)?;

    let result = extractor.parse(r#"[{"id": "A""#);

    match result {
        Err(InsightError::Extraction(msg)) => assert!(msg.contains("malformed task list")),
        other => panic!("Expected Extraction error, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn prose_without_action_items_yields_nothing() -> TestResult {
    let extractor = RuleExtractor::new(Priority::Medium)?;

    let records = extractor.parse("We chatted about the weather.\nNothing to do.")?;

    assert!(records.is_empty());
    assert!(matches!(
        check_extracted(records),
        Err(InsightError::Extraction(_))
    ));
    Ok(())
}

#[test]
fn priority_defaults_to_medium_and_accepts_aliases() {
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!("normal".parse::<Priority>(), Ok(Priority::Medium));
    assert_eq!("Critical".parse::<Priority>(), Ok(Priority::Urgent));
    assert!("someday".parse::<Priority>().is_err());
}

#[test]
fn check_extracted_rejects_blank_ids() {
    let records = vec![TaskRecordBuilder::new("  ").build()];

    assert!(matches!(
        check_extracted(records),
        Err(InsightError::Extraction(_))
    ));
}

#[tokio::test]
async fn rule_extractor_drives_a_real_job() -> TestResult {
    init_tracing();

    let extractor = RuleExtractor::new(Priority::Medium)?;
    let direct = extractor.extract(TRANSCRIPT).await?;
    assert_eq!(direct.len(), 3);

    let manager = JobManager::new(Arc::new(extractor), service_section());
    let submission = manager.submit(TRANSCRIPT).await?;
    let job = with_timeout(
        manager.wait_until_terminal(&submission.job.id, Duration::from_secs(2)),
    )
    .await?;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.task("T1").map(|t| t.status), Some(TaskStatus::Ready));
    assert_eq!(job.task("T2").map(|t| t.status), Some(TaskStatus::Blocked));
    // T9 is never defined, so T3 stays blocked.
    assert_eq!(job.task("T3").map(|t| t.status), Some(TaskStatus::Blocked));
    assert!(!job.has_cycles);
    Ok(())
}
