use encoding_service::engine::registry::{JobFilter, JobRegistry};
use encoding_service::ffmpeg::pipeline::EncodeOutput;
use encoding_service::jobs::JobStatus;

fn output_for(id: &str) -> EncodeOutput {
    EncodeOutput {
        dash_manifest: format!("/dash/{id}/manifest.mpd"),
        hls_manifest: format!("/hls/{id}/master.m3u8"),
        duration: 42,
    }
}

#[tokio::test]
async fn create_places_job_in_active_partition() {
    let registry = JobRegistry::new();
    let job = registry.create("1_sample.mp4").await;

    assert!(job.id.starts_with("job_"));
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress, 0);
    assert_eq!(job.source_file, "1_sample.mp4");

    let active = registry.list(JobFilter::Active).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, job.id);
}

#[tokio::test]
async fn begin_marks_processing_and_sets_start_time() {
    let registry = JobRegistry::new();
    let job = registry.create("1_sample.mp4").await;

    registry.begin(&job.id).await.unwrap();

    let current = registry.get(&job.id).await.unwrap();
    assert_eq!(current.status, JobStatus::Processing);
    assert!(current.started_at.is_some());
}

#[tokio::test]
async fn begin_unknown_job_fails_with_not_found() {
    let registry = JobRegistry::new();
    let err = registry.begin("job_missing").await.unwrap_err();
    assert!(err.to_string().contains("job_missing"));
}

#[tokio::test]
async fn successful_finish_moves_job_to_completed() {
    let registry = JobRegistry::new();
    let job = registry.create("1_sample.mp4").await;
    registry.begin(&job.id).await.unwrap();

    let finished = registry.finish(&job.id, Ok(output_for(&job.id))).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.progress, 100);
    assert!(finished.completed_at.is_some());
    assert_eq!(
        finished.dash_manifest.as_deref(),
        Some(format!("/dash/{}/manifest.mpd", job.id).as_str())
    );
    assert_eq!(
        finished.hls_manifest.as_deref(),
        Some(format!("/hls/{}/master.m3u8", job.id).as_str())
    );
    assert_eq!(finished.duration, Some(42));

    assert!(registry.list(JobFilter::Active).await.is_empty());
    assert_eq!(registry.list(JobFilter::Completed).await.len(), 1);
    assert_eq!(registry.get(&job.id).await.unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn failed_finish_records_error_message() {
    let registry = JobRegistry::new();
    let job = registry.create("1_sample.mp4").await;
    registry.begin(&job.id).await.unwrap();

    let finished = registry
        .finish(&job.id, Err("ffmpeg DASH encoding error for 720p: boom".to_string()))
        .await
        .unwrap();

    assert_eq!(finished.status, JobStatus::Failed);
    assert_eq!(
        finished.error_message.as_deref(),
        Some("ffmpeg DASH encoding error for 720p: boom")
    );
    assert!(finished.completed_at.is_none());

    assert!(registry.list(JobFilter::Active).await.is_empty());
    assert_eq!(registry.list(JobFilter::Failed).await.len(), 1);
}

#[tokio::test]
async fn finish_on_unknown_job_fails_with_not_found() {
    let registry = JobRegistry::new();
    assert!(registry.finish("job_missing", Err("x".into())).await.is_err());
}

#[tokio::test]
async fn every_job_lives_in_exactly_one_partition() {
    let registry = JobRegistry::new();
    let pending = registry.create("1_a.mp4").await;
    let done = registry.create("2_b.mp4").await;
    let broken = registry.create("3_c.mp4").await;

    registry.begin(&done.id).await.unwrap();
    registry.finish(&done.id, Ok(output_for(&done.id))).await.unwrap();
    registry.begin(&broken.id).await.unwrap();
    registry.finish(&broken.id, Err("probe failed".into())).await.unwrap();

    assert_eq!(registry.list(JobFilter::All).await.len(), 3);
    let active = registry.list(JobFilter::Active).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, pending.id);
    assert_eq!(registry.list(JobFilter::Completed).await.len(), 1);
    assert_eq!(registry.list(JobFilter::Failed).await.len(), 1);
}

#[tokio::test]
async fn progress_updates_are_clamped_and_scoped_to_active_jobs() {
    let registry = JobRegistry::new();
    let job = registry.create("1_a.mp4").await;
    registry.begin(&job.id).await.unwrap();

    registry.progress(&job.id, 50).await;
    assert_eq!(registry.get(&job.id).await.unwrap().progress, 50);

    registry.progress(&job.id, 150).await;
    assert_eq!(registry.get(&job.id).await.unwrap().progress, 100);

    registry.finish(&job.id, Err("boom".into())).await.unwrap();
    //un job terminé est immuable
    registry.progress(&job.id, 10).await;
    assert_eq!(registry.get(&job.id).await.unwrap().error_message.as_deref(), Some("boom"));
}

#[tokio::test]
async fn seen_sources_spans_all_partitions() {
    let registry = JobRegistry::new();
    let active = registry.create("1_a.mp4").await;
    let done = registry.create("2_b.mp4").await;
    let broken = registry.create("3_c.mp4").await;
    registry.begin(&done.id).await.unwrap();
    registry.finish(&done.id, Ok(output_for(&done.id))).await.unwrap();
    registry.begin(&broken.id).await.unwrap();
    registry.finish(&broken.id, Err("boom".into())).await.unwrap();

    let seen = registry.seen_sources().await;
    assert_eq!(seen.len(), 3);
    for source in ["1_a.mp4", "2_b.mp4", "3_c.mp4"] {
        assert!(seen.contains(source), "missing {source}");
    }
    let _ = active;
}

#[test]
fn filter_parsing_accepts_blank_and_all() {
    assert_eq!(JobFilter::parse(""), Some(JobFilter::All));
    assert_eq!(JobFilter::parse("all"), Some(JobFilter::All));
    assert_eq!(JobFilter::parse("active"), Some(JobFilter::Active));
    assert_eq!(JobFilter::parse("completed"), Some(JobFilter::Completed));
    assert_eq!(JobFilter::parse("failed"), Some(JobFilter::Failed));
    assert_eq!(JobFilter::parse("bogus"), None);
}
