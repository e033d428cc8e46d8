//! Behavioural coverage for the upload staging queue.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use wallery_data::{StagedUpload, StagingError, StagingQueue, UploadStatus};

/// Queue under test together with the directory that backs it.
#[fixture]
pub fn queue() -> RefCell<Option<(TempDir, StagingQueue)>> {
    RefCell::new(None)
}

/// Result of the last status change attempted by a `when` step.
#[fixture]
pub fn outcome() -> RefCell<Option<Result<(), StagingError>>> {
    RefCell::new(None)
}

fn with_queue<T>(
    queue: &RefCell<Option<(TempDir, StagingQueue)>>,
    action: impl FnOnce(&mut StagingQueue) -> T,
) -> T {
    let mut guard = queue.borrow_mut();
    let (_, active) = guard
        .as_mut()
        .unwrap_or_else(|| panic!("staging queue must be created"));
    action(active)
}

fn status_of(queue: &RefCell<Option<(TempDir, StagingQueue)>>, id: &str) -> UploadStatus {
    with_queue(queue, |active| {
        active
            .entries()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.status)
            .unwrap_or_else(|| panic!("upload {id} must be staged"))
    })
}

#[given("a staging queue with three uploads")]
fn three_uploads(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("create temp dir: {err}"));
    let path = Utf8PathBuf::from_path_buf(dir.path().join("queue.json"))
        .unwrap_or_else(|path| panic!("non UTF-8 temp path {path:?}"));
    let mut staged =
        StagingQueue::load(&path).unwrap_or_else(|err| panic!("load empty queue: {err}"));
    for (id, title) in [("first", "Dawn"), ("second", "Noon"), ("third", "Dusk")] {
        staged
            .enqueue(StagedUpload::new(id, format!("{id}.jpg")).with_title(title))
            .unwrap_or_else(|err| panic!("enqueue {id}: {err}"));
    }
    *queue.borrow_mut() = Some((dir, staged));
}

#[given("the first upload is in progress")]
fn first_in_progress(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    with_queue(queue, |active| {
        active
            .mark_uploading("first")
            .unwrap_or_else(|err| panic!("start first upload: {err}"));
    });
}

#[given("the second upload has finished")]
fn second_finished(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    with_queue(queue, |active| {
        active
            .mark_uploading("second")
            .and_then(|()| active.mark_uploaded("second"))
            .unwrap_or_else(|err| panic!("finish second upload: {err}"));
    });
}

#[when("the queue is saved and reloaded")]
fn save_and_reload(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    with_queue(queue, |active| {
        active
            .save()
            .unwrap_or_else(|err| panic!("save queue: {err}"));
        *active = StagingQueue::load(active.path())
            .unwrap_or_else(|err| panic!("reload queue: {err}"));
    });
}

#[when("the second upload is restarted")]
fn restart_second(
    queue: &RefCell<Option<(TempDir, StagingQueue)>>,
    outcome: &RefCell<Option<Result<(), StagingError>>>,
) {
    let result = with_queue(queue, |active| active.mark_uploading("second"));
    *outcome.borrow_mut() = Some(result);
}

#[then("the first upload is pending again")]
fn first_pending(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    assert_eq!(status_of(queue, "first"), UploadStatus::Pending);
}

#[then("the second upload is still uploaded")]
fn second_uploaded(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    assert_eq!(status_of(queue, "second"), UploadStatus::Uploaded);
}

#[then("the next pending upload is the first one")]
fn next_is_first(queue: &RefCell<Option<(TempDir, StagingQueue)>>) {
    let next = with_queue(queue, |active| {
        active.next_pending().map(|entry| entry.id.clone())
    });
    assert_eq!(next.as_deref(), Some("first"));
}

#[then("the restart is rejected as an invalid transition")]
fn restart_rejected(
    queue: &RefCell<Option<(TempDir, StagingQueue)>>,
    outcome: &RefCell<Option<Result<(), StagingError>>>,
) {
    assert!(matches!(
        outcome.borrow().as_ref(),
        Some(Err(StagingError::InvalidTransition {
            from: UploadStatus::Uploaded,
            to: UploadStatus::Uploading,
            ..
        }))
    ));
    assert_eq!(status_of(queue, "second"), UploadStatus::Uploaded);
}

#[scenario(path = "tests/features/staging.feature", index = 0)]
fn interrupted_uploads_restart(queue: RefCell<Option<(TempDir, StagingQueue)>>) {
    let _ = queue;
}

#[scenario(path = "tests/features/staging.feature", index = 1)]
fn finished_upload_cannot_restart(
    queue: RefCell<Option<(TempDir, StagingQueue)>>,
    outcome: RefCell<Option<Result<(), StagingError>>>,
) {
    let _ = (queue, outcome);
}
