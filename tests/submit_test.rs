mod common;

use std::time::Duration;

use common::{requests, FakeBatchService};
use geobatch_lib::{submit_batch_chunks, BatchTrackingRecord};

#[tokio::test]
async fn given_120_requests_when_chunking_by_50_then_three_records_cover_all_indices() {
    let service = FakeBatchService::new();
    let requests = requests(120);

    let records = submit_batch_chunks(&service, &requests, 50, Duration::ZERO).await;

    let counts: Vec<usize> = records.iter().map(|r| r.request_count).collect();
    let bounds: Vec<(usize, usize)> = records
        .iter()
        .map(|r| (r.start_index, r.end_index))
        .collect();
    let chunk_nums: Vec<usize> = records.iter().map(|r| r.chunk_num).collect();

    assert_eq!(counts, vec![50, 50, 20]);
    assert_eq!(bounds, vec![(0, 49), (50, 99), (100, 119)]);
    assert_eq!(chunk_nums, vec![1, 2, 3]);
}

#[tokio::test]
async fn given_chunks_when_submitted_then_concatenation_preserves_request_order() {
    let service = FakeBatchService::new();
    let requests = requests(23);

    let records = submit_batch_chunks(&service, &requests, 5, Duration::ZERO).await;

    assert_eq!(records.len(), 5);
    let submitted: Vec<String> = records
        .iter()
        .flat_map(|r| service.submitted_ids(&r.batch_id))
        .collect();
    let original: Vec<String> = requests.iter().map(|r| r.custom_id.clone()).collect();
    assert_eq!(submitted, original);
    assert!(records[..4].iter().all(|r| r.request_count == 5));
    assert_eq!(records[4].request_count, 3);
}

#[tokio::test]
async fn given_rejected_chunk_when_submitting_then_it_is_skipped_and_others_are_tracked() {
    let service = FakeBatchService::new().failing_create_calls(&[2]);
    let requests = requests(120);

    let records = submit_batch_chunks(&service, &requests, 50, Duration::ZERO).await;

    assert_eq!(service.create_calls(), 3);
    assert_eq!(
        records,
        vec![
            BatchTrackingRecord {
                batch_id: "msgbatch_01".to_string(),
                chunk_num: 1,
                request_count: 50,
                start_index: 0,
                end_index: 49,
            },
            BatchTrackingRecord {
                batch_id: "msgbatch_03".to_string(),
                chunk_num: 3,
                request_count: 20,
                start_index: 100,
                end_index: 119,
            },
        ]
    );
}

#[tokio::test]
async fn given_every_chunk_rejected_when_submitting_then_no_records() {
    let service = FakeBatchService::new().failing_create_calls(&[1, 2]);

    let records = submit_batch_chunks(&service, &requests(60), 50, Duration::ZERO).await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn given_no_requests_when_submitting_then_nothing_is_sent() {
    let service = FakeBatchService::new();

    let records = submit_batch_chunks(&service, &[], 50, Duration::ZERO).await;

    assert!(records.is_empty());
    assert_eq!(service.create_calls(), 0);
}

#[tokio::test]
async fn given_delay_when_submitting_then_it_is_only_waited_between_chunks() {
    let service = FakeBatchService::new();
    let delay = Duration::from_millis(30);

    let started = std::time::Instant::now();
    submit_batch_chunks(&service, &requests(3), 1, delay).await;

    assert!(started.elapsed() >= delay * 2);
}
