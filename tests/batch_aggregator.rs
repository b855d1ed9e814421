use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Mutex;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use evidence_export::api_client::QueryExecutor;
use evidence_export::batch_aggregator::BatchAggregator;
use evidence_export::error::{FetchError, TransportError};

const PATH: &str = "data.target.items";

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: usize,
}

/// Serves `total` items in pages. Later pages answer sooner so arrival order is reversed.
struct PagedServer {
    total: usize,
    fail_on_page: Option<usize>,
    // (page index, count reported, rows actually returned) overrides
    drift: Option<(usize, usize, usize)>,
    requests: Mutex<Vec<Map<String, Value>>>,
}

impl PagedServer {
    fn new(total: usize) -> Self {
        PagedServer {
            total,
            fail_on_page: None,
            drift: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for PagedServer {
    async fn execute(&self, _query: &str, variables: &Map<String, Value>) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(variables.clone());
        let index = variables["index"].as_u64().unwrap() as usize;
        let size = variables["size"].as_u64().unwrap() as usize;

        let pages = self.total.div_ceil(size.max(1)).max(1);
        tokio::time::sleep(Duration::from_millis(((pages - index.min(pages)) * 3) as u64)).await;

        if self.fail_on_page == Some(index) {
            return Err(TransportError::Status {
                status: 502,
                url: "http://mock/graphql".to_string(),
            });
        }

        let start = (index * size).min(self.total);
        let mut end = ((index + 1) * size).min(self.total);
        let mut count = self.total;
        if let Some((page, reported, returned)) = self.drift {
            if page == index {
                count = reported;
                end = start + returned;
            }
        }
        let rows: Vec<Value> = (start..end).map(|id| json!({ "id": id })).collect();
        Ok(json!({ "data": { "target": { "items": { "count": count, "rows": rows } } } }))
    }
}

fn filters() -> Map<String, Value> {
    let mut vars = Map::new();
    vars.insert("ensemblId".to_string(), json!("ENSG00000157764"));
    vars
}

#[tokio::test]
async fn returns_every_item_for_stable_counts() {
    for (total, page_size) in [(1, 1), (7, 3), (10, 10), (23, 5), (4, 50)] {
        let server = PagedServer::new(total);
        let result = assert_ok!(
            BatchAggregator::new(&server, "query", filters(), PATH)
                .page_size(page_size)
                .concurrency(3)
                .fetch_all::<Item>()
                .await
        );
        assert_eq!(result.items.len(), total, "total={} page_size={}", total, page_size);
        assert_eq!(server.request_count(), total.div_ceil(page_size));
    }
}

#[tokio::test]
async fn zero_count_issues_a_single_request() {
    let server = PagedServer::new(0);
    let result = assert_ok!(
        BatchAggregator::new(&server, "query", filters(), PATH)
            .page_size(10)
            .fetch_all::<Item>()
            .await
    );
    assert!(result.items.is_empty());
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn pages_are_concatenated_in_index_order() {
    let server = PagedServer::new(40);
    let result = assert_ok!(
        BatchAggregator::new(&server, "query", filters(), PATH)
            .page_size(4)
            .concurrency(10)
            .fetch_all::<Item>()
            .await
    );
    let ids: Vec<usize> = result.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, (0..40).collect::<Vec<_>>());
}

#[tokio::test]
async fn first_page_carries_caller_variables() {
    let server = PagedServer::new(3);
    assert_ok!(
        BatchAggregator::new(&server, "query", filters(), PATH)
            .page_size(25)
            .fetch_all::<Item>()
            .await
    );
    let requests = server.requests.lock().unwrap();
    assert_eq!(requests[0]["index"], json!(0));
    assert_eq!(requests[0]["size"], json!(25));
    assert_eq!(requests[0]["ensemblId"], json!("ENSG00000157764"));
}

#[tokio::test]
async fn failing_page_aborts_the_aggregation() {
    for failing in [0, 1, 3] {
        let mut server = PagedServer::new(20);
        server.fail_on_page = Some(failing);
        let err = assert_err!(
            BatchAggregator::new(&server, "query", filters(), PATH)
                .page_size(5)
                .concurrency(2)
                .fetch_all::<Item>()
                .await
        );
        assert!(
            matches!(err, FetchError::Transport(TransportError::Status { status: 502, .. })),
            "page {} produced {:?}",
            failing,
            err
        );
    }
}

#[tokio::test]
async fn zero_page_size_is_rejected_without_requests() {
    let server = PagedServer::new(5);
    let err = assert_err!(
        BatchAggregator::new(&server, "query", filters(), PATH)
            .page_size(0)
            .fetch_all::<Item>()
            .await
    );
    assert!(matches!(err, FetchError::InvalidPageSize));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn count_drift_is_not_masked() {
    let mut server = PagedServer::new(10);
    // The second page comes back short after a server-side delete.
    server.drift = Some((1, 7, 2));
    let result = assert_ok!(
        BatchAggregator::new(&server, "query", filters(), PATH)
            .page_size(5)
            .fetch_all::<Item>()
            .await
    );
    assert_eq!(result.items.len(), 7);
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn missing_result_path_is_reported() {
    let server = PagedServer::new(3);
    let err = assert_err!(
        BatchAggregator::new(&server, "query", filters(), "data.target.somethingElse")
            .fetch_all::<Item>()
            .await
    );
    assert!(matches!(err, FetchError::MissingPath { .. }));
}
