// Property tests for request queue ordering and grouping.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::cell::RefCell;

use proptest::prelude::*;
use serde_json::json;
use sheetbatch_core::address::RectRange;
use sheetbatch_engine::{request, DispatchError, Dispatcher, PendingRequest, RequestQueue};
use sheetbatch_protocol::{BatchResponse, Color};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Small rectangles on two tabs so repeats and overlaps are common.
fn arb_request() -> impl Strategy<Value = PendingRequest> {
    (0u32..2, 0u32..4, 0u32..4, 0u32..3, 0u32..3, any::<bool>()).prop_map(|(tab, row, col, dr, dc, border)| {
        let rng = RectRange::new(tab, row, col, Some(row + dr), Some(col + dc)).unwrap();
        if border {
            request::set_border_format(&rng, &Default::default())
        } else {
            request::set_background_color(&rng, Color::WHITE)
        }
    })
}

#[derive(Default)]
struct Recorder {
    batches: RefCell<Vec<Vec<PendingRequest>>>,
}

impl Dispatcher for Recorder {
    fn dispatch(&self, _document_id: &str, batch: &[PendingRequest]) -> Result<BatchResponse, DispatchError> {
        self.batches.borrow_mut().push(batch.to_vec());
        Ok(BatchResponse { replies: vec![json!({}); batch.len()], ..Default::default() })
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn groups_concatenate_to_queue(reqs in prop::collection::vec(arb_request(), 0..24)) {
        let mut queue = RequestQueue::new();
        for r in &reqs {
            queue.append(r.clone());
        }

        let groups = queue.groups();
        let flattened: Vec<PendingRequest> = groups.iter().flat_map(|g| g.requests.iter().cloned()).collect();
        prop_assert_eq!(flattened, reqs);

        // adjacent groups never share a key
        for pair in groups.windows(2) {
            prop_assert_ne!(&pair[0].key, &pair[1].key);
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn flush_sends_everything_once(reqs in prop::collection::vec(arb_request(), 1..24)) {
        let recorder = Recorder::default();
        let mut queue = RequestQueue::new();
        for r in &reqs {
            queue.append(r.clone());
        }

        let resp = queue.flush(&recorder, "doc").unwrap();
        prop_assert_eq!(resp.replies.len(), reqs.len());
        prop_assert!(queue.is_empty());
        let sent = recorder.batches.borrow().clone();
        prop_assert_eq!(sent, vec![reqs]);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn partial_overlaps_are_ordered_and_distinct(reqs in prop::collection::vec(arb_request(), 0..16)) {
        let mut queue = RequestQueue::new();
        for r in &reqs {
            queue.append(r.clone());
        }
        for (i, j) in queue.partial_overlaps() {
            prop_assert!(i < j);
            prop_assert_ne!(reqs[i].target.canonical_key(), reqs[j].target.canonical_key());
            prop_assert!(reqs[i].target.overlaps(&reqs[j].target));
        }
    }
}
