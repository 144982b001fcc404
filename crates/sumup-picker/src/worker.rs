//! Background fetch worker thread
//!
//! The worker owns the [`ItemSource`] and runs fetches off the UI thread.
//! Requests queued while a fetch is running are coalesced: only the newest
//! request per (level, kind) survives, since the engine discards anything
//! older on arrival anyway.

use log::debug;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::{FetchKind, FetchRequest, FetchResponse};
use crate::navigation::LevelId;
use crate::record::{FetchError, ItemSource};

pub struct FetchWorker {
    request_tx: Sender<FetchRequest>,
    response_rx: Receiver<FetchResponse>,
    _handle: JoinHandle<()>,
}

impl FetchWorker {
    pub fn spawn<S: ItemSource>(source: S) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (response_tx, response_rx) = mpsc::channel::<FetchResponse>();
        let handle = spawn_worker(source, request_rx, response_tx);
        Self {
            request_tx,
            response_rx,
            _handle: handle,
        }
    }

    pub fn submit(&self, request: FetchRequest) {
        if self.request_tx.send(request).is_err() {
            debug!("fetch worker is gone, dropping request");
        }
    }

    /// Next finished fetch, without blocking
    pub fn try_recv(&self) -> Option<FetchResponse> {
        match self.response_rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn spawn_worker<S: ItemSource>(
    source: S,
    request_rx: Receiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(first) = request_rx.recv() {
            let mut batch = vec![first];
            while let Ok(next) = request_rx.try_recv() {
                batch.push(next);
            }

            for request in coalesce(batch) {
                let result = source
                    .fetch(request.query.as_deref(), request.parent.as_ref())
                    .map_err(FetchError::from);
                if response_tx.send(FetchResponse { request, result }).is_err() {
                    // UI went away
                    return;
                }
            }
        }
    })
}

/// Keep only the newest request per (level, kind), preserving arrival order
fn coalesce(batch: Vec<FetchRequest>) -> Vec<FetchRequest> {
    let mut newest: HashMap<(LevelId, FetchKind), usize> = HashMap::new();
    for (i, request) in batch.iter().enumerate() {
        newest.insert((request.level, request.kind), i);
    }
    let dropped = batch.len() - newest.len();
    if dropped > 0 {
        debug!("coalesced {} superseded fetch request(s)", dropped);
    }

    batch
        .into_iter()
        .enumerate()
        .filter(|(i, request)| newest.get(&(request.level, request.kind)) == Some(i))
        .map(|(_, request)| request)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RequestId;
    use crate::record::{MembershipRecord, ParentRef};
    use anyhow::{Result, bail};

    fn request(id: u64, level: u64, kind: FetchKind, query: Option<&str>) -> FetchRequest {
        FetchRequest {
            id: RequestId(id),
            level: LevelId(level),
            kind,
            query: query.map(str::to_string),
            parent: None,
        }
    }

    struct EchoSource;

    impl ItemSource for EchoSource {
        fn fetch(
            &self,
            query: Option<&str>,
            parent: Option<&ParentRef>,
        ) -> Result<Vec<MembershipRecord>> {
            if query == Some("fail") {
                bail!("service unavailable");
            }
            let name = format!(
                "{}/{}",
                parent.map(|p| p.id.as_str()).unwrap_or("root"),
                query.unwrap_or("")
            );
            Ok(vec![MembershipRecord::merchant("m", name)])
        }
    }

    #[test]
    fn test_coalesce_keeps_newest_per_level_and_kind() {
        let batch = vec![
            request(1, 0, FetchKind::Search, Some("a")),
            request(2, 1, FetchKind::Listing, None),
            request(3, 0, FetchKind::Search, Some("ab")),
            request(4, 1, FetchKind::Search, Some("x")),
        ];
        let ids: Vec<_> = coalesce(batch).into_iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = FetchWorker::spawn(EchoSource);
        let mut req = request(7, 1, FetchKind::Listing, None);
        req.parent = Some(MembershipRecord::organization("org1", "Acme").as_parent());
        worker.submit(req);

        let response = worker
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should answer");
        assert_eq!(response.request.id, RequestId(7));
        let items = response.result.unwrap();
        assert_eq!(items[0].resource_name, "org1/");
    }

    #[test]
    fn test_worker_reports_errors() {
        let worker = FetchWorker::spawn(EchoSource);
        worker.submit(request(1, 0, FetchKind::Search, Some("fail")));

        let response = worker
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should answer");
        assert_eq!(
            response.result.unwrap_err().message(),
            "service unavailable"
        );
    }
}
