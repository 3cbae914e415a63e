// TestDependencies - mock implementations for testing
//
// Recording stand-ins for the Open Match services and the game server
// allocator. Each mock is configured with builder methods and records the
// calls made against it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agones_client::{AgonesError, Allocation};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use open_match_api::{
    AssignTicketsRequest, AssignTicketsResponse, Assignment, AssignmentFailure,
    FetchMatchesRequest, FetchMatchesResponse, Match, Pool, QueryTicketsResponse, Ticket,
    WatchAssignmentsResponse,
};
use tonic::{Code, Status};

use super::{
    BaseBackendService, BaseFrontendService, BaseGameServerAllocator, BaseQueryService,
    GrpcStream,
};

// =============================================================================
// Mock Backend
// =============================================================================

pub struct MockBackend {
    matches: Arc<Mutex<Vec<Match>>>,
    fetch_error: Arc<Mutex<Option<(Code, String)>>>,
    stream_error: Arc<Mutex<Option<(Code, String)>>>,
    hang_after_matches: Arc<Mutex<bool>>,
    fetch_panics: Arc<Mutex<usize>>,
    assign_error: Arc<Mutex<Option<(Code, String)>>>,
    assign_failures: Arc<Mutex<Vec<String>>>,
    fetch_calls: Arc<Mutex<Vec<FetchMatchesRequest>>>,
    assign_calls: Arc<Mutex<Vec<AssignTicketsRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            matches: Arc::new(Mutex::new(Vec::new())),
            fetch_error: Arc::new(Mutex::new(None)),
            stream_error: Arc::new(Mutex::new(None)),
            hang_after_matches: Arc::new(Mutex::new(false)),
            fetch_panics: Arc::new(Mutex::new(0)),
            assign_error: Arc::new(Mutex::new(None)),
            assign_failures: Arc::new(Mutex::new(Vec::new())),
            fetch_calls: Arc::new(Mutex::new(Vec::new())),
            assign_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Matches streamed back by every FetchMatches call.
    pub fn with_matches(self, matches: Vec<Match>) -> Self {
        self.matches.lock().unwrap().extend(matches);
        self
    }

    /// Fail the FetchMatches call itself.
    pub fn with_fetch_error(self, code: Code, message: &str) -> Self {
        *self.fetch_error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    /// Stream the configured matches, then a transport error.
    pub fn with_stream_error(self, code: Code, message: &str) -> Self {
        *self.stream_error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    /// Stream the configured matches, then never close.
    pub fn hanging(self) -> Self {
        *self.hang_after_matches.lock().unwrap() = true;
        self
    }

    /// Panic inside the next FetchMatches call; later calls behave normally.
    pub fn with_fetch_panic(self) -> Self {
        *self.fetch_panics.lock().unwrap() += 1;
        self
    }

    pub fn with_assign_error(self, code: Code, message: &str) -> Self {
        *self.assign_error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    /// Report these ticket ids as per-ticket failures from AssignTickets.
    pub fn with_assign_failures(self, ticket_ids: &[&str]) -> Self {
        self.assign_failures
            .lock()
            .unwrap()
            .extend(ticket_ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn fetch_calls(&self) -> Vec<FetchMatchesRequest> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn assign_calls(&self) -> Vec<AssignTicketsRequest> {
        self.assign_calls.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseBackendService for MockBackend {
    async fn fetch_matches(
        &self,
        request: FetchMatchesRequest,
        _timeout: Duration,
    ) -> Result<GrpcStream<FetchMatchesResponse>, Status> {
        self.fetch_calls.lock().unwrap().push(request);

        let panic_now = {
            let mut remaining = self.fetch_panics.lock().unwrap();
            let pending = *remaining > 0;
            if pending {
                *remaining -= 1;
            }
            pending
        };
        if panic_now {
            panic!("mock backend panicked");
        }

        if let Some((code, message)) = self.fetch_error.lock().unwrap().clone() {
            return Err(Status::new(code, message));
        }

        let items: Vec<Result<FetchMatchesResponse, Status>> = self
            .matches
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|m| Ok(FetchMatchesResponse { r#match: Some(m) }))
            .collect();
        let mut response = stream::iter(items).boxed();

        if let Some((code, message)) = self.stream_error.lock().unwrap().clone() {
            response = response
                .chain(stream::once(async move { Err(Status::new(code, message)) }))
                .boxed();
        }
        if *self.hang_after_matches.lock().unwrap() {
            response = response.chain(stream::pending()).boxed();
        }

        Ok(response)
    }

    async fn assign_tickets(
        &self,
        request: AssignTicketsRequest,
        _timeout: Duration,
    ) -> Result<AssignTicketsResponse, Status> {
        self.assign_calls.lock().unwrap().push(request);

        if let Some((code, message)) = self.assign_error.lock().unwrap().clone() {
            return Err(Status::new(code, message));
        }

        let failures = self
            .assign_failures
            .lock()
            .unwrap()
            .iter()
            .map(|id| AssignmentFailure {
                ticket_id: id.clone(),
                ..Default::default()
            })
            .collect();
        Ok(AssignTicketsResponse { failures })
    }
}

// =============================================================================
// Mock Allocator
// =============================================================================

enum AllocatorReply {
    Allocated(Allocation),
    Failed(AgonesError),
    Panic,
}

/// Allocator that replays queued results, then succeeds with
/// `10.0.0.<call>:7777` for every further call.
pub struct MockAllocator {
    fleet: String,
    replies: Arc<Mutex<VecDeque<AllocatorReply>>>,
    calls: Arc<AtomicUsize>,
}

impl MockAllocator {
    pub fn new() -> Self {
        Self {
            fleet: "ue5-gameserver-fleet".to_string(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_allocation(self, address: &str, port: u16) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(AllocatorReply::Allocated(Allocation {
                address: address.to_string(),
                port,
                game_server_name: Some(format!("{}-mock", self.fleet)),
            }));
        self
    }

    pub fn with_failure(self, error: AgonesError) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(AllocatorReply::Failed(error));
        self
    }

    /// Panic on the next queued call.
    pub fn with_panic(self) -> Self {
        self.replies.lock().unwrap().push_back(AllocatorReply::Panic);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseGameServerAllocator for MockAllocator {
    fn fleet(&self) -> &str {
        &self.fleet
    }

    async fn allocate(&self) -> Result<Allocation, AgonesError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(AllocatorReply::Allocated(allocation)) => Ok(allocation),
            Some(AllocatorReply::Failed(error)) => Err(error),
            Some(AllocatorReply::Panic) => panic!("mock allocator panicked"),
            None => Ok(Allocation {
                address: format!("10.0.0.{}", call),
                port: 7777,
                game_server_name: None,
            }),
        }
    }
}

// =============================================================================
// Mock Frontend
// =============================================================================

pub struct MockFrontend {
    tickets: Arc<Mutex<HashMap<String, Ticket>>>,
    next_id: Arc<AtomicUsize>,
    create_error: Arc<Mutex<Option<(Code, String)>>>,
    watch_error: Arc<Mutex<Option<(Code, String)>>>,
    assignment: Arc<Mutex<Option<String>>>,
    created: Arc<Mutex<Vec<Ticket>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MockFrontend {
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
            create_error: Arc::new(Mutex::new(None)),
            watch_error: Arc::new(Mutex::new(None)),
            assignment: Arc::new(Mutex::new(None)),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliver this connection on WatchAssignments, after one empty update.
    /// Without it the watch stream stays open and silent.
    pub fn with_assignment(self, connection: &str) -> Self {
        *self.assignment.lock().unwrap() = Some(connection.to_string());
        self
    }

    pub fn with_create_error(self, code: Code, message: &str) -> Self {
        *self.create_error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    pub fn with_watch_error(self, code: Code, message: &str) -> Self {
        *self.watch_error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    pub fn created(&self) -> Vec<Ticket> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for MockFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseFrontendService for MockFrontend {
    async fn create_ticket(&self, ticket: Ticket, _timeout: Duration) -> Result<Ticket, Status> {
        if let Some((code, message)) = self.create_error.lock().unwrap().clone() {
            return Err(Status::new(code, message));
        }

        let id = format!("ticket-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Ticket { id: id.clone(), ..ticket };

        self.created.lock().unwrap().push(stored.clone());
        self.tickets.lock().unwrap().insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_ticket(&self, ticket_id: &str, _timeout: Duration) -> Result<Ticket, Status> {
        let mut ticket = self
            .tickets
            .lock()
            .unwrap()
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("ticket {} not found", ticket_id)))?;

        if let Some(connection) = self.assignment.lock().unwrap().clone() {
            ticket.assignment = Some(Assignment { connection });
        }
        Ok(ticket)
    }

    async fn delete_ticket(&self, ticket_id: &str, _timeout: Duration) -> Result<(), Status> {
        self.tickets.lock().unwrap().remove(ticket_id);
        self.deleted.lock().unwrap().push(ticket_id.to_string());
        Ok(())
    }

    async fn watch_assignments(
        &self,
        _ticket_id: &str,
        _timeout: Duration,
    ) -> Result<GrpcStream<WatchAssignmentsResponse>, Status> {
        if let Some((code, message)) = self.watch_error.lock().unwrap().clone() {
            return Err(Status::new(code, message));
        }

        match self.assignment.lock().unwrap().clone() {
            Some(connection) => {
                let updates = vec![
                    Ok(WatchAssignmentsResponse {
                        assignment: Some(Assignment::default()),
                    }),
                    Ok(WatchAssignmentsResponse {
                        assignment: Some(Assignment { connection }),
                    }),
                ];
                Ok(stream::iter(updates).chain(stream::pending()).boxed())
            }
            None => Ok(stream::pending().boxed()),
        }
    }
}

// =============================================================================
// Mock Query Service
// =============================================================================

pub struct MockQueryService {
    pools: Arc<Mutex<HashMap<String, Vec<Vec<Ticket>>>>>,
    error: Arc<Mutex<Option<(Code, String)>>>,
    panics: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockQueryService {
    pub fn new() -> Self {
        Self {
            pools: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            panics: Arc::new(Mutex::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add one QueryTickets response page for `pool`.
    pub fn with_page(self, pool: &str, ticket_ids: &[&str]) -> Self {
        let page = ticket_ids
            .iter()
            .map(|id| Ticket {
                id: id.to_string(),
                ..Default::default()
            })
            .collect();
        self.pools
            .lock()
            .unwrap()
            .entry(pool.to_string())
            .or_default()
            .push(page);
        self
    }

    pub fn with_error(self, code: Code, message: &str) -> Self {
        *self.error.lock().unwrap() = Some((code, message.to_string()));
        self
    }

    /// Panic inside every QueryTickets call.
    pub fn with_panic(self) -> Self {
        *self.panics.lock().unwrap() = true;
        self
    }

    /// Pool names queried, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockQueryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseQueryService for MockQueryService {
    async fn query_tickets(
        &self,
        pool: Pool,
        _timeout: Duration,
    ) -> Result<GrpcStream<QueryTicketsResponse>, Status> {
        self.calls.lock().unwrap().push(pool.name.clone());

        let panics = *self.panics.lock().unwrap();
        if panics {
            panic!("mock query service panicked");
        }

        if let Some((code, message)) = self.error.lock().unwrap().clone() {
            return Err(Status::new(code, message));
        }

        let pages: Vec<Result<QueryTicketsResponse, Status>> = self
            .pools
            .lock()
            .unwrap()
            .get(&pool.name)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|tickets| Ok(QueryTicketsResponse { tickets }))
            .collect();
        Ok(stream::iter(pages).boxed())
    }
}
