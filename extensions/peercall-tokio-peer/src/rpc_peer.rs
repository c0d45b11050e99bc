use crate::transport::{PeerTransportHandle, TransportEvent};
use bytes::Bytes;
use peercall::rpc::{RpcCall, RpcDispatcher, RpcInboundCall, RpcRecv, RpcReply};
use peercall::wire::WireValue;
use peercall_service::constants::CALL_SIDE_PEER_TYPE_ID;
use peercall_service::{
    AccessPolicy, LocalResolver, MethodSpec, PeerCallerInterface, RpcCallError, ServiceRegistry,
    bind_receive, bind_send, dispatch_call_with_reply, unwrap_reply_outcome,
};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Connection readiness as observed through transport lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerTransportState {
    Connected,
    Disconnected,
}

type StateChangeHandler = Box<dyn Fn(PeerTransportState) + Send + Sync>;

/// A bidirectional RPC peer over one message transport.
///
/// Both ends of a connection are symmetric: each can invoke methods the
/// other registered, and each processes inbound calls concurrently with its
/// own outbound invocations. The peer owns the pending-call table (via the
/// dispatcher) and the transport handle; disposing it abandons every
/// outstanding call.
pub struct RpcPeer {
    dispatcher: Arc<Mutex<RpcDispatcher>>,
    registry: Arc<ServiceRegistry>,
    policy: AccessPolicy,
    outbound: mpsc::UnboundedSender<Bytes>,
    ready: AtomicBool,
    state_change_handler: Mutex<Option<StateChangeHandler>>,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl RpcPeer {
    /// Builds a peer over `transport` exposing the given registry under the
    /// given policy, and starts its event loop. Must be called within a
    /// Tokio runtime.
    pub fn new(
        transport: PeerTransportHandle,
        registry: ServiceRegistry,
        policy: AccessPolicy,
    ) -> Arc<Self> {
        let peer = Arc::new(Self {
            dispatcher: Arc::new(Mutex::new(RpcDispatcher::new())),
            registry: Arc::new(registry),
            policy,
            outbound: transport.outbound,
            ready: AtomicBool::new(false),
            state_change_handler: Mutex::new(None),
            event_task: Mutex::new(None),
        });

        // The event loop holds only a weak handle so dropping the last
        // user-held Arc still tears the peer down.
        let weak = Arc::downgrade(&peer);
        let task = tokio::spawn(run_event_loop(weak, transport.events));
        *peer.event_task.lock().unwrap() = Some(task);

        peer
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Number of outbound calls still awaiting replies.
    pub fn pending_calls(&self) -> usize {
        self.dispatcher.lock().unwrap().pending_len()
    }

    /// Registers a handler observing `Connected`/`Disconnected` transitions.
    /// The current state is replayed immediately if already connected.
    pub fn set_state_change_handler<F>(&self, handler: F)
    where
        F: Fn(PeerTransportState) + Send + Sync + 'static,
    {
        if self.is_ready() {
            handler(PeerTransportState::Connected);
        }
        *self.state_change_handler.lock().unwrap() = Some(Box::new(handler));
    }

    /// Reply-expecting invocation bounded by `deadline`.
    ///
    /// On expiry the pending entry is swept immediately rather than left for
    /// the connection-close sweep. The sans-io core stays deadline-free;
    /// this is purely a caller-side bound.
    pub async fn invoke_remote_with_deadline(
        &self,
        spec: &MethodSpec,
        args: Vec<WireValue>,
        deadline: Duration,
    ) -> Result<WireValue, RpcCallError> {
        if spec.no_reply() {
            self.invoke_remote_no_reply(spec, args).await?;
            return Ok(WireValue::Null);
        }
        if !self.is_ready() {
            return Err(RpcCallError::NotConnected);
        }

        let (correlation_id, rx) = {
            let mut dispatcher = self.dispatcher.lock().unwrap();
            dispatch_call_with_reply(&mut dispatcher, spec, &args, |bytes| {
                self.send_bytes(bytes)
            })?
        };

        // A close racing the send would miss this entry in its sweep.
        if !self.is_ready() {
            self.dispatcher
                .lock()
                .unwrap()
                .fail_pending(correlation_id, "connection closed");
        }

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(outcome)) => unwrap_reply_outcome(outcome),
            Ok(Err(_)) => Err(RpcCallError::ConnectionClosed),
            Err(_) => {
                self.dispatcher
                    .lock()
                    .unwrap()
                    .fail_pending(correlation_id, "deadline exceeded");
                Err(RpcCallError::DeadlineExceeded)
            }
        }
    }

    /// Tears the peer down: stops the event loop and fails every pending
    /// call with `ConnectionClosed`.
    pub fn close(&self) {
        if let Some(task) = self.event_task.lock().unwrap().take() {
            task.abort();
        }
        self.handle_close();
    }

    fn send_bytes(&self, bytes: &[u8]) {
        if self.outbound.send(Bytes::copy_from_slice(bytes)).is_err() {
            tracing::warn!("transport dropped an outbound message");
        }
    }

    fn notify_state(&self, state: PeerTransportState) {
        if let Some(handler) = self.state_change_handler.lock().unwrap().as_ref() {
            handler(state);
        }
    }

    fn handle_close(&self) {
        let was_ready = self.ready.swap(false, Ordering::SeqCst);
        let abandoned = self
            .dispatcher
            .lock()
            .unwrap()
            .fail_all_pending("connection closed");
        if abandoned > 0 {
            tracing::debug!(abandoned, "transport closed with calls in flight");
        }
        if was_ready {
            self.notify_state(PeerTransportState::Disconnected);
        }
    }

    fn handle_data(self: &Arc<Self>, bytes: &[u8]) {
        let recv = self.dispatcher.lock().unwrap().receive_bytes(bytes);
        match recv {
            Ok(RpcRecv::Call(call)) => {
                // Each inbound call is its own task: invocation may suspend
                // on nested work, and completion order is allowed to differ
                // from arrival order.
                let peer = Arc::clone(self);
                tokio::spawn(async move {
                    peer.process_inbound_call(call).await;
                });
            }
            Ok(RpcRecv::MalformedCall {
                correlation_id,
                expects_reply,
                reason,
            }) => {
                tracing::error!(correlation_id, %reason, "inbound call failed to reconstruct");
                if expects_reply {
                    self.send_reply(RpcReply {
                        correlation_id,
                        error: Some(RpcCallError::EnvelopeDecode(reason).to_string()),
                        result: WireValue::Null,
                    });
                }
            }
            // Reply routing already happened inside the dispatcher.
            Ok(RpcRecv::ReplyDelivered { .. })
            | Ok(RpcRecv::ReplyUnmatched { .. })
            | Ok(RpcRecv::MalformedReply { .. }) => {}
            Err(e) => {
                tracing::error!(error = ?e, "dropping undecodable envelope");
            }
        }
    }

    async fn process_inbound_call(self: Arc<Self>, call: RpcInboundCall) {
        let (outcome, method_no_reply) = self.execute_inbound(&call).await;

        if call.expects_reply && !method_no_reply {
            let reply = match outcome {
                Ok(result) => RpcReply {
                    correlation_id: call.correlation_id,
                    error: None,
                    result,
                },
                Err(e) => RpcReply {
                    correlation_id: call.correlation_id,
                    error: Some(e.to_string()),
                    result: WireValue::Null,
                },
            };
            self.send_reply(reply);
        } else if let Err(e) = outcome {
            // The caller opted out of failure visibility; nothing goes back
            // on the wire.
            tracing::debug!(
                correlation_id = call.correlation_id,
                error = %e,
                "suppressed failure of no-reply call"
            );
        }
    }

    /// Runs the inbound pipeline: resolve, authorize, bind, invoke.
    ///
    /// Returns the invocation outcome plus the method's own no-reply marker
    /// (false when resolution failed before the marker was knowable).
    async fn execute_inbound(
        self: &Arc<Self>,
        call: &RpcInboundCall,
    ) -> (Result<WireValue, RpcCallError>, bool) {
        let (spec, handler) = match self.registry.resolve(&call.method_ref) {
            Some(registered) => (registered.spec.clone(), Arc::clone(&registered.handler)),
            None => {
                return (
                    Err(RpcCallError::MethodNotFound(call.method_ref.signature())),
                    false,
                );
            }
        };
        let method_no_reply = spec.no_reply();

        let service = self.registry.service(&spec.service).cloned();
        let instance = self.registry.service_instance(&spec.service);
        if !spec.is_static && instance.is_none() {
            return (
                Err(RpcCallError::ServiceNotFound(spec.service.clone())),
                method_no_reply,
            );
        }

        if let Some(reason) = self.policy.check(&spec, service.as_ref(), instance.as_ref()) {
            return (Err(RpcCallError::AccessDenied(reason)), method_no_reply);
        }

        let resolver = PeerLocalResolver {
            peer: Arc::clone(self),
            registry: Arc::clone(&self.registry),
        };
        let args = match bind_receive(&spec, &call.args, &resolver) {
            Ok(args) => args,
            Err(e) => return (Err(RpcCallError::Bind(e)), method_no_reply),
        };

        // Handler failures are caught and stringified here; they must never
        // propagate into the transport layer.
        match handler(args).await {
            Ok(result) => (Ok(result), method_no_reply),
            Err(e) => (
                Err(RpcCallError::RemoteInvocationFailed(e.to_string())),
                method_no_reply,
            ),
        }
    }

    fn send_reply(&self, reply: RpcReply) {
        let result = self
            .dispatcher
            .lock()
            .unwrap()
            .respond(reply, |bytes| self.send_bytes(bytes));
        if let Err(e) = result {
            tracing::error!(error = ?e, "failed to encode reply envelope");
        }
    }
}

#[async_trait::async_trait]
impl PeerCallerInterface for RpcPeer {
    async fn invoke_remote(
        &self,
        spec: &MethodSpec,
        args: Vec<WireValue>,
    ) -> Result<WireValue, RpcCallError> {
        // The registered marker, not the call site, decides reply-ness.
        if spec.no_reply() {
            self.invoke_remote_no_reply(spec, args).await?;
            return Ok(WireValue::Null);
        }
        if !self.is_ready() {
            return Err(RpcCallError::NotConnected);
        }

        let (correlation_id, rx) = {
            let mut dispatcher = self.dispatcher.lock().unwrap();
            dispatch_call_with_reply(&mut dispatcher, spec, &args, |bytes| {
                self.send_bytes(bytes)
            })?
        };

        // A close racing the send would miss this entry in its sweep.
        if !self.is_ready() {
            self.dispatcher
                .lock()
                .unwrap()
                .fail_pending(correlation_id, "connection closed");
        }

        match rx.await {
            Ok(outcome) => unwrap_reply_outcome(outcome),
            Err(_) => Err(RpcCallError::ConnectionClosed),
        }
    }

    async fn invoke_remote_no_reply(
        &self,
        spec: &MethodSpec,
        args: Vec<WireValue>,
    ) -> Result<(), RpcCallError> {
        if !self.is_ready() {
            return Err(RpcCallError::NotConnected);
        }

        let wire_args = bind_send(spec, &args)?;
        self.dispatcher.lock().unwrap().call(
            RpcCall {
                method_ref: spec.method_ref(),
                wire_args,
                expects_reply: false,
            },
            |bytes| self.send_bytes(bytes),
            None,
        )?;
        Ok(())
    }
}

impl Drop for RpcPeer {
    fn drop(&mut self) {
        if let Some(task) = self.event_task.lock().unwrap().take() {
            task.abort();
        }
        self.dispatcher
            .lock()
            .unwrap()
            .fail_all_pending("connection closed");
    }
}

/// Trusted-context resolver for inbound binding: injects this peer for
/// call-side `"peer"` parameters and defers to the registry for keyed
/// service parameters.
struct PeerLocalResolver {
    peer: Arc<RpcPeer>,
    registry: Arc<ServiceRegistry>,
}

impl LocalResolver for PeerLocalResolver {
    fn resolve_call_side(&self, type_id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        (type_id == CALL_SIDE_PEER_TYPE_ID)
            .then(|| Arc::clone(&self.peer) as Arc<dyn Any + Send + Sync>)
    }

    fn resolve_service(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.registry.resolve_service(key)
    }
}

async fn run_event_loop(peer: Weak<RpcPeer>, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
    while let Some(event) = events.recv().await {
        let Some(peer) = peer.upgrade() else {
            return;
        };

        match event {
            TransportEvent::Connected => {
                peer.ready.store(true, Ordering::SeqCst);
                peer.notify_state(PeerTransportState::Connected);
            }
            TransportEvent::Data(bytes) => {
                peer.handle_data(&bytes);
            }
            TransportEvent::Error { code, message } => {
                tracing::warn!(%code, %message, "transport error");
            }
            TransportEvent::Closed => {
                peer.handle_close();
            }
        }
    }

    // Event stream ended without an explicit close; treat it as one.
    if let Some(peer) = peer.upgrade() {
        peer.handle_close();
    }
}
