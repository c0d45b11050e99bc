use peercall::rpc::{
    RpcCall, RpcDispatcher, RpcMethodRef, RpcRecv, RpcReply, RpcReplyOutcome,
};
use peercall::wire::{WireValue, encode_values};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

fn ping_call(expects_reply: bool) -> RpcCall {
    RpcCall {
        method_ref: RpcMethodRef {
            service: "EchoService".to_string(),
            method: "ping".to_string(),
            param_type_ids: vec!["str".to_string()],
            is_static: false,
        },
        wire_args: vec![WireValue::Str("ping".to_string())],
        expects_reply,
    }
}

#[test]
fn call_and_reply_round_trip_between_two_dispatchers() {
    let wire: Rc<RefCell<Vec<Vec<u8>>>> = Rc::new(RefCell::new(Vec::new()));

    let mut caller = RpcDispatcher::new();
    let mut callee = RpcDispatcher::new();

    let outcomes: Arc<Mutex<Vec<RpcReplyOutcome>>> = Arc::new(Mutex::new(Vec::new()));

    let sent_id = {
        let wire = Rc::clone(&wire);
        let outcomes = Arc::clone(&outcomes);
        caller
            .call(
                ping_call(true),
                move |bytes: &[u8]| wire.borrow_mut().push(bytes.to_vec()),
                Some(Box::new(move |outcome| {
                    outcomes.lock().unwrap().push(outcome);
                })),
            )
            .expect("caller call failed")
    };

    // Exactly one pending entry exists between send and completion.
    assert_eq!(caller.pending_len(), 1);

    let inbound = callee
        .receive_bytes(&wire.borrow_mut().remove(0))
        .expect("callee receive failed");
    let call = match inbound {
        RpcRecv::Call(call) => call,
        other => panic!("expected inbound call, got {other:?}"),
    };
    assert_eq!(call.correlation_id, sent_id);
    assert_eq!(call.args, vec![WireValue::Str("ping".to_string())]);
    assert!(call.expects_reply);

    {
        let wire = Rc::clone(&wire);
        callee
            .respond(
                RpcReply {
                    correlation_id: call.correlation_id,
                    error: None,
                    result: WireValue::Str("pong".to_string()),
                },
                move |bytes: &[u8]| wire.borrow_mut().push(bytes.to_vec()),
            )
            .expect("callee respond failed");
    }

    let reply_bytes = wire.borrow_mut().remove(0);
    match caller.receive_bytes(&reply_bytes).unwrap() {
        RpcRecv::ReplyDelivered { correlation_id } => assert_eq!(correlation_id, sent_id),
        other => panic!("expected delivered reply, got {other:?}"),
    }

    assert_eq!(caller.pending_len(), 0);
    assert_eq!(
        *outcomes.lock().unwrap(),
        vec![RpcReplyOutcome::Reply {
            error: None,
            result: WireValue::Str("pong".to_string()),
        }]
    );

    // A duplicate of the same reply must not re-fulfill anything.
    match caller.receive_bytes(&reply_bytes).unwrap() {
        RpcRecv::ReplyUnmatched { correlation_id } => assert_eq!(correlation_id, sent_id),
        other => panic!("expected unmatched reply, got {other:?}"),
    }
    assert_eq!(outcomes.lock().unwrap().len(), 1);
}

#[test]
fn replies_complete_independently_of_arrival_order() {
    let wire: Rc<RefCell<Vec<Vec<u8>>>> = Rc::new(RefCell::new(Vec::new()));
    let mut caller = RpcDispatcher::new();
    let mut callee = RpcDispatcher::new();

    let completions: Arc<Mutex<Vec<(u64, RpcReplyOutcome)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut issued = Vec::new();
    for n in 0..2u64 {
        let wire = Rc::clone(&wire);
        let completions = Arc::clone(&completions);
        let id = caller
            .call(
                ping_call(true),
                move |bytes: &[u8]| wire.borrow_mut().push(bytes.to_vec()),
                Some(Box::new(move |outcome| {
                    completions.lock().unwrap().push((n, outcome));
                })),
            )
            .unwrap();
        issued.push(id);
    }
    assert_eq!(caller.pending_len(), 2);
    assert_ne!(issued[0], issued[1]);

    // Deliver both calls, then answer them in reverse order.
    let mut inbound_ids = Vec::new();
    for bytes in wire.borrow_mut().drain(..).collect::<Vec<_>>() {
        match callee.receive_bytes(&bytes).unwrap() {
            RpcRecv::Call(call) => inbound_ids.push(call.correlation_id),
            other => panic!("expected inbound call, got {other:?}"),
        }
    }

    for (idx, correlation_id) in inbound_ids.into_iter().enumerate().rev() {
        let wire = Rc::clone(&wire);
        callee
            .respond(
                RpcReply {
                    correlation_id,
                    error: None,
                    result: WireValue::I64(idx as i64),
                },
                move |bytes: &[u8]| wire.borrow_mut().push(bytes.to_vec()),
            )
            .unwrap();
    }

    for bytes in wire.borrow_mut().drain(..).collect::<Vec<_>>() {
        caller.receive_bytes(&bytes).unwrap();
    }

    assert_eq!(caller.pending_len(), 0);
    let completions = completions.lock().unwrap();
    // Second call completed first, each with its own result.
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[0].0, 1);
    assert_eq!(completions[1].0, 0);
}

#[test]
fn no_reply_call_registers_no_pending_state() {
    let mut caller = RpcDispatcher::new();
    let emitted: Rc<RefCell<Vec<Vec<u8>>>> = Rc::new(RefCell::new(Vec::new()));

    {
        let emitted = Rc::clone(&emitted);
        caller
            .call(
                ping_call(false),
                move |bytes: &[u8]| emitted.borrow_mut().push(bytes.to_vec()),
                None,
            )
            .unwrap();
    }

    assert_eq!(emitted.borrow().len(), 1);
    assert_eq!(caller.pending_len(), 0);
}

#[test]
fn transport_close_fails_every_pending_call() {
    let mut caller = RpcDispatcher::new();
    let outcomes: Arc<Mutex<Vec<RpcReplyOutcome>>> = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..3 {
        let outcomes = Arc::clone(&outcomes);
        caller
            .call(
                ping_call(true),
                |_bytes: &[u8]| {},
                Some(Box::new(move |outcome| {
                    outcomes.lock().unwrap().push(outcome);
                })),
            )
            .unwrap();
    }
    assert_eq!(caller.pending_len(), 3);

    let failed = caller.fail_all_pending("connection closed");
    assert_eq!(failed, 3);
    assert_eq!(caller.pending_len(), 0);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 3);
    for outcome in outcomes.iter() {
        assert_eq!(
            *outcome,
            RpcReplyOutcome::Abandoned {
                reason: "connection closed".to_string(),
            }
        );
    }
}

#[test]
fn malformed_reply_body_fails_the_pending_call() {
    let mut caller = RpcDispatcher::new();
    let outcomes: Arc<Mutex<Vec<RpcReplyOutcome>>> = Arc::new(Mutex::new(Vec::new()));

    let id = {
        let outcomes = Arc::clone(&outcomes);
        caller
            .call(
                ping_call(true),
                |_bytes: &[u8]| {},
                Some(Box::new(move |outcome| {
                    outcomes.lock().unwrap().push(outcome);
                })),
            )
            .unwrap()
    };

    // "=" envelope whose error slot holds an integer: outer parses, body fails.
    let bytes = encode_values(&[
        WireValue::Str("=".to_string()),
        WireValue::I64(id as i64),
        WireValue::I64(1),
        WireValue::Null,
    ])
    .unwrap();

    match caller.receive_bytes(&bytes).unwrap() {
        RpcRecv::MalformedReply { correlation_id } => assert_eq!(correlation_id, id),
        other => panic!("expected malformed reply, got {other:?}"),
    }

    assert_eq!(caller.pending_len(), 0);
    let outcomes = outcomes.lock().unwrap();
    assert!(matches!(outcomes[0], RpcReplyOutcome::Abandoned { .. }));
}

#[test]
fn malformed_call_body_surfaces_the_owed_reply() {
    let mut callee = RpcDispatcher::new();

    let bytes = encode_values(&[
        WireValue::Str("?".to_string()),
        WireValue::I64(77),
        WireValue::Bool(false),
        WireValue::Seq(vec![]),
    ])
    .unwrap();

    match callee.receive_bytes(&bytes).unwrap() {
        RpcRecv::MalformedCall {
            correlation_id,
            expects_reply,
            reason,
        } => {
            assert_eq!(correlation_id, 77);
            assert!(expects_reply);
            assert!(reason.contains("failed to reconstruct call"));
        }
        other => panic!("expected malformed call, got {other:?}"),
    }
}
