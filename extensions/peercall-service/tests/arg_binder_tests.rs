use peercall::wire::{ValueKind, WireValue};
use peercall_service::{
    BindError, LocalResolver, MethodSpec, ParamSpec, bind_receive, bind_send,
    constants::CALL_SIDE_PEER_TYPE_ID,
};
use std::any::Any;
use std::sync::Arc;

struct FakePeer {
    label: String,
}

struct FakeClock {
    micros: u64,
}

/// Test resolver standing in for the receiving peer's trusted context.
struct TestResolver {
    peer: Arc<FakePeer>,
    clock: Option<Arc<FakeClock>>,
}

impl LocalResolver for TestResolver {
    fn resolve_call_side(&self, type_id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        (type_id == CALL_SIDE_PEER_TYPE_ID)
            .then(|| Arc::clone(&self.peer) as Arc<dyn Any + Send + Sync>)
    }

    fn resolve_service(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        (key == "clock")
            .then(|| self.clock.clone().map(|c| c as Arc<dyn Any + Send + Sync>))
            .flatten()
    }
}

fn resolver() -> TestResolver {
    TestResolver {
        peer: Arc::new(FakePeer {
            label: "local-peer".to_string(),
        }),
        clock: Some(Arc::new(FakeClock { micros: 1234 })),
    }
}

fn hybrid_spec() -> MethodSpec {
    // (wire i64, call-side peer, wire str, service clock)
    MethodSpec::new("LogService", "record")
        .param(ParamSpec::wire("i64"))
        .param(ParamSpec::call_side(CALL_SIDE_PEER_TYPE_ID))
        .param(ParamSpec::wire("str"))
        .param(ParamSpec::from_services("clock"))
        .callable()
}

#[test]
fn send_mode_strips_locally_resolved_slots() {
    let spec = hybrid_spec();

    // The caller populates every slot, including the ones it must not send.
    let supplied = vec![
        WireValue::I64(7),
        WireValue::Str("forged peer".to_string()),
        WireValue::Str("hello".to_string()),
        WireValue::Str("forged clock".to_string()),
    ];

    let payload = bind_send(&spec, &supplied).expect("send bind failed");

    // Only the two wire slots remain, in declaration order, not null-padded.
    assert_eq!(
        payload,
        vec![WireValue::I64(7), WireValue::Str("hello".to_string())]
    );
}

#[test]
fn send_mode_allows_trailing_omission() {
    let spec = MethodSpec::new("MathService", "clamp")
        .param(ParamSpec::wire("i64"))
        .param(ParamSpec::wire_with_default("i64", WireValue::I64(100)));

    let payload = bind_send(&spec, &[WireValue::I64(5)]).unwrap();
    assert_eq!(payload, vec![WireValue::I64(5)]);

    // Without a declared default, the receiving side reports the gap.
    let spec = MethodSpec::new("MathService", "clamp3")
        .param(ParamSpec::wire("i64"))
        .param(ParamSpec::wire("i64"))
        .param(ParamSpec::wire("i64"));
    let payload = bind_send(&spec, &[WireValue::I64(1)]).unwrap();
    assert_eq!(payload.len(), 1);

    let err = bind_receive(&spec, &payload, &resolver()).unwrap_err();
    assert!(matches!(err, BindError::MissingArgument { index: 1, .. }));
}

#[test]
fn send_mode_rejects_surplus_arguments() {
    let spec = MethodSpec::new("MathService", "negate").param(ParamSpec::wire("i64"));
    let err = bind_send(&spec, &[WireValue::I64(1), WireValue::I64(2)]).unwrap_err();
    assert_eq!(
        err,
        BindError::TooManyArguments {
            declared: 1,
            supplied: 2,
        }
    );
}

#[test]
fn receive_mode_reconstructs_the_full_argument_list() {
    let spec = hybrid_spec();
    let payload = vec![WireValue::I64(7), WireValue::Str("hello".to_string())];

    let args = bind_receive(&spec, &payload, &resolver()).expect("receive bind failed");
    assert_eq!(args.len(), 4);

    assert_eq!(args[0].value(), Some(&WireValue::I64(7)));

    let peer: Arc<FakePeer> = args[1].local().expect("peer slot should be local");
    assert_eq!(peer.label, "local-peer");

    assert_eq!(args[2].value(), Some(&WireValue::Str("hello".to_string())));

    let clock: Arc<FakeClock> = args[3].local().expect("clock slot should be local");
    assert_eq!(clock.micros, 1234);
}

#[test]
fn receive_mode_uses_declared_defaults_for_short_payloads() {
    let spec = MethodSpec::new("MathService", "scale")
        .param(ParamSpec::wire("f64"))
        .param(ParamSpec::wire_with_default("f64", WireValue::F64(1.0)));

    let args = bind_receive(&spec, &[WireValue::F64(2.5)], &resolver()).unwrap();
    assert_eq!(args[1].value(), Some(&WireValue::F64(1.0)));
}

#[test]
fn receive_mode_fails_on_unresolved_local_context() {
    let spec = MethodSpec::new("LogService", "record").param(ParamSpec::from_services("clock"));
    let without_clock = TestResolver {
        peer: Arc::new(FakePeer {
            label: "p".to_string(),
        }),
        clock: None,
    };

    let err = bind_receive(&spec, &[], &without_clock).unwrap_err();
    assert_eq!(
        err,
        BindError::UnresolvedService {
            key: "clock".to_string(),
        }
    );
}

#[test]
fn receive_mode_rejects_surplus_payload_values() {
    let spec = MethodSpec::new("MathService", "negate").param(ParamSpec::wire("i64"));
    let err =
        bind_receive(&spec, &[WireValue::I64(1), WireValue::I64(2)], &resolver()).unwrap_err();
    assert!(matches!(err, BindError::TooManyArguments { .. }));
}

#[test]
fn declared_types_are_enforced_with_numeric_widening() {
    let spec = MethodSpec::new("MathService", "scale").param(ParamSpec::wire("f64"));

    // i64 widens to a declared f64.
    let args = bind_receive(&spec, &[WireValue::I64(3)], &resolver()).unwrap();
    assert_eq!(args[0].value(), Some(&WireValue::F64(3.0)));

    // Anything else mismatches.
    let spec = MethodSpec::new("MathService", "negate").param(ParamSpec::wire("i64"));
    let err = bind_receive(
        &spec,
        &[WireValue::Str("three".to_string())],
        &resolver(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BindError::TypeMismatch {
            index: 0,
            expected: "i64".to_string(),
            actual: ValueKind::Str,
        }
    );

    // Null passes for any declared type.
    let spec = MethodSpec::new("MathService", "describe").param(ParamSpec::wire("str"));
    let args = bind_receive(&spec, &[WireValue::Null], &resolver()).unwrap();
    assert_eq!(args[0].value(), Some(&WireValue::Null));

    // Unknown type identities pass through for the handler to interpret.
    let spec = MethodSpec::new("MathService", "raw").param(ParamSpec::wire("AppBlob"));
    let args = bind_receive(&spec, &[WireValue::Bytes(vec![1, 2])], &resolver()).unwrap();
    assert_eq!(args[0].value(), Some(&WireValue::Bytes(vec![1, 2])));
}

#[test]
fn classification_is_identical_on_both_sides() {
    // Sending through one side and binding on the other lines payload
    // indices up with wire parameters only.
    let spec = hybrid_spec();
    let supplied = vec![
        WireValue::I64(42),
        WireValue::Null,
        WireValue::Str("aligned".to_string()),
        WireValue::Null,
    ];

    let payload = bind_send(&spec, &supplied).unwrap();
    let args = bind_receive(&spec, &payload, &resolver()).unwrap();

    assert_eq!(args[0].value(), Some(&WireValue::I64(42)));
    assert_eq!(args[2].value(), Some(&WireValue::Str("aligned".to_string())));
}
