use example_peercall_service_definition::{counter, reporting};
use peercall::wire::WireValue;
use peercall_service::{AccessPolicy, PeerCallerInterface, ServiceRegistry};
use peercall_tokio_peer::{RpcPeer, memory_transport_pair};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::join;

struct CounterState {
    count: AtomicI64,
}

#[tokio::main]
async fn main() {
    let (transport_a, transport_b) = memory_transport_pair();

    // Peer A exposes the services.
    let peer_a = {
        let state = Arc::new(CounterState {
            count: AtomicI64::new(0),
        });

        let mut registry = ServiceRegistry::new();
        registry
            .register_service(counter::service_descriptor(), Some(state.clone()))
            .unwrap();
        registry
            .register_service(reporting::service_descriptor(), Some(Arc::new(())))
            .unwrap();

        {
            let state = state.clone();
            registry
                .register_method(counter::increment(), move |args| {
                    let state = state.clone();
                    async move {
                        let amount = args[0]
                            .value()
                            .and_then(WireValue::as_i64)
                            .ok_or("amount must be an integer")?;
                        let value = state.count.fetch_add(amount, Ordering::SeqCst) + amount;
                        Ok(WireValue::I64(value))
                    }
                })
                .unwrap();
        }
        {
            let state = state.clone();
            registry
                .register_method(counter::current(), move |_args| {
                    let state = state.clone();
                    async move { Ok(WireValue::I64(state.count.load(Ordering::SeqCst))) }
                })
                .unwrap();
        }
        registry
            .register_method(reporting::submit(), |args| {
                async move {
                    let blob = args[0]
                        .value()
                        .and_then(WireValue::as_bytes)
                        .ok_or("report must be a byte blob")?;
                    let report = reporting::decode_report(blob)?;
                    println!(
                        "peer A received report from {:?} with {} samples",
                        report.source,
                        report.samples.len()
                    );
                    Ok(WireValue::I64(report.samples.len() as i64))
                }
            })
            .unwrap();
        registry
            .register_method(reporting::note(), |args| {
                async move {
                    let message = args[0]
                        .value()
                        .and_then(WireValue::as_str)
                        .unwrap_or_default()
                        .to_string();
                    println!("peer A note: {message}");
                    Ok(WireValue::Null)
                }
            })
            .unwrap();

        RpcPeer::new(transport_a, registry, AccessPolicy::default())
    };

    // Peer B only calls.
    let peer_b = RpcPeer::new(
        transport_b,
        ServiceRegistry::new(),
        AccessPolicy::default(),
    );

    // Give both event loops a moment to observe the connect event.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let increment_spec = counter::increment();
    let submit_spec = reporting::submit();
    let (res1, res2, res3) = join!(
        peer_b.invoke_remote(&increment_spec, vec![WireValue::I64(5)]),
        peer_b.invoke_remote(&increment_spec, vec![]),
        peer_b.invoke_remote(
            &submit_spec,
            vec![WireValue::Bytes(reporting::encode_report(
                &reporting::StatsReport {
                    source: "peer-b".to_string(),
                    samples: vec![1.0, 2.0, 3.0],
                }
            ))],
        ),
    );

    println!("increment(5) -> {res1:?}");
    println!("increment()  -> {res2:?}");
    println!("submit(..)   -> {res3:?}");

    let _ = peer_b
        .invoke_remote_no_reply(
            &reporting::note(),
            vec![WireValue::Str("all done".to_string())],
        )
        .await;

    let current = peer_b.invoke_remote(&counter::current(), vec![]).await;
    println!("current()    -> {current:?}");

    peer_a.close();
    peer_b.close();
}
