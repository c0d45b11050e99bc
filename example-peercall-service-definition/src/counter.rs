use peercall::wire::WireValue;
use peercall_service::{MethodSpec, ParamSpec, ServiceDescriptor};

pub const SERVICE: &str = "CounterService";

pub fn service_descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new(SERVICE)
}

/// `increment(amount: i64 = 1) -> i64`. Returns the new counter value.
pub fn increment() -> MethodSpec {
    MethodSpec::new(SERVICE, "increment")
        .param(ParamSpec::wire_with_default("i64", WireValue::I64(1)))
        .callable()
}

/// `current() -> i64`.
pub fn current() -> MethodSpec {
    MethodSpec::new(SERVICE, "current").callable()
}
