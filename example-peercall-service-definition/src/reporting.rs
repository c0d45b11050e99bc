use bitcode::{Decode, Encode};
use peercall_service::constants::CALL_SIDE_PEER_TYPE_ID;
use peercall_service::{MethodSpec, ParamSpec, ServiceDescriptor};

pub const SERVICE: &str = "ReportingService";

/// Application-level report carried through the wire as an opaque blob.
#[derive(Encode, Decode, PartialEq, Debug)]
pub struct StatsReport {
    pub source: String,
    pub samples: Vec<f64>,
}

pub fn service_descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new(SERVICE).callable()
}

/// `submit(report: StatsReport, peer) -> i64`. Returns samples accepted so
/// far. The peer slot is resolved on the receiving side and never sent.
pub fn submit() -> MethodSpec {
    MethodSpec::new(SERVICE, "submit")
        .param(ParamSpec::wire("StatsReport"))
        .param(ParamSpec::call_side(CALL_SIDE_PEER_TYPE_ID))
}

/// `note(message: str)`. Fire-and-forget log line; the marker itself opts
/// out of replies.
pub fn note() -> MethodSpec {
    MethodSpec::new(SERVICE, "note")
        .param(ParamSpec::wire("str"))
        .callable_no_reply()
}

pub fn encode_report(report: &StatsReport) -> Vec<u8> {
    bitcode::encode(report)
}

pub fn decode_report(bytes: &[u8]) -> Result<StatsReport, bitcode::Error> {
    bitcode::decode(bytes)
}
