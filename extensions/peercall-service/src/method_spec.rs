use peercall::rpc::RpcMethodRef;
use peercall::wire::WireValue;

/// How one declared parameter gets its value at invocation time.
///
/// The classification is part of the registered descriptor and must be
/// declared identically on both sides of a call, so that payload indices
/// line up with wire-supplied parameters only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// The value travels in the call payload.
    Wire,

    /// Resolved on the called side from its own trusted context; never
    /// transmitted. The type id `"peer"` resolves to the receiving peer.
    CallSide,

    /// Resolved on the called side from its service registry by key; never
    /// transmitted.
    FromServices { key: String },
}

/// One declared parameter of a callable method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub type_id: String,
    pub binding: ParamBinding,
    /// Used when the payload is shorter than the wire-parameter list.
    pub default: Option<WireValue>,
}

impl ParamSpec {
    pub fn wire(type_id: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            binding: ParamBinding::Wire,
            default: None,
        }
    }

    pub fn wire_with_default(type_id: &str, default: WireValue) -> Self {
        Self {
            type_id: type_id.to_string(),
            binding: ParamBinding::Wire,
            default: Some(default),
        }
    }

    pub fn call_side(type_id: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            binding: ParamBinding::CallSide,
            default: None,
        }
    }

    pub fn from_services(key: &str) -> Self {
        Self {
            type_id: key.to_string(),
            binding: ParamBinding::FromServices {
                key: key.to_string(),
            },
            default: None,
        }
    }

    pub fn is_wire(&self) -> bool {
        self.binding == ParamBinding::Wire
    }
}

/// Marks a method as remotely callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallableMarker {
    /// A no-reply method never sends results or errors back to the caller,
    /// making such calls quicker. The marker overrides the call site.
    pub no_reply: bool,
}

/// What sort of declaration the method is. Accessors and operators count as
/// "special" for access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Regular,
    PropertyGet,
    PropertySet,
    Operator,
}

impl MethodKind {
    pub fn is_special(&self) -> bool {
        !matches!(self, MethodKind::Regular)
    }
}

/// Explicit per-method binding descriptor.
///
/// Built once at registration time and consulted on every call; replaces
/// attribute/reflection discovery with declared data. The caller side uses
/// the same descriptor to strip locally-resolved parameters before
/// transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub service: String,
    pub method: String,
    pub params: Vec<ParamSpec>,
    pub is_static: bool,
    pub kind: MethodKind,
    pub is_private: bool,
    pub callable: Option<CallableMarker>,
}

impl MethodSpec {
    pub fn new(service: &str, method: &str) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
            params: Vec::new(),
            is_static: false,
            kind: MethodKind::Regular,
            is_private: false,
            callable: None,
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn of_kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn callable(mut self) -> Self {
        self.callable = Some(CallableMarker { no_reply: false });
        self
    }

    pub fn callable_no_reply(mut self) -> Self {
        self.callable = Some(CallableMarker { no_reply: true });
        self
    }

    /// Whether the callable marker opts this method out of replies.
    pub fn no_reply(&self) -> bool {
        self.callable.map(|marker| marker.no_reply).unwrap_or(false)
    }

    /// The serializable reference transmitted for calls to this method.
    pub fn method_ref(&self) -> RpcMethodRef {
        RpcMethodRef {
            service: self.service.clone(),
            method: self.method.clone(),
            param_type_ids: self.params.iter().map(|p| p.type_id.clone()).collect(),
            is_static: self.is_static,
        }
    }
}
