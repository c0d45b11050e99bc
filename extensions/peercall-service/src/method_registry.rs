use crate::arg_binder::{BoundArg, LocalResolver};
use crate::method_spec::MethodSpec;
use peercall::rpc::RpcMethodRef;
use peercall::wire::WireValue;
use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Hashes a full method identity for registry keying.
///
/// The hash is only a lookup accelerator; resolution always re-verifies the
/// stored signature exactly, so a collision can never route to the wrong
/// overload.
pub fn method_signature_hash(service: &str, method: &str, param_type_ids: &[String]) -> u64 {
    let key = format!("{}::{}({})", service, method, param_type_ids.join(","));
    xxh3_64(key.as_bytes())
}

pub fn method_ref_hash(method_ref: &RpcMethodRef) -> u64 {
    method_signature_hash(
        &method_ref.service,
        &method_ref.method,
        &method_ref.param_type_ids,
    )
}

pub type RpcHandlerFuture =
    Pin<Box<dyn Future<Output = Result<WireValue, Box<dyn std::error::Error + Send + Sync>>> + Send>>;

/// An invocable registered target. Receives the full ordered argument list
/// produced by the binder.
pub type RpcMethodHandler = Arc<dyn Fn(Vec<BoundArg>) -> RpcHandlerFuture + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub type_id: String,
    /// Service-level callable marker; may satisfy the marker requirement for
    /// the service's methods depending on policy configuration.
    pub callable: bool,
}

impl ServiceDescriptor {
    pub fn new(type_id: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            callable: false,
        }
    }

    pub fn callable(mut self) -> Self {
        self.callable = true;
        self
    }
}

struct ServiceEntry {
    descriptor: ServiceDescriptor,
    instance: Option<Arc<dyn Any + Send + Sync>>,
}

pub struct RegisteredMethod {
    pub spec: MethodSpec,
    pub handler: RpcMethodHandler,
}

#[derive(Debug, PartialEq)]
pub enum RegistryError {
    /// A service with this type identity is already registered.
    DuplicateService(String),

    /// A method with this exact signature is already registered.
    DuplicateMethod(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateService(type_id) => {
                write!(f, "service {type_id} is already registered")
            }
            RegistryError::DuplicateMethod(signature) => {
                write!(f, "method {signature} is already registered")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Local registry of callable targets, populated once at startup.
///
/// Inbound method references resolve against this map; there is no runtime
/// type introspection anywhere. Instance methods additionally require their
/// declaring service to hold a registered instance.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceEntry>,
    methods: HashMap<u64, RegisteredMethod>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_service(
        &mut self,
        descriptor: ServiceDescriptor,
        instance: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<(), RegistryError> {
        match self.services.entry(descriptor.type_id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateService(descriptor.type_id)),
            Entry::Vacant(entry) => {
                entry.insert(ServiceEntry {
                    descriptor,
                    instance,
                });
                Ok(())
            }
        }
    }

    pub fn register_method<F, Fut>(
        &mut self,
        spec: MethodSpec,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Vec<BoundArg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WireValue, Box<dyn std::error::Error + Send + Sync>>>
            + Send
            + 'static,
    {
        let method_ref = spec.method_ref();
        let key = method_ref_hash(&method_ref);

        match self.methods.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateMethod(method_ref.signature())),
            Entry::Vacant(entry) => {
                let wrapped = move |args: Vec<BoundArg>| {
                    Box::pin(handler(args)) as RpcHandlerFuture
                };
                entry.insert(RegisteredMethod {
                    spec,
                    handler: Arc::new(wrapped),
                });
                Ok(())
            }
        }
    }

    /// Resolves a wire-transmitted method reference to its registered target.
    ///
    /// An exact-signature match is required: service, method name, the full
    /// ordered parameter type list, and the static/instance flag.
    pub fn resolve(&self, method_ref: &RpcMethodRef) -> Option<&RegisteredMethod> {
        let registered = self.methods.get(&method_ref_hash(method_ref))?;
        if registered.spec.method_ref() == *method_ref {
            Some(registered)
        } else {
            None
        }
    }

    pub fn service(&self, type_id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(type_id).map(|entry| &entry.descriptor)
    }

    pub fn service_instance(&self, type_id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services
            .get(type_id)
            .and_then(|entry| entry.instance.as_ref().map(Arc::clone))
    }
}

impl LocalResolver for ServiceRegistry {
    /// The bare registry resolves no call-side context; the owning peer
    /// layers self-injection on top.
    fn resolve_call_side(&self, _type_id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }

    fn resolve_service(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.service_instance(key)
    }
}
