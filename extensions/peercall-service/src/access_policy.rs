use crate::method_registry::ServiceDescriptor;
use crate::method_spec::MethodSpec;

/// Access-control policy evaluated against every inbound call before
/// invocation.
///
/// A pure predicate: returns `None` when the call is allowed, otherwise the
/// denial reason. Checks run in a fixed order and the first failing check
/// wins; each is independently togglable.
///
/// The defaults are conservative-but-usable: static methods, private
/// methods, and non-service statics are allowed, but the explicit callable
/// marker is required; the whitelist is opt-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Allow methods registered without a backing service entry.
    pub allow_non_service_static: bool,
    /// Allow property accessors and operators.
    pub allow_special_methods: bool,
    /// Allow methods declared private.
    pub allow_private_methods: bool,
    /// Allow static methods.
    pub allow_static_methods: bool,
    /// Require the explicit callable marker.
    pub require_callable_marker: bool,
    /// Let a marker on the declaring service satisfy the requirement.
    pub accept_service_marker: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allow_non_service_static: true,
            allow_special_methods: false,
            allow_private_methods: true,
            allow_static_methods: true,
            require_callable_marker: true,
            accept_service_marker: true,
        }
    }
}

impl AccessPolicy {
    pub fn check(
        &self,
        method: &MethodSpec,
        service: Option<&ServiceDescriptor>,
        _instance: Option<&std::sync::Arc<dyn std::any::Any + Send + Sync>>,
    ) -> Option<String> {
        if service.is_none() && !self.allow_non_service_static {
            return Some(format!(
                "no service registration backs {}::{}",
                method.service, method.method
            ));
        }

        if method.kind.is_special() && !self.allow_special_methods {
            return Some(format!(
                "special method {}::{} is not callable",
                method.service, method.method
            ));
        }

        if method.is_private && !self.allow_private_methods {
            return Some(format!(
                "private method {}::{} is not callable",
                method.service, method.method
            ));
        }

        if method.is_static && !self.allow_static_methods {
            return Some(format!(
                "static method {}::{} is not callable",
                method.service, method.method
            ));
        }

        if self.require_callable_marker {
            let method_marked = method.callable.is_some();
            let service_marked =
                self.accept_service_marker && service.map(|s| s.callable).unwrap_or(false);
            if !method_marked && !service_marked {
                return Some(format!(
                    "method {}::{} is not marked callable",
                    method.service, method.method
                ));
            }
        }

        None
    }
}
