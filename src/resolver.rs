//! URI expansion and service-name lookup.
//!
//! The actual DNS/SRV machinery is an external collaborator the core merely
//! calls into; this module only defines the seam (a `Resolver` trait) plus
//! the connection-string utilities the transport-backed endpoints need
//! regardless of which resolver is plugged in.
use url::Url;

use crate::errors::*;

/// Expands a logical connection string or service name into concrete
/// transport endpoints.
///
/// The default implementation is a pass-through: a `connection_string` names
/// itself as the sole endpoint, and `service_name` lookups fail with
/// `ServiceNotFound`, since real SRV resolution lives outside this crate.
pub trait Resolver {
    fn resolve_connection_string(&self, connection_string: &str) -> Result<Vec<String>>;
    fn resolve_service(&self, service_name: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughResolver;

impl Resolver for PassthroughResolver {
    fn resolve_connection_string(&self, connection_string: &str) -> Result<Vec<String>> {
        Ok(vec![connection_string.to_string()])
    }

    fn resolve_service(&self, service_name: &str) -> Result<Vec<String>> {
        bail!(ErrorKind::ServiceNotFound(service_name.to_string()))
    }
}

/// Rewrites the host component of a `tcp://` URI to the wildcard `*`, the
/// transport's "bind to all interfaces" address. Non-`tcp` schemes and
/// malformed URIs are returned unchanged.
pub fn rewrite_host_for_bind(connection_string: &str) -> String {
    let Ok(mut url) = Url::parse(connection_string) else {
        return connection_string.to_string();
    };
    if url.scheme() != "tcp" {
        return connection_string.to_string();
    }
    if url.set_host(Some("*")).is_err() {
        return connection_string.to_string();
    }
    url.to_string()
}

/// Validates that a connection string at least parses as a URI with a
/// recognized scheme; used to fail fast on an obviously malformed string
/// before attempting any transport call.
pub fn validate_connection_string(connection_string: &str) -> Result<()> {
    if connection_string.starts_with("inproc://") {
        return Ok(());
    }
    Url::parse(connection_string)
        .map(|_| ())
        .chain_err(|| format!("'{}' is not a valid connection string", connection_string))
}
