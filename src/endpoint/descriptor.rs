//! Endpoint Descriptor Module
//!
//! Static description of one endpoint: how to build its request and which
//! tags it provides or invalidates.

use std::fmt;

use serde_json::Value;

use crate::endpoint::{RequestSpec, TagSet};
use crate::error::{CacheError, Result};

/// Builds the request for a set of args, or explains why it cannot.
pub type BuildRequest = fn(&Value) -> std::result::Result<RequestSpec, String>;
/// Tags provided by a query, from its decoded result and args.
pub type ProvidesTags = fn(&Value, &Value) -> TagSet;
/// Tags invalidated by a successful mutation, from its args.
pub type InvalidatesTags = fn(&Value) -> TagSet;

// == Endpoint Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Read; results are cached
    Query,
    /// Write; results are never cached
    Mutation,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Query => "query",
            EndpointKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Endpoint Descriptor ==
/// Immutable endpoint description, registered once at start-up.
#[derive(Clone)]
pub struct EndpointDescriptor {
    name: &'static str,
    kind: EndpointKind,
    build_request: BuildRequest,
    provides_tags: ProvidesTags,
    invalidates_tags: InvalidatesTags,
}

fn no_provided_tags(_result: &Value, _args: &Value) -> TagSet {
    TagSet::new()
}

fn no_invalidated_tags(_args: &Value) -> TagSet {
    TagSet::new()
}

impl EndpointDescriptor {
    // == Constructors ==
    /// Query endpoint providing no tags until `provides` is set.
    pub fn query(name: &'static str, build_request: BuildRequest) -> Self {
        Self::new(name, EndpointKind::Query, build_request)
    }

    /// Mutation endpoint invalidating no tags until `invalidates` is set.
    pub fn mutation(name: &'static str, build_request: BuildRequest) -> Self {
        Self::new(name, EndpointKind::Mutation, build_request)
    }

    fn new(name: &'static str, kind: EndpointKind, build_request: BuildRequest) -> Self {
        Self {
            name,
            kind,
            build_request,
            provides_tags: no_provided_tags,
            invalidates_tags: no_invalidated_tags,
        }
    }

    pub fn provides(mut self, provides_tags: ProvidesTags) -> Self {
        self.provides_tags = provides_tags;
        self
    }

    pub fn invalidates(mut self, invalidates_tags: InvalidatesTags) -> Self {
        self.invalidates_tags = invalidates_tags;
        self
    }

    // == Accessors ==
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    // == Behaviour ==
    /// Builds the request for `args`.
    pub fn build_request(&self, args: &Value) -> Result<RequestSpec> {
        (self.build_request)(args).map_err(|reason| CacheError::InvalidArguments {
            endpoint: self.name.to_string(),
            reason,
        })
    }

    /// Tags provided by a successful query result.
    pub fn provides_tags(&self, result: &Value, args: &Value) -> TagSet {
        (self.provides_tags)(result, args)
    }

    /// Tags to invalidate after a successful mutation.
    pub fn invalidates_tags(&self, args: &Value) -> TagSet {
        (self.invalidates_tags)(args)
    }

    /// Fails with `WrongEndpointKind` unless the endpoint is of `expected` kind.
    pub fn expect_kind(&self, expected: EndpointKind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(CacheError::WrongEndpointKind {
                endpoint: self.name.to_string(),
                expected: expected.as_str(),
                actual: self.kind.as_str(),
            })
        }
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Tag;
    use serde_json::json;

    fn build_ping(args: &Value) -> std::result::Result<RequestSpec, String> {
        match args {
            Value::Null => Ok(RequestSpec::get("/ping")),
            _ => Err("ping takes no arguments".to_string()),
        }
    }

    fn provides_list(_result: &Value, _args: &Value) -> TagSet {
        [Tag::Etudiants].into_iter().collect()
    }

    #[test]
    fn test_query_defaults_to_no_tags() {
        let descriptor = EndpointDescriptor::query("ping", build_ping);
        assert_eq!(descriptor.kind(), EndpointKind::Query);
        assert!(descriptor.provides_tags(&json!({}), &Value::Null).is_empty());
        assert!(descriptor.invalidates_tags(&Value::Null).is_empty());
    }

    #[test]
    fn test_provides_hook() {
        let descriptor = EndpointDescriptor::query("ping", build_ping).provides(provides_list);
        let tags = descriptor.provides_tags(&json!([]), &Value::Null);
        assert!(tags.contains(&Tag::Etudiants));
    }

    #[test]
    fn test_build_request_error_is_invalid_arguments() {
        let descriptor = EndpointDescriptor::query("ping", build_ping);
        let err = descriptor.build_request(&json!(1)).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArguments { ref endpoint, .. } if endpoint == "ping"));
    }

    #[test]
    fn test_expect_kind() {
        let descriptor = EndpointDescriptor::mutation("ping", build_ping);
        assert!(descriptor.expect_kind(EndpointKind::Mutation).is_ok());
        assert!(matches!(
            descriptor.expect_kind(EndpointKind::Query),
            Err(CacheError::WrongEndpointKind { .. })
        ));
    }
}
