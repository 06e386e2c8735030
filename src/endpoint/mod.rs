//! Endpoint Module
//!
//! Endpoint descriptors, their registry, request specs and cache tags.

mod descriptor;
mod registry;
mod request;
mod tag;

pub use descriptor::{
    BuildRequest, EndpointDescriptor, EndpointKind, InvalidatesTags, ProvidesTags,
};
pub use registry::EndpointRegistry;
pub use request::{render_path, Method, RequestSpec};
pub use tag::{intersects, Tag, TagSet};
