//! Static table of request variants keyed by method, path and media type.
//!
//! Each `(method, path)` route names the header it negotiates on and lists
//! its candidate [`Variant`]s. Ambiguity is a configuration error reported
//! by [`RegistryBuilder::register`], never a request-time condition. The
//! built [`RepresentationRegistry`] is immutable and shared across requests.

use std::collections::HashMap;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method};
use tourline_core::creation::CreationShape;
use tourline_core::policy::Policy;
use tourline_core::representation::RepresentationShape;

use super::matcher::{declared_media_type, match_media_type};
use crate::error::AppError;

/// Header a route negotiates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationHeader {
    Accept,
    ContentType,
}

impl NegotiationHeader {
    pub fn header_name(self) -> HeaderName {
        match self {
            NegotiationHeader::Accept => ACCEPT,
            NegotiationHeader::ContentType => CONTENT_TYPE,
        }
    }
}

/// What a selected variant does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourOperation {
    /// Role-branched collection read.
    List,
    Read(RepresentationShape),
    Create(CreationShape),
    PartialUpdate,
}

/// One handler variant of a route.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: &'static str,
    /// Required media type; `None` marks the route's default variant.
    pub media_type: Option<&'static str>,
    pub operation: TourOperation,
    /// Policies that must all pass before the operation runs.
    pub policies: Vec<Policy>,
}

impl Variant {
    pub fn new(name: &'static str, operation: TourOperation) -> Self {
        Self {
            name,
            media_type: None,
            operation,
            policies: Vec::new(),
        }
    }

    pub fn media_type(mut self, media_type: &'static str) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn require(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// `Content-Type` to answer a read with.
    pub fn response_media_type(&self) -> &'static str {
        self.media_type.unwrap_or("application/json")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{method} {path}: media type '{media_type}' is registered twice")]
    DuplicateMediaType {
        method: Method,
        path: &'static str,
        media_type: &'static str,
    },

    #[error("{method} {path}: more than one default variant")]
    DuplicateDefault { method: Method, path: &'static str },

    #[error("{method} {path}: negotiates on {existing:?}, cannot also negotiate on {requested:?}")]
    ConflictingHeader {
        method: Method,
        path: &'static str,
        existing: NegotiationHeader,
        requested: NegotiationHeader,
    },
}

#[derive(Debug)]
struct RouteEntry {
    header: NegotiationHeader,
    variants: Vec<Variant>,
}

/// Why no variant was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatch {
    pub header: Option<NegotiationHeader>,
    pub declared: Option<String>,
}

impl From<NoMatch> for AppError {
    fn from(no_match: NoMatch) -> Self {
        let declared = no_match.declared.unwrap_or_else(|| "(none)".into());
        match no_match.header {
            Some(NegotiationHeader::Accept) => {
                AppError::NotAcceptable(format!("No representation for Accept: {declared}"))
            }
            Some(NegotiationHeader::ContentType) => AppError::UnsupportedMediaType(format!(
                "No handler for Content-Type: {declared}"
            )),
            None => AppError::InternalError("Route is not registered".into()),
        }
    }
}

/// Route entries keyed by method, then by path template.
type RouteTable = HashMap<Method, HashMap<&'static str, RouteEntry>>;

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routes: RouteTable,
}

impl RegistryBuilder {
    /// Add `variant` to the `(method, path)` route.
    pub fn register(
        &mut self,
        method: Method,
        path: &'static str,
        header: NegotiationHeader,
        variant: Variant,
    ) -> Result<&mut Self, RegistryError> {
        let entry = self
            .routes
            .entry(method.clone())
            .or_default()
            .entry(path)
            .or_insert_with(|| RouteEntry {
                header,
                variants: Vec::new(),
            });

        if entry.header != header {
            return Err(RegistryError::ConflictingHeader {
                method,
                path,
                existing: entry.header,
                requested: header,
            });
        }

        let clash = entry
            .variants
            .iter()
            .any(|existing| existing.media_type == variant.media_type);
        if clash {
            return Err(match variant.media_type {
                Some(media_type) => RegistryError::DuplicateMediaType {
                    method,
                    path,
                    media_type,
                },
                None => RegistryError::DuplicateDefault { method, path },
            });
        }

        entry.variants.push(variant);
        Ok(self)
    }

    pub fn build(self) -> RepresentationRegistry {
        RepresentationRegistry {
            routes: self.routes,
        }
    }
}

#[derive(Debug)]
pub struct RepresentationRegistry {
    routes: RouteTable,
}

impl RepresentationRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Select the variant for a request with the given declared media type.
    pub fn match_variant(
        &self,
        method: &Method,
        path: &str,
        declared: Option<&str>,
    ) -> Result<&Variant, NoMatch> {
        let Some(entry) = self.route(method, path) else {
            return Err(NoMatch {
                header: None,
                declared: declared.map(str::to_string),
            });
        };
        match_media_type(&entry.variants, declared).ok_or_else(|| NoMatch {
            header: Some(entry.header),
            declared: declared.map(str::to_string),
        })
    }

    /// Select the variant for a request, reading the route's negotiation header.
    pub fn select(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<&Variant, NoMatch> {
        let declared = self
            .route(method, path)
            .and_then(|entry| declared_media_type(headers, entry.header));
        self.match_variant(method, path, declared)
    }

    /// Candidates registered for a route, in registration order.
    pub fn variants(&self, method: &Method, path: &str) -> &[Variant] {
        self.route(method, path)
            .map(|entry| entry.variants.as_slice())
            .unwrap_or(&[])
    }

    fn route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.routes.get(method)?.get(path)
    }
}
