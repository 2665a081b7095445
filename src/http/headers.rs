//! Header collections and hop-by-hop stripping.
//!
//! # Responsibilities
//! - Define the multi-map contract the forwarder relies on
//! - Copy every value of every header between collections
//! - Strip hop-by-hop headers, both the fixed set and those named in `Connection`
//!
//! # Design Decisions
//! - Names compare case-insensitively, values keep insertion order
//! - The fixed hop-by-hop set is an immutable static passed in by reference

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE,
    TRANSFER_ENCODING, UPGRADE,
};

/// Headers that never cross a proxy hop (RFC 2616 section 13.5.1).
pub static HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    HeaderName::from_static("trailers"),
    TRANSFER_ENCODING,
    UPGRADE,
];

/// An ordered multi-map from case-insensitive header name to values.
pub trait HeaderCollection {
    /// Append a value, keeping any values already present under `name`.
    fn add(&mut self, name: HeaderName, value: HeaderValue);

    /// First value stored under `name`.
    fn get(&self, name: &HeaderName) -> Option<&HeaderValue>;

    /// Every value stored under `name`, in insertion order.
    fn get_all<'a>(&'a self, name: &HeaderName) -> impl Iterator<Item = &'a HeaderValue>
    where
        Self: 'a;

    /// Remove all values stored under `name`.
    fn delete(&mut self, name: &HeaderName);

    /// Every (name, value) pair; a name repeats once per value.
    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a HeaderName, &'a HeaderValue)>
    where
        Self: 'a;
}

impl HeaderCollection for HeaderMap {
    fn add(&mut self, name: HeaderName, value: HeaderValue) {
        self.append(name, value);
    }

    fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        HeaderMap::get(self, name)
    }

    fn get_all<'a>(&'a self, name: &HeaderName) -> impl Iterator<Item = &'a HeaderValue>
    where
        Self: 'a,
    {
        HeaderMap::get_all(self, name).iter()
    }

    fn delete(&mut self, name: &HeaderName) {
        self.remove(name);
    }

    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a HeaderName, &'a HeaderValue)>
    where
        Self: 'a,
    {
        self.iter()
    }
}

/// Append every value of every header in `src` to `dst`.
pub fn copy_headers<S, D>(src: &S, dst: &mut D)
where
    S: HeaderCollection,
    D: HeaderCollection,
{
    for (name, value) in src.iterate() {
        dst.add(name.clone(), value.clone());
    }
}

/// Remove hop-by-hop headers from `headers`.
///
/// Headers listed in `Connection` go first, then everything in `fixed`.
/// Tokens that are not valid header names cannot be present and are skipped.
pub fn remove_hop_by_hop_headers<H>(headers: &mut H, fixed: &[HeaderName])
where
    H: HeaderCollection,
{
    let named: Vec<HeaderName> = headers
        .get_all(&CONNECTION)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| HeaderName::from_bytes(token.as_bytes()).ok())
        .collect();

    for name in &named {
        headers.delete(name);
    }
    for name in fixed {
        headers.delete(name);
    }
}
