/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::hooks::Registry;
use async_trait::async_trait;
use hyper::{
    HeaderMap, Method, StatusCode,
    header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use sharing_proto::{
    Depth, Privilege,
    schema::{
        property::{DavProperty, DavPropertyValue},
        request::{ShareReply, ShareUpdate},
        response::{PropResponse, PropStatMap},
        sharee::Sharee,
    },
};
use std::sync::Arc;

/// An incoming request as seen by the extension points. The body can only be
/// taken once; whoever takes it must put it back with [`DavRequest::set_body`].
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub transaction_type: Option<&'static str>,
    body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Shareable,
    Shared,
    CalendarHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutcome {
    NotHandled,
    Handled,
    HandledWithBody(Vec<u8>),
}

/// A resource of the host tree. Sharing capabilities are exposed through
/// the accessors, a node may expose more than one.
pub trait DavNode: Send + Sync {
    fn path(&self) -> &str;

    fn shareable(&self) -> Option<&dyn ShareableCalendar> {
        None
    }

    fn shared(&self) -> Option<&dyn SharedCalendar> {
        None
    }

    fn calendar_home(&self) -> Option<&dyn CalendarHome> {
        None
    }

    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Shareable => self.shareable().is_some(),
            Capability::Shared => self.shared().is_some(),
            Capability::CalendarHome => self.calendar_home().is_some(),
        }
    }
}

/// Owner side of a calendar that can be shared.
#[async_trait]
pub trait ShareableCalendar: Send + Sync {
    async fn shares(&self) -> crate::Result<Vec<Sharee>>;

    /// Applies the update atomically.
    async fn update_shares(&self, update: &ShareUpdate) -> crate::Result<()>;

    async fn publish_status(&self) -> crate::Result<bool>;

    async fn set_publish_status(&self, value: bool) -> crate::Result<()>;
}

/// Sharee side view of a calendar that was accepted.
#[async_trait]
pub trait SharedCalendar: Send + Sync {
    /// Principal path of the calendar owner.
    fn owner(&self) -> &str;

    /// Canonical href of the owner's calendar.
    fn shared_url(&self) -> &str;

    async fn shares(&self) -> crate::Result<Vec<Sharee>>;
}

#[async_trait]
pub trait CalendarHome: Send + Sync {
    /// Records a reply to an invitation. Returns the url of the shared
    /// calendar when the reply materialized one.
    async fn share_reply(&self, reply: &ShareReply) -> crate::Result<Option<String>>;
}

#[async_trait]
pub trait DavTree: Send + Sync {
    async fn node_for_path(&self, path: &str) -> crate::Result<Option<Arc<dyn DavNode>>>;

    async fn properties_for_path(
        &self,
        path: &str,
        properties: &[DavProperty],
        depth: Depth,
    ) -> crate::Result<Vec<PropResponse>>;
}

/// Core property storage, invoked between the pre and post fetch hooks.
#[async_trait]
pub trait PropertyStorage: Send + Sync {
    async fn fetch_properties(
        &self,
        node: &dyn DavNode,
        requested: &[DavProperty],
        returned: &mut PropStatMap,
    ) -> crate::Result<()>;

    async fn store_properties(
        &self,
        node: &dyn DavNode,
        mutations: &[DavPropertyValue],
        result: &mut PropStatMap,
    ) -> crate::Result<()>;
}

#[async_trait]
pub trait AclPlugin: Send + Sync {
    async fn check_privileges(&self, uri: &str, privilege: Privilege) -> crate::Result<()>;
}

/// Collaborators available to the extension points while serving a request.
#[derive(Clone, Copy)]
pub struct DavContext<'x> {
    pub registry: &'x Registry,
    pub tree: &'x dyn DavTree,
    pub storage: &'x dyn PropertyStorage,
    pub acl: Option<&'x dyn AclPlugin>,
}

impl DavRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        DavRequest {
            method,
            uri: uri.into(),
            headers: HeaderMap::new(),
            transaction_type: None,
            body: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: impl AsRef<str>) -> Self {
        if let Ok(value) = HeaderValue::from_str(value.as_ref()) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the content type is `application/xml` or `text/xml`,
    /// parameters are ignored.
    pub fn is_xml(&self) -> bool {
        self.content_type().is_some_and(|content_type| {
            let media_type = content_type
                .split_once(';')
                .map_or(content_type, |(media_type, _)| media_type)
                .trim();
            media_type.eq_ignore_ascii_case("application/xml")
                || media_type.eq_ignore_ascii_case("text/xml")
        })
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn take_body(&mut self) -> Option<Vec<u8>> {
        self.body.take()
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_xml_body(mut self, body: impl Into<String>) -> Self {
        self.set_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );
        self.body = Some(body.into().into_bytes());
        self
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        HttpResponse::new(StatusCode::NOT_IMPLEMENTED)
    }
}

impl MethodOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, MethodOutcome::NotHandled)
    }
}
