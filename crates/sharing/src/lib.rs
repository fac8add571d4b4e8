/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod config;
pub mod hooks;
pub mod host;
pub mod properties;
pub mod router;

use async_trait::async_trait;
use config::SharingConfig;
use hooks::{DavPlugin, ExtensionPoint, RegistryBuilder};
use host::{Capability, DavContext, DavNode, DavRequest, HttpResponse, MethodOutcome};
use hyper::{
    StatusCode,
    header::{HeaderName, HeaderValue},
};
use properties::PropertyInjector;
use router::ShareRequestRouter;
use sharing_proto::{
    Element, Namespace,
    parser,
    schema::{
        property::{DavProperty, DavPropertyValue, ResourceType},
        response::PropStatMap,
        sharee::InvalidTransition,
    },
};
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "caldav-sharing";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("request failed with status {0}")]
    Code(StatusCode),
    #[error("invalid sharing document: {0}")]
    Parse(#[from] parser::Error),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ShareError>;

impl ShareError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShareError::Code(code) => *code,
            ShareError::Parse(_) => StatusCode::BAD_REQUEST,
            ShareError::Transition(_) => StatusCode::CONFLICT,
            ShareError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShareError> for HttpResponse {
    fn from(err: ShareError) -> Self {
        HttpResponse::new(err.status())
    }
}

/// The calendar sharing extension.
pub struct SharingPlugin {
    config: SharingConfig,
    status_header: (HeaderName, HeaderValue),
}

impl SharingPlugin {
    pub fn new(config: SharingConfig) -> Result<Self> {
        let status_header = config.status_header()?;
        Ok(SharingPlugin {
            config,
            status_header,
        })
    }

    pub fn config(&self) -> &SharingConfig {
        &self.config
    }

    pub(crate) fn set_status(&self, response: &mut HttpResponse, status: StatusCode) {
        response.set_status(status);
        response.set_header(self.status_header.0.clone(), self.status_header.1.clone());
    }
}

#[async_trait]
impl DavPlugin for SharingPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn features(&self) -> Vec<String> {
        vec![self.config.feature.clone()]
    }

    fn initialize(self: Arc<Self>, registry: &mut RegistryBuilder) -> Result<()> {
        registry.map_resource_type(Capability::Shared, ResourceType::Shared);

        for property in [
            DavProperty::INVITE,
            DavProperty::ALLOWED_SHARING_MODES,
            DavProperty::SHARED_URL,
        ] {
            registry.protect_property(property);
        }

        for name in [
            "share",
            "invite-reply",
            "publish-calendar",
            "unpublish-calendar",
            "set",
            "remove",
        ] {
            registry.register_element(Element::new(Namespace::CalendarServer, name));
        }

        for (uri, prefix) in &self.config.namespaces {
            registry.register_namespace(uri.as_str(), prefix.as_str());
        }

        for point in [
            ExtensionPoint::PropertyReadPre,
            ExtensionPoint::PropertyReadPost,
            ExtensionPoint::PropertyWrite,
            ExtensionPoint::UnhandledMethod,
        ] {
            registry.subscribe(point, self.clone());
        }

        Ok(())
    }

    async fn before_properties(
        &self,
        ctx: &DavContext<'_>,
        node: &dyn DavNode,
        requested: &mut Vec<DavProperty>,
        returned: &mut PropStatMap,
    ) -> Result<()> {
        self.inject_before(ctx, node, requested, returned).await
    }

    async fn after_properties(
        &self,
        _ctx: &DavContext<'_>,
        node: &dyn DavNode,
        properties: &mut PropStatMap,
    ) -> Result<()> {
        self.inject_after(node, properties).await
    }

    async fn update_properties(
        &self,
        _ctx: &DavContext<'_>,
        node: &dyn DavNode,
        mutations: &mut Vec<DavPropertyValue>,
        result: &mut PropStatMap,
    ) -> Result<()> {
        self.intercept_unshare(node, mutations, result).await
    }

    async fn unknown_method(
        &self,
        ctx: &DavContext<'_>,
        request: &mut DavRequest,
        response: &mut HttpResponse,
    ) -> Result<MethodOutcome> {
        self.handle_share_request(ctx, request, response).await
    }
}
