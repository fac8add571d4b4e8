/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::host::{Capability, DavContext, DavNode, DavRequest, HttpResponse, MethodOutcome};
use async_trait::async_trait;
use hyper::StatusCode;
use sharing_proto::{
    Element, NamespaceTable,
    schema::{
        property::{DavProperty, DavPropertyValue, ResourceType},
        response::PropStatMap,
    },
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    PropertyReadPre,
    PropertyReadPost,
    PropertyWrite,
    UnhandledMethod,
}

/// Server extension. Every hook defaults to a no-op so a plugin only
/// implements the extension points it subscribes to.
#[async_trait]
pub trait DavPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn features(&self) -> Vec<String> {
        Vec::new()
    }

    fn initialize(self: Arc<Self>, registry: &mut RegistryBuilder) -> crate::Result<()>;

    async fn before_properties(
        &self,
        _ctx: &DavContext<'_>,
        _node: &dyn DavNode,
        _requested: &mut Vec<DavProperty>,
        _returned: &mut PropStatMap,
    ) -> crate::Result<()> {
        Ok(())
    }

    async fn after_properties(
        &self,
        _ctx: &DavContext<'_>,
        _node: &dyn DavNode,
        _properties: &mut PropStatMap,
    ) -> crate::Result<()> {
        Ok(())
    }

    async fn update_properties(
        &self,
        _ctx: &DavContext<'_>,
        _node: &dyn DavNode,
        _mutations: &mut Vec<DavPropertyValue>,
        _result: &mut PropStatMap,
    ) -> crate::Result<()> {
        Ok(())
    }

    async fn unknown_method(
        &self,
        _ctx: &DavContext<'_>,
        _request: &mut DavRequest,
        _response: &mut HttpResponse,
    ) -> crate::Result<MethodOutcome> {
        Ok(MethodOutcome::NotHandled)
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    plugins: Vec<Arc<dyn DavPlugin>>,
    features: Vec<String>,
    protected: HashSet<DavProperty>,
    resource_types: Vec<(Capability, ResourceType)>,
    elements: HashSet<Element>,
    namespaces: NamespaceTable,
    subscribers: HashMap<ExtensionPoint, Vec<Arc<dyn DavPlugin>>>,
}

/// Startup registrations, immutable once built.
pub struct Registry {
    plugins: Vec<Arc<dyn DavPlugin>>,
    features: Vec<String>,
    protected: HashSet<DavProperty>,
    resource_types: Vec<(Capability, ResourceType)>,
    elements: HashSet<Element>,
    namespaces: NamespaceTable,
    subscribers: HashMap<ExtensionPoint, Vec<Arc<dyn DavPlugin>>>,
}

const BASE_COMPLIANCE: [&str; 3] = ["1", "3", "extended-mkcol"];

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn DavPlugin>) -> crate::Result<Self> {
        self.add_plugin(plugin)?;
        Ok(self)
    }

    pub fn add_plugin(&mut self, plugin: Arc<dyn DavPlugin>) -> crate::Result<()> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(crate::ShareError::Internal(format!(
                "plugin {} registered twice",
                plugin.name()
            )));
        }

        for feature in plugin.features() {
            self.add_feature(feature);
        }
        self.plugins.push(plugin.clone());
        plugin.initialize(self)
    }

    pub fn add_feature(&mut self, feature: impl Into<String>) {
        let feature = feature.into();
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
    }

    pub fn protect_property(&mut self, property: DavProperty) {
        self.protected.insert(property);
    }

    pub fn map_resource_type(&mut self, capability: Capability, resource_type: ResourceType) {
        if !self
            .resource_types
            .iter()
            .any(|(c, r)| *c == capability && *r == resource_type)
        {
            self.resource_types.push((capability, resource_type));
        }
    }

    pub fn register_element(&mut self, element: Element) {
        self.elements.insert(element);
    }

    pub fn register_namespace(&mut self, uri: impl Into<String>, prefix: impl Into<String>) {
        self.namespaces.insert(uri, prefix);
    }

    pub fn subscribe(&mut self, point: ExtensionPoint, plugin: Arc<dyn DavPlugin>) {
        self.subscribers.entry(point).or_default().push(plugin);
    }

    pub fn build(self) -> Registry {
        Registry {
            plugins: self.plugins,
            features: self.features,
            protected: self.protected,
            resource_types: self.resource_types,
            elements: self.elements,
            namespaces: self.namespaces,
            subscribers: self.subscribers,
        }
    }
}

impl Registry {
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Value of the `DAV` response header.
    pub fn dav_header(&self) -> String {
        BASE_COMPLIANCE
            .iter()
            .copied()
            .chain(self.features.iter().map(|f| f.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn plugin(&self, name: &str) -> Option<&Arc<dyn DavPlugin>> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    pub fn is_protected(&self, property: &DavProperty) -> bool {
        self.protected.contains(property)
    }

    pub fn is_known_element(&self, element: &Element) -> bool {
        self.elements.contains(element)
    }

    /// Resource type labels the host adds for the capabilities of `node`.
    pub fn resource_types(&self, node: &dyn DavNode) -> Vec<ResourceType> {
        self.resource_types
            .iter()
            .filter(|(capability, _)| node.has_capability(*capability))
            .map(|(_, resource_type)| resource_type.clone())
            .collect()
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    fn subscribers(&self, point: ExtensionPoint) -> &[Arc<dyn DavPlugin>] {
        self.subscribers
            .get(&point)
            .map(|s| s.as_slice())
            .unwrap_or_default()
    }
}

impl DavContext<'_> {
    /// Runs the property read pipeline for `node`: pre-fetch hooks, core
    /// storage, resource type mapping and post-fetch hooks.
    pub async fn resolve_properties(
        &self,
        node: &dyn DavNode,
        mut requested: Vec<DavProperty>,
    ) -> crate::Result<PropStatMap> {
        let mut returned = PropStatMap::new();

        for plugin in self.registry.subscribers(ExtensionPoint::PropertyReadPre) {
            plugin
                .before_properties(self, node, &mut requested, &mut returned)
                .await?;
        }

        if !requested.is_empty() {
            self.storage
                .fetch_properties(node, &requested, &mut returned)
                .await?;
        }

        if let Some(value) = returned.get_mut(StatusCode::OK, &DavProperty::RESOURCE_TYPE) {
            for resource_type in self.registry.resource_types(node) {
                value.value.add_resource_type(resource_type);
            }
        }

        for plugin in self.registry.subscribers(ExtensionPoint::PropertyReadPost) {
            plugin.after_properties(self, node, &mut returned).await?;
        }

        Ok(returned)
    }

    /// Runs the property write pipeline. A request touching a protected
    /// property fails as a whole: the protected ones are reported as 403 and
    /// the rest as 424.
    pub async fn apply_mutations(
        &self,
        node: &dyn DavNode,
        mut mutations: Vec<DavPropertyValue>,
    ) -> crate::Result<PropStatMap> {
        let mut result = PropStatMap::new();

        if mutations
            .iter()
            .any(|m| self.registry.is_protected(&m.property))
        {
            for mutation in mutations {
                let status = if self.registry.is_protected(&mutation.property) {
                    StatusCode::FORBIDDEN
                } else {
                    StatusCode::FAILED_DEPENDENCY
                };
                result.insert(status, DavPropertyValue::empty(mutation.property));
            }
            return Ok(result);
        }

        for plugin in self.registry.subscribers(ExtensionPoint::PropertyWrite) {
            plugin
                .update_properties(self, node, &mut mutations, &mut result)
                .await?;
        }

        if !mutations.is_empty() {
            self.storage
                .store_properties(node, &mutations, &mut result)
                .await?;
        }

        Ok(result)
    }

    /// Offers a request no core handler accepted to the subscribed plugins,
    /// stopping at the first one that handles it.
    pub async fn dispatch_unknown_method(
        &self,
        request: &mut DavRequest,
        response: &mut HttpResponse,
    ) -> crate::Result<MethodOutcome> {
        for plugin in self.registry.subscribers(ExtensionPoint::UnhandledMethod) {
            let outcome = plugin.unknown_method(self, request, response).await?;
            if outcome.is_handled() {
                return Ok(outcome);
            }
        }

        Ok(MethodOutcome::NotHandled)
    }
}
