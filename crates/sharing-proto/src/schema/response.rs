/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{
    NamespaceTable,
    property::{DavProperty, DavPropertyValue},
};
use hyper::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropStat {
    pub status: StatusCode,
    pub properties: Vec<DavPropertyValue>,
}

/// Properties of a single resource grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropStatMap {
    pub propstats: Vec<PropStat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropResponse {
    pub href: String,
    pub propstat: PropStatMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiStatus {
    pub responses: Vec<PropResponse>,
}

pub struct SharedAs<'x> {
    pub href: &'x str,
    pub namespaces: &'x NamespaceTable,
}

impl PropStatMap {
    pub fn new() -> Self {
        PropStatMap::default()
    }

    /// Adds a property under `status`, replacing any value the bucket
    /// already holds for the same property.
    pub fn insert(&mut self, status: StatusCode, value: DavPropertyValue) {
        let bucket = if let Some(idx) = self.propstats.iter().position(|p| p.status == status) {
            &mut self.propstats[idx]
        } else {
            self.propstats.push(PropStat {
                status,
                properties: Vec::new(),
            });
            let last = self.propstats.len() - 1;
            &mut self.propstats[last]
        };

        if let Some(existing) = bucket
            .properties
            .iter_mut()
            .find(|p| p.property == value.property)
        {
            *existing = value;
        } else {
            bucket.properties.push(value);
        }
    }

    pub fn get(&self, status: StatusCode, property: &DavProperty) -> Option<&DavPropertyValue> {
        self.propstats
            .iter()
            .find(|p| p.status == status)?
            .properties
            .iter()
            .find(|p| &p.property == property)
    }

    pub fn get_mut(
        &mut self,
        status: StatusCode,
        property: &DavProperty,
    ) -> Option<&mut DavPropertyValue> {
        self.propstats
            .iter_mut()
            .find(|p| p.status == status)?
            .properties
            .iter_mut()
            .find(|p| &p.property == property)
    }

    pub fn contains(&self, status: StatusCode, property: &DavProperty) -> bool {
        self.get(status, property).is_some()
    }

    pub fn remove(&mut self, status: StatusCode, property: &DavProperty) -> Option<DavPropertyValue> {
        let idx = self.propstats.iter().position(|p| p.status == status)?;
        let bucket = &mut self.propstats[idx];
        let pos = bucket.properties.iter().position(|p| &p.property == property)?;
        let value = bucket.properties.remove(pos);
        if bucket.properties.is_empty() {
            self.propstats.remove(idx);
        }
        Some(value)
    }

    pub fn status_of(&self, property: &DavProperty) -> Option<StatusCode> {
        self.propstats
            .iter()
            .find(|p| p.properties.iter().any(|v| &v.property == property))
            .map(|p| p.status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropStat> {
        self.propstats.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.propstats.is_empty()
    }
}

impl PropResponse {
    pub fn new(href: impl Into<String>, propstat: PropStatMap) -> Self {
        PropResponse {
            href: href.into(),
            propstat,
        }
    }
}

impl MultiStatus {
    pub fn new(responses: Vec<PropResponse>) -> Self {
        MultiStatus { responses }
    }
}

impl<'x> SharedAs<'x> {
    pub fn new(href: &'x str, namespaces: &'x NamespaceTable) -> Self {
        SharedAs { href, namespaces }
    }
}
