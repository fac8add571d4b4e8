/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::ShareError;
use hyper::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use sharing_proto::{Namespace, NamespaceTable};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SharingConfig {
    pub feature: String,
    pub diagnostic_header: DiagnosticHeader,
    pub request_max_size: usize,
    pub namespaces: BTreeMap<String, String>,
}

/// Header attached to every response of a request handled by the router.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticHeader {
    pub name: String,
    pub value: String,
}

impl SharingConfig {
    pub fn parse(toml: &str) -> crate::Result<Self> {
        toml::from_str(toml)
            .map_err(|err| ShareError::Internal(format!("invalid sharing configuration: {err}")))
    }

    pub fn namespace_table(&self) -> NamespaceTable {
        self.namespaces
            .iter()
            .map(|(uri, prefix)| (uri.as_str(), prefix.as_str()))
            .collect()
    }

    pub(crate) fn status_header(&self) -> crate::Result<(HeaderName, HeaderValue)> {
        let name = HeaderName::from_bytes(self.diagnostic_header.name.as_bytes()).map_err(|_| {
            ShareError::Internal(format!(
                "invalid diagnostic header name {:?}",
                self.diagnostic_header.name
            ))
        })?;
        let value = HeaderValue::from_str(&self.diagnostic_header.value).map_err(|_| {
            ShareError::Internal(format!(
                "invalid diagnostic header value {:?}",
                self.diagnostic_header.value
            ))
        })?;
        Ok((name, value))
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        SharingConfig {
            feature: "calendarserver-sharing".to_string(),
            diagnostic_header: DiagnosticHeader::default(),
            request_max_size: 1024 * 1024,
            namespaces: [
                Namespace::Dav,
                Namespace::CalDav,
                Namespace::CalendarServer,
                Namespace::Sabre,
            ]
            .into_iter()
            .filter_map(|namespace| {
                namespace
                    .prefix()
                    .map(|prefix| (namespace.uri().to_string(), prefix.to_string()))
            })
            .collect(),
        }
    }
}

impl Default for DiagnosticHeader {
    fn default() -> Self {
        DiagnosticHeader {
            name: "X-Sabre-Status".to_string(),
            value: "everything-went-well".to_string(),
        }
    }
}
