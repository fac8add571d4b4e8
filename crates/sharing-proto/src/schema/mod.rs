/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod property;
pub mod request;
pub mod response;
pub mod sharee;

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum Namespace {
    Dav,
    CalDav,
    CalendarServer,
    Sabre,
    Other(String),
}

/// A namespace qualified element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub struct Element {
    pub namespace: Namespace,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    #[default]
    Zero,
    One,
    Infinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    Read,
    Write,
    WriteProperties,
    WriteContent,
}

/// Namespace URI to prefix mapping declared by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable(Vec<(String, String)>);

impl Namespace {
    pub fn parse(uri: &[u8]) -> Self {
        hashify::tiny_map!(uri,
            "DAV:" => Namespace::Dav,
            "urn:ietf:params:xml:ns:caldav" => Namespace::CalDav,
            "http://calendarserver.org/ns/" => Namespace::CalendarServer,
            "http://sabredav.org/ns" => Namespace::Sabre,
        )
        .unwrap_or_else(|| Namespace::Other(String::from_utf8_lossy(uri).into_owned()))
    }

    pub fn uri(&self) -> &str {
        match self {
            Namespace::Dav => "DAV:",
            Namespace::CalDav => "urn:ietf:params:xml:ns:caldav",
            Namespace::CalendarServer => "http://calendarserver.org/ns/",
            Namespace::Sabre => "http://sabredav.org/ns",
            Namespace::Other(uri) => uri,
        }
    }

    /// Prefix used when serializing properties. Foreign namespaces are
    /// declared inline on the element instead.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Namespace::Dav => Some("D"),
            Namespace::CalDav => Some("A"),
            Namespace::CalendarServer => Some("C"),
            Namespace::Sabre => Some("S"),
            Namespace::Other(_) => None,
        }
    }
}

impl Element {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Element {
            namespace,
            name: name.into(),
        }
    }

    pub fn is(&self, namespace: &Namespace, name: &str) -> bool {
        &self.namespace == namespace && self.name == name
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace.uri(), self.name)
    }
}

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Read => "read",
            Privilege::Write => "write",
            Privilege::WriteProperties => "write-properties",
            Privilege::WriteContent => "write-content",
        }
    }
}

impl Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{DAV:}}{}", self.as_str())
    }
}

impl NamespaceTable {
    pub fn new() -> Self {
        NamespaceTable(Vec::new())
    }

    pub fn insert(&mut self, uri: impl Into<String>, prefix: impl Into<String>) {
        let uri = uri.into();
        let prefix = prefix.into();
        if let Some(entry) = self.0.iter_mut().find(|(u, _)| *u == uri) {
            entry.1 = prefix;
        } else {
            self.0.push((uri, prefix));
        }
    }

    pub fn prefix(&self, namespace: &Namespace) -> Option<&str> {
        let uri = namespace.uri();
        self.0
            .iter()
            .find(|(u, _)| u == uri)
            .map(|(_, prefix)| prefix.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        let mut table = NamespaceTable::new();
        for namespace in [
            Namespace::Dav,
            Namespace::CalDav,
            Namespace::CalendarServer,
            Namespace::Sabre,
        ] {
            if let Some(prefix) = namespace.prefix() {
                table.insert(namespace.uri(), prefix);
            }
        }
        table
    }
}

impl<U: Into<String>, P: Into<String>> FromIterator<(U, P)> for NamespaceTable {
    fn from_iter<T: IntoIterator<Item = (U, P)>>(iter: T) -> Self {
        let mut table = NamespaceTable::new();
        for (uri, prefix) in iter {
            table.insert(uri, prefix);
        }
        table
    }
}

impl Display for NamespaceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, (uri, prefix)) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "xmlns:{prefix}=\"{uri}\"")?;
        }
        Ok(())
    }
}
