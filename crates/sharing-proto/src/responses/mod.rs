/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod multistatus;
pub mod property;
pub mod shared_as;

use crate::schema::Namespace;
use std::fmt::{Display, Write};

pub trait XmlEscape {
    fn write_escaped_to(&self, out: &mut impl Write) -> std::fmt::Result;
}

impl<T: AsRef<str>> XmlEscape for T {
    fn write_escaped_to(&self, out: &mut impl Write) -> std::fmt::Result {
        for ch in self.as_ref().chars() {
            match ch {
                '<' => out.write_str("&lt;")?,
                '>' => out.write_str("&gt;")?,
                '&' => out.write_str("&amp;")?,
                '"' => out.write_str("&quot;")?,
                '\'' => out.write_str("&apos;")?,
                _ => out.write_char(ch)?,
            }
        }
        Ok(())
    }
}

/// Element name writer. Namespaces without a well-known prefix are declared
/// inline on the opening tag.
pub(crate) struct Tag<'x> {
    pub namespace: &'x Namespace,
    pub name: &'x str,
}

impl<'x> Tag<'x> {
    pub fn new(namespace: &'x Namespace, name: &'x str) -> Self {
        Tag { namespace, name }
    }

    pub fn open(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_start(f)?;
        f.write_str(">")
    }

    pub fn empty(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_start(f)?;
        f.write_str("/>")
    }

    pub fn close(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.namespace.prefix() {
            Some(prefix) => write!(f, "</{prefix}:{}>", self.name),
            None => write!(f, "</X:{}>", self.name),
        }
    }

    pub fn wrap(&self, f: &mut std::fmt::Formatter<'_>, content: impl Display) -> std::fmt::Result {
        self.open(f)?;
        write!(f, "{content}")?;
        self.close(f)
    }

    fn write_start(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.namespace.prefix() {
            Some(prefix) => write!(f, "<{prefix}:{}", self.name),
            None => {
                write!(f, "<X:{} xmlns:X=\"", self.name)?;
                self.namespace.uri().write_escaped_to(f)?;
                f.write_str("\"")
            }
        }
    }
}

/// Escaped text content.
pub(crate) struct Text<'x>(pub &'x str);

impl Display for Text<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.write_escaped_to(f)
    }
}
