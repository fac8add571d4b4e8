/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::request::{ShareUpdate, ShareeDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(test, derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ShareeStatus {
    Accepted = 1,
    Declined = 2,
    Deleted = 3,
    #[default]
    NoResponse = 4,
    Invalid = 5,
}

/// A principal invited to, or currently sharing, a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(serde::Serialize, serde::Deserialize))]
pub struct Sharee {
    pub href: String,
    pub common_name: Option<String>,
    pub status: ShareeStatus,
    pub read_write: Option<bool>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sharee cannot move from {} to {}", .from.as_str(), .to.as_str())]
pub struct InvalidTransition {
    pub from: ShareeStatus,
    pub to: ShareeStatus,
}

/// Outcome of applying a share update to a sharee list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareChanges {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

pub trait ShareeList {
    fn apply_update(&mut self, update: &ShareUpdate) -> ShareChanges;
    fn find(&self, href: &str) -> Option<&Sharee>;
    fn find_mut(&mut self, href: &str) -> Option<&mut Sharee>;
    fn hrefs(&self) -> Vec<String>;
}

impl ShareeStatus {
    pub fn parse(token: &str) -> Option<Self> {
        hashify::tiny_map!(token.as_bytes(),
            "invite-accepted" => ShareeStatus::Accepted,
            "invite-declined" => ShareeStatus::Declined,
            "invite-deleted" => ShareeStatus::Deleted,
            "invite-noresponse" => ShareeStatus::NoResponse,
            "invite-invalid" => ShareeStatus::Invalid,
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShareeStatus::Accepted => "invite-accepted",
            ShareeStatus::Declined => "invite-declined",
            ShareeStatus::Deleted => "invite-deleted",
            ShareeStatus::NoResponse => "invite-noresponse",
            ShareeStatus::Invalid => "invite-invalid",
        }
    }

    pub fn is_reply_target(&self) -> bool {
        matches!(
            self,
            ShareeStatus::Accepted | ShareeStatus::Declined | ShareeStatus::Deleted
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ShareeStatus::Accepted)
    }
}

impl From<ShareeStatus> for u8 {
    fn from(value: ShareeStatus) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ShareeStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ShareeStatus::Accepted),
            2 => Ok(ShareeStatus::Declined),
            3 => Ok(ShareeStatus::Deleted),
            4 => Ok(ShareeStatus::NoResponse),
            5 => Ok(ShareeStatus::Invalid),
            _ => Err(value),
        }
    }
}

impl Sharee {
    pub fn new(href: impl Into<String>) -> Self {
        Sharee {
            href: href.into(),
            common_name: None,
            status: ShareeStatus::NoResponse,
            read_write: None,
            summary: None,
        }
    }

    pub fn from_descriptor(descriptor: &ShareeDescriptor) -> Self {
        Sharee {
            href: descriptor.href.clone(),
            common_name: descriptor.common_name.clone(),
            status: ShareeStatus::NoResponse,
            read_write: Some(descriptor.read_write),
            summary: descriptor.summary.clone(),
        }
    }

    pub fn with_status(mut self, status: ShareeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_read_write(mut self, read_write: bool) -> Self {
        self.read_write = Some(read_write);
        self
    }

    pub fn with_common_name(mut self, common_name: impl Into<String>) -> Self {
        self.common_name = Some(common_name.into());
        self
    }

    pub fn matches(&self, href: &str) -> bool {
        href_eq(&self.href, href)
    }

    /// Moves the sharee to `target`. Returns `true` when the transition should
    /// materialize a shared calendar for the sharee.
    pub fn apply_reply(&mut self, target: ShareeStatus) -> Result<bool, InvalidTransition> {
        if !target.is_reply_target() || self.status == ShareeStatus::Invalid {
            return Err(InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        Ok(target == ShareeStatus::Accepted)
    }

    fn merge(&mut self, descriptor: &ShareeDescriptor) -> bool {
        let mut changed = false;
        if descriptor.common_name.is_some() && self.common_name != descriptor.common_name {
            self.common_name = descriptor.common_name.clone();
            changed = true;
        }
        if descriptor.summary.is_some() && self.summary != descriptor.summary {
            self.summary = descriptor.summary.clone();
            changed = true;
        }
        if self.read_write != Some(descriptor.read_write) {
            self.read_write = Some(descriptor.read_write);
            changed = true;
        }
        changed
    }
}

impl ShareeList for Vec<Sharee> {
    fn apply_update(&mut self, update: &ShareUpdate) -> ShareChanges {
        let mut changes = ShareChanges::default();

        for descriptor in &update.set {
            if let Some(sharee) = self.find_mut(&descriptor.href) {
                if sharee.merge(descriptor) {
                    changes.updated.push(sharee.href.clone());
                }
            } else {
                self.push(Sharee::from_descriptor(descriptor));
                changes.added.push(descriptor.href.clone());
            }
        }

        // Removals are applied last so they win over a set of the same href
        for href in &update.remove {
            let before = self.len();
            self.retain(|sharee| !sharee.matches(href));
            if self.len() != before {
                changes.added.retain(|added| !href_eq(added, href));
                changes.updated.retain(|updated| !href_eq(updated, href));
                changes.removed.push(href.clone());
            }
        }

        changes
    }

    fn find(&self, href: &str) -> Option<&Sharee> {
        self.iter().find(|sharee| sharee.matches(href))
    }

    fn find_mut(&mut self, href: &str) -> Option<&mut Sharee> {
        self.iter_mut().find(|sharee| sharee.matches(href))
    }

    fn hrefs(&self) -> Vec<String> {
        self.iter().map(|sharee| sharee.href.clone()).collect()
    }
}

impl ShareChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Compares two principal hrefs. `mailto:` addresses are case insensitive.
pub fn href_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (strip_mailto(a), strip_mailto(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => a == b,
        _ => false,
    }
}

fn strip_mailto(href: &str) -> Option<&str> {
    href.get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .map(|_| &href[7..])
}
