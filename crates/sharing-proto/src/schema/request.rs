/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{Element, sharee::ShareeStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(serde::Serialize, serde::Deserialize))]
pub struct ShareeDescriptor {
    pub href: String,
    pub common_name: Option<String>,
    pub summary: Option<String>,
    pub read_write: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(test, derive(serde::Serialize, serde::Deserialize))]
pub struct ShareUpdate {
    pub set: Vec<ShareeDescriptor>,
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(serde::Serialize, serde::Deserialize))]
pub struct ShareReply {
    pub href: String,
    pub status: ShareeStatus,
    pub calendar_uri: Option<String>,
    pub in_reply_to: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum SharingDocument {
    Share(ShareUpdate),
    InviteReply(ShareReply),
    PublishCalendar,
    UnpublishCalendar,
    Unknown(Element),
}

impl ShareeDescriptor {
    pub fn new(href: impl Into<String>, read_write: bool) -> Self {
        ShareeDescriptor {
            href: href.into(),
            common_name: None,
            summary: None,
            read_write,
        }
    }
}

impl ShareUpdate {
    pub fn remove_all(hrefs: Vec<String>) -> Self {
        ShareUpdate {
            set: Vec::new(),
            remove: hrefs,
        }
    }
}

impl SharingDocument {
    pub fn transaction_type(&self) -> Option<&'static str> {
        match self {
            SharingDocument::Share(_) => Some("post-calendar-share"),
            SharingDocument::InviteReply(_) => Some("post-invite-reply"),
            SharingDocument::PublishCalendar => Some("post-publish-calendar"),
            SharingDocument::UnpublishCalendar => Some("post-unpublish-calendar"),
            SharingDocument::Unknown(_) => None,
        }
    }
}
