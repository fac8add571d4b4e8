/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod tokenizer;

use crate::schema::{
    Namespace,
    request::{ShareReply, ShareUpdate, ShareeDescriptor, SharingDocument},
    sharee::ShareeStatus,
};
use tokenizer::{Token, Tokenizer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unknown namespace prefix {0}")]
    UnknownPrefix(String),
    #[error("invalid entity {0}")]
    InvalidEntity(String),
    #[error("empty document")]
    EmptyDocument,
    #[error("unexpected end of document")]
    UnexpectedEof,
    #[error("missing element {0}")]
    MissingElement(&'static str),
    #[error("invalid reply status {0}")]
    InvalidReplyStatus(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses the content of an element whose start tag has already been read.
pub trait DavParser: Sized {
    fn parse(stream: &mut Tokenizer<'_>) -> Result<Self>;
}

impl SharingDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut stream = Tokenizer::new(bytes);

        let root = loop {
            match stream.token()? {
                Token::ElementStart { name } => break name,
                Token::Text(_) => continue,
                Token::ElementEnd | Token::Eof => return Err(Error::EmptyDocument),
            }
        };

        let document = match root.namespace {
            Namespace::CalendarServer => match root.name.as_str() {
                "share" => SharingDocument::Share(ShareUpdate::parse(&mut stream)?),
                "invite-reply" => SharingDocument::InviteReply(ShareReply::parse(&mut stream)?),
                "publish-calendar" => {
                    stream.skip_element()?;
                    SharingDocument::PublishCalendar
                }
                "unpublish-calendar" => {
                    stream.skip_element()?;
                    SharingDocument::UnpublishCalendar
                }
                _ => {
                    stream.skip_element()?;
                    SharingDocument::Unknown(root)
                }
            },
            _ => {
                stream.skip_element()?;
                SharingDocument::Unknown(root)
            }
        };

        // Drain trailing misc content so that malformed XML is still reported
        while stream.token()? != Token::Eof {}

        Ok(document)
    }
}

impl DavParser for ShareUpdate {
    fn parse(stream: &mut Tokenizer<'_>) -> Result<Self> {
        let mut update = ShareUpdate::default();

        loop {
            match stream.token()? {
                Token::ElementStart { name } if name.namespace == Namespace::CalendarServer => {
                    match name.name.as_str() {
                        "set" => update.set.push(ShareeDescriptor::parse(stream)?),
                        "remove" => {
                            let mut href = None;
                            parse_children(stream, |stream, name| {
                                if name.namespace == Namespace::Dav && name.name == "href" {
                                    href = Some(stream.collect_text()?);
                                } else {
                                    stream.skip_element()?;
                                }
                                Ok(())
                            })?;
                            update
                                .remove
                                .push(href.ok_or(Error::MissingElement("href"))?);
                        }
                        _ => stream.skip_element()?,
                    }
                }
                Token::ElementStart { .. } => stream.skip_element()?,
                Token::ElementEnd => break,
                Token::Text(_) => {}
                Token::Eof => return Err(Error::UnexpectedEof),
            }
        }

        Ok(update)
    }
}

impl DavParser for ShareeDescriptor {
    fn parse(stream: &mut Tokenizer<'_>) -> Result<Self> {
        let mut href = None;
        let mut common_name = None;
        let mut summary = None;
        let mut read_write = false;

        parse_children(stream, |stream, name| {
            match (&name.namespace, name.name.as_str()) {
                (Namespace::Dav, "href") => href = Some(stream.collect_text()?),
                (Namespace::CalendarServer, "common-name") => {
                    common_name = non_empty(stream.collect_text()?)
                }
                (Namespace::CalendarServer, "summary") => {
                    summary = non_empty(stream.collect_text()?)
                }
                (Namespace::CalendarServer, "read-write") => {
                    read_write = true;
                    stream.skip_element()?;
                }
                (Namespace::CalendarServer, "read") => {
                    read_write = false;
                    stream.skip_element()?;
                }
                _ => stream.skip_element()?,
            }
            Ok(())
        })?;

        Ok(ShareeDescriptor {
            href: href
                .and_then(non_empty)
                .ok_or(Error::MissingElement("href"))?,
            common_name,
            summary,
            read_write,
        })
    }
}

impl DavParser for ShareReply {
    fn parse(stream: &mut Tokenizer<'_>) -> Result<Self> {
        let mut href = None;
        let mut status = None;
        let mut calendar_uri = None;
        let mut in_reply_to = None;
        let mut summary = None;

        parse_children(stream, |stream, name| {
            match (&name.namespace, name.name.as_str()) {
                (Namespace::Dav, "href") => href = Some(stream.collect_text()?),
                (Namespace::CalendarServer, "hosturl") => {
                    parse_children(stream, |stream, name| {
                        if name.namespace == Namespace::Dav && name.name == "href" {
                            calendar_uri = non_empty(stream.collect_text()?);
                        } else {
                            stream.skip_element()?;
                        }
                        Ok(())
                    })?;
                }
                (Namespace::CalendarServer, "in-reply-to") => {
                    in_reply_to = Some(stream.collect_text()?)
                }
                (Namespace::CalendarServer, "summary") => {
                    summary = non_empty(stream.collect_text()?)
                }
                (Namespace::CalendarServer, token) => {
                    match ShareeStatus::parse(token) {
                        Some(target) if target.is_reply_target() => status = Some(target),
                        Some(target) => return Err(Error::InvalidReplyStatus(target.as_str())),
                        None => {}
                    }
                    stream.skip_element()?;
                }
                _ => stream.skip_element()?,
            }
            Ok(())
        })?;

        Ok(ShareReply {
            href: href
                .and_then(non_empty)
                .ok_or(Error::MissingElement("href"))?,
            status: status.ok_or(Error::MissingElement("invite-accepted"))?,
            calendar_uri,
            in_reply_to: in_reply_to.ok_or(Error::MissingElement("in-reply-to"))?,
            summary,
        })
    }
}

/// Invokes `f` for every child element until the enclosing element ends.
fn parse_children<F>(stream: &mut Tokenizer<'_>, mut f: F) -> Result<()>
where
    F: FnMut(&mut Tokenizer<'_>, crate::schema::Element) -> Result<()>,
{
    loop {
        match stream.token()? {
            Token::ElementStart { name } => f(stream, name)?,
            Token::ElementEnd => return Ok(()),
            Token::Text(_) => {}
            Token::Eof => return Err(Error::UnexpectedEof),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
