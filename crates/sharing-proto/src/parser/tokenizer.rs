/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{Error, Result};
use crate::schema::{Element, Namespace};
use quick_xml::{
    NsReader,
    events::Event,
    name::{Namespace as XmlNamespace, ResolveResult},
};

pub struct Tokenizer<'x> {
    xml: NsReader<&'x [u8]>,
    pending: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    ElementStart { name: Element },
    ElementEnd,
    Text(String),
    Eof,
}

impl<'x> Tokenizer<'x> {
    pub fn new(input: &'x [u8]) -> Self {
        let mut xml = NsReader::from_reader(input);
        xml.config_mut().expand_empty_elements = true;
        Tokenizer { xml, pending: None }
    }

    /// Returns the next token. Adjacent text, entity and CDATA events are
    /// merged into a single trimmed `Text` token, whitespace-only text is
    /// dropped.
    pub fn token(&mut self) -> Result<Token> {
        if let Some(token) = self.pending.take() {
            return Ok(token);
        }

        let mut text = String::new();
        loop {
            let (resolve, event) = self.xml.read_resolved_event()?;
            let token = match event {
                Event::Start(element) => {
                    let namespace = match resolve {
                        ResolveResult::Bound(XmlNamespace(uri)) => Namespace::parse(uri),
                        ResolveResult::Unbound => Namespace::Other(String::new()),
                        ResolveResult::Unknown(prefix) => {
                            return Err(Error::UnknownPrefix(
                                String::from_utf8_lossy(&prefix).into_owned(),
                            ));
                        }
                    };
                    let name = std::str::from_utf8(element.local_name().as_ref())?.to_string();
                    Token::ElementStart {
                        name: Element::new(namespace, name),
                    }
                }
                Event::End(_) => Token::ElementEnd,
                Event::Eof => Token::Eof,
                Event::Text(chunk) => {
                    text.push_str(std::str::from_utf8(&chunk)?);
                    continue;
                }
                Event::CData(chunk) => {
                    text.push_str(std::str::from_utf8(&chunk)?);
                    continue;
                }
                Event::GeneralRef(entity) => {
                    let ch = match &*entity {
                        b"lt" => '<',
                        b"gt" => '>',
                        b"amp" => '&',
                        b"apos" => '\'',
                        b"quot" => '"',
                        _ => entity.resolve_char_ref().ok().flatten().ok_or_else(|| {
                            Error::InvalidEntity(String::from_utf8_lossy(&entity).into_owned())
                        })?,
                    };
                    text.push(ch);
                    continue;
                }
                _ => continue,
            };

            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Ok(token)
            } else {
                let text = trimmed.to_string();
                self.pending = Some(token);
                Ok(Token::Text(text))
            };
        }
    }

    /// Consumes the remainder of the element whose start tag was just read.
    pub fn skip_element(&mut self) -> Result<()> {
        let mut depth = 1;
        loop {
            match self.token()? {
                Token::ElementStart { .. } => depth += 1,
                Token::ElementEnd => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::Text(_) => {}
                Token::Eof => return Err(Error::UnexpectedEof),
            }
        }
    }

    /// Reads the text content of the element whose start tag was just read,
    /// ignoring any nested elements.
    pub fn collect_text(&mut self) -> Result<String> {
        let mut result = String::new();
        loop {
            match self.token()? {
                Token::Text(text) => {
                    if !result.is_empty() {
                        result.push(' ');
                    }
                    result.push_str(&text);
                }
                Token::ElementStart { .. } => self.skip_element()?,
                Token::ElementEnd => return Ok(result),
                Token::Eof => return Err(Error::UnexpectedEof),
            }
        }
    }
}
