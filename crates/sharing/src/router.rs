/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    SharingPlugin,
    host::{DavContext, DavNode, DavRequest, HttpResponse, MethodOutcome},
};
use hyper::{
    Method, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use sharing_proto::{
    Privilege,
    schema::{
        request::{ShareReply, ShareUpdate, SharingDocument},
        response::SharedAs,
        sharee::ShareeStatus,
    },
};
use tracing::{debug, info, warn};

pub(crate) trait ShareRequestRouter: Sync + Send {
    fn handle_share_request(
        &self,
        ctx: &DavContext<'_>,
        request: &mut DavRequest,
        response: &mut HttpResponse,
    ) -> impl Future<Output = crate::Result<MethodOutcome>> + Send;
}

impl ShareRequestRouter for SharingPlugin {
    async fn handle_share_request(
        &self,
        ctx: &DavContext<'_>,
        request: &mut DavRequest,
        response: &mut HttpResponse,
    ) -> crate::Result<MethodOutcome> {
        if request.method != Method::POST {
            return Ok(MethodOutcome::NotHandled);
        }
        if !request.is_xml() {
            debug!(uri = %request.uri, "Declining POST without an XML content type");
            return Ok(MethodOutcome::NotHandled);
        }

        // Make sure the node exists
        let Some(node) = ctx.tree.node_for_path(&request.uri).await? else {
            debug!(uri = %request.uri, "Declining POST to a missing resource");
            return Ok(MethodOutcome::NotHandled);
        };

        // The body can only be read once, put it back for the next handler
        let Some(body) = request.take_body() else {
            debug!(uri = %request.uri, "Declining POST without a body");
            return Ok(MethodOutcome::NotHandled);
        };
        let size = body.len();
        let document = if size == 0 {
            None
        } else if size > self.config.request_max_size {
            warn!(
                uri = %request.uri,
                size,
                max_size = self.config.request_max_size,
                "Declining oversized sharing request"
            );
            None
        } else {
            Some(SharingDocument::parse(&body))
        };
        request.set_body(body);

        let Some(document) = document.transpose()? else {
            if size == 0 {
                debug!(uri = %request.uri, "Declining POST with an empty body");
            }
            return Ok(MethodOutcome::NotHandled);
        };
        let Some(transaction) = document.transaction_type() else {
            if let SharingDocument::Unknown(root) = &document {
                debug!(
                    uri = %request.uri,
                    root = %root,
                    "Declining POST with an unrecognized document"
                );
            }
            return Ok(MethodOutcome::NotHandled);
        };

        let node = node.as_ref();
        let tx = Transaction {
            ctx,
            request,
            response,
            node,
            name: transaction,
        };
        match document {
            SharingDocument::Share(update) => self.handle_share(tx, update).await,
            SharingDocument::InviteReply(reply) => self.handle_invite_reply(tx, reply).await,
            SharingDocument::PublishCalendar => self.handle_publish(tx, true).await,
            SharingDocument::UnpublishCalendar => self.handle_publish(tx, false).await,
            SharingDocument::Unknown(_) => Ok(MethodOutcome::NotHandled),
        }
    }
}

/// State shared by the handlers of the sharing documents.
struct Transaction<'x, 'y> {
    ctx: &'x DavContext<'y>,
    request: &'x mut DavRequest,
    response: &'x mut HttpResponse,
    node: &'x dyn DavNode,
    name: &'static str,
}

impl SharingPlugin {
    async fn handle_share(
        &self,
        tx: Transaction<'_, '_>,
        update: ShareUpdate,
    ) -> crate::Result<MethodOutcome> {
        let Some(shareable) = tx.node.shareable() else {
            return Ok(MethodOutcome::NotHandled);
        };
        tx.request.transaction_type = Some(tx.name);

        // Validate ACL
        self.check_write(tx.ctx, &tx.request.uri).await?;

        shareable.update_shares(&update).await?;
        self.set_status(tx.response, StatusCode::OK);

        info!(
            transaction = tx.name,
            uri = %tx.request.uri,
            set = update.set.len(),
            remove = update.remove.len(),
            "Updated calendar sharees"
        );

        Ok(MethodOutcome::Handled)
    }

    async fn handle_invite_reply(
        &self,
        tx: Transaction<'_, '_>,
        reply: ShareReply,
    ) -> crate::Result<MethodOutcome> {
        let Some(home) = tx.node.calendar_home() else {
            return Ok(MethodOutcome::NotHandled);
        };
        tx.request.transaction_type = Some(tx.name);

        // Validate ACL
        self.check_write(tx.ctx, &tx.request.uri).await?;

        let url = home.share_reply(&reply).await?;
        self.set_status(tx.response, StatusCode::OK);

        info!(
            transaction = tx.name,
            uri = %tx.request.uri,
            href = %reply.href,
            status = reply.status.as_str(),
            shared_as = url.as_deref(),
            "Processed invite reply"
        );

        match url.filter(|url| !url.is_empty()) {
            Some(url) if reply.status == ShareeStatus::Accepted => {
                tx.response
                    .set_header(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
                Ok(MethodOutcome::HandledWithBody(
                    SharedAs::new(&url, tx.ctx.registry.namespaces())
                        .to_string()
                        .into_bytes(),
                ))
            }
            Some(url) => {
                warn!(
                    uri = %tx.request.uri,
                    status = reply.status.as_str(),
                    shared_as = %url,
                    "Ignoring shared url returned for a reply that was not an acceptance"
                );
                Ok(MethodOutcome::Handled)
            }
            None => Ok(MethodOutcome::Handled),
        }
    }

    async fn handle_publish(
        &self,
        tx: Transaction<'_, '_>,
        publish: bool,
    ) -> crate::Result<MethodOutcome> {
        let Some(shareable) = tx.node.shareable() else {
            return Ok(MethodOutcome::NotHandled);
        };
        tx.request.transaction_type = Some(tx.name);

        // Validate ACL
        self.check_write(tx.ctx, &tx.request.uri).await?;

        shareable.set_publish_status(publish).await?;
        self.set_status(
            tx.response,
            if publish {
                StatusCode::ACCEPTED
            } else {
                StatusCode::OK
            },
        );

        info!(
            transaction = tx.name,
            uri = %tx.request.uri,
            "Changed calendar publish status"
        );

        Ok(MethodOutcome::Handled)
    }

    async fn check_write(&self, ctx: &DavContext<'_>, uri: &str) -> crate::Result<()> {
        if let Some(acl) = ctx.acl {
            acl.check_privileges(uri, Privilege::Write)
                .await
                .inspect_err(|err| {
                    warn!(uri, reason = %err, "Sharing request denied");
                })?;
        }
        Ok(())
    }
}
