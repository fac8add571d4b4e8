/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{
    PUBLISH, SharingTest, init_sharing_tests, reply_document, share_document, store::WORK,
};
use hyper::StatusCode;
use sharing::config::SharingConfig;

const PROPFIND: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>",
    "<D:propfind xmlns:D=\"DAV:\"><D:prop><D:displayname/></D:prop></D:propfind>"
);

pub async fn test(handle: &SharingTest) {
    println!("Running share request routing tests...");
    handle.reset();
    let john = handle.client("john");
    let share = share_document(&[("mailto:jane@example.com", true)], &[]);

    // Documents owned by other handlers reach them untouched
    john.post(WORK, PROPFIND)
        .await
        .with_status(StatusCode::OK)
        .with_header("x-body-recorder", "consumed")
        .with_no_header("x-sabre-status")
        .with_transaction(None);
    handle.assert_fallback_received(PROPFIND);

    // Only XML POST requests to existing resources are considered
    for (method, uri, content_type) in [
        ("POST", WORK, "text/calendar"),
        ("POST", WORK, "application/xml-dtd"),
        ("REPORT", WORK, "application/xml"),
        ("POST", "/calendars/john/missing/", "application/xml"),
    ] {
        john.request_with_headers(method, uri, [("content-type", content_type)], share.as_str())
            .await
            .with_header("x-body-recorder", "consumed")
            .with_no_header("x-sabre-status")
            .with_transaction(None);
        handle.assert_fallback_received(&share);
    }
    john.request_with_headers("POST", WORK, [] as [(&str, &str); 0], share.as_str())
        .await
        .with_header("x-body-recorder", "consumed");
    handle.assert_fallback_received(&share);
    assert!(handle.server.sharees(WORK).is_empty());

    // Requests without a body are declined and passed on as they came
    john.post(WORK, "")
        .await
        .with_header("x-body-recorder", "consumed")
        .with_no_header("x-sabre-status")
        .with_transaction(None);
    handle.assert_fallback_without_body();

    // Content type parameters and casing are ignored
    john.request_with_headers(
        "POST",
        WORK,
        [("content-type", "Text/XML; charset=\"utf-8\"")],
        share.as_str(),
    )
    .await
    .with_status(StatusCode::OK)
    .with_header("x-sabre-status", "everything-went-well")
    .with_transaction(Some("post-calendar-share"));
    handle.assert_fallback_untouched();
    assert_eq!(handle.server.sharees(WORK).len(), 1);

    // The feature is advertised
    john.options(WORK)
        .await
        .with_header("dav", "1, 3, extended-mkcol, calendarserver-sharing");

    // Custom configuration
    let custom = init_sharing_tests(
        SharingConfig::parse(
            r#"
            feature = "calendar-sharing"
            request-max-size = 512

            [diagnostic-header]
            name = "X-Share-Status"
            value = "ok"

            [namespaces]
            "DAV:" = "d"
            "http://calendarserver.org/ns/" = "cs"
            "#,
        )
        .unwrap(),
    );
    let john = custom.client("john");
    let jane = custom.client("jane");

    john.options(WORK)
        .await
        .with_header("dav", "1, 3, extended-mkcol, calendar-sharing");
    john.post(WORK, share.as_str())
        .await
        .with_status(StatusCode::OK)
        .with_header("x-share-status", "ok")
        .with_no_header("x-sabre-status");
    john.post(WORK, PUBLISH)
        .await
        .with_status(StatusCode::ACCEPTED)
        .with_header("x-share-status", "ok");

    // Oversized bodies are not parsed
    let oversized = share_document(
        &(0..20)
            .map(|i| format!("mailto:user{i}@example.com"))
            .collect::<Vec<_>>()
            .iter()
            .map(|href| (href.as_str(), false))
            .collect::<Vec<_>>(),
        &[],
    );
    assert!(oversized.len() > 512);
    john.post(WORK, oversized.as_str())
        .await
        .with_header("x-body-recorder", "consumed")
        .with_no_header("x-share-status")
        .with_transaction(None);
    custom.assert_fallback_received(&oversized);
    assert_eq!(custom.server.sharees(WORK).len(), 1);

    // The shared-as document declares the configured prefixes
    let response = jane
        .post(
            "/calendars/jane/",
            reply_document(
                "mailto:jane@example.com",
                "invite-accepted",
                Some(WORK),
                "inv-john-work",
            ),
        )
        .await
        .with_status(StatusCode::OK)
        .with_header("x-share-status", "ok")
        .with_value("cs:shared-as.d:href", "/calendars/jane/work-john/");
    assert_eq!(
        response.body,
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<cs:shared-as xmlns:d=\"DAV:\" xmlns:A=\"urn:ietf:params:xml:ns:caldav\" ",
            "xmlns:cs=\"http://calendarserver.org/ns/\" xmlns:S=\"http://sabredav.org/ns\">",
            "<d:href>/calendars/jane/work-john/</d:href></cs:shared-as>"
        )
    );
    custom.assert_fallback_untouched();
}
