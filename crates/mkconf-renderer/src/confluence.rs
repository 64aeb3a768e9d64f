//! Confluence backend for markdown rendering.
//!
//! Produces Confluence XHTML storage format for the REST API.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::link::PageLink;
use crate::util::{basename, escape_html, is_external_url};

/// Table of contents macro.
pub const TOC_MACRO: &str = r#"<ac:structured-macro ac:name="toc" ac:schema-version="1" />"#;

/// Confluence render backend.
///
/// Produces Confluence XHTML storage format with:
/// - `ac:structured-macro` for code blocks
/// - Info panel macro for blockquotes
/// - `ac:image` with `ri:url` or `ri:attachment` for images
/// - `ac:link` with `ri:page` for links between pages
/// - Plain `<hN>` headings; Confluence derives anchors from the heading text
pub struct ConfluenceBackend;

impl RenderBackend for ConfluenceBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
        if let Some(lang) = lang {
            write!(
                out,
                r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                escape_html(lang)
            )
            .unwrap();
        }
        out.push_str(r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#);
        // CDATA cannot contain its own terminator, split it across sections
        let content = content.replace("]]>", "]]]]><![CDATA[>");
        write!(
            out,
            r"<ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body>"
        )
        .unwrap();
        out.push_str("</ac:structured-macro>");
    }

    fn blockquote_start(out: &mut String) {
        out.push_str(
            r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#,
        );
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</ac:rich-text-body></ac:structured-macro>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        out.push_str("<ac:image");
        if !alt.is_empty() {
            write!(out, r#" ac:alt="{}""#, escape_html(alt)).unwrap();
        }
        if !title.is_empty() {
            write!(out, r#" ac:title="{}""#, escape_html(title)).unwrap();
        }
        out.push('>');
        if is_external_url(src) {
            write!(out, r#"<ri:url ri:value="{}" />"#, escape_html(src)).unwrap();
        } else {
            // Local file, uploaded as an attachment under its basename
            write!(
                out,
                r#"<ri:attachment ri:filename="{}" />"#,
                escape_html(basename(src))
            )
            .unwrap();
        }
        out.push_str("</ac:image>");
    }

    fn page_link_start(link: &PageLink, out: &mut String) {
        out.push_str("<ac:link");
        if let Some(anchor) = &link.anchor {
            write!(out, r#" ac:anchor="{}""#, escape_html(anchor)).unwrap();
        }
        out.push('>');
        if let Some(title) = &link.title {
            write!(out, r#"<ri:page ri:content-title="{}" />"#, escape_html(title)).unwrap();
        }
        out.push_str("<ac:link-body>");
    }

    fn page_link_end(_link: &PageLink, out: &mut String) {
        out.push_str("</ac:link-body></ac:link>");
    }

    fn toc(out: &mut String) {
        out.push_str(TOC_MACRO);
    }

    fn hard_break(out: &mut String) {
        out.push_str("<br />");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr />");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        ConfluenceBackend::code_block(Some("python"), "print('hello')", &mut out);
        assert!(out.contains(r#"ac:name="code""#));
        assert!(out.contains(r#"ac:name="language">python"#));
        assert!(out.contains("<![CDATA[print('hello')]]>"));
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        ConfluenceBackend::code_block(None, "plain code", &mut out);
        assert!(!out.contains(r#"ac:name="language""#));
        assert!(out.contains("plain code"));
    }

    #[test]
    fn test_code_block_escapes_cdata_terminator() {
        let mut out = String::new();
        ConfluenceBackend::code_block(None, "a]]>b", &mut out);
        assert!(out.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
    }

    #[test]
    fn test_blockquote() {
        let mut out = String::new();
        ConfluenceBackend::blockquote_start(&mut out);
        out.push_str("content");
        ConfluenceBackend::blockquote_end(&mut out);
        assert!(out.contains(r#"ac:name="info""#));
        assert!(out.contains("<ac:rich-text-body>content</ac:rich-text-body>"));
    }

    #[test]
    fn test_external_image() {
        let mut out = String::new();
        ConfluenceBackend::image("https://example.com/image.png", "", "", &mut out);
        assert_eq!(
            out,
            r#"<ac:image><ri:url ri:value="https://example.com/image.png" /></ac:image>"#
        );
    }

    #[test]
    fn test_local_image_uses_basename() {
        let mut out = String::new();
        ConfluenceBackend::image("./images/diagram.png", "Flow", "", &mut out);
        assert_eq!(
            out,
            r#"<ac:image ac:alt="Flow"><ri:attachment ri:filename="diagram.png" /></ac:image>"#
        );
    }

    #[test]
    fn test_heading_has_no_id() {
        let mut out = String::new();
        ConfluenceBackend::heading(2, "Setup", &mut out);
        assert_eq!(out, "<h2>Setup</h2>");
    }

    #[test]
    fn test_page_link_with_anchor() {
        let link = PageLink::page("Docs - Install", Some("Requirements".to_owned()));
        let mut out = String::new();
        ConfluenceBackend::page_link_start(&link, &mut out);
        out.push_str("install");
        ConfluenceBackend::page_link_end(&link, &mut out);
        assert_eq!(
            out,
            r#"<ac:link ac:anchor="Requirements"><ri:page ri:content-title="Docs - Install" /><ac:link-body>install</ac:link-body></ac:link>"#
        );
    }

    #[test]
    fn test_same_page_anchor_link() {
        let link = PageLink::anchor("Usage");
        let mut out = String::new();
        ConfluenceBackend::page_link_start(&link, &mut out);
        ConfluenceBackend::page_link_end(&link, &mut out);
        assert_eq!(
            out,
            r#"<ac:link ac:anchor="Usage"><ac:link-body></ac:link-body></ac:link>"#
        );
    }

    #[test]
    fn test_page_link_escapes_title() {
        let link = PageLink::page("Q&A", None);
        let mut out = String::new();
        ConfluenceBackend::page_link_start(&link, &mut out);
        assert!(out.contains(r#"ri:content-title="Q&amp;A""#));
    }

    #[test]
    fn test_breaks_and_markers() {
        let mut out = String::new();
        ConfluenceBackend::hard_break(&mut out);
        ConfluenceBackend::horizontal_rule(&mut out);
        ConfluenceBackend::task_list_marker(true, &mut out);
        ConfluenceBackend::task_list_marker(false, &mut out);
        assert_eq!(out, "<br /><hr />[x] [ ] ");
    }
}
