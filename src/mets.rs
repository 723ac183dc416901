//! XML helpers for the METS manifest and PAGE-XML transcripts.
//!
//! The service answers several calls with small XML envelopes (login,
//! upload creation) and serves documents as a METS manifest plus one
//! PAGE-XML file per page. Only a handful of attributes are ever touched;
//! everything else is copied through event by event.

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::{NsReader, Reader};
use quick_xml::Writer;

use crate::errors::{Result, TranskribusError};

pub(crate) const METS_NS: &[u8] = b"http://www.loc.gov/METS/";
pub(crate) const XLINK_NS: &[u8] = b"http://www.w3.org/1999/xlink";

/// `ID` of the METS file group holding the PAGE-XML pointers.
pub const PAGEXML_GROUP: &str = "PAGEXML";

const INDENT: usize = 4;

/// Return the trimmed text of the first element named `local` (namespace
/// prefix ignored), or `None` if the document has no such element.
pub fn first_text(xml: &[u8], local: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == local.as_bytes() => {
                let text = reader.read_text(e.name())?;
                return Ok(Some(text.trim().to_string()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Rewrite every `mets:FLocat` inside the `PAGEXML` file group so it points
/// at a local transcript file.
///
/// The k-th pointer receives `file_names[k]`; its `LOCTYPE` becomes `OTHER`
/// and its `OTHERLOCTYPE` becomes `FILE`. The output is re-indented and
/// starts with an XML declaration.
///
/// Fails with [`TranskribusError::Download`] when the number of pointers
/// differs from the number of file names, and with
/// [`TranskribusError::Parse`] when the manifest is not a complete document.
pub fn rewrite_file_locations(xml: &[u8], file_names: &[&str]) -> Result<Vec<u8>> {
    let mut reader = NsReader::from_reader(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut nesting = Nesting::default();
    let mut group_depth: Option<usize> = None;
    let mut pointers = 0usize;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Decl(_) => {}
            Event::Text(t) if is_blank(&t) => {}
            Event::Text(t) => {
                nesting.content()?;
                writer.write_event(Event::Text(t))?;
            }
            Event::CData(t) => {
                nesting.content()?;
                writer.write_event(Event::CData(t))?;
            }
            Event::Start(e) => {
                nesting.open()?;
                if group_depth.is_none() && is_page_group(&reader, &e)? {
                    group_depth = Some(nesting.depth);
                }
                if group_depth.is_some() && is_mets_element(&reader, &e, b"FLocat") {
                    let href = pointer_target(file_names, pointers)?;
                    pointers += 1;
                    writer.write_event(Event::Start(rewrite_pointer(&reader, &e, href)?))?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                nesting.open()?;
                nesting.close();
                if group_depth.is_some() && is_mets_element(&reader, &e, b"FLocat") {
                    let href = pointer_target(file_names, pointers)?;
                    pointers += 1;
                    writer.write_event(Event::Empty(rewrite_pointer(&reader, &e, href)?))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if group_depth == Some(nesting.depth) {
                    group_depth = None;
                }
                nesting.close();
                writer.write_event(Event::End(e))?;
            }
            other => writer.write_event(other)?,
        }
    }
    nesting.finish()?;

    if pointers != file_names.len() {
        return Err(TranskribusError::Download(format!(
            "manifest lists {pointers} transcript pointers but the document has {} pages",
            file_names.len()
        )));
    }

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Re-indent a PAGE-XML transcript and give it a standalone declaration.
///
/// Truncated or non-XML input fails with [`TranskribusError::Parse`].
pub fn format_transcript(xml: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )))?;

    let mut nesting = Nesting::default();

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Decl(_) => continue,
            Event::Text(t) if is_blank(t) => continue,
            Event::Text(_) | Event::CData(_) => nesting.content()?,
            Event::Start(_) => nesting.open()?,
            Event::Empty(_) => {
                nesting.open()?;
                nesting.close();
            }
            Event::End(_) => nesting.close(),
            _ => {}
        }
        writer.write_event(event)?;
    }
    nesting.finish()?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Element nesting of a document being copied. quick-xml reports `Eof` even
/// with elements still open, and hands stray text back as a `Text` event.
#[derive(Debug, Default)]
struct Nesting {
    depth: usize,
    root_seen: bool,
}

impl Nesting {
    fn open(&mut self) -> Result<()> {
        if self.depth == 0 && self.root_seen {
            return Err(TranskribusError::Parse(
                "document has more than one root element".to_string(),
            ));
        }
        self.depth += 1;
        self.root_seen = true;
        Ok(())
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn content(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(TranskribusError::Parse(
                "text outside the root element".to_string(),
            ));
        }
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if !self.root_seen {
            return Err(TranskribusError::Parse("document has no root element".to_string()));
        }
        if self.depth > 0 {
            return Err(TranskribusError::Parse(format!(
                "document ends with {} unclosed element(s)",
                self.depth
            )));
        }
        Ok(())
    }
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn pointer_target<'a>(file_names: &[&'a str], index: usize) -> Result<&'a str> {
    file_names.get(index).copied().ok_or_else(|| {
        TranskribusError::Download(format!(
            "manifest lists more transcript pointers than the {} pages of the document",
            file_names.len()
        ))
    })
}

fn is_mets_element(reader: &NsReader<&[u8]>, e: &BytesStart<'_>, local: &[u8]) -> bool {
    let (ns, name) = reader.resolve_element(e.name());
    ns == ResolveResult::Bound(Namespace(METS_NS)) && name.as_ref() == local
}

fn is_page_group(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<bool> {
    if !is_mets_element(reader, e, b"fileGrp") {
        return Ok(false);
    }
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ID" {
            return Ok(attr.value.as_ref() == PAGEXML_GROUP.as_bytes());
        }
    }
    Ok(false)
}

fn rewrite_pointer(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    href: &str,
) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut has_loctype = false;
    let mut has_other_loctype = false;
    let mut has_href = false;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"LOCTYPE" => {
                out.push_attribute(("LOCTYPE", "OTHER"));
                has_loctype = true;
            }
            b"OTHERLOCTYPE" => {
                out.push_attribute(("OTHERLOCTYPE", "FILE"));
                has_other_loctype = true;
            }
            _ => {
                let (ns, local) = reader.resolve_attribute(attr.key);
                if ns == ResolveResult::Bound(Namespace(XLINK_NS)) && local.as_ref() == b"href" {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    out.push_attribute((key.as_str(), href));
                    has_href = true;
                } else {
                    out.push_attribute(attr);
                }
            }
        }
    }

    if !has_loctype {
        out.push_attribute(("LOCTYPE", "OTHER"));
    }
    if !has_other_loctype {
        out.push_attribute(("OTHERLOCTYPE", "FILE"));
    }
    if !has_href {
        out.push_attribute(("xmlns:xlink", "http://www.w3.org/1999/xlink"));
        out.push_attribute(("xlink:href", href));
    }

    Ok(out)
}
