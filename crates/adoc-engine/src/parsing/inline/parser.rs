use crate::models::{Document, Node, NodeId, NodeKind};
use crate::parsing::attrs::{default_alt, parse_attrlist, parse_shorthand};
use crate::parsing::kinds::{is_valid_attr_name, is_valid_id};

use super::{
    cursor::Cursor,
    kinds::{
        APOSTROPHE, Bracket, FormatKind, MACRO_NAMES, Marker, Quote, REPLACEMENTS, is_url_scheme,
    },
};

/// Upper bound on `{name}` rewrites per buffer; stops self-referencing values.
const MAX_REWRITES: usize = 64;
/// Upper bound on nested inline parses (labels, footnotes).
const MAX_DEPTH: usize = 8;

/// Parses the raw content of `container` into a chain of inline children.
///
/// The raw buffer is consumed: afterwards the container holds children only.
pub fn parse_inline(doc: &mut Document, container: NodeId) {
    let raw = std::mem::take(&mut doc.tree[container].raw);
    parse_into(doc, container, &raw, 0);
}

/// Parses `content` and appends the resulting nodes to `container`.
pub(crate) fn parse_into(doc: &mut Document, container: NodeId, content: &str, depth: usize) {
    if depth >= MAX_DEPTH {
        let leaf = doc.tree.new_node(NodeKind::Text);
        doc.tree[leaf].raw = content.to_string();
        doc.tree.append_child(container, leaf);
        return;
    }
    let mut p = InlineParser::new(doc, container, content, depth);
    p.run();
    p.finish();
}

/// A macro recognised at a `:`: target before the brackets, bracket
/// content, and the number of bytes it spans from the colon on.
struct MacroCall {
    target: String,
    content: Option<String>,
    consumed: usize,
}

struct InlineParser<'d> {
    doc: &'d mut Document,
    cur: Cursor,
    container: NodeId,
    /// Open text leaf receiving plain characters.
    current: NodeId,
    /// Formats currently open, innermost last.
    stack: Vec<(FormatKind, NodeId)>,
    /// Source text that opened each format node.
    openers: Vec<(NodeId, String)>,
    open_double_quotes: usize,
    open_single_quotes: usize,
    rewrites: usize,
    depth: usize,
}

impl<'d> InlineParser<'d> {
    fn new(doc: &'d mut Document, container: NodeId, content: &str, depth: usize) -> Self {
        let current = doc.tree.new_node(NodeKind::Text);
        doc.tree.append_child(container, current);
        Self {
            doc,
            cur: Cursor::new(content),
            container,
            current,
            stack: vec![],
            openers: vec![],
            open_double_quotes: 0,
            open_single_quotes: 0,
            rewrites: 0,
            depth,
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.cur.peek() {
            let handled = self.escape(c)
                || self.passthrough(c)
                || self.macro_colon(c)
                || self.sub_super(c)
                || self.smart_quote(c)
                || self.emphasis(c)
                || self.span_close(c)
                || self.bracket(c)
                || self.cross_reference(c)
                || self.attribute_reference(c)
                || self.replacement(c);
            if !handled && let Some(ch) = self.cur.bump_char() {
                self.doc.tree[self.current].raw.push(ch);
            }
        }
    }

    fn push_str(&mut self, s: &str) {
        self.doc.tree[self.current].raw.push_str(s);
    }

    fn open_parent(&self) -> NodeId {
        self.doc.tree[self.current].parent.unwrap_or(self.container)
    }

    fn new_leaf(&mut self, parent: NodeId) {
        let leaf = self.doc.tree.new_node(NodeKind::Text);
        self.doc.tree.append_child(parent, leaf);
        self.current = leaf;
    }

    /// Appends a node after the current leaf and starts a fresh leaf after it.
    fn emit(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.open_parent();
        let n = self.doc.tree.new_node(kind);
        self.doc.tree.append_child(parent, n);
        self.new_leaf(parent);
        n
    }

    fn emit_raw(&mut self, kind: NodeKind, raw: &str) -> NodeId {
        let n = self.emit(kind);
        self.doc.tree[n].raw = raw.to_string();
        n
    }

    fn text_child(&mut self, parent: NodeId, s: &str) {
        let leaf = self.doc.tree.new_node(NodeKind::Text);
        self.doc.tree[leaf].raw = s.to_string();
        self.doc.tree.append_child(parent, leaf);
    }

    /// Opens `fmt`; `marker` is the source text that opened it.
    fn open(&mut self, fmt: FormatKind, marker: &str) -> NodeId {
        let parent = self.open_parent();
        let n = self.doc.tree.new_node(fmt.node_kind());
        self.doc.tree[n].emphasis = fmt.emphasis();
        self.doc.tree.append_child(parent, n);
        self.stack.push((fmt, n));
        self.openers.push((n, marker.to_string()));
        self.new_leaf(n);
        n
    }

    fn is_open(&self, fmt: FormatKind) -> bool {
        self.stack.iter().any(|(k, _)| *k == fmt)
    }

    /// Closes `fmt` even when other formats were opened inside it.
    ///
    /// Formats opened after `fmt` are closed with it and re-opened as fresh
    /// nodes beside the closed one, so `*a _b* c_` keeps `c` italic.
    fn terminate(&mut self, fmt: FormatKind) {
        let Some(pos) = self.stack.iter().rposition(|(k, _)| *k == fmt) else {
            return;
        };
        let reopen: Vec<(FormatKind, NodeId)> = self.stack.drain(pos + 1..).collect();
        let Some((_, target)) = self.stack.pop() else {
            return;
        };
        let mut parent = self.doc.tree[target].parent.unwrap_or(self.container);
        for (kind, old) in reopen {
            let n = self.doc.tree.new_node(kind.node_kind());
            self.doc.tree[n].emphasis = kind.emphasis();
            self.doc.tree[n].roles = self.doc.tree[old].roles.clone();
            self.doc.tree.append_child(parent, n);
            self.stack.push((kind, n));
            parent = n;
        }
        self.new_leaf(parent);
    }

    fn escape(&mut self, c: u8) -> bool {
        if c != Marker::ESCAPE {
            return false;
        }
        let rest = &self.cur.rest()[1..];
        if let Some(name) = MACRO_NAMES
            .iter()
            .find(|n| rest.starts_with(**n) && rest[n.len()..].starts_with(':'))
        {
            let literal = format!("{name}:");
            self.cur.bump_n(1 + literal.len());
            self.push_str(&literal);
            return true;
        }
        let Some(next) = self.cur.peek_at(1) else {
            return false;
        };
        if !Marker::is_escapable(next) {
            return false;
        }
        self.cur.bump_n(1);
        let doubled = matches!(next, Marker::BOLD | Marker::ITALIC | Marker::MONO | Marker::PASS)
            && self.cur.peek_at(1) == Some(next);
        let n = if doubled { 2 } else { 1 };
        for _ in 0..n {
            if let Some(ch) = self.cur.bump_char() {
                self.doc.tree[self.current].raw.push(ch);
            }
        }
        true
    }

    fn passthrough(&mut self, c: u8) -> bool {
        if c != Marker::PASS {
            return false;
        }
        for (marker, kind) in [
            ("+++", NodeKind::PassthroughRaw),
            ("++", NodeKind::Passthrough),
        ] {
            if !self.cur.starts_with(marker) {
                continue;
            }
            let rest = &self.cur.rest()[marker.len()..];
            if let Some(close) = rest.find(marker)
                && close > 0
            {
                let content = rest[..close].to_string();
                self.cur.bump_n(marker.len() * 2 + close);
                self.emit_raw(kind, &content);
                return true;
            }
        }

        // ` +` at the end of a line
        if self.cur.prev() == Some(b' ') && matches!(self.cur.peek_at(1), None | Some(b'\n')) {
            let raw = &mut self.doc.tree[self.current].raw;
            let trimmed = raw.trim_end_matches(' ').len();
            raw.truncate(trimmed);
            self.cur.bump_n(1);
            if self.cur.peek() == Some(b'\n') {
                self.cur.bump_n(1);
            }
            self.emit(NodeKind::LineBreak);
            return true;
        }

        if self.begin_ok()
            && let Some(close) = self.closer_ahead(Marker::PASS)
        {
            let content = self.cur.rest()[1..close].to_string();
            self.cur.bump_n(close + 1);
            self.emit_raw(NodeKind::Passthrough, &content);
            return true;
        }
        false
    }

    /// Constrained opener: not glued to a word before, not followed by
    /// whitespace.
    fn begin_ok(&self) -> bool {
        let prev_ok = self
            .cur
            .prev()
            .is_none_or(|p| !(p.is_ascii_alphanumeric() || p == b':' || p == b';'));
        let next_ok = self
            .cur
            .peek_at(1)
            .is_some_and(|n| !n.is_ascii_whitespace());
        prev_ok && next_ok
    }

    /// Constrained closer: glued to the text before, not to a word after.
    fn end_ok(&self) -> bool {
        let prev_ok = self.cur.prev().is_some_and(|p| !p.is_ascii_whitespace());
        let next_ok = self.cur.peek_at(1).is_none_or(|n| !n.is_ascii_alphanumeric());
        prev_ok && next_ok
    }

    /// Offset (from the current position) of a valid constrained closer.
    fn closer_ahead(&self, marker: u8) -> Option<usize> {
        let b = self.cur.rest().as_bytes();
        (2..b.len()).find(|&j| {
            b[j] == marker
                && !b[j - 1].is_ascii_whitespace()
                && b[j - 1] != Marker::ESCAPE
                && b.get(j + 1).is_none_or(|n| !n.is_ascii_alphanumeric())
        })
    }

    fn macro_colon(&mut self, c: u8) -> bool {
        if c != Marker::MACRO {
            return false;
        }
        let raw = &self.doc.tree[self.current].raw;
        let Some(name) = MACRO_NAMES.iter().copied().find(|n| {
            raw.ends_with(n)
                && !raw[..raw.len() - n.len()]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric)
        }) else {
            return false;
        };
        let Some(call) = self.scan_macro(name) else {
            return false;
        };

        let raw = &mut self.doc.tree[self.current].raw;
        raw.truncate(raw.len() - name.len());
        self.cur.bump_n(call.consumed);
        let content = call.content.unwrap_or_default();

        match name {
            "footnote" => self.footnote(call.target, &content),
            "image" => self.inline_image(call.target, &content),
            "xref" => {
                let n = self.emit(NodeKind::CrossReference);
                self.doc.tree[n].attrs.insert("target".into(), call.target);
                if !content.is_empty() {
                    parse_into(self.doc, n, &content, self.depth + 1);
                }
            }
            "pass" => {
                self.emit_raw(NodeKind::PassthroughRaw, &content);
            }
            "mailto" => {
                let href = format!("mailto:{}", call.target);
                self.url(href, &call.target, &content);
            }
            _ => {
                let display = call.target.clone();
                self.url(call.target, &display, &content);
            }
        }
        true
    }

    fn scan_macro(&self, name: &str) -> Option<MacroCall> {
        let after = &self.cur.rest()[1..];

        if is_url_scheme(name) {
            let tail = after.strip_prefix("//")?;
            let end = tail
                .find(|c: char| c.is_whitespace() || matches!(c, '[' | '<' | '>' | '"'))
                .unwrap_or(tail.len());
            if tail[end..].starts_with('[') {
                let close = find_bracket_end(tail, end)?;
                return Some(MacroCall {
                    target: format!("{name}://{}", &tail[..end]),
                    content: Some(tail[end + 1..close].to_string()),
                    consumed: 3 + close + 1,
                });
            }
            let target = tail[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
            if target.is_empty() {
                return None;
            }
            return Some(MacroCall {
                target: format!("{name}://{target}"),
                content: None,
                consumed: 3 + target.len(),
            });
        }

        // `image::x[]` inside a paragraph is still an inline image
        let (skip, after) = match after.strip_prefix(':') {
            Some(a) if name == "image" => (2, a),
            _ => (1, after),
        };
        let open = after.find('[')?;
        let target = &after[..open];
        if target.contains(char::is_whitespace) {
            return None;
        }
        if target.is_empty() && !matches!(name, "footnote" | "pass") {
            return None;
        }
        let close = find_bracket_end(after, open)?;
        Some(MacroCall {
            target: target.to_string(),
            content: Some(after[open + 1..close].to_string()),
            consumed: skip + close + 1,
        })
    }

    fn url(&mut self, href: String, display: &str, label: &str) {
        let n = self.emit(NodeKind::Url);
        self.doc.tree[n].attrs.insert("href".into(), href);
        if label.is_empty() {
            self.doc.tree[n].add_role("bare");
            self.text_child(n, display);
        } else {
            parse_into(self.doc, n, label, self.depth + 1);
        }
    }

    fn inline_image(&mut self, target: String, content: &str) {
        let n = self.emit(NodeKind::InlineImage);
        let attrs = parse_attrlist(content).unwrap_or_default();
        let alt = attrs
            .positional(0)
            .map(str::to_string)
            .unwrap_or_else(|| default_alt(&target));
        let node = &mut self.doc.tree[n];
        node.attrs.insert("target".into(), target);
        node.attrs.insert("alt".into(), alt);
        for (key, pos) in [("width", 1), ("height", 2)] {
            if let Some(v) = attrs.positional(pos) {
                node.attrs.insert(key.into(), v.to_string());
            }
        }
        for (k, v) in attrs.named {
            node.attrs.insert(k, v);
        }
    }

    fn footnote(&mut self, id: String, content: &str) {
        let id = (!id.is_empty()).then_some(id);
        let holder = self.doc.tree.new_node(NodeKind::Paragraph);
        if !content.is_empty() {
            parse_into(self.doc, holder, content, self.depth + 1);
        }
        let number = self.doc.register_footnote(id.as_deref(), holder);
        let n = self.emit(NodeKind::Footnote);
        let node = &mut self.doc.tree[n];
        node.id = id;
        node.attrs.insert("number".into(), number.to_string());
    }

    fn sub_super(&mut self, c: u8) -> bool {
        if c != Marker::SUPERSCRIPT && c != Marker::SUBSCRIPT {
            return false;
        }
        let Some(fmt) = FormatKind::from_marker(c, false) else {
            return false;
        };
        if self.is_open(fmt) {
            self.terminate(fmt);
            self.cur.bump_n(1);
            return true;
        }
        let rest = &self.cur.rest()[1..];
        let closes = rest
            .bytes()
            .position(|b| b == c || b.is_ascii_whitespace())
            .is_some_and(|p| p > 0 && rest.as_bytes()[p] == c);
        if !closes {
            return false;
        }
        self.open(fmt, &(c as char).to_string());
        self.cur.bump_n(1);
        true
    }

    fn smart_quote(&mut self, c: u8) -> bool {
        let kind = if self.cur.starts_with(Quote::DOUBLE_OPEN) {
            self.open_double_quotes += 1;
            NodeKind::QuoteDoubleBegin
        } else if self.cur.starts_with(Quote::SINGLE_OPEN) {
            self.open_single_quotes += 1;
            NodeKind::QuoteSingleBegin
        } else if c == Marker::MONO
            && self.open_double_quotes > 0
            && self.cur.starts_with(Quote::DOUBLE_CLOSE)
        {
            self.open_double_quotes -= 1;
            NodeKind::QuoteDoubleEnd
        } else if c == Marker::MONO
            && self.open_single_quotes > 0
            && self.cur.starts_with(Quote::SINGLE_CLOSE)
        {
            self.open_single_quotes -= 1;
            NodeKind::QuoteSingleEnd
        } else {
            return false;
        };
        self.cur.bump_n(2);
        self.emit(kind);
        true
    }

    fn emphasis(&mut self, c: u8) -> bool {
        if !matches!(c, Marker::BOLD | Marker::ITALIC | Marker::MONO) {
            return false;
        }
        if self.cur.peek_at(1) == Some(c)
            && let Some(fmt) = FormatKind::from_marker(c, true)
        {
            if self.is_open(fmt) {
                self.terminate(fmt);
                self.cur.bump_n(2);
                return true;
            }
            let pair = [c, c];
            let rest = &self.cur.rest().as_bytes()[2..];
            if rest.windows(2).skip(1).any(|w| w == pair.as_slice()) {
                let marker = String::from_utf8_lossy(&pair).into_owned();
                self.open(fmt, &marker);
                self.cur.bump_n(2);
                return true;
            }
        }
        let Some(fmt) = FormatKind::from_marker(c, false) else {
            return false;
        };
        if self.is_open(fmt) && self.end_ok() {
            self.terminate(fmt);
            self.cur.bump_n(1);
            return true;
        }
        if self.begin_ok() && self.closer_ahead(c).is_some() {
            self.open(fmt, &(c as char).to_string());
            self.cur.bump_n(1);
            return true;
        }
        false
    }

    fn span_close(&mut self, c: u8) -> bool {
        if c != Marker::SPAN || !self.is_open(FormatKind::Span) {
            return false;
        }
        self.terminate(FormatKind::Span);
        self.cur.bump_n(1);
        true
    }

    fn bracket(&mut self, c: u8) -> bool {
        if c != b'[' {
            return false;
        }
        if self.cur.starts_with(Bracket::ANCHOR_OPEN) {
            return self.inline_anchor();
        }
        // `[#id.role]#text#` and `[.role]#text#`
        let rest = self.cur.rest();
        let Some(close) = rest.find(']') else {
            return false;
        };
        let inner = &rest[1..close];
        if !inner.starts_with(['#', '.'])
            || rest.as_bytes().get(close + 1) != Some(&Marker::SPAN)
            || !rest[close + 2..].contains('#')
        {
            return false;
        }
        let Some(sh) = parse_shorthand(inner) else {
            return false;
        };
        let opener = rest[..close + 2].to_string();
        let id = sh.id.map(|id| self.doc.register_anchor(&id, ""));
        self.cur.bump_n(close + 2);
        let n = self.open(FormatKind::Span, &opener);
        let node = &mut self.doc.tree[n];
        node.id = id;
        for r in &sh.roles {
            node.add_role(r);
        }
        true
    }

    fn inline_anchor(&mut self) -> bool {
        let rest = &self.cur.rest()[Bracket::ANCHOR_OPEN.len()..];
        let Some(close) = rest.find(Bracket::ANCHOR_CLOSE) else {
            return false;
        };
        let inner = &rest[..close];
        let (id, reftext) = match inner.split_once(',') {
            Some((id, label)) => (id.trim(), label.trim()),
            None => (inner.trim(), ""),
        };
        if !is_valid_id(id) {
            log::debug!("ignoring invalid inline anchor id {id:?}");
            return false;
        }
        let (id, reftext) = (id.to_string(), reftext.to_string());
        self.cur
            .bump_n(Bracket::ANCHOR_OPEN.len() + close + Bracket::ANCHOR_CLOSE.len());
        let registered = self.doc.register_anchor(&id, &reftext);
        let n = self.emit(NodeKind::InlineId);
        self.doc.tree[n].id = Some(registered);
        true
    }

    fn cross_reference(&mut self, c: u8) -> bool {
        if c != b'<' || !self.cur.starts_with(Bracket::XREF_OPEN) {
            return false;
        }
        let rest = &self.cur.rest()[Bracket::XREF_OPEN.len()..];
        let Some(close) = rest.find(Bracket::XREF_CLOSE) else {
            return false;
        };
        let inner = &rest[..close];
        let (target, label) = match inner.split_once(',') {
            Some((t, l)) => (t.trim(), l.trim()),
            None => (inner.trim(), ""),
        };
        if target.is_empty() || target.contains(['<', '\n']) {
            return false;
        }
        let (target, label) = (target.to_string(), label.to_string());
        self.cur
            .bump_n(Bracket::XREF_OPEN.len() + close + Bracket::XREF_CLOSE.len());
        let n = self.emit(NodeKind::CrossReference);
        self.doc.tree[n].attrs.insert("target".into(), target);
        if !label.is_empty() {
            parse_into(self.doc, n, &label, self.depth + 1);
        }
        true
    }

    /// `{name}` replaces the rest of the buffer with the value followed by
    /// the text after the reference.
    fn attribute_reference(&mut self, c: u8) -> bool {
        if c != Marker::ATTR_OPEN || self.rewrites >= MAX_REWRITES {
            return false;
        }
        let rest = self.cur.rest();
        let Some(close) = rest.find(Marker::ATTR_CLOSE as char) else {
            return false;
        };
        let name = &rest[1..close];
        if !is_valid_attr_name(name) {
            return false;
        }
        let Some(value) = self.doc.attributes.get(name).cloned() else {
            return false;
        };
        self.cur.rewrite(&value, close + 1);
        self.rewrites += 1;
        true
    }

    fn replacement(&mut self, c: u8) -> bool {
        if c == b'\''
            && self.cur.prev().is_some_and(|p| p.is_ascii_alphanumeric())
            && self.cur.peek_at(1).is_some_and(|n| n.is_ascii_alphanumeric())
        {
            self.cur.bump_n(1);
            self.doc.tree[self.current].raw.push(APOSTROPHE);
            return true;
        }
        if !matches!(c, b'(' | b'.' | b'-' | b'=' | b'<') {
            return false;
        }
        let Some((from, to)) = REPLACEMENTS
            .iter()
            .find(|(from, _)| self.cur.starts_with(from))
        else {
            return false;
        };
        if *from == "--" && !self.dash_ok() {
            return false;
        }
        self.cur.bump_n(from.len());
        self.push_str(to);
        true
    }

    /// `--` becomes an em dash between words or between spaces.
    fn dash_ok(&self) -> bool {
        let word = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_alphanumeric());
        let space = |b: Option<u8>| b.is_none_or(|b| b == b' ' || b == b'\n');
        let (prev, next) = (self.cur.prev(), self.cur.peek_at(2));
        (word(prev) && word(next)) || (space(prev) && space(next))
    }

    fn finish(&mut self) {
        while let Some((_, node)) = self.stack.pop() {
            let marker = self
                .openers
                .iter()
                .find(|(n, _)| *n == node)
                .map(|(_, m)| m.clone())
                .unwrap_or_default();
            self.unwrap_unclosed(node, &marker);
        }
        remove_empty_text(self.doc, self.container);
        if let Some(last) = last_leaf(self.doc, self.container)
            && self.doc.tree[last].kind == NodeKind::Text
        {
            let raw = &mut self.doc.tree[last].raw;
            let trimmed = raw.trim_end().len();
            raw.truncate(trimmed);
        }
        remove_empty_text(self.doc, self.container);
    }
}

impl InlineParser<'_> {
    /// Turns a format still open at the end into literal text: the opening
    /// marker goes back in front of its children, which take its place.
    ///
    /// Formats re-opened by `terminate` have no marker of their own.
    fn unwrap_unclosed(&mut self, node: NodeId, marker: &str) {
        let tree = &mut self.doc.tree;
        let Some(parent) = tree[node].parent else {
            return;
        };
        if !marker.is_empty() {
            let first = tree[node].child;
            match first {
                Some(first) if is_plain_leaf(&tree[first]) => {
                    tree[first].raw.insert_str(0, marker);
                }
                first => {
                    let leaf = tree.new_node(NodeKind::Text);
                    tree[leaf].raw = marker.to_string();
                    match first {
                        Some(first) => tree.insert_before(first, leaf),
                        None => tree.append_child(node, leaf),
                    }
                }
            }
        }
        let children: Vec<NodeId> = tree.children(node).collect();
        for c in children {
            tree.insert_before(node, c);
        }
        tree.detach(node);
        merge_text_runs(self.doc, parent);
    }
}

fn is_plain_leaf(n: &Node) -> bool {
    n.kind == NodeKind::Text && n.child.is_none() && n.emphasis.is_empty() && n.roles.is_empty()
}

/// Joins neighbouring plain text leaves under `id`.
fn merge_text_runs(doc: &mut Document, id: NodeId) {
    let children: Vec<NodeId> = doc.tree.children(id).collect();
    let mut prev: Option<NodeId> = None;
    for c in children {
        match prev {
            Some(p) if is_plain_leaf(&doc.tree[p]) && is_plain_leaf(&doc.tree[c]) => {
                let tail = std::mem::take(&mut doc.tree[c].raw);
                doc.tree[p].raw.push_str(&tail);
                doc.tree.detach(c);
            }
            _ => prev = Some(c),
        }
    }
}

/// Deepest last descendant of `id`, if it has any children.
fn last_leaf(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut n = doc.tree.last_child(id)?;
    while let Some(c) = doc.tree.last_child(n) {
        n = c;
    }
    Some(n)
}

/// Detaches text leaves left empty, and format nodes emptied by that.
fn remove_empty_text(doc: &mut Document, id: NodeId) {
    let children: Vec<NodeId> = doc.tree.children(id).collect();
    for c in children {
        remove_empty_text(doc, c);
        let n = &doc.tree[c];
        if n.kind == NodeKind::Text && n.raw.is_empty() && n.child.is_none() {
            doc.tree.detach(c);
        }
    }
}

/// Index of the `]` matching the `[` at `open`, honouring nesting and
/// backslash escapes.
fn find_bracket_end(s: &str, open: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
