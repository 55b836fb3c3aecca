use std::collections::BTreeMap;

use crate::models::{AdmonitionKind, BlockStyle, NodeId, NodeKind};
use crate::parsing::{
    attrs::{parse_attrlist, parse_shorthand},
    classify::LineKind,
    inline::parse_inline,
    kinds::is_valid_id,
};

use super::Parser;

/// Block metadata collected from the lines above a block: `.Title`,
/// `[[id]]`, `[#id.role%option]`, `[style, positional, key=value]`.
///
/// Applied to, and cleared by, the next block the parser creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub id: Option<String>,
    pub reftext: Option<String>,
    pub title: Option<String>,
    /// First positional attribute, e.g. `source`, `NOTE`, `quote`.
    pub style: Option<String>,
    pub roles: Vec<String>,
    pub options: Vec<String>,
    /// Named attributes plus positional ones under `"2"`, `"3"`, ...
    pub attrs: BTreeMap<String, String>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        *self == Meta::default()
    }

    pub fn block_style(&self) -> Option<BlockStyle> {
        self.style.as_deref().and_then(BlockStyle::from_name)
    }

    pub fn admonition(&self) -> Option<AdmonitionKind> {
        self.style.as_deref().and_then(AdmonitionKind::from_marker)
    }

    pub fn is_discrete(&self) -> bool {
        self.block_style() == Some(BlockStyle::Discrete)
    }

    pub fn positional(&self, n: usize) -> Option<&str> {
        self.attrs.get(&n.to_string()).map(String::as_str)
    }

    /// Merges an attribute list line. Returns false when the list is
    /// malformed; the caller then treats the line as text.
    pub fn merge_attrlist(&mut self, inner: &str) -> bool {
        let Some(list) = parse_attrlist(inner) else {
            return false;
        };
        for (n, value) in list.positional.iter().enumerate() {
            if n == 0 {
                let Some(sh) = parse_shorthand(value) else {
                    return false;
                };
                if let Some(style) = sh.style.filter(|s| !s.is_empty()) {
                    self.style = Some(style);
                }
                if sh.id.is_some() {
                    self.id = sh.id;
                }
                self.roles.extend(sh.roles);
                self.options.extend(sh.options);
            } else if !value.is_empty() {
                self.attrs.insert((n + 1).to_string(), value.clone());
            }
        }
        for (key, value) in list.named {
            match key.as_str() {
                "id" if is_valid_id(&value) => self.id = Some(value),
                "role" => self
                    .roles
                    .extend(value.split_whitespace().map(str::to_string)),
                "options" | "opts" => self.options.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                ),
                "title" => self.title = Some(value),
                "reftext" => self.reftext = Some(value),
                _ => {
                    self.attrs.insert(key, value);
                }
            }
        }
        true
    }
}

impl Parser<'_> {
    /// Records a metadata line. Returns false when the line is malformed.
    pub(crate) fn meta_line(&mut self, kind: LineKind, content: &str) -> bool {
        match kind {
            LineKind::BlockTitle => {
                self.meta.title = Some(content[1..].to_string());
                true
            }
            LineKind::ListingNamed => {
                self.meta.style = Some("listing".into());
                true
            }
            LineKind::LiteralNamed => {
                self.meta.style = Some("literal".into());
                true
            }
            LineKind::InlineId => {
                let inner = &content[2..content.len() - 2];
                let (id, reftext) = match inner.split_once(',') {
                    Some((id, r)) => (id.trim(), Some(r.trim().to_string())),
                    None => (inner.trim(), None),
                };
                if !is_valid_id(id) {
                    log::warn!("invalid block id {id:?}; keeping the line as text");
                    return false;
                }
                self.meta.id = Some(id.to_string());
                if reftext.is_some() {
                    self.meta.reftext = reftext;
                }
                true
            }
            LineKind::InlineIdShort | LineKind::StyleClass | LineKind::AttributeElement => {
                let inner = &content[1..content.len() - 1];
                let mut next = self.meta.clone();
                if !next.merge_attrlist(inner) {
                    return false;
                }
                self.meta = next;
                true
            }
            _ => false,
        }
    }

    /// Applies and clears the pending metadata on a freshly created block.
    ///
    /// The id is registered with the block title (or reftext) as label.
    pub(crate) fn apply_meta(&mut self, node: NodeId) {
        let meta = std::mem::take(&mut self.meta);
        if let Some(title) = &meta.title {
            let holder = self.doc.tree.new_node(NodeKind::Text);
            self.doc.tree[holder].raw = title.clone();
            parse_inline(self.doc, holder);
            self.doc.tree[node].title = Some(holder);
        }
        if let Some(id) = &meta.id {
            let label = meta
                .reftext
                .clone()
                .or_else(|| {
                    self.doc.tree[node]
                        .title
                        .map(|t| self.doc.plain_text(t))
                })
                .unwrap_or_default();
            let id = self.doc.register_anchor(id, &label);
            self.doc.tree[node].id = Some(id);
        }

        let style = meta.block_style();
        let admonition = meta.admonition();
        let n = &mut self.doc.tree[node];
        for r in &meta.roles {
            n.add_role(r);
        }
        for o in &meta.options {
            n.add_option(o);
        }
        n.style = style;
        n.attrs.extend(meta.attrs.clone());
        match style {
            Some(BlockStyle::Source) => {
                let lang = meta
                    .positional(2)
                    .or_else(|| meta.attrs.get("language").map(String::as_str));
                if let Some(lang) = lang {
                    n.attrs.insert("language".into(), lang.to_string());
                }
            }
            Some(BlockStyle::Quote | BlockStyle::Verse) => {
                if let Some(a) = meta.positional(2) {
                    n.attrs.insert("attribution".into(), a.to_string());
                }
                if let Some(c) = meta.positional(3) {
                    n.attrs.insert("citetitle".into(), c.to_string());
                }
            }
            _ => {}
        }
        if let Some(kind) = admonition {
            self.set_admonition(node, kind);
        }
    }

    /// Marks a block as an admonition: flag, role and a label sub-tree.
    pub(crate) fn set_admonition(&mut self, node: NodeId, kind: AdmonitionKind) {
        let label = self.doc.tree.new_node(NodeKind::Text);
        self.doc.tree[label].raw = kind.label().to_string();
        let n = &mut self.doc.tree[node];
        n.admonition = Some(kind);
        n.add_role(kind.role());
        n.label = Some(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merges_style_positionals_and_named() {
        let mut m = Meta::default();
        assert!(m.merge_attrlist("source#main.lead%linenums, rust, title=\"Code\""));
        assert_eq!(m.style.as_deref(), Some("source"));
        assert_eq!(m.id.as_deref(), Some("main"));
        assert_eq!(m.roles, vec!["lead"]);
        assert_eq!(m.options, vec!["linenums"]);
        assert_eq!(m.positional(2), Some("rust"));
        assert_eq!(m.title.as_deref(), Some("Code"));
        assert_eq!(m.block_style(), Some(BlockStyle::Source));
    }

    #[test]
    fn named_role_and_options() {
        let mut m = Meta::default();
        assert!(m.merge_attrlist("role=\"a b\", options=\"header,footer\", cols=\"1,2\""));
        assert_eq!(m.roles, vec!["a", "b"]);
        assert_eq!(m.options, vec!["header", "footer"]);
        assert_eq!(m.attrs.get("cols").map(String::as_str), Some("1,2"));
    }

    #[test]
    fn admonition_style() {
        let mut m = Meta::default();
        assert!(m.merge_attrlist("WARNING"));
        assert_eq!(m.admonition(), Some(AdmonitionKind::Warning));
        assert_eq!(m.block_style(), None);
    }

    #[test]
    fn malformed_list_is_rejected() {
        let mut m = Meta::default();
        assert!(!m.merge_attrlist("title=\"open"));
        assert!(!m.merge_attrlist("#9bad"));
    }
}
