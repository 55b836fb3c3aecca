use std::sync::OnceLock;

use regex::Regex;

use crate::models::{CellStyle, ColumnFormat, HAlign, VAlign};

fn column_regex() -> &'static Regex {
    static COLUMN_REGEX: OnceLock<Regex> = OnceLock::new();
    COLUMN_REGEX.get_or_init(|| {
        Regex::new(r"^(?:(\d+)\*)?([<^>])?(?:\.([<^>]))?(\d+%?|~)?([adehlms])?$")
            .expect("Invalid column format regex")
    })
}

fn cell_spec_regex() -> &'static Regex {
    static CELL_SPEC_REGEX: OnceLock<Regex> = OnceLock::new();
    CELL_SPEC_REGEX.get_or_init(|| {
        Regex::new(r"^(?:(\d+)\*)?(?:(\d+)?(?:\.(\d+))?\+)?([<^>])?(?:\.([<^>]))?([adehlms])?$")
            .expect("Invalid cell spec regex")
    })
}

/// Prefix written right before a cell's `|`: `3*`, `2+`, `.2+`, `2.3+`,
/// alignment and style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpec {
    /// Number of copies of the cell (`N*`).
    pub dup: usize,
    pub colspan: usize,
    pub rowspan: usize,
    pub halign: Option<HAlign>,
    pub valign: Option<VAlign>,
    pub style: Option<CellStyle>,
}

impl Default for CellSpec {
    fn default() -> Self {
        Self {
            dup: 1,
            colspan: 1,
            rowspan: 1,
            halign: None,
            valign: None,
            style: None,
        }
    }
}

impl CellSpec {
    /// The column format with this cell's overrides applied.
    pub fn apply(&self, base: ColumnFormat) -> ColumnFormat {
        ColumnFormat {
            halign: self.halign.unwrap_or(base.halign),
            valign: self.valign.unwrap_or(base.valign),
            style: self.style.unwrap_or(base.style),
            ..base
        }
    }

    /// Columns taken by all copies of the cell.
    pub fn width(&self) -> usize {
        self.dup * self.colspan
    }
}

fn halign(c: &str) -> HAlign {
    match c {
        "^" => HAlign::Center,
        ">" => HAlign::Right,
        _ => HAlign::Left,
    }
}

fn valign(c: &str) -> VAlign {
    match c {
        "^" => VAlign::Middle,
        ">" => VAlign::Bottom,
        _ => VAlign::Top,
    }
}

fn number(m: Option<regex::Match<'_>>) -> Option<usize> {
    m.and_then(|m| m.as_str().parse().ok())
}

fn style(m: Option<regex::Match<'_>>) -> Option<CellStyle> {
    m.and_then(|m| CellStyle::from_letter(m.as_str().as_bytes()[0]))
}

/// Parses a cell spec. Empty input and a bare `+` are not specs.
pub fn parse_cell_spec(s: &str) -> Option<CellSpec> {
    if s.is_empty() {
        return None;
    }
    let caps = cell_spec_regex().captures(s)?;
    let (colspan, rowspan) = (number(caps.get(2)), number(caps.get(3)));
    if s.contains('+') && colspan.is_none() && rowspan.is_none() {
        return None;
    }
    Some(CellSpec {
        dup: number(caps.get(1)).unwrap_or(1).max(1),
        colspan: colspan.unwrap_or(1).max(1),
        rowspan: rowspan.unwrap_or(1).max(1),
        halign: caps.get(4).map(|m| halign(m.as_str())),
        valign: caps.get(5).map(|m| valign(m.as_str())),
        style: style(caps.get(6)),
    })
}

/// Upper bound on the columns a `cols` attribute can declare.
pub const MAX_COLUMNS: usize = 1024;

/// Parses the `cols` attribute: a column count, or comma/semicolon
/// separated specs such as `2*>.^1`, `3a`, `25%`, `~`.
pub fn parse_cols(s: &str) -> Vec<ColumnFormat> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        return vec![ColumnFormat::default(); n.clamp(1, MAX_COLUMNS)];
    }
    let mut out = vec![];
    for part in s.split([',', ';']).map(str::trim) {
        if out.len() >= MAX_COLUMNS {
            break;
        }
        let Some(caps) = column_regex().captures(part) else {
            out.push(ColumnFormat::default());
            continue;
        };
        let (width, is_percent) = match caps.get(4).map(|m| m.as_str()) {
            Some(w) if w.ends_with('%') => (w.trim_end_matches('%').parse().unwrap_or(1), true),
            Some("~") | None => (1, false),
            Some(w) => (w.parse().unwrap_or(1), false),
        };
        let format = ColumnFormat {
            halign: caps.get(2).map_or(HAlign::Left, |m| halign(m.as_str())),
            valign: caps.get(3).map_or(VAlign::Top, |m| valign(m.as_str())),
            width,
            is_percent,
            style: style(caps.get(5)).unwrap_or_default(),
        };
        let dup = number(caps.get(1)).unwrap_or(1).max(1);
        let room = MAX_COLUMNS.saturating_sub(out.len());
        out.extend(std::iter::repeat_n(format, dup.min(room)));
    }
    if out.is_empty() {
        out.push(ColumnFormat::default());
    }
    out
}

/// Column widths as percentages of the summed relative widths, printed
/// with `precision` decimals and trailing zeros removed.
pub fn column_widths(formats: &[ColumnFormat], precision: usize) -> Vec<String> {
    let total = formats.iter().map(|f| f.width).sum::<u32>().max(1);
    formats
        .iter()
        .map(|f| format_width(f64::from(f.width) * 100.0 / f64::from(total), precision))
        .collect()
}

fn format_width(v: f64, precision: usize) -> String {
    let s = format!("{v:.precision$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("3", 3)]
    #[case("1,2", 2)]
    #[case("3*", 3)]
    #[case("2*,1", 3)]
    #[case("1;1;1;1", 4)]
    #[case("", 1)]
    #[case("99999999", MAX_COLUMNS)]
    #[case("99999999*,1", MAX_COLUMNS)]
    fn column_counts(#[case] cols: &str, #[case] expected: usize) {
        assert_eq!(parse_cols(cols).len(), expected);
    }

    #[test]
    fn column_spec_parts() {
        let cols = parse_cols(">.^2a, 30%, ~");
        assert_eq!(cols[0].halign, HAlign::Right);
        assert_eq!(cols[0].valign, VAlign::Middle);
        assert_eq!(cols[0].width, 2);
        assert_eq!(cols[0].style, CellStyle::AsciiDoc);
        assert!(cols[1].is_percent);
        assert_eq!(cols[1].width, 30);
        assert_eq!(cols[2].width, 1);
    }

    #[rstest]
    #[case("2+", 1, 2, 1)]
    #[case(".3+", 1, 1, 3)]
    #[case("2.3+", 1, 2, 3)]
    #[case("3*", 3, 1, 1)]
    fn cell_spans(
        #[case] spec: &str,
        #[case] dup: usize,
        #[case] colspan: usize,
        #[case] rowspan: usize,
    ) {
        let got = parse_cell_spec(spec).unwrap();
        assert_eq!((got.dup, got.colspan, got.rowspan), (dup, colspan, rowspan));
    }

    #[rstest]
    #[case("")]
    #[case("+")]
    #[case("word")]
    #[case("2")]
    fn not_cell_specs(#[case] spec: &str) {
        assert_eq!(parse_cell_spec(spec), None);
    }

    #[test]
    fn cell_spec_alignment_and_style() {
        let got = parse_cell_spec("^.>s").unwrap();
        assert_eq!(got.halign, Some(HAlign::Center));
        assert_eq!(got.valign, Some(VAlign::Bottom));
        assert_eq!(got.style, Some(CellStyle::Strong));
    }

    #[test]
    fn widths_are_normalised() {
        assert_eq!(column_widths(&parse_cols("1,1,1"), 4), vec!["33.3333"; 3]);
        assert_eq!(column_widths(&parse_cols("1,3"), 4), vec!["25", "75"]);
        assert_eq!(column_widths(&parse_cols("1,2"), 1), vec!["33.3", "66.7"]);
    }
}
