use super::node::NodeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Middle => "middle",
            VAlign::Bottom => "bottom",
        }
    }
}

/// Content style letter of a column or cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellStyle {
    /// `a`: content is parsed as nested blocks.
    AsciiDoc,
    #[default]
    Default,
    Emphasis,
    Header,
    Literal,
    Monospace,
    Strong,
}

impl CellStyle {
    pub fn from_letter(c: u8) -> Option<Self> {
        match c {
            b'a' => Some(CellStyle::AsciiDoc),
            b'd' => Some(CellStyle::Default),
            b'e' => Some(CellStyle::Emphasis),
            b'h' => Some(CellStyle::Header),
            b'l' => Some(CellStyle::Literal),
            b'm' => Some(CellStyle::Monospace),
            b's' => Some(CellStyle::Strong),
            _ => None,
        }
    }
}

/// One column specifier from the `cols` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnFormat {
    pub halign: HAlign,
    pub valign: VAlign,
    /// Relative width, or a percentage when `is_percent`.
    pub width: u32,
    pub is_percent: bool,
    pub style: CellStyle,
}

impl Default for ColumnFormat {
    fn default() -> Self {
        Self {
            halign: HAlign::Left,
            valign: VAlign::Top,
            width: 1,
            is_percent: false,
            style: CellStyle::Default,
        }
    }
}

/// A table cell. Its content lives in the tree under `node`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub node: NodeId,
    pub colspan: usize,
    pub rowspan: usize,
    pub format: ColumnFormat,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// Table-specific data attached to a [`NodeKind::Table`](super::node::NodeKind::Table) node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub formats: Vec<ColumnFormat>,
    pub header: Option<Row>,
    pub rows: Vec<Row>,
    pub footer: Option<Row>,
    /// Column widths as formatted percentages, one per column.
    pub widths: Vec<String>,
}

impl Table {
    pub fn ncols(&self) -> usize {
        self.formats.len()
    }
}
