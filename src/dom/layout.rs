//! Block-flow geometry estimate for a static page.
//!
//! There is no real rendering engine here: content blocks are stacked
//! vertically with fixed heading heights and a line-count estimate for text,
//! which is enough to drive the scroll spy offline. An inline
//! `style="height: …px"` pins a block to an exact height.

use std::collections::HashMap;

use cssparser::{Parser, ParserInput, Token};

use super::arena::{NodeData, NodeId, PageDom};

pub const LINE_HEIGHT: f64 = 24.0;
pub const CHARS_PER_LINE: usize = 80;

/// Elements that never take up space.
const HIDDEN: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "noscript",
];

/// Elements whose text flows into the surrounding block.
const INLINE: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "em", "i", "img", "kbd", "mark", "q", "s", "small",
    "span", "strong", "sub", "sup", "time", "u", "var",
];

fn heading_height(tag: &str) -> Option<f64> {
    match tag {
        "h1" => Some(48.0),
        "h2" => Some(40.0),
        "h3" => Some(32.0),
        "h4" | "h5" | "h6" => Some(28.0),
        _ => None,
    }
}

/// Height of `text` in wrapped lines, zero for whitespace-only text.
pub fn text_height(text: &str) -> f64 {
    let chars = text.split_whitespace().map(|w| w.chars().count() + 1).sum::<usize>();
    if chars == 0 {
        return 0.0;
    }
    (chars - 1).div_ceil(CHARS_PER_LINE).max(1) as f64 * LINE_HEIGHT
}

/// Parse the `height` declaration of an inline style, in pixels.
pub fn inline_height(style: &str) -> Option<f64> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("height") {
            return None;
        }
        let mut input = ParserInput::new(value);
        let mut parser = Parser::new(&mut input);
        match parser.next().ok()? {
            Token::Dimension { value, unit, .. } if unit.eq_ignore_ascii_case("px") && *value >= 0.0 => {
                Some(*value as f64)
            }
            Token::Number { value, .. } if *value == 0.0 => Some(0.0),
            _ => None,
        }
    })
}

/// Page offsets and heights of laid-out elements.
#[derive(Debug, Default, Clone)]
pub struct PageLayout {
    boxes: HashMap<NodeId, (f64, f64)>,
    height: f64,
}

impl PageLayout {
    /// Lay out every element of `dom`, skipping the subtree rooted at `excluded`.
    pub fn compute(dom: &PageDom, excluded: Option<NodeId>) -> Self {
        let mut layout = Self::default();
        let mut flow = Flow {
            dom,
            excluded,
            layout: &mut layout,
        };
        let mut y = 0.0;
        for child in dom.children(dom.document()) {
            y = flow.block(child, y);
        }
        layout.height = y;
        layout
    }

    pub fn offset(&self, node: NodeId) -> Option<f64> {
        self.boxes.get(&node).map(|&(top, _)| top)
    }

    pub fn height_of(&self, node: NodeId) -> Option<f64> {
        self.boxes.get(&node).map(|&(_, height)| height)
    }

    /// Total document height.
    pub fn document_height(&self) -> f64 {
        self.height
    }
}

struct Flow<'a> {
    dom: &'a PageDom,
    excluded: Option<NodeId>,
    layout: &'a mut PageLayout,
}

impl Flow<'_> {
    /// Place `node` as a block starting at `y`, returning the y after it.
    fn block(&mut self, node: NodeId, y: f64) -> f64 {
        let Some(tag) = self.dom.element_name(node).map(|n| n.to_string()) else {
            return y;
        };
        if Some(node) == self.excluded || HIDDEN.contains(&tag.as_str()) {
            return y;
        }

        let end = if let Some(height) = heading_height(&tag) {
            self.inline_run(node, y);
            y + height
        } else {
            let text: String = self
                .dom
                .children(node)
                .filter(|&child| self.is_inline_or_text(child))
                .map(|child| self.run_text(child))
                .collect();
            let mut cursor = y + text_height(&text);
            for child in self.dom.children(node).collect::<Vec<_>>() {
                if self.is_inline_or_text(child) {
                    self.inline_run(child, y);
                } else {
                    cursor = self.block(child, cursor);
                }
            }
            cursor
        };

        let end = self
            .dom
            .attr(node, "style")
            .and_then(|style| inline_height(&style))
            .map_or(end, |height| y + height);
        self.layout.boxes.insert(node, (y, end - y));
        end
    }

    fn run_text(&self, node: NodeId) -> String {
        match self.dom.get(node).map(|n| &n.data) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Element { .. }) => self.dom.text_content(node),
            _ => String::new(),
        }
    }

    fn is_inline_or_text(&self, node: NodeId) -> bool {
        match self.dom.element_name(node) {
            Some(name) => INLINE.contains(&name.as_ref()),
            None => true,
        }
    }

    /// Give `node` and all its element descendants the offset `y`.
    fn inline_run(&mut self, node: NodeId, y: f64) {
        if self.dom.is_element(node) {
            self.layout.boxes.insert(node, (y, 0.0));
        }
        for descendant in self.dom.descendants(node).collect::<Vec<_>>() {
            if self.dom.is_element(descendant) {
                self.layout.boxes.insert(descendant, (y, 0.0));
            }
        }
    }
}
