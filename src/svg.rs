//! An owned SVG element tree.
//!
//! Symbols are drawn into this tree rather than into markup strings so the
//! post-processor can look elements up, rewrite attributes and replace
//! shapes before anything is serialized.

use std::fmt;

use anyhow::{Context, bail};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Sets an attribute, replacing the existing value in place so the
    /// attribute order of the serialized markup stays stable.
    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Reads a numeric attribute the way `parseFloat` would: the longest
    /// leading number, exponent included, with any trailing unit such as
    /// `px` ignored.
    pub fn number_attr(&self, key: &str) -> Option<f64> {
        let value = self.attr(key)?.trim();
        let bytes = value.as_bytes();
        let skip_digits = |from: usize| {
            bytes[from..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |n| from + n)
        };

        let sign = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
        let mut end = skip_digits(sign);
        if bytes.get(end) == Some(&b'.') {
            end = skip_digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'-' | b'+')) {
                exponent += 1;
            }
            let exponent_end = skip_digits(exponent);
            if exponent_end > exponent {
                end = exponent_end;
            }
        }

        value[..end].parse().ok()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn prepend(&mut self, child: Element) {
        self.children.insert(0, child);
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Depth-first search for the first element carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    pub fn find_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_class_mut(class))
    }

    /// Serializes the tree as a standalone SVG file.
    pub fn to_document(&self) -> String {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{self}")
    }

    /// Geometric bounds of a shape element, ignoring transforms and strokes.
    pub fn bbox(&self) -> anyhow::Result<BBox> {
        match self.name.as_str() {
            "rect" | "image" => Ok(BBox {
                x: self.number_attr("x").unwrap_or(0.0),
                y: self.number_attr("y").unwrap_or(0.0),
                width: self.number_attr("width").context("rect has no width")?,
                height: self.number_attr("height").context("rect has no height")?,
            }),
            "circle" => {
                let r = self.number_attr("r").context("circle has no radius")?;
                Ok(BBox {
                    x: self.number_attr("cx").unwrap_or(0.0) - r,
                    y: self.number_attr("cy").unwrap_or(0.0) - r,
                    width: 2.0 * r,
                    height: 2.0 * r,
                })
            }
            "ellipse" => {
                let rx = self.number_attr("rx").context("ellipse has no rx")?;
                let ry = self.number_attr("ry").context("ellipse has no ry")?;
                Ok(BBox {
                    x: self.number_attr("cx").unwrap_or(0.0) - rx,
                    y: self.number_attr("cy").unwrap_or(0.0) - ry,
                    width: 2.0 * rx,
                    height: 2.0 * ry,
                })
            }
            "path" => {
                let d = self.attr("d").context("path has no data")?;
                BBox::enclosing(&path_points(d)?).context("path has no points")
            }
            other => bail!("<{other}> has no measurable geometry"),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(
                f,
                " {}=\"{}\"",
                key,
                html_escape::encode_double_quoted_attribute(value)
            )?;
        }

        if self.children.is_empty() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn enclosing(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        Some(BBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn tokenize_path(d: &str) -> anyhow::Result<Vec<PathToken>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = d.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(PathToken::Command(c));
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < chars.len() {
                let n = chars[i];
                let after_exponent = matches!(chars[i - 1], 'e' | 'E');
                if n.is_ascii_digit() || n == '.' || n == 'e' || n == 'E' {
                    i += 1;
                } else if (n == '-' || n == '+') && after_exponent {
                    i += 1;
                } else {
                    break;
                }
            }

            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<f64>()
                .with_context(|| format!("Invalid number {literal:?} in path data"))?;
            tokens.push(PathToken::Number(value));
        }
    }

    Ok(tokens)
}

fn take_numbers<const N: usize>(
    tokens: &mut std::iter::Peekable<std::vec::IntoIter<PathToken>>,
    command: char,
) -> anyhow::Result<[f64; N]> {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        match tokens.next() {
            Some(PathToken::Number(n)) => *value = n,
            _ => bail!("Missing argument for path command '{command}'"),
        }
    }
    Ok(values)
}

// Collects every point a path passes through or pulls towards: endpoints
// plus Bézier control points. Arcs only contribute their endpoints.
fn path_points(d: &str) -> anyhow::Result<Vec<(f64, f64)>> {
    let mut tokens = tokenize_path(d)?.into_iter().peekable();
    let mut points = Vec::new();
    let mut cursor = (0.0, 0.0);
    let mut subpath_start = (0.0, 0.0);
    let mut command: Option<char> = None;

    while let Some(token) = tokens.peek().copied() {
        if let PathToken::Command(c) = token {
            tokens.next();
            command = Some(c);
            if c == 'Z' {
                cursor = subpath_start;
                if matches!(tokens.peek(), Some(PathToken::Number(_))) {
                    bail!("Unexpected number after closepath");
                }
                continue;
            }
        }

        let c = command.context("Path data must start with a command")?;
        match c {
            'M' => {
                let [x, y] = take_numbers(&mut tokens, c)?;
                cursor = (x, y);
                subpath_start = cursor;
                points.push(cursor);
                // Extra coordinate pairs after a moveto are implicit linetos.
                command = Some('L');
            }
            'L' | 'T' => {
                let [x, y] = take_numbers(&mut tokens, c)?;
                cursor = (x, y);
                points.push(cursor);
            }
            'H' => {
                let [x] = take_numbers(&mut tokens, c)?;
                cursor.0 = x;
                points.push(cursor);
            }
            'V' => {
                let [y] = take_numbers(&mut tokens, c)?;
                cursor.1 = y;
                points.push(cursor);
            }
            'Q' | 'S' => {
                let [x1, y1, x, y] = take_numbers(&mut tokens, c)?;
                points.push((x1, y1));
                cursor = (x, y);
                points.push(cursor);
            }
            'C' => {
                let [x1, y1, x2, y2, x, y] = take_numbers(&mut tokens, c)?;
                points.push((x1, y1));
                points.push((x2, y2));
                cursor = (x, y);
                points.push(cursor);
            }
            'A' => {
                let [_, _, _, _, _, x, y] = take_numbers(&mut tokens, c)?;
                cursor = (x, y);
                points.push(cursor);
            }
            c if c.is_ascii_lowercase() => {
                bail!("Relative path command '{c}' cannot be measured")
            }
            c => bail!("Unknown path command '{c}'"),
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, width: f64, height: f64) -> Element {
        Element::new("rect")
            .with_attr("x", x)
            .with_attr("y", y)
            .with_attr("width", width)
            .with_attr("height", height)
    }

    fn bbox(x: f64, y: f64, width: f64, height: f64) -> BBox {
        BBox {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_serialize_nested() {
        let group = Element::new("g").with_child(Element::new("rect").with_attr("x", 1.5));
        let svg = Element::new("svg")
            .with_attr("width", 100)
            .with_child(group);

        let expected = r#"<svg width="100"><g><rect x="1.5"/></g></svg>"#;
        assert_eq!(svg.to_string(), expected);
    }

    #[test]
    fn test_serialize_escapes_attributes() {
        let image = Element::new("image").with_attr("href", r#"a.png?x=1&y="2""#);
        assert_eq!(
            image.to_string(),
            r#"<image href="a.png?x=1&amp;y=&quot;2&quot;"/>"#
        );
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut rect = Element::new("rect")
            .with_attr("fill", "#000")
            .with_attr("x", 0);
        rect.set_attr("fill", "url(#grad)");
        assert_eq!(rect.to_string(), r#"<rect fill="url(#grad)" x="0"/>"#);
    }

    #[test]
    fn test_number_attr_ignores_units() {
        let svg = Element::new("svg")
            .with_attr("width", "360px")
            .with_attr("height", "abc");
        assert_eq!(svg.number_attr("width"), Some(360.0));
        assert_eq!(svg.number_attr("height"), None);
        assert_eq!(svg.number_attr("missing"), None);
    }

    #[test]
    fn test_number_attr_exponent() {
        let rect = Element::new("rect")
            .with_attr("x", "1e3")
            .with_attr("y", "2.5E-1px")
            .with_attr("width", "4e")
            .with_attr("height", "-.5e+1");
        assert_eq!(rect.number_attr("x"), Some(1000.0));
        assert_eq!(rect.number_attr("y"), Some(0.25));
        assert_eq!(rect.number_attr("width"), Some(4.0));
        assert_eq!(rect.number_attr("height"), Some(-5.0));
    }

    #[test]
    fn test_find_class() {
        let dots = Element::new("g")
            .with_attr("class", "outer qrbloom__dots")
            .with_child(Element::new("rect"));
        let mut svg = Element::new("svg").with_child(dots);

        assert!(svg.find_class("qrbloom__dots").is_some());
        assert!(svg.find_class("qrbloom__corners").is_none());

        let dots = svg.find_class_mut("qrbloom__dots").unwrap();
        dots.push(Element::new("circle"));
        let dots = svg.find_class("qrbloom__dots").unwrap();
        assert_eq!(dots.children().len(), 2);
    }

    #[test]
    fn test_rect_bbox() {
        let rect = rect(10.0, 20.0, 8.0, 6.0);
        assert_eq!(rect.bbox().unwrap(), bbox(10.0, 20.0, 8.0, 6.0));
    }

    #[test]
    fn test_circle_bbox() {
        let circle = Element::new("circle")
            .with_attr("cx", 5)
            .with_attr("cy", 5)
            .with_attr("r", 2);
        let bounds = circle.bbox().unwrap();
        assert_eq!(bounds, bbox(3.0, 3.0, 4.0, 4.0));
        assert_eq!(bounds.center(), (5.0, 5.0));
    }

    #[test]
    fn test_path_bbox() {
        let d = "M 0 5 A 5 5 0 0 1 5,0 H 10 V 5 A 5 5 0 0 1 5 10 H 0 Z";
        let path = Element::new("path").with_attr("d", d);
        assert_eq!(path.bbox().unwrap(), bbox(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_path_bbox_implicit_lineto_and_exponent() {
        let path = Element::new("path").with_attr("d", "M1e1 2 3 -4.5 Q 0 0 2 2Z");
        let bounds = path.bbox().unwrap();
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, -4.5);
        assert_eq!(bounds.width, 10.0);
    }

    #[test]
    fn test_unmeasurable_shapes() {
        let path = |d: &str| Element::new("path").with_attr("d", d);
        assert!(path("m 0 0 l 1 1").bbox().is_err());
        assert!(path("M 0").bbox().is_err());
        assert!(Element::new("path").bbox().is_err());
        assert!(Element::new("rect").with_attr("width", 1).bbox().is_err());
        assert!(Element::new("g").bbox().is_err());
    }
}
