use sitecanvas_bundle::Project;
use sitecanvas_dom::Element;
use std::collections::BTreeMap;

/// Layout/typography/color properties exposed in ElementData snapshots
pub const STYLE_ALLOW_LIST: &[&str] = &[
    "display",
    "position",
    "top",
    "left",
    "right",
    "bottom",
    "width",
    "height",
    "margin",
    "padding",
    "color",
    "background-color",
    "font-size",
    "font-family",
    "font-weight",
    "line-height",
    "text-align",
    "border",
    "border-radius",
    "opacity",
    "z-index",
];

/// Parse a `style` attribute into ordered property pairs
pub fn parse_inline_style(source: &str) -> Vec<(String, String)> {
    source
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if property.is_empty() || value.is_empty() {
                None
            } else {
                Some((property, value))
            }
        })
        .collect()
}

pub fn write_inline_style(properties: &[(String, String)]) -> String {
    properties
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl PositionMode {
    pub fn from_value(value: &str) -> Self {
        match value {
            "relative" => PositionMode::Relative,
            "absolute" => PositionMode::Absolute,
            "fixed" => PositionMode::Fixed,
            "sticky" => PositionMode::Sticky,
            _ => PositionMode::Static,
        }
    }

    /// Only absolutely-positioned elements are draggable
    pub fn is_draggable(self) -> bool {
        matches!(self, PositionMode::Absolute | PositionMode::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Tag(String),
    Class(String),
    Id(String),
}

impl Selector {
    fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        if let Some(class) = source.strip_prefix('.') {
            Some(Selector::Class(class.to_string()))
        } else if let Some(id) = source.strip_prefix('#') {
            Some(Selector::Id(id.to_string()))
        } else if !source.is_empty()
            && source
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some(Selector::Tag(source.to_ascii_lowercase()))
        } else {
            // Combinators, pseudo-classes, attribute selectors: out of
            // scope for the approximation
            None
        }
    }

    fn specificity(&self) -> u32 {
        match self {
            Selector::Tag(_) => 1,
            Selector::Class(_) => 10,
            Selector::Id(_) => 100,
        }
    }

    fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.tag == *tag,
            Selector::Class(class) => element
                .attr("class")
                .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
                .unwrap_or(false),
            Selector::Id(id) => element.attr("id") == Some(id),
        }
    }
}

#[derive(Debug, Clone)]
struct StyleRule {
    selector: Selector,
    properties: Vec<(String, String)>,
    order: usize,
}

/// Approximate computed styles from the project's stylesheets.
///
/// The browser host owns real computed styles; engine-side resolution is
/// a small cascade (tag defaults, then simple-selector rules in
/// specificity and source order, then the inline `style` attribute)
/// filtered to the allow-list. Enough to drive the properties panel and
/// position-mode checks in tests.
#[derive(Debug, Default)]
pub struct StyleResolver {
    rules: Vec<StyleRule>,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_project(project: &Project) -> Self {
        let mut resolver = Self::new();
        for file in project.css_files() {
            if let Some(css) = file.as_text() {
                resolver.add_stylesheet(css);
            }
        }
        resolver
    }

    pub fn add_stylesheet(&mut self, css: &str) {
        let css = strip_comments(css);
        let mut rest = css.as_str();
        while let Some(open) = rest.find('{') {
            let selectors = &rest[..open];
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            let body = &rest[open + 1..open + close];
            let properties = parse_inline_style(body);
            for part in selectors.split(',') {
                if let Some(selector) = Selector::parse(part) {
                    let order = self.rules.len();
                    self.rules.push(StyleRule {
                        selector,
                        properties: properties.clone(),
                        order,
                    });
                }
            }
            rest = &rest[open + close + 1..];
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Computed-style approximation for one element, allow-list filtered
    /// and overlaid with its inline styles
    pub fn resolve(&self, element: &Element) -> BTreeMap<String, String> {
        let mut styles = default_styles(&element.tag);

        let mut matching: Vec<&StyleRule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(element))
            .collect();
        matching.sort_by_key(|rule| (rule.selector.specificity(), rule.order));
        for rule in matching {
            for (property, value) in &rule.properties {
                if STYLE_ALLOW_LIST.contains(&property.as_str()) {
                    styles.insert(property.clone(), value.clone());
                }
            }
        }

        // Inline styles are explicit author intent: overlaid last and
        // kept even off the allow-list
        if let Some(inline) = element.attr("style") {
            for (property, value) in parse_inline_style(inline) {
                styles.insert(property, value);
            }
        }

        styles
    }

    pub fn position_mode(&self, element: &Element) -> PositionMode {
        self.resolve(element)
            .get("position")
            .map(|value| PositionMode::from_value(value))
            .unwrap_or(PositionMode::Static)
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start..].find("*/") {
            Some(end) => rest = &rest[start + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn default_styles(tag: &str) -> BTreeMap<String, String> {
    let mut styles = BTreeMap::new();
    let display = match tag {
        "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "li" | "form"
        | "section" | "article" | "header" | "footer" | "main" | "nav" | "aside" | "body"
        | "html" | "figure" | "blockquote" => "block",
        "span" | "a" | "b" | "i" | "em" | "strong" | "label" | "small" | "code" => "inline",
        "img" | "button" | "input" | "select" | "textarea" => "inline-block",
        _ => "inline",
    };
    styles.insert("display".to_string(), display.to_string());
    styles.insert("position".to_string(), "static".to_string());
    styles
}
