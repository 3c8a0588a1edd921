//! Badge rendering
//!
//! A badge has three segments: the dataset title, its download count and
//! its DOI. Segment widths are estimated from the character count at an
//! 11px font size.

use serde::{Deserialize, Serialize};

pub const BADGE_HEIGHT: u32 = 20;
pub const FONT_SIZE: u32 = 11;
pub const FONT_FAMILY: &str = "Verdana,Geneva,sans-serif";
pub const SEGMENT_PADDING: u32 = 10;
pub const MIN_SEGMENT_WIDTH: u32 = 40;

pub const TITLE_COLOR: &str = "#555";
pub const DOWNLOADS_COLOR: &str = "#4c1";
pub const DOI_COLOR: &str = "#007ec6";

pub const NO_DOI: &str = "No DOI";

/// What a badge shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeData {
    pub dataset_id: i64,
    pub title: String,
    pub downloads: i64,
    pub doi: Option<String>,
    /// Link target, the DOI landing page when published
    pub url: Option<String>,
}

impl BadgeData {
    pub fn doi_label(&self) -> &str {
        self.doi.as_deref().unwrap_or(NO_DOI)
    }

    fn alt_text(&self) -> String {
        format!(
            "{} - {} DL - DOI {}",
            self.title,
            self.downloads,
            self.doi_label()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    width: u32,
    color: &'static str,
    text: String,
}

impl Segment {
    fn new(text: impl Into<String>, color: &'static str) -> Self {
        let text = text.into();
        Self {
            width: segment_width(&text),
            color,
            text,
        }
    }
}

/// `max(40, floor(0.6 * 11 * chars) + 20)`
pub fn segment_width(text: &str) -> u32 {
    let chars = text.chars().count() as f64;
    let estimated = (0.6 * f64::from(FONT_SIZE) * chars).floor() as u32;
    (estimated + 2 * SEGMENT_PADDING).max(MIN_SEGMENT_WIDTH)
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_svg(badge: &BadgeData) -> String {
    let segments = [
        Segment::new(badge.title.clone(), TITLE_COLOR),
        Segment::new(format!("{} DL", badge.downloads), DOWNLOADS_COLOR),
        Segment::new(badge.doi_label(), DOI_COLOR),
    ];
    let total_width: u32 = segments.iter().map(|s| s.width).sum();
    let h = BADGE_HEIGHT;

    let mut rects = String::new();
    let mut texts = String::new();
    let mut x = 0u32;
    for segment in &segments {
        rects.push_str(&format!(
            "    <rect x=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            x, segment.width, h, segment.color
        ));
        let center = f64::from(x) + f64::from(segment.width) / 2.0;
        texts.push_str(&format!(
            "    <text x=\"{}\" y=\"14\">{}</text>\n",
            center,
            escape_xml(&segment.text)
        ));
        x += segment.width;
    }

    let (link_start, link_end) = match &badge.url {
        Some(url) => (
            format!(
                "  <a xlink:href=\"{}\" target=\"_blank\" rel=\"noopener\">\n",
                escape_xml(url)
            ),
            "  </a>\n".to_string(),
        ),
        None => (String::new(), String::new()),
    };

    let label = escape_xml(&format!(
        "{}: {} downloads, DOI {}",
        badge.title,
        badge.downloads,
        badge.doi_label()
    ));

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{w}\" height=\"{h}\" role=\"img\" aria-label=\"{label}\">\n\
         \x20 <linearGradient id=\"b\" x2=\"0\" y2=\"100%\">\n\
         \x20   <stop offset=\"0\" stop-color=\"#bbb\" stop-opacity=\".1\"/>\n\
         \x20   <stop offset=\"1\" stop-opacity=\".1\"/>\n\
         \x20 </linearGradient>\n\
         \x20 <mask id=\"a\"><rect width=\"{w}\" height=\"{h}\" rx=\"3\" fill=\"#fff\"/></mask>\n\
         \x20 <g mask=\"url(#a)\">\n\
         {rects}\
         \x20   <rect width=\"{w}\" height=\"{h}\" fill=\"url(#b)\"/>\n\
         \x20 </g>\n\
         {link_start}\
         \x20 <g fill=\"#fff\" text-anchor=\"middle\" font-family=\"{font}\" font-size=\"{fs}\">\n\
         {texts}\
         \x20 </g>\n\
         {link_end}\
         </svg>\n",
        w = total_width,
        h = h,
        label = label,
        rects = rects,
        link_start = link_start,
        font = FONT_FAMILY,
        fs = FONT_SIZE,
        texts = texts,
        link_end = link_end,
    )
}

/// Snippets for embedding a badge in a README or a web page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEmbed {
    pub markdown: String,
    pub html: String,
}

pub fn embed(badge: &BadgeData, svg_url: &str) -> BadgeEmbed {
    let target = badge.url.as_deref().unwrap_or(svg_url);
    let alt = badge.alt_text();

    BadgeEmbed {
        markdown: format!("[![{}]({})]({})", alt, svg_url, target),
        html: format!(
            "<a href=\"{target}\" target=\"_blank\" rel=\"noopener\">\
             <img alt=\"{alt}\" src=\"{svg}\"></a> \
             <a href=\"{svg}\" download=\"dataset-{id}-badge.svg\" target=\"_blank\" rel=\"noopener\">\
             Download SVG</a>",
            target = escape_xml(target),
            alt = escape_xml(&alt),
            svg = escape_xml(svg_url),
            id = badge.dataset_id,
        ),
    }
}
