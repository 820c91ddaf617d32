//! Reduces a product page to a weighted plain-text blob.

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod selectors;
pub mod weighting;

pub use selectors::Section;
pub use weighting::WeightedText;

use crate::error::{StudioError, StudioResult};
use crate::utils::string_utils::StringUtils;

/// Extracted content of one successfully fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    /// Text of the `<title>` element
    pub title: String,
    /// `<meta name="description">` content
    pub description: String,
    pub weighted_text: String,
    /// True when no e-commerce region was found and generic content was used
    pub used_fallback: bool,
}

impl PageContent {
    /// Text handed to the tokenizer: meta description, page title and the
    /// weighted blob as separate paragraphs, skipping empty ones
    pub fn analysis_text(&self) -> String {
        [&self.description, &self.title, &self.weighted_text]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Text found for each e-commerce content class
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EcommerceSections {
    pub product_title: String,
    pub description: String,
    pub specifications: String,
    pub breadcrumbs: String,
    pub reviews: String,
    pub price: String,
}

impl EcommerceSections {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::ProductTitle => &self.product_title,
            Section::Description => &self.description,
            Section::Specifications => &self.specifications,
            Section::Breadcrumbs => &self.breadcrumbs,
            Section::Reviews => &self.reviews,
            Section::Price => &self.price,
        }
    }

    fn set(&mut self, section: Section, text: String) {
        let slot = match section {
            Section::ProductTitle => &mut self.product_title,
            Section::Description => &mut self.description,
            Section::Specifications => &mut self.specifications,
            Section::Breadcrumbs => &mut self.breadcrumbs,
            Section::Reviews => &mut self.reviews,
            Section::Price => &mut self.price,
        };
        *slot = text;
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|section| self.get(*section).is_empty())
    }
}

struct SectionRule {
    section: Section,
    selectors: Vec<Selector>,
}

/// HTML content extractor with precompiled selector tables
pub struct ContentExtractor {
    rules: Vec<SectionRule>,
    heading: Selector,
    generic: Vec<Selector>,
    page_title: Selector,
    meta_description: Selector,
    body: Selector,
    review_char_limit: usize,
}

impl ContentExtractor {
    /// Create new extractor; reviews longer than `review_char_limit`
    /// characters are truncated
    pub fn new(review_char_limit: usize) -> StudioResult<Self> {
        let rules = Section::ALL
            .iter()
            .map(|section| {
                Ok(SectionRule {
                    section: *section,
                    selectors: parse_selectors(section.selectors())?,
                })
            })
            .collect::<StudioResult<Vec<_>>>()?;

        Ok(Self {
            rules,
            heading: parse_selector(selectors::HEADING_SELECTOR)?,
            generic: parse_selectors(selectors::GENERIC_CONTENT_SELECTORS)?,
            page_title: parse_selector("title")?,
            meta_description: parse_selector("meta[name=\"description\"]")?,
            body: parse_selector("body")?,
            review_char_limit,
        })
    }

    /// Extract title, meta description and weighted text from raw HTML
    pub fn extract(&self, url: &str, html: &str) -> PageContent {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.page_title)
            .next()
            .map(|element| element_text(element, is_non_content))
            .unwrap_or_default();

        let description = document
            .select(&self.meta_description)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        let sections = self.extract_sections(&document);

        let mut weighted = WeightedText::new();
        for section in Section::ALL {
            weighted.push(sections.get(section), section.weight());
        }

        let used_fallback = sections.is_empty();
        if used_fallback {
            weighted.push(self.generic_content(&document), 1);
        }

        let weighted_text = StringUtils::normalize_whitespace(&weighted.render());
        debug!(
            "Extracted {} chars of weighted text from {} (fallback: {})",
            weighted_text.len(),
            url,
            used_fallback
        );

        PageContent {
            url: url.to_string(),
            title,
            description,
            weighted_text,
            used_fallback,
        }
    }

    /// Run every section's selector list against the document
    pub fn extract_sections(&self, document: &Html) -> EcommerceSections {
        let mut sections = EcommerceSections::default();

        for rule in &self.rules {
            let mut text = first_non_empty(document, &rule.selectors).unwrap_or_default();

            match rule.section {
                Section::ProductTitle if text.is_empty() => {
                    text = first_non_empty(document, std::slice::from_ref(&self.heading))
                        .unwrap_or_default();
                }
                Section::Reviews => {
                    text = StringUtils::truncate_with_ellipsis(&text, self.review_char_limit);
                }
                _ => {}
            }

            sections.set(rule.section, text);
        }

        sections
    }

    /// Main-content region text, else body text without page chrome, else
    /// the whole document's text
    fn generic_content(&self, document: &Html) -> String {
        if let Some(text) = first_non_empty(document, &self.generic) {
            return text;
        }

        match document.select(&self.body).next() {
            Some(body) => element_text(body, |element| is_non_content(element) || is_page_chrome(element)),
            None => element_text(document.root_element(), is_non_content),
        }
    }
}

fn parse_selector(css: &str) -> StudioResult<Selector> {
    Selector::parse(css).map_err(|e| StudioError::internal(format!("Invalid selector '{}': {:?}", css, e)))
}

fn parse_selectors(css: &[&str]) -> StudioResult<Vec<Selector>> {
    css.iter().map(|s| parse_selector(s)).collect()
}

/// Text of the first matching element with non-blank content, trying the
/// selectors in order
fn first_non_empty(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .map(|element| element_text(element, is_non_content))
            .find(|text| !text.is_empty())
    })
}

/// Collect an element's text nodes, skipping any node with an ancestor
/// matched by `skip`
fn element_text<F>(root: ElementRef<'_>, skip: F) -> String
where
    F: Fn(&Element) -> bool,
{
    let mut parts = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|element| skip(element));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

fn is_non_content(element: &Element) -> bool {
    selectors::NON_CONTENT_TAGS.contains(&element.name())
}

fn is_page_chrome(element: &Element) -> bool {
    selectors::CHROME_TAGS.contains(&element.name())
        || element.classes().any(|class| selectors::CHROME_CLASSES.contains(&class))
}
