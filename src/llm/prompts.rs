/// Prompt templates for keyword classification
use crate::keywords::KeywordMetric;

/// Role given to the model for every classification request
pub const SYSTEM_PROMPT: &str = "You are a senior e-commerce SEO strategist who specializes in \
competitive keyword analysis and product page optimization. Give actionable recommendations \
for product detail pages.";

/// One line per keyword, strongest first, capped at `limit` entries
pub fn build_keyword_context(keywords: &[KeywordMetric], limit: usize) -> String {
    keywords
        .iter()
        .take(limit)
        .map(|kw| {
            format!(
                "{} (freq: {}, coverage: {}%, score: {})",
                kw.keyword,
                kw.frequency,
                (kw.coverage * 100.0).round() as u32,
                kw.strategic_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt asking for a categorized keyword table
pub fn build_classification_prompt(product_title: &str, keyword_context: &str) -> String {
    format!(
        r#"You are reviewing keywords gathered from competing product detail pages (PDPs) for an e-commerce SEO audit.

PRODUCT: "{product_title}"

KEYWORDS (freq = total occurrences across competitor pages, coverage = share of competitors using the phrase, score = strategic weight):
{keyword_context}

For every keyword, judge its value for the product page along these lines:

1. **Search Intent**:
   - Commercial: comparing or researching products
   - Transactional: ready to purchase
   - Informational: learning about features or usage
   - Navigational: looking for a brand or a specific product

2. **SEO Opportunity**:
   - High: meaningful demand, buying intent and room to rank
   - Medium: some demand but crowded or narrow
   - Low: little demand or too generic to convert

3. **Competitive Strategy**:
   - Universal: every competitor uses it, so it is table stakes
   - Majority: most competitors use it
   - Gap: few competitors use it, which leaves an opening
   - Unique: a phrase that can set the page apart

4. **PDP Usage**: where the phrase belongs on the page, such as the product title, bullet points, description, specifications or FAQ.

Reply with a single markdown table and nothing else. Order rows by SEO Opportunity (High first), then by strategic value:

| Keyword/Phrase | Search Intent | SEO Opportunity | Competitive Strategy | PDP Usage | Strategic Reason |
|----------------|---------------|-----------------|----------------------|-----------|------------------|
| example phrase | Commercial | High | Universal | Product Title | Core identifier shared by every competitor |

Prioritize the phrases that would do most for organic traffic to this product page."#
    )
}
