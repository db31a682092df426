//! Fixed prompts for the shopping assistant.

/// Persona prepended to every conversational prompt.
pub const ASSISTANT_PERSONA: &str = "\
You are a helpful and friendly e-commerce assistant for an online store.
You help customers with:
- Product availability and pricing
- Product recommendations based on their needs
- Order information and tracking
- Delivery details and timelines
- Discount codes and promotions
- General shopping questions
- Payment methods and security

Personality:
- Be friendly and conversational
- Use emojis occasionally (but not excessively)
- Be concise but helpful
- If you don't know something, say so honestly
- Keep responses under 200 words

Remember: You represent the store, so be professional yet approachable.";

/// Reply used when the model returns no text.
pub const FALLBACK_REPLY: &str = "I'm having trouble responding right now. Please try again.";

/// Number of suggestions requested from the model.
pub const SUGGESTION_COUNT: usize = 5;

/// Build the conversational prompt for a customer message.
#[must_use]
pub fn conversational_prompt(message: &str) -> String {
    format!("{ASSISTANT_PERSONA}\n\nCustomer Question: {message}")
}

/// Build the structured search-suggestion prompt for a query.
#[must_use]
pub fn suggestion_prompt(query: &str) -> String {
    let query = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{query}\""));
    format!(
        r#"Given the search query: {query}

Provide {SUGGESTION_COUNT} product suggestions that would match this query in an e-commerce store.
Format as JSON array with 'name' and 'description' for each product.

IMPORTANT: Return ONLY valid JSON, no other text or explanation.

Example format (return EXACTLY like this):
[
    {{"name": "MacBook Pro 16\"", "description": "High-performance laptop for professionals"}},
    {{"name": "MacBook Air M2", "description": "Lightweight and fast laptop"}}
]"#
    )
}
