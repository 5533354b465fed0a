//! Prompt templates and expected fields per extraction mode.
//!
//! The [`SchemaTable`] is built once at startup and shared by reference;
//! nothing mutates it afterwards.

use std::collections::BTreeMap;

use super::mode::ExtractionMode;

/// Placeholder replaced by the document text in every user prompt.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Prompt pair and field list for one extraction mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSchema {
    pub system_prompt: &'static str,
    pub user_prompt_template: &'static str,
    pub expected_fields: &'static [&'static str],
}

impl ExtractionSchema {
    /// Substitute the document text into the user prompt, untruncated.
    #[must_use]
    pub fn render_user_prompt(&self, text: &str) -> String {
        self.user_prompt_template.replacen(TEXT_PLACEHOLDER, text, 1)
    }
}

const RESUME: ExtractionSchema = ExtractionSchema {
    system_prompt: "You are a professional resume parser. Extract structured data from resumes accurately.",
    user_prompt_template: "Extract the following information from this resume and return ONLY valid JSON:
- Name (full name of the candidate)
- Email (email address)
- Phone (phone number if available)
- Total_Years_Experience (estimated total years, as a number)
- Top_Skills (array of top 3-5 skills)
- Education (highest degree)
- Current_Role (most recent job title)

Text: {text}

Return only valid JSON with these exact field names.",
    expected_fields: &[
        "Name",
        "Email",
        "Phone",
        "Total_Years_Experience",
        "Top_Skills",
        "Education",
        "Current_Role",
    ],
};

const INVOICE: ExtractionSchema = ExtractionSchema {
    system_prompt: "You are an invoice data extraction specialist. Extract structured data from invoices accurately.",
    user_prompt_template: "Extract the following information from this invoice and return ONLY valid JSON:
- Invoice_Number (invoice ID or number)
- Date (invoice date)
- Total_Amount (total amount with currency)
- Vendor_Name (company/vendor name)
- Customer_Name (customer/client name if available)
- Due_Date (payment due date if available)
- Items_Count (number of line items, as a number)

Text: {text}

Return only valid JSON with these exact field names.",
    expected_fields: &[
        "Invoice_Number",
        "Date",
        "Total_Amount",
        "Vendor_Name",
        "Customer_Name",
        "Due_Date",
        "Items_Count",
    ],
};

const SENTIMENT: ExtractionSchema = ExtractionSchema {
    system_prompt: "You are a sentiment analysis expert. Analyze text and provide structured insights.",
    user_prompt_template: "Analyze this text for sentiment and return ONLY valid JSON:
- Sentiment_Score (0-10, where 0 is very negative, 5 is neutral, 10 is very positive)
- Sentiment_Label (one of: Very Negative, Negative, Neutral, Positive, Very Positive)
- Main_Theme (brief description of the main topic/theme)
- Tone (overall tone: Professional, Casual, Angry, Happy, Sad, etc.)
- Key_Phrases (array of 3-5 important phrases or keywords)

Text: {text}

Return only valid JSON with these exact field names.",
    expected_fields: &[
        "Sentiment_Score",
        "Sentiment_Label",
        "Main_Theme",
        "Tone",
        "Key_Phrases",
    ],
};

/// Immutable mode → schema mapping.
#[derive(Debug, Clone)]
pub struct SchemaTable {
    schemas: BTreeMap<ExtractionMode, ExtractionSchema>,
}

impl SchemaTable {
    /// The built-in schemas for every [`ExtractionMode`].
    #[must_use]
    pub fn builtin() -> Self {
        let schemas = BTreeMap::from([
            (ExtractionMode::Resume, RESUME),
            (ExtractionMode::Invoice, INVOICE),
            (ExtractionMode::Sentiment, SENTIMENT),
        ]);
        Self { schemas }
    }

    #[must_use]
    pub fn get(&self, mode: ExtractionMode) -> Option<&ExtractionSchema> {
        self.schemas.get(&mode)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtractionMode, &ExtractionSchema)> {
        self.schemas.iter().map(|(mode, schema)| (*mode, schema))
    }
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_a_schema() {
        let table = SchemaTable::builtin();
        for mode in ExtractionMode::ALL {
            let schema = table.get(mode).expect("schema for mode");
            assert_eq!(
                schema.user_prompt_template.matches(TEXT_PLACEHOLDER).count(),
                1,
                "{mode} template must have exactly one placeholder"
            );
            assert!(!schema.expected_fields.is_empty());
        }
    }

    #[test]
    fn test_render_inserts_full_text() {
        let table = SchemaTable::builtin();
        let schema = table.get(ExtractionMode::Invoice).unwrap();
        let text = "INVOICE #42 {braces stay} ".repeat(100);
        let prompt = schema.render_user_prompt(&text);

        assert!(prompt.contains(&text));
        assert!(!prompt.contains("Text: {text}"));
        assert!(prompt.ends_with("Return only valid JSON with these exact field names."));
    }

    #[test]
    fn test_sentiment_fields_in_order() {
        let table = SchemaTable::builtin();
        let schema = table.get(ExtractionMode::Sentiment).unwrap();
        assert_eq!(schema.expected_fields[0], "Sentiment_Score");
        assert_eq!(schema.expected_fields[4], "Key_Phrases");
    }
}
