//! Prompt templates for the generative model

use crate::error::Result;
use minijinja::{context, Environment};

const ANALYST_TEMPLATE: &str = r#"You are a professional financial analyst.

### Stock Overview:
- **Stock Symbol:** {{ symbol }}
- **Current Price:** ${{ price }}
- **Market Sentiment:** {{ sentiment }}

### Latest Financial News:
"{{ news }}"
{% if question %}
### Question from the user:
{{ question }}
{% endif %}
### Investment Recommendation:
Based on the stock's performance, latest trends, and market sentiment, provide a **clear** investment recommendation (Buy, Sell, or Hold) along with a brief explanation.
"#;

/// Registry of the prompt templates used by the pipeline
pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    /// Create the library with all templates compiled
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("advisor.analyst", ANALYST_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the analyst prompt for one advisory request
    pub fn analyst(
        &self,
        symbol: &str,
        price: f64,
        sentiment: &str,
        news: &str,
        question: Option<&str>,
    ) -> Result<String> {
        let template = self.env.get_template("advisor.analyst")?;
        let rendered = template.render(context! {
            symbol => symbol,
            price => price,
            sentiment => sentiment,
            news => news,
            question => question,
        })?;
        Ok(rendered)
    }
}
