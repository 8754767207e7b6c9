pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the graph comes from and which server-side filters to ask for.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub nlargest: Option<usize>,
    pub min_weight: Option<f64>,
    pub num_examples: Option<usize>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            nlargest: None,
            min_weight: None,
            num_examples: None,
        }
    }

    pub fn relations_url(&self) -> String {
        format!("{}/domain-relations", self.base_url)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(nlargest) = self.nlargest {
            pairs.push(("nlargest", nlargest.to_string()));
        }
        if let Some(min_weight) = self.min_weight {
            pairs.push(("min_weight", min_weight.to_string()));
        }
        if let Some(num_examples) = self.num_examples {
            pairs.push(("num_examples", num_examples.to_string()));
        }
        pairs
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_owned();
    }
    trimmed.trim_end_matches('/').to_owned()
}
