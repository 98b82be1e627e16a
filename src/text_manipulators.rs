use regex::Regex;
use scraper::ElementRef;

const TITLE_SUFFIX: &str = " - Dentalstall India";

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Strips the store name the catalog appends to image alt text.
pub fn clean_title(raw: &str) -> String {
    raw.replace(TITLE_SUFFIX, "").trim().to_string()
}

pub struct PriceParser {
    // First number in a price label, with optional thousands separators.
    amount_regex: Regex,
}

impl PriceParser {
    pub fn new() -> anyhow::Result<Self> {
        let amount_regex = Regex::new(r"\d[\d,]*(?:\.\d+)?")?;
        Ok(Self { amount_regex })
    }

    /// "₹1,299.00" -> 1299.0. Labels without digits yield `None`.
    pub fn parse(&self, label: &str) -> Option<f64> {
        let amount = self.amount_regex.find(label)?;
        amount.as_str().replace(',', "").parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_labels() {
        let parser = PriceParser::new().unwrap();
        assert_eq!(parser.parse("₹1,299.00"), Some(1299.0));
        assert_eq!(parser.parse("  ₹ 85 "), Some(85.0));
        assert_eq!(parser.parse("₹12.5"), Some(12.5));
        assert_eq!(parser.parse("Free"), None);
    }

    #[test]
    fn removes_store_suffix() {
        assert_eq!(clean_title("Dental Mirror - Dentalstall India"), "Dental Mirror");
        assert_eq!(clean_title(" Probe "), "Probe");
    }
}
