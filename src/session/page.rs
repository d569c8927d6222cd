use scraper::Html;
use url::Url;

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects; relative links on the page resolve against it
    pub url: Url,

    /// Response body
    pub body: String,
}

impl Page {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Parses the body into a DOM
    ///
    /// Pages are re-parsed wherever they are inspected; the parsed document is
    /// not kept across requests.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}
