use percent_encoding::utf8_percent_encode;

use crate::pipeline::codec::URI_COMPONENT;

// Links for the share panel. Each embeds the permalink as a query value, so
// it gets escaped a second time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareLinks {
    pub permalink: String,
    pub email: String,
    pub google: String,
    pub facebook: String,
    pub twitter: String,
}

impl ShareLinks {
    pub fn new(permalink: &str) -> Self {
        let encoded = utf8_percent_encode(permalink, URI_COMPONENT).to_string();
        Self {
            permalink: permalink.to_string(),
            email: format!("mailto:?subject=Check Out These Beats&body={encoded}"),
            google: format!("https://plus.google.com/share?url={encoded}"),
            facebook: format!("http://www.facebook.com/sharer.php?u={encoded}"),
            twitter: format!(
                "http://twitter.com/share?url={encoded}&text=Check%20out%20these%20beats%20"
            ),
        }
    }
}
