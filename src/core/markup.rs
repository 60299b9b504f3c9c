//! Speech markup
//!
//! Wraps chat text in the SSML envelope every backend consumes. Chat input
//! is untrusted, so the content and the language attribute are escaped.

use quick_xml::escape::escape;

const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";

/// Build the `<speak>` document for `text` spoken in `lang`
pub fn speech_markup(text: &str, lang: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='{}' xml:lang='{}'>{}</speak>",
        SSML_NAMESPACE,
        escape(lang),
        escape(text)
    )
}
