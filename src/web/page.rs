use std::fmt::Write;

use crate::answer::AnswerResult;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query to get an answer.";

/// What to show below the form
#[derive(Debug)]
pub enum PageMessage {
    None,
    Prompt,
    Answer(AnswerResult),
    Error(String),
}

/// Escape HTML special characters.
#[inline]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the full page with the form and an optional message
#[inline]
pub fn render_page(title: &str, query: &str, message: &PageMessage) -> String {
    let title = html_escape(title);
    let mut body = String::new();

    match message {
        PageMessage::None => {}
        PageMessage::Prompt => {
            let _ = write!(body, "<p class=\"prompt\">{}</p>", EMPTY_QUERY_MESSAGE);
        }
        PageMessage::Answer(result) => {
            let _ = write!(
                body,
                "<div class=\"answer\"><strong>Answer:</strong> <span>{}</span></div>",
                html_escape(&result.text)
            );
            if !result.sources.is_empty() {
                body.push_str("<ul class=\"sources\">");
                for source in &result.sources {
                    let _ = write!(
                        body,
                        "<li>{} <small>(similarity {:.3})</small></li>",
                        html_escape(&source.chunk.source.to_string()),
                        source.similarity
                    );
                }
                body.push_str("</ul>");
            }
        }
        PageMessage::Error(error) => {
            let _ = write!(
                body,
                "<p class=\"error\">Could not answer the question: {}</p>",
                html_escape(error)
            );
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
input[type=text] {{ width: 100%; padding: 0.5rem; box-sizing: border-box; }}
.error {{ color: #b00020; }}
.sources {{ color: #555; }}
</style>
</head>
<body>
<h1>{title}</h1>
<form method="post" action="/">
<label for="query">Ask a question about the documents:</label>
<input type="text" id="query" name="query" value="{query}" autofocus>
<p><button type="submit">Get Answer</button></p>
</form>
{body}
</body>
</html>
"#,
        title = title,
        query = html_escape(query),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<script>alert("x & y")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn empty_page_has_form_only() {
        let page = render_page("Budget <Bot>", "", &PageMessage::None);

        assert!(page.contains("<h1>Budget &lt;Bot&gt;</h1>"));
        assert!(page.contains("name=\"query\""));
        assert!(page.contains("Get Answer"));
        assert!(!page.contains(EMPTY_QUERY_MESSAGE));
        assert!(!page.contains("class=\"answer\""));
    }

    #[test]
    fn prompt_message() {
        let page = render_page("Bot", "", &PageMessage::Prompt);
        assert!(page.contains(EMPTY_QUERY_MESSAGE));
    }

    #[test]
    fn answer_is_escaped_and_query_kept() {
        let result = AnswerResult {
            text: "Use <b>5000 crore</b>".to_string(),
            sources: Vec::new(),
            used_context: true,
        };
        let page = render_page("Bot", "what \"now\"?", &PageMessage::Answer(result));

        assert!(page.contains("<strong>Answer:</strong> <span>Use &lt;b&gt;5000 crore&lt;/b&gt;</span>"));
        assert!(page.contains("value=\"what &quot;now&quot;?\""));
    }

    #[test]
    fn error_message_is_visible() {
        let page = render_page(
            "Bot",
            "q",
            &PageMessage::Error("Remote service error: HTTP 429".to_string()),
        );
        assert!(page.contains("Could not answer the question: Remote service error: HTTP 429"));
    }
}
