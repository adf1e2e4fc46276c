//! Built-in HTML renderer

use std::fmt::Write as _;

use num_format::{Locale, ToFormattedString};

use super::{RenderData, Renderer, View};
use crate::client::Petition;
use crate::error::RenderError;

/// Renders the site's three pages as self-contained HTML
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new("We the People response times")
    }
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn summary(&self, data: &RenderData<'_>, out: &mut String) -> std::fmt::Result {
        let s = &data.stats;
        writeln!(out, "<section class=\"summary\">")?;
        writeln!(
            out,
            "<p>{} of {} petitions over the signature threshold have received a response ({}%).</p>",
            add_commas(s.number_response as i64),
            add_commas(s.number_total as i64),
            s.percent_responded
        )?;
        writeln!(
            out,
            "<p>Responses took <strong>{}</strong> days past the deadline on average.</p>",
            add_commas(s.average_response)
        )?;
        writeln!(
            out,
            "<p>{} petitions are still waiting, on average <strong>{}</strong> days past their deadline.</p>",
            add_commas(s.number_pending as i64),
            add_commas(s.average_pending)
        )?;
        writeln!(out, "</section>")
    }

    fn petition_row(petition: &Petition, out: &mut String) -> std::fmt::Result {
        let (deadline, class) = match &petition.ingestion {
            Some(ingestion) => (
                ingestion.deadline_time.format("%b %-d, %Y").to_string(),
                if ingestion.year_ago { " class=\"year-ago\"" } else { "" },
            ),
            None => (petition.deadline.to_string(), ""),
        };
        let signatures = petition
            .signature_count
            .map(add_commas)
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "<tr{}><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
            class,
            escape(&petition.url),
            escape(&petition.title),
            signatures,
            deadline
        )
    }

    fn body(&self, view: View, data: &RenderData<'_>, out: &mut String) -> std::fmt::Result {
        match view {
            View::Main => {
                self.summary(data, out)?;
                writeln!(out, "<table class=\"petitions\">")?;
                writeln!(
                    out,
                    "<thead><tr><th>Petition</th><th>Signatures</th><th>Deadline</th></tr></thead>"
                )?;
                writeln!(out, "<tbody>")?;
                for petition in data.petitions {
                    Self::petition_row(petition, out)?;
                }
                writeln!(out, "</tbody>\n</table>")
            }
            View::Empty => {
                self.summary(data, out)?;
                writeln!(
                    out,
                    "<p class=\"empty\">No petitions are currently waiting for a response.</p>"
                )
            }
            View::NotFound => {
                writeln!(out, "<h2>Page not found</h2>")?;
                writeln!(
                    out,
                    "<p>Nothing lives here. <a href=\"/\">{} petitions</a> are tracked on the front page.</p>",
                    add_commas(data.stats.number_total as i64)
                )
            }
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: View, data: &RenderData<'_>) -> Result<Vec<u8>, RenderError> {
        let mut out = String::with_capacity(4096 + data.petitions.len() * 256);
        let result = (|| -> std::fmt::Result {
            writeln!(out, "<!DOCTYPE html>")?;
            writeln!(out, "<html lang=\"en\">\n<head>")?;
            writeln!(out, "<meta charset=\"utf-8\">")?;
            writeln!(out, "<title>{}</title>", escape(&self.title))?;
            writeln!(out, "</head>\n<body>")?;
            writeln!(out, "<h1>{}</h1>", escape(&self.title))?;
            self.body(view, data, &mut out)?;
            writeln!(out, "</body>\n</html>")
        })();

        result.map_err(|e| RenderError::Failed {
            view: view.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(out.into_bytes())
    }
}

/// Format an integer with thousands separators, e.g. `-1234567` -> `-1,234,567`
pub fn add_commas(v: i64) -> String {
    v.to_formatted_string(&Locale::en)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
