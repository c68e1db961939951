pub mod report;

use colored::Colorize;

use crate::view::RenderedView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Html => "html",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(view: &RenderedView, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(view).into_bytes(),
        OutputFormat::Json => render_json(view),
        OutputFormat::Xml => render_xml(view),
        OutputFormat::Html => render_html(view),
    }
}

/// Terminal rendering. Honors `colored::control` overrides.
pub fn render_text(view: &RenderedView) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        ":: {} :: sort={}\n",
        view.status.bold(),
        view.sort.label()
    ));

    if view.active_filters.is_empty() {
        out.push_str(&format!(":: {}\n", view.active_label.dimmed()));
    } else {
        let chips: Vec<String> = view
            .active_filters
            .iter()
            .map(|f| format!("[{} ×]", f.value).yellow().to_string())
            .collect();
        out.push_str(&format!(":: {} {}\n", view.active_label, chips.join(" ")));
    }

    out.push_str(&render_facets_text(view));

    if !view.cards.is_empty() {
        out.push('\n');
    }
    for card in view.cards.iter() {
        out.push_str(&format!(
            "{:>3}. {}\n",
            card.index,
            card.title.bold().cyan()
        ));
        out.push_str(&format!("     {}\n", card.url.underline()));
        let chips: Vec<String> = card
            .chips
            .iter()
            .map(|c| {
                if c.accent {
                    format!("#{}", c.value).magenta().to_string()
                } else {
                    format!("#{}", c.value)
                }
            })
            .collect();
        let mut meta = chips.join(" ");
        if !card.publish_date.is_empty() {
            if !meta.is_empty() {
                meta.push_str("  ");
            }
            meta.push_str(&card.publish_date.dimmed().to_string());
        }
        if !meta.is_empty() {
            out.push_str(&format!("     {meta}\n"));
        }
    }
    out
}

/// Facet groups only, as listed by the interactive `facets` command.
pub fn render_facets_text(view: &RenderedView) -> String {
    let mut out = String::new();
    for group in view.facets.iter() {
        out.push('\n');
        let marker = if group.open { "▾" } else { "▸" };
        out.push_str(&format!("{} {}\n", marker, group.label.bold()));
        if !group.open {
            let checked = group.controls.iter().filter(|c| c.checked).count();
            out.push_str(&format!(
                "    {} values, {} selected\n",
                group.controls.len(),
                checked
            ));
            continue;
        }
        for c in group.controls.iter() {
            let mark = if c.checked { "[x]" } else { "[ ]" };
            let line = format!("  {} {} ({})", mark, c.value, c.count);
            if c.checked {
                out.push_str(&format!("{}\n", line.green()));
            } else if c.count == 0 {
                out.push_str(&format!("{}\n", line.dimmed()));
            } else {
                out.push_str(&format!("{line}\n"));
            }
        }
    }

    out
}

pub fn render_json(view: &RenderedView) -> Vec<u8> {
    serde_json::to_vec_pretty(view).unwrap_or_else(|_| b"{}\n".to_vec())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(view: &RenderedView) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(&format!(
        "<catalog total=\"{}\" sort=\"{}\">\n",
        view.total,
        view.sort.label()
    ));
    out.push_str(&format!("  <status>{}</status>\n", escape_xml(&view.status)));
    out.push_str("  <active>\n");
    for f in view.active_filters.iter() {
        out.push_str(&format!(
            "    <filter dimension=\"{}\">{}</filter>\n",
            f.dimension.key(),
            escape_xml(&f.value)
        ));
    }
    out.push_str("  </active>\n");
    out.push_str("  <facets>\n");
    for g in view.facets.iter() {
        out.push_str(&format!(
            "    <facet dimension=\"{}\" label=\"{}\">\n",
            g.dimension.key(),
            escape_xml(&g.label)
        ));
        for c in g.controls.iter() {
            out.push_str(&format!(
                "      <value id=\"{}\" count=\"{}\" checked=\"{}\">{}</value>\n",
                escape_xml(&c.id),
                c.count,
                c.checked,
                escape_xml(&c.value)
            ));
        }
        out.push_str("    </facet>\n");
    }
    out.push_str("  </facets>\n");
    out.push_str("  <cards>\n");
    for card in view.cards.iter() {
        out.push_str("    <card>\n");
        out.push_str(&format!("      <title>{}</title>\n", escape_xml(&card.title)));
        out.push_str(&format!("      <url>{}</url>\n", escape_xml(&card.url)));
        out.push_str(&format!("      <image>{}</image>\n", escape_xml(&card.image)));
        out.push_str(&format!(
            "      <publish_date>{}</publish_date>\n",
            escape_xml(&card.publish_date)
        ));
        for chip in card.chips.iter() {
            out.push_str(&format!(
                "      <{0}>{1}</{0}>\n",
                chip.dimension.key(),
                escape_xml(&chip.value)
            ));
        }
        out.push_str("    </card>\n");
    }
    out.push_str("  </cards>\n");
    out.push_str("</catalog>\n");
    out.into_bytes()
}

pub fn render_html(view: &RenderedView) -> Vec<u8> {
    report::render_html(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CardOptions;
    use crate::engine::fixtures::entity;
    use crate::engine::Catalog;
    use crate::model::{FacetConfig, ViewState};
    use crate::view::build_view;

    fn view() -> RenderedView {
        let catalog = Catalog::new(vec![
            entity("https://a.example/?q=1&x=<2>", "tech", "bike", "mtb", "2024-01-01"),
            entity("https://b.example/", "news", "", "", ""),
        ]);
        build_view(
            &catalog,
            &ViewState::default(),
            &FacetConfig::default(),
            &CardOptions::default(),
        )
    }

    #[test]
    fn format_parse_and_inference() {
        assert_eq!(OutputFormat::parse(" HTML "), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("csv"), None);
        assert_eq!(infer_format_from_path("out/catalog.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("catalog"), None);
    }

    #[test]
    fn text_lists_cards_in_order() {
        colored::control::set_override(false);
        let text = render_text(&view());
        assert!(text.starts_with(":: 2 results :: sort=relevant"));
        assert!(text.contains("All content"));
        let a = text.find("https://a.example").unwrap();
        let b = text.find("https://b.example").unwrap();
        assert!(a < b);
        assert!(text.contains("[ ] tech (1)"));
    }

    #[test]
    fn json_is_the_render_model() {
        let parsed: serde_json::Value = serde_json::from_slice(&render_json(&view())).unwrap();
        assert_eq!(parsed["status"], "2 results");
        assert_eq!(parsed["cards"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["facets"][0]["dimension"], "page_type");
    }

    #[test]
    fn xml_escapes_values() {
        let xml = String::from_utf8(render_xml(&view())).unwrap();
        assert!(xml.contains("<url>https://a.example/?q=1&amp;x=&lt;2&gt;</url>"));
        assert!(xml.contains("<page_type>tech</page_type>"));
    }
}
