use crate::view::{Card, FacetGroup, RenderedView};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_facet_group(group: &FacetGroup) -> String {
    let open = if group.open { " open" } else { "" };
    let mut out = format!(
        r#"        <details class="facet-group border-b border-slate-200 py-3"{open} data-dimension="{dim}">
          <summary class="cursor-pointer font-display text-sm uppercase tracking-tight">{label}</summary>
          <ul class="mt-2 space-y-1">
"#,
        dim = group.dimension.key(),
        label = escape_html(&group.label),
    );
    for c in group.controls.iter() {
        let checked = if c.checked { " checked" } else { "" };
        let muted = if c.count == 0 { " text-slate-400" } else { "" };
        out.push_str(&format!(
            r#"            <li class="flex items-center gap-2{muted}">
              <input type="checkbox" id="{id}" value="{value}"{checked}/>
              <label for="{id}">{value}</label>
              <span class="ml-auto text-xs tabular-nums">({count})</span>
            </li>
"#,
            id = escape_html(&c.id),
            value = escape_html(&c.value),
            count = c.count,
        ));
    }
    out.push_str("          </ul>\n        </details>\n");
    out
}

fn render_card(card: &Card) -> String {
    let chips: String = card
        .chips
        .iter()
        .map(|chip| {
            let accent = if chip.accent {
                "bg-primary text-white"
            } else {
                "bg-slate-100 text-slate-700"
            };
            format!(
                r#"<button type="button" class="chip rounded-full px-2 py-0.5 text-xs {accent}" data-dimension="{dim}" data-value="{value}" aria-label="{aria}">{value}</button>"#,
                dim = chip.dimension.key(),
                value = escape_html(&chip.value),
                aria = escape_html(&chip.aria_label),
            )
        })
        .collect::<Vec<_>>()
        .join("\n              ");
    let date = if card.publish_date.is_empty() {
        String::new()
    } else {
        format!(
            r#"<time class="text-xs text-slate-500">{}</time>"#,
            escape_html(&card.publish_date)
        )
    };
    format!(
        r#"        <article class="card rounded-xl overflow-hidden bg-white shadow">
          <a href="{url}" target="_blank" rel="noreferrer" class="block">
            <div class="h-40 bg-cover bg-center" style="background-image: url('{image}')"></div>
            <h3 class="px-4 pt-3 text-lg">{title}</h3>
          </a>
          <div class="px-4 pb-4 pt-2 flex flex-wrap items-center gap-2">
              {chips}
              {date}
          </div>
        </article>
"#,
        url = escape_html(&card.url),
        image = escape_html(&card.image),
        title = escape_html(&card.title),
    )
}

/// Self-contained page for one view snapshot. The render model is also
/// embedded as JSON for downstream tooling.
pub fn render_html(view: &RenderedView) -> Vec<u8> {
    let json = serde_json::to_string(view).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);

    let facets: String = view.facets.iter().map(render_facet_group).collect();
    let cards: String = view.cards.iter().map(render_card).collect();
    let active: String = view
        .active_filters
        .iter()
        .map(|f| {
            format!(
                r#"<button type="button" class="active-filter rounded-full bg-slate-800 text-white px-3 py-1 text-xs" data-control="{id}" aria-label="{aria}">{value} ×</button>"#,
                id = escape_html(&f.control_id),
                aria = escape_html(&f.aria_label),
                value = escape_html(&f.value),
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Pagegrid Catalog</title>
  <script src="https://cdn.tailwindcss.com?plugins=forms,container-queries"></script>
  <link href="https://fonts.googleapis.com/css2?family=Montserrat:wght@700;800&amp;family=Inter:wght@400;500;600;700&amp;display=swap" rel="stylesheet"/>
  <script id="tailwind-config">
    tailwind.config = {{
      theme: {{
        extend: {{
          colors: {{
            "primary": "#135bec",
            "background-light": "#f8fafc"
          }},
          fontFamily: {{
            "sans": ["Inter", "sans-serif"],
            "display": ["Montserrat", "sans-serif"]
          }}
        }}
      }}
    }};
  </script>
  <style type="text/tailwindcss">
    h1, h2, h3 {{
      font-family: 'Montserrat', sans-serif;
      font-weight: 800;
      letter-spacing: -0.025em;
    }}
  </style>
</head>
<body class="bg-background-light text-slate-900 min-h-screen">
  <script type="application/json" id="view-data">{json}</script>
  <main class="max-w-[1440px] mx-auto w-full px-8 py-10 flex flex-col md:flex-row gap-8">
    <aside class="md:w-64 shrink-0" aria-label="Filters">
{facets}    </aside>
    <section class="flex-1">
      <div class="flex flex-wrap items-center justify-between gap-4 mb-6">
        <p id="results-count" class="text-slate-600" aria-live="polite">{status}</p>
        <p class="text-xs uppercase tracking-wide text-slate-500">Sort: {sort}</p>
      </div>
      <div id="active-filters" class="flex flex-wrap items-center gap-2 mb-6">
        <span class="text-sm text-slate-500">{active_label}</span>
          {active}
      </div>
      <div id="results" class="grid gap-6 sm:grid-cols-2 xl:grid-cols-3">
{cards}      </div>
    </section>
  </main>
</body>
</html>
"####,
        status = escape_html(&view.status),
        sort = view.sort.label(),
        active_label = escape_html(&view.active_label),
    );
    html.into_bytes()
}
