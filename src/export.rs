//! Static one-record outputs: the HTML report snapshot and the share text.

use crate::models::WineReport;

/// Render a self-contained HTML snapshot of one report, suitable for
/// pasting into a document or saving next to the cellar spreadsheet.
pub fn report_html(report: &WineReport) -> String {
    let score = report.headline_score().unwrap_or("N/A");
    let varietals = if report.varietals.is_empty() {
        report.wine_type.clone()
    } else {
        report.varietals.join(", ")
    };

    format!(
        r#"<html>
  <head>
    <title>{name}</title>
    <style>
      body {{ font-family: sans-serif; padding: 20px; line-height: 1.6; color: #333; }}
      h1 {{ color: #882333; border-bottom: 2px solid #eee; padding-bottom: 10px; }}
      h2 {{ color: #555; margin-top: 20px; font-size: 18px; text-transform: uppercase; letter-spacing: 1px; }}
      .stat {{ display: flex; justify-content: space-between; max-width: 300px; border-bottom: 1px dashed #ccc; padding: 4px 0; }}
      .notes {{ background: #f9f9f9; padding: 15px; border-left: 4px solid #882333; font-style: italic; }}
    </style>
  </head>
  <body>
    <h1>{name}</h1>
    <p><strong>Vintage:</strong> {vintage} | <strong>Region:</strong> {region}, {country}</p>
    <p><strong>Market Price:</strong> {price} | <strong>Score:</strong> {score}</p>

    <h2>Sensory Profile</h2>
    <div class="notes">"{nose}. {taste}"</div>

    <h2>Technical Details</h2>
    <div class="stat"><span>Type:</span> <span>{wine_type}</span></div>
    <div class="stat"><span>ABV:</span> <span>{abv}</span></div>
    <div class="stat"><span>Grapes:</span> <span>{varietals}</span></div>

    <h2>Winery Info</h2>
    <p>{winery}</p>
  </body>
</html>
"#,
        name = escape(&report.name),
        vintage = escape(&report.vintage),
        region = escape(&report.region),
        country = escape(&report.country),
        price = escape(&report.market_price),
        score = escape(score),
        nose = escape(&report.nose),
        taste = escape(&report.taste),
        wine_type = escape(&report.wine_type),
        abv = escape(&report.abv),
        varietals = escape(&varietals),
        winery = escape(&report.winery_info),
    )
}

/// Build a plain-text summary for copy/paste sharing.
pub fn share_summary(report: &WineReport) -> String {
    let mut lines = vec![format!(
        "{} ({}) - {}, {}",
        report.name, report.vintage, report.region, report.country
    )];

    if !report.wine_type.is_empty() || !report.abv.is_empty() {
        lines.push(format!("{} | {}", report.wine_type, report.abv));
    }

    if let Some(score) = report.headline_score() {
        let critic = &report.critic_scores[0].critic;
        lines.push(format!("Score: {} ({})", score, critic));
    }

    if !report.market_price.is_empty() {
        lines.push(format!("Market: {}", report.market_price));
    }

    if let Some(aging) = &report.aging {
        if !aging.peak_years.is_empty() {
            lines.push(format!("Peak window: {}", aging.peak_years));
        }
    }

    if !report.taste.is_empty() {
        lines.push(format!("\"{}\"", report.taste));
    }

    if let Some(rating) = report.user_rating {
        let stars: String = "*".repeat(rating as usize);
        lines.push(format!("My rating: {} ({}/5)", stars, rating));
    }

    lines.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
