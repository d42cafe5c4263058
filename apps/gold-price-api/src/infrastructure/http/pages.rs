//! Static-ish documents: SEO snapshot, status page, sitemap, robots.txt.

use crate::domain::quote::PriceQuote;
use crate::domain::refresh::RefreshPolicy;

/// Crawlable HTML page embedding the current price.
#[must_use]
pub fn render_seo_snapshot(quote: &PriceQuote, policy: &RefreshPolicy) -> String {
    let spot = format!("{:.2}", quote.spot_price_per_ounce);
    let gram = format!("{:.2}", quote.price_per_gram);
    let updated = quote.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
    let interval = policy.describe();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Gold Calculator - Live Gold Price Calculator</title>
  <meta name="description" content="Free gold calculator with live rates updated every {interval}. Calculate gold value in grams, ounces, tola, pennyweight. Current: ${spot}/oz">
  <meta name="keywords" content="gold calculator, gold price, 22k gold, 24k gold, tola, troy ounce">
</head>
<body>
  <main>
    <h1>Live Gold Price Calculator - Real-Time Gold Value</h1>

    <div class="price-info">
      <p><strong>Current Gold Price:</strong> ${spot} per troy ounce</p>
      <p><strong>Price per Gram:</strong> ${gram}</p>
      <p><strong>Last Updated:</strong> {updated}</p>
      <p><strong>Market:</strong> {market}</p>
    </div>

    <h2>How to Use the Gold Calculator</h2>
    <ol>
      <li><strong>Enter Weight:</strong> Input gold weight</li>
      <li><strong>Select Unit:</strong> Grams, ounces, tola, pennyweight, kg</li>
      <li><strong>Choose Purity:</strong> 8K to 24K karat</li>
      <li><strong>Calculate:</strong> Get instant market value</li>
    </ol>

    <h2>Supported Units</h2>
    <ul>
      <li><strong>Grams (g)</strong> - Metric unit</li>
      <li><strong>Troy Ounce (oz)</strong> - 31.1035 grams</li>
      <li><strong>Tola</strong> - 11.66 grams (South Asian)</li>
      <li><strong>Pennyweight (dwt)</strong> - 1.555 grams</li>
      <li><strong>Kilogram (kg)</strong> - 1000 grams</li>
    </ul>

    <h2>Gold Purity Levels</h2>
    <ul>
      <li><strong>24K</strong> - 99.9% pure (investment)</li>
      <li><strong>22K</strong> - 91.6% pure (jewelry)</li>
      <li><strong>18K</strong> - 75% pure</li>
      <li><strong>14K</strong> - 58.3% pure</li>
      <li><strong>10K</strong> - 41.7% pure</li>
      <li><strong>8K</strong> - 33.3% pure</li>
    </ul>

    <p><strong>Start calculating your gold value now!</strong></p>
  </main>
</body>
</html>
"#,
        market = quote.market,
    )
}

/// Human-facing status page listing the endpoints.
#[must_use]
pub fn render_home(policy: &RefreshPolicy, api_key_configured: bool) -> String {
    let interval = policy.describe();
    let api_key = api_key_label(api_key_configured);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Gold Calculator API - Ready</title>
  <style>
    body {{ font-family: Arial; max-width: 800px; margin: 50px auto; padding: 20px; }}
    h1 {{ color: #d4af37; }}
    .status {{ background: #d4f4dd; padding: 15px; border-radius: 5px; margin: 20px 0; }}
    .endpoint {{ background: #f4f4f4; padding: 10px; margin: 10px 0; border-left: 4px solid #d4af37; }}
    code {{ background: #333; color: #fff; padding: 3px 8px; border-radius: 3px; }}
  </style>
</head>
<body>
  <h1>Gold Calculator API - Ready!</h1>

  <div class="status">
    <strong>Server Running</strong><br>
    Update Interval: <strong>{interval}</strong><br>
    API Key: <strong>{api_key}</strong>
  </div>

  <h2>Endpoints:</h2>

  <div class="endpoint">
    <code>GET /api/gold-prices</code><br>
    Live gold prices ({interval} updates)
  </div>

  <div class="endpoint">
    <code>GET /api/config</code><br>
    Configuration settings
  </div>

  <div class="endpoint">
    <code>GET /seo-snapshot</code><br>
    SEO-optimized HTML snapshot
  </div>

  <div class="endpoint">
    <code>GET /health</code><br>
    Health check
  </div>

  <div class="endpoint">
    <code>GET /metrics</code><br>
    Prometheus metrics
  </div>

  <p><a href="/api/gold-prices">Test Live Prices</a> | <a href="/api/config">View Config</a> | <a href="/health">Health</a></p>
</body>
</html>
"#
    )
}

/// XML sitemap covering the status page and the SEO snapshot.
#[must_use]
pub fn render_sitemap(public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{base}/</loc>
    <changefreq>hourly</changefreq>
    <priority>1.0</priority>
  </url>
  <url>
    <loc>{base}/seo-snapshot</loc>
    <changefreq>daily</changefreq>
    <priority>0.8</priority>
  </url>
</urlset>"#
    )
}

/// robots.txt allowing all crawlers.
#[must_use]
pub fn render_robots(public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!("User-agent: *\nAllow: /\nSitemap: {base}/sitemap.xml")
}

/// "Configured" or "Missing".
#[must_use]
pub const fn api_key_label(configured: bool) -> &'static str {
    if configured { "Configured" } else { "Missing" }
}
