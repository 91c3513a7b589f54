//! Audit report rendering
//!
//! Produces a self-contained HTML report (score, source creative, risk tag,
//! findings, confidence) from already-fetched data. The artifact is handed
//! to the platform's viewer / print-to-PDF path; nothing here touches the
//! wire.

use adaudit_common::types::{AuditRecord, DecodedInsight};

/// Score color bands used across report and history display
pub fn score_color(score: i64) -> &'static str {
    if score >= 80 {
        "#10b981"
    } else if score >= 50 {
        "#6366f1"
    } else {
        "#f43f5e"
    }
}

/// Minimal HTML escaping for server-provided text fields
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the audit report as a standalone HTML document
///
/// # Arguments
/// * `record` - The audit as fetched from the backend
/// * `insight` - The decoded analysis for the same record
/// * `image_url` - Public read URL of the analyzed creative
pub fn render_html(record: &AuditRecord, insight: &DecodedInsight, image_url: &str) -> String {
    let color = score_color(record.score);
    let date = record
        .created_at
        .map(|t| t.format("%B %e, %Y").to_string())
        .unwrap_or_else(|| "Unknown date".to_string());

    let findings_block = if insight.findings.is_empty() {
        String::new()
    } else {
        let items: String = insight
            .findings
            .iter()
            .map(|f| format!("<li class=\"finding-item\">{}</li>\n", escape_html(f)))
            .collect();
        format!(
            r#"<p class="section-label" style="margin-top: 30px;">Key Findings</p>
            <ul class="findings-list">
            {items}
            </ul>"#
        )
    };

    format!(
        r#"<html>
  <head>
    <style>
      body {{ font-family: 'Helvetica', sans-serif; padding: 40px; color: #1e293b; line-height: 1.5; }}
      .header {{ border-bottom: 2px solid #e2e8f0; padding-bottom: 20px; margin-bottom: 30px; display: flex; justify-content: space-between; align-items: center; }}
      .report-title {{ font-size: 24px; font-weight: bold; color: #0f172a; margin: 0; }}
      .score-badge {{ padding: 20px; background: #f8fafc; border-radius: 12px; text-align: center; border: 1px solid #e2e8f0; margin-bottom: 30px; }}
      .score-value {{ font-size: 48px; font-weight: 800; color: {color}; margin: 0; }}
      .section-label {{ font-size: 12px; text-transform: uppercase; letter-spacing: 1px; color: #64748b; font-weight: bold; }}
      .img-container {{ width: 100%; text-align: center; margin: 20px 0; background: #000; border-radius: 12px; overflow: hidden; }}
      .main-img {{ max-height: 400px; max-width: 100%; }}
      .risk-tag {{ display: inline-block; padding: 4px 12px; border-radius: 20px; background: {color}20; color: {color}; font-weight: bold; font-size: 12px; margin-bottom: 10px; }}
      .findings-list {{ margin-top: 20px; padding-left: 20px; }}
      .finding-item {{ margin-bottom: 10px; color: #475569; }}
      .footer {{ margin-top: 50px; border-top: 1px solid #e2e8f0; padding-top: 20px; font-size: 10px; color: #94a3b8; text-align: center; }}
    </style>
  </head>
  <body>
    <div class="header">
      <div>
        <h1 class="report-title">Creative Audit Report</h1>
        <p style="color: #64748b; margin: 5px 0 0 0;">Date: {date}</p>
      </div>
      <div style="text-align: right">
        <p class="section-label">Audience</p>
        <p style="font-weight: bold; margin: 0;">{audience}</p>
      </div>
    </div>

    <div class="score-badge">
      <p class="section-label" style="margin-bottom: 5px;">Overall Performance Score</p>
      <h2 class="score-value">{score}</h2>
    </div>

    <p class="section-label">Analyzed Creative</p>
    <div class="img-container">
      <img src="{image_url}" class="main-img" />
    </div>

    <div class="analysis-card">
      <p class="section-label">AI Analysis Insights</p>
      <div class="risk-tag">RISK LEVEL: {risk}</div>
      <p style="font-size: 16px; color: #1e293b;">{summary}</p>
      {findings_block}
    </div>

    <div class="footer">
      Generated by the AdAudit engine &bull; Confidence Level: {confidence}%
    </div>
  </body>
</html>
"#,
        color = color,
        date = escape_html(&date),
        audience = escape_html(&record.target_audience),
        score = record.score,
        image_url = escape_html(image_url),
        risk = insight.risk.to_string().to_uppercase(),
        summary = escape_html(&insight.summary),
        findings_block = findings_block,
        confidence = insight.confidence,
    )
}
