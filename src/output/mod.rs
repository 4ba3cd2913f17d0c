//! Helpers for rendering generation results for the terminal

use crate::error::Result;
use crate::generator::GeneratedQr;
use serde_json::Value;

/// Combined structured and human-readable representation of a generated code
#[derive(Debug, Clone)]
pub struct RenderedQr {
    /// Structured JSON representation suitable for scripts
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a generation result into both JSON and human-readable forms.
pub fn render_generated(generated: &GeneratedQr) -> Result<RenderedQr> {
    let json = serde_json::to_value(generated)?;
    let mut human = Vec::new();

    human.push(format!("QR code saved to {}", generated.path.display()));
    human.push(format!("  Id: {}", generated.id));
    human.push(format!("  Text: {}", generated.text));
    human.push(format!(
        "  Created: {}",
        generated.created_at.format("%Y-%m-%d %H:%M:%S")
    ));

    match generated.overlay_ratio {
        Some(ratio) => human.push(format!("  Logo: yes ({:.1}% of symbol)", ratio * 100.0)),
        None => human.push("  Logo: no".to_string()),
    }

    if generated.metadata_stored {
        human.push("  Metadata: stored".to_string());
    }

    match generated.verified {
        Some(true) => human.push("  Verified: decodes to input".to_string()),
        Some(false) => human.push("  Verified: FAILED, image does not decode to input".to_string()),
        None => {}
    }

    Ok(RenderedQr { json, human })
}
