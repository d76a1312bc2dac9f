//! HTML report generation with D3.js visualizations

use crate::dashboard::Dashboard;
use crate::error::Result;
use std::io::Write;

// Embed the page template directly in the binary
const TEMPLATE: &str = include_str!("dashboard.html");

/// Where interactions are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Self-contained file, the page applies the selection rules itself
    Standalone,
    /// Served by `tunemood serve`, interactions are sent to the API
    Served,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Standalone => "standalone",
            Mode::Served => "served",
        }
    }
}

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard, mode: Mode) -> Result<()> {
    writer.write_all(render(dashboard, mode)?.as_bytes())?;
    Ok(())
}

/// Render the page to a string
pub fn render(dashboard: &Dashboard, mode: Mode) -> Result<String> {
    let json_data = script_safe(&serde_json::to_string(&dashboard.snapshot())?);

    // Mode first, so genre names in the data are never rewritten
    Ok(TEMPLATE
        .replace("__MODE__", mode.as_str())
        .replace("/*__DATA__*/null", &json_data))
}

/// Keep embedded JSON from closing the surrounding script element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::record::RecordStore;

    fn dashboard(csv: &str) -> Dashboard {
        Dashboard::new(RecordStore::from_reader(csv.as_bytes()).unwrap(), ViewConfig::default())
    }

    const CSV: &str = "Hours per day,Fav genre,Anxiety,Depression,Music effects\n1,Rock,3,0,Improve\n3,Jazz,4,1,Worsen\n";

    #[test]
    fn test_html_embeds_snapshot() {
        let html = render(&dashboard(CSV), Mode::Standalone).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("/*__DATA__*/"));
        assert!(html.contains(r#"const data = {"config":"#));
        assert!(html.contains(r#"const mode = "standalone";"#));
    }

    #[test]
    fn test_html_served_mode() {
        let html = render(&dashboard(CSV), Mode::Served).unwrap();
        assert!(html.contains(r#"const mode = "served";"#));
    }

    #[test]
    fn test_html_contains_view_functions() {
        let html = render(&dashboard(CSV), Mode::Standalone).unwrap();
        for call in ["drawHistogram();", "drawPie();", "drawDendrogram();", "applyRedraw(data.redraw);"] {
            assert!(html.contains(call), "HTML should call {}", call);
        }
    }

    #[test]
    fn test_genre_cannot_break_out_of_script() {
        let csv = "Hours per day,Fav genre,Anxiety,Depression,Music effects\n1,</script><b>x,3,0,Improve\n";
        let html = render(&dashboard(csv), Mode::Standalone).unwrap();
        assert_eq!(html.matches("</script>").count(), 2, "only the two real closing tags");
    }

    #[test]
    fn test_placeholder_text_in_genre_survives() {
        let csv = "Hours per day,Fav genre,Anxiety,Depression,Music effects\n1,__MODE__ Core,3,0,Improve\n";
        let html = render(&dashboard(csv), Mode::Served).unwrap();
        assert!(html.contains("__MODE__ Core"));
        assert!(html.contains(r#"const mode = "served";"#));
    }
}
