//! Static SVG of all three views under the current selection
//!
//! Panels are stacked top to bottom: histogram, pie with legend, dendrogram.
//! Faded shapes use the opacities from [`Dashboard::redraw`], so the picture
//! matches what the interactive report shows for the same selection.

use crate::config::MARGIN;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::views::{NodeKind, TreeNode};
use std::collections::HashMap;
use std::io::Write;

const BAR_FILL: &str = "#69b3a2";
const LINK_STROKE: &str = "#555";
const LEGEND_ROW: f64 = 20.0;

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard) -> Result<()> {
    let config = dashboard.config();
    let panel_height = config.height;
    let tree_height = dashboard.dendrogram().height() + MARGIN.top + MARGIN.bottom;
    let total_height = panel_height * 2.0 + tree_height;

    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = config.width,
        h = total_height
    )?;

    write_histogram(writer, dashboard, 0.0)?;
    write_pie(writer, dashboard, panel_height)?;
    write_dendrogram(writer, dashboard, panel_height * 2.0)?;

    writeln!(writer, "</svg>")?;
    Ok(())
}

fn write_histogram<W: Write>(writer: &mut W, dashboard: &Dashboard, offset: f64) -> Result<()> {
    let config = dashboard.config();
    let hist = dashboard.histogram();
    let h = config.inner_height();

    writeln!(writer, r#"<g class="histogram" transform="translate({},{})">"#, MARGIN.left, offset + MARGIN.top)?;
    for bin in hist.bins() {
        writeln!(
            writer,
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{}</title></rect>"#,
            bin.px,
            bin.py,
            bin.width,
            bin.height,
            BAR_FILL,
            xml_escape(&bin.tooltip())
        )?;
    }

    let (d0, d1) = hist.domain();
    writeln!(writer, r##"  <line x1="0" y1="{h}" x2="{w}" y2="{h}" stroke="#000"/>"##, h = h, w = config.inner_width())?;
    writeln!(writer, r##"  <line x1="0" y1="0" x2="0" y2="{}" stroke="#000"/>"##, h)?;
    writeln!(writer, r#"  <text x="0" y="{}" text-anchor="middle">{}</text>"#, h + 16.0, d0)?;
    writeln!(writer, r#"  <text x="{}" y="{}" text-anchor="middle">{}</text>"#, config.inner_width(), h + 16.0, d1)?;
    writeln!(writer, r#"  <text x="-6" y="4" text-anchor="end">{}</text>"#, hist.y_max())?;
    writeln!(
        writer,
        r#"  <text x="{}" y="{}" text-anchor="middle">Hours per day</text>"#,
        config.inner_width() / 2.0,
        h + 45.0
    )?;
    writeln!(
        writer,
        r#"  <text transform="rotate(-90)" x="{}" y="-45" text-anchor="middle">Count</text>"#,
        -h / 2.0
    )?;
    writeln!(writer, "</g>")?;
    Ok(())
}

fn write_pie<W: Write>(writer: &mut W, dashboard: &Dashboard, offset: f64) -> Result<()> {
    let config = dashboard.config();
    let pie = dashboard.pie();
    let redraw = dashboard.redraw();
    let cx = MARGIN.left + config.inner_width() / 2.0;
    let cy = offset + MARGIN.top + config.inner_height() / 2.0;

    writeln!(writer, r#"<g class="pie" transform="translate({},{})">"#, cx, cy)?;
    for (wedge, deco) in pie.wedges().iter().zip(&redraw.pie) {
        writeln!(
            writer,
            r#"  <path d="{}" fill="{}" stroke="{}" stroke-width="{}" opacity="{}"><title>{}</title></path>"#,
            wedge.arc_path(pie.radius()),
            wedge.fill,
            deco.stroke,
            deco.stroke_width,
            deco.opacity,
            xml_escape(&wedge.tooltip())
        )?;
    }
    writeln!(writer, "</g>")?;

    writeln!(writer, r#"<g class="legend" transform="translate({},{})">"#, MARGIN.left, offset + MARGIN.top)?;
    for (i, (genre, color)) in dashboard.palette().entries().enumerate() {
        let y = i as f64 * LEGEND_ROW;
        writeln!(writer, r#"  <rect x="0" y="{}" width="12" height="12" fill="{}"/>"#, y, color)?;
        writeln!(writer, r#"  <text x="18" y="{}">{}</text>"#, y + 10.0, xml_escape(genre.as_str()))?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

fn write_dendrogram<W: Write>(writer: &mut W, dashboard: &Dashboard, offset: f64) -> Result<()> {
    let tree = dashboard.dendrogram();
    let nodes = tree.nodes();
    let opacity: HashMap<usize, f64> = dashboard
        .redraw()
        .dendrogram
        .iter()
        .map(|d| (d.id, d.opacity))
        .collect();

    writeln!(writer, r#"<g class="dendrogram" transform="translate({},{})">"#, MARGIN.left, offset + MARGIN.top)?;

    for link in tree.links() {
        let (s, t) = (&nodes[link.source], &nodes[link.target]);
        // Horizontal cubic link, control points at the midpoint column
        let mid = (s.y + t.y) / 2.0;
        writeln!(
            writer,
            r#"  <path d="M{:.2},{:.2}C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}" fill="none" stroke="{}"/>"#,
            s.y, s.x, mid, s.x, mid, t.x, t.y, t.x, LINK_STROKE
        )?;
    }

    for node in nodes {
        let alpha = opacity.get(&node.id).copied().unwrap_or(1.0);
        write_tree_node(writer, node, alpha)?;
    }

    writeln!(writer, "</g>")?;
    Ok(())
}

fn write_tree_node<W: Write>(writer: &mut W, node: &TreeNode, opacity: f64) -> Result<()> {
    let class = match node.kind {
        NodeKind::Root => "root-node",
        NodeKind::Genre => "genre-node",
        NodeKind::Leaf => "leaf-node",
    };
    let (dx, anchor) = if node.kind == NodeKind::Leaf { (8, "start") } else { (-8, "end") };
    let title = node
        .tooltip()
        .map(|t| format!("<title>{}</title>", xml_escape(&t)))
        .unwrap_or_default();

    writeln!(
        writer,
        r##"  <g class="{}" transform="translate({:.2},{:.2})" opacity="{}"><circle r="6" fill="{}" stroke="#000">{}</circle><text dy="3" x="{}" text-anchor="{}">{}</text></g>"##,
        class,
        node.y,
        node.x,
        opacity,
        node.fill,
        title,
        dx,
        anchor,
        xml_escape(&node.label)
    )?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::dashboard::Interaction;
    use crate::record::{tests::sample_store, Genre};

    fn render(dash: &Dashboard) -> String {
        let mut out = Vec::new();
        write(&mut out, dash).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_svg_has_every_shape() {
        let dash = Dashboard::new(sample_store(), ViewConfig::default());
        let svg = render(&dash);

        assert_eq!(svg.matches("<rect x=").count(), dash.histogram().bins().len() + 3);
        assert_eq!(svg.matches("<path d=\"M").count(), 3 + dash.dendrogram().links().len());
        assert_eq!(svg.matches("<circle").count(), dash.dendrogram().nodes().len());
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_fades_unpinned_genres() {
        let mut dash = Dashboard::new(sample_store(), ViewConfig::default());
        dash.dispatch(Interaction::SliceClicked(Genre::from("Jazz")));
        let svg = render(&dash);

        // Rock and Pop wedges, plus their genre nodes and six leaves
        assert_eq!(svg.matches(r#"opacity="0.2""#).count(), 2 + 2 + 6);
        assert!(svg.contains(r#"stroke="black" stroke-width="3""#));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("R&B <live>"), "R&amp;B &lt;live&gt;");
    }
}
