//! Visualization utilities for TSP solutions.
//!
//! Generates SVG drawings of tours and plain-text exports for plotting.

use crate::error::{Result, SolverError};
use crate::instance::TspInstance;
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// City marker radius
    pub node_radius: f64,
    /// Draw city identifiers next to markers
    pub show_labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
            show_labels: true,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &TspInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);
        let scale_x = (self.width - 2.0 * self.margin) / span_x;
        let scale_y = (self.height - 2.0 * self.margin) / span_y;
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Cities: {} | Cost: {:.2}</text>
"##,
            self.margin, escape_xml(&instance.name), instance.dimension(), solution.cost
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        if solution.tour.len() > 1 {
            let points: Vec<String> = solution.tour.iter()
                .map(|&i| {
                    let city = instance.city(i);
                    let (x, y) = transform(city.x, city.y);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect();

            svg.push_str(&format!(
                r#"<polygon points="{}" class="edge"/>
"#,
                points.join(" ")
            ));
        }

        let start = solution.tour.first().copied();
        for (index, city) in instance.cities().iter().enumerate() {
            let (x, y) = transform(city.x, city.y);
            let class = if Some(index) == start { "start" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.show_labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x, y - self.node_radius - 3.0, city.id
                ));
            }
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)
            .map_err(|e| SolverError::export(format!("{}: {}", path.display(), e)))?;
        file.write_all(svg.as_bytes())
            .map_err(|e| SolverError::export(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Get coordinate bounds
    fn get_bounds(&self, instance: &TspInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for city in instance.cities() {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        (min_x, max_x, min_y, max_y)
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &TspInstance, solution: &Solution) -> String {
        let mut data = String::new();

        data.push_str("# TSP Solution Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Cost: {:.4}\n\n", solution.cost));

        data.push_str("# Cities: index, id, x, y\n");
        for (index, city) in instance.cities().iter().enumerate() {
            data.push_str(&format!("{},{},{},{}\n", index, city.id, city.x, city.y));
        }

        data.push_str("\n# Tour: sequence of city indices\n");
        let tour_str: Vec<String> = solution.tour.iter().map(|n| n.to_string()).collect();
        data.push_str(&tour_str.join(","));
        data.push('\n');

        data
    }
}

/// Escape the characters that would break SVG text content or attributes
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::City;

    fn create_test_instance() -> TspInstance {
        let cities = vec![
            City::new(10, 0.0, 0.0),
            City::new(20, 1.0, 0.0),
            City::new(30, 0.0, 1.0),
        ];
        TspInstance::new("test", cities).unwrap()
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2], "test");

        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);

        assert!(svg.contains("svg"));
        assert!(svg.contains("test"));
        assert!(svg.contains("<polygon"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains(">20</text>"));
    }

    #[test]
    fn test_single_city_has_no_edges() {
        let instance = TspInstance::new("solo", vec![City::new(1, 2.0, 2.0)]).unwrap();
        let solution = Solution::from_tour(&instance, vec![0], "test");
        let svg = Visualizer::new().generate_svg(&instance, &solution);

        assert!(!svg.contains("<polygon"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_save_svg_and_plot_data() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![2, 0, 1], "test");
        let viz = Visualizer::new();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tour.svg");
        viz.save_svg(&viz.generate_svg(&instance, &solution), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("</svg>"));

        let data = viz.export_plot_data(&instance, &solution);
        assert!(data.contains("1,20,1,0"));
        assert!(data.trim_end().ends_with("2,0,1"));
    }

    #[test]
    fn test_instance_name_is_escaped() {
        let cities = vec![City::new(1, 0.0, 0.0), City::new(2, 1.0, 1.0)];
        let instance = TspInstance::new("a&b<c>", cities).unwrap();
        let solution = Solution::from_tour(&instance, vec![0, 1], "test");
        let svg = Visualizer::new().generate_svg(&instance, &solution);

        assert!(svg.contains("Instance: a&amp;b&lt;c&gt; |"));
        assert!(!svg.contains("a&b"));
        assert!(!svg.contains("<c>"));
    }
}
