//! Engagement analytics
//!
//! Turns a batch of fetched posts into a tabular engagement summary and
//! renders it as a grouped bar chart under the static directory. The
//! table is recomputed fresh on every request and the chart file is
//! overwritten each time.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::types::Post;

/// Filename of the rendered chart under the static directory.
pub const CHART_FILENAME: &str = "analytics.svg";

/// Chart dimensions in pixels.
const CHART_SIZE: (u32, u32) = (1000, 500);

/// One post's engagement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementRow {
    pub reshares: u32,
    pub likes: u32,
}

/// Ordered engagement counts, indexed by post position in the fetched
/// batch.
#[derive(Debug, Clone, Default)]
pub struct EngagementTable {
    pub rows: Vec<EngagementRow>,
}

impl EngagementTable {
    /// Extract reshare and like counts in fetch order.
    pub fn from_posts(posts: &[Post]) -> Self {
        Self {
            rows: posts
                .iter()
                .map(|post| EngagementRow {
                    reshares: post.reshares,
                    likes: post.likes,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render the engagement table as a grouped bar chart.
///
/// One reshare bar and one like bar per post index, fixed 1000x500
/// dimensions, overwriting any file already at `path`. An empty table
/// still produces a chart with empty axes.
pub fn render_chart(table: &EngagementTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(AnalyticsError::Io)?;
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| AnalyticsError::Render(e.to_string()))?;

    let x_max = table.len().max(1) as f64;
    let y_max = table
        .rows
        .iter()
        .map(|row| row.reshares.max(row.likes))
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Engagement Analytics", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(|e| AnalyticsError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Tweet Index")
        .y_desc("Engagement Count")
        .x_label_formatter(&|x| format!("{}", *x as usize))
        .draw()
        .map_err(|e| AnalyticsError::Render(e.to_string()))?;

    chart
        .draw_series(table.rows.iter().enumerate().map(|(i, row)| {
            let x = i as f64;
            Rectangle::new([(x + 0.08, 0.0), (x + 0.46, row.reshares as f64)], BLUE.filled())
        }))
        .map_err(|e| AnalyticsError::Render(e.to_string()))?
        .label("Reshares")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.filled()));

    chart
        .draw_series(table.rows.iter().enumerate().map(|(i, row)| {
            let x = i as f64;
            Rectangle::new([(x + 0.54, 0.0), (x + 0.92, row.likes as f64)], RED.filled())
        }))
        .map_err(|e| AnalyticsError::Render(e.to_string()))?
        .label("Likes")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.filled()));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| AnalyticsError::Render(e.to_string()))?;

    root.present()
        .map_err(|e| AnalyticsError::Render(e.to_string()))?;

    debug!(path = %path.display(), posts = table.len(), "Chart rendered");
    Ok(())
}
