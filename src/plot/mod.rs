//! Diagnostic figures: description, terminal preview, SVG output.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub mod ascii;
pub mod figure;
pub mod svg;

pub use ascii::render_ascii;
pub use figure::{Figure, Layer, LayerKind, TimeAxis, in_window};
pub use svg::render_svg;

/// `<dir>/<parts joined by _>_<start>_<end>.svg`
pub fn plot_path(dir: &Path, parts: &[&str], range: Option<(NaiveDate, NaiveDate)>) -> PathBuf {
    let mut name = parts.join("_");
    if let Some((start, end)) = range {
        name.push_str(&format!("_{}_{}", start.format("%Y%m%d"), end.format("%Y%m%d")));
    }
    name.push_str(".svg");
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_path_includes_range() {
        let d0 = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2021, 8, 31).unwrap();
        let p = plot_path(Path::new("plots"), &["hs", "radex"], Some((d0, d1)));
        assert_eq!(p, Path::new("plots/hs_radex_20210601_20210831.svg"));
        let p = plot_path(Path::new("plots"), &["hs", "alb"], None);
        assert_eq!(p, Path::new("plots/hs_alb.svg"));
    }
}
