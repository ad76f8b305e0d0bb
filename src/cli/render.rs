// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::annotations::load_annotations;
use crate::canvas::{CanvasConfig, image_canvas};
use crate::cli::args::RenderArgs;
use crate::error::{Result, VizError};
use crate::io::load_image;
use crate::keypoints::KeypointPainter;
use crate::logging::set_verbose;
use crate::overlay::white_screen;
use crate::{VERSION, section, success, verbose, warn};

/// Draw the annotations of `args.annotations` over `args.image`, then save and/or show.
///
/// # Errors
///
/// Returns an error if an input cannot be read, an option is out of range, or the figure cannot
/// be saved.
pub fn run_render(args: &RenderArgs) -> Result<()> {
    set_verbose(args.verbose);
    check_show(args.show)?;
    if let Some(alpha) = args.white_screen {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(VizError::ConfigError(format!(
                "White screen opacity must be within [0, 1], got {alpha}"
            )));
        }
    }
    if args.output.is_none() && !args.show {
        warn!("Neither '--output' nor '--show' given, nothing will be produced.");
    }

    section!("poseviz {VERSION}");
    let image = load_image(&args.image, 1.0)?;
    let (height, width) = (image.shape()[0], image.shape()[1]);
    verbose!("image: {} ({width}x{height})", args.image.display());

    let sets = load_annotations(&args.annotations)?;
    verbose!(
        "annotations: {} ({} individuals{})",
        args.annotations.display(),
        sets.len(),
        if sets.scores.is_some() { ", scored" } else { "" }
    );

    let painter = KeypointPainter::new()
        .with_xy_scale(args.xy_scale)
        .with_show_box(!args.no_box)
        .with_color_connections(args.color_connections)
        .with_highlight_invisible(args.highlight_invisible);

    let mut config = CanvasConfig::new()
        .with_show(args.show)
        .with_dpi_factor(args.dpi_factor)
        .with_fig_width(args.fig_width);
    if let Some(output) = &args.output {
        config = config.with_fig_file(output);
    }

    image_canvas(&image, &config, |ax| {
        if let Some(alpha) = args.white_screen {
            white_screen(ax, alpha);
        }
        painter.draw(ax, Some(sets.keypoints.view()), sets.scores.as_deref())
    })?;

    if let Some(output) = &args.output {
        success!("Saved to {}", output.display());
    }
    Ok(())
}

#[cfg(feature = "visualize")]
#[allow(clippy::unnecessary_wraps)]
fn check_show(_show: bool) -> Result<()> {
    Ok(())
}

#[cfg(not(feature = "visualize"))]
fn check_show(show: bool) -> Result<()> {
    if show {
        return Err(VizError::FeatureNotEnabled(
            "'--show' requires the 'visualize' feature".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;
    use image::{Rgb, RgbImage};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("poseviz-cli-{}-{name}", std::process::id()))
    }

    fn render_args(extra: &[&str]) -> RenderArgs {
        let image = temp_path("in.png");
        let annotations = temp_path("in.json");
        let mut argv = vec![
            "app".to_string(),
            "render".to_string(),
            "--image".to_string(),
            image.display().to_string(),
            "--annotations".to_string(),
            annotations.display().to_string(),
            "--verbose".to_string(),
            "false".to_string(),
        ];
        argv.extend(extra.iter().map(|s| (*s).to_string()));
        let Commands::Render(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn test_render_writes_output() {
        RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]))
            .save(temp_path("in.png"))
            .unwrap();
        let keypoints: Vec<String> = (0..17)
            .map(|k| format!("{}, {}, 2", 5 + 3 * k, 4 + 2 * k))
            .collect();
        std::fs::write(
            temp_path("in.json"),
            format!(r#"[{{"keypoints": [{}], "score": 0.75}}]"#, keypoints.join(", ")),
        )
        .unwrap();
        let output = temp_path("out.png");
        let out_str = output.display().to_string();

        run_render(&render_args(&["--output", &out_str, "--white-screen", "0.5", "--no-box"])).unwrap();

        let saved = image::open(&output).unwrap();
        assert_eq!((saved.width(), saved.height()), (64, 48));
        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn test_render_rejects_bad_alpha() {
        let result = run_render(&render_args(&["--white-screen", "1.5"]));
        assert!(matches!(result, Err(VizError::ConfigError(_))));
    }
}
