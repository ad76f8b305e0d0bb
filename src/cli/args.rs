// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Render Options:
    --image, -i <IMAGE>              Image to draw on
    --annotations, -a <FILE>         JSON file with keypoints per individual
    --output, -o <OUTPUT>            Save the annotated figure here
    --show                           Display the figure in a window
    --xy-scale <F>                   Multiplier on keypoint coordinates [default: 1.0]
    --dpi-factor <F>                 Output resolution relative to the image [default: 1.0]
    --fig-width <F>                  Figure width in inches [default: 10.0]
    --no-box                         Do not draw bounding boxes and scores
    --color-connections              Color each connection from a palette
    --highlight-invisible            Outline predicted-only keypoints in black
    --white-screen [ALPHA]           Fade the image behind a white layer [default: 0.9]
    --verbose <BOOL>                 Show verbose output [default: true]

Examples:
    poseviz render --image person.jpg --annotations person.json --output person.png
    poseviz render -i person.jpg -a person.json --show --white-screen
    poseviz render -i person.jpg -a person.json -o out.jpg --dpi-factor 2 --no-box"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw keypoint annotations over an image
    Render(RenderArgs),
}

/// Arguments for the render command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderArgs {
    /// Image to draw on
    #[arg(short, long)]
    pub image: PathBuf,

    /// JSON file with keypoints per individual
    #[arg(short, long)]
    pub annotations: PathBuf,

    /// Save the annotated figure here; the format follows the extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Display the figure in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Multiplier on keypoint coordinates
    #[arg(long, default_value_t = 1.0)]
    pub xy_scale: f32,

    /// Output resolution relative to the image
    #[arg(long, default_value_t = 1.0)]
    pub dpi_factor: f32,

    /// Figure width in inches
    #[arg(long, default_value_t = 10.0)]
    pub fig_width: f32,

    /// Do not draw bounding boxes and scores
    #[arg(long, default_value_t = false)]
    pub no_box: bool,

    /// Color each connection from a palette
    #[arg(long, default_value_t = false)]
    pub color_connections: bool,

    /// Outline predicted-only keypoints in black
    #[arg(long, default_value_t = false)]
    pub highlight_invisible: bool,

    /// Fade the image behind a white layer of this opacity
    #[arg(long, num_args = 0..=1, default_missing_value = "0.9")]
    pub white_screen: Option<f32>,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_args_defaults() {
        let args = Cli::parse_from(["app", "render", "--image", "a.jpg", "--annotations", "a.json"]);
        match args.command {
            Commands::Render(render_args) => {
                assert_eq!(render_args.image, PathBuf::from("a.jpg"));
                assert_eq!(render_args.annotations, PathBuf::from("a.json"));
                assert!(render_args.output.is_none());
                assert!(!render_args.show);
                assert!((render_args.xy_scale - 1.0).abs() < f32::EPSILON);
                assert!((render_args.dpi_factor - 1.0).abs() < f32::EPSILON);
                assert!((render_args.fig_width - 10.0).abs() < f32::EPSILON);
                assert!(!render_args.no_box);
                assert!(render_args.white_screen.is_none());
                assert!(render_args.verbose);
            }
        }
    }

    #[test]
    fn test_render_args_custom() {
        let args = Cli::parse_from([
            "app",
            "render",
            "-i",
            "a.jpg",
            "-a",
            "a.json",
            "-o",
            "out.png",
            "--xy-scale",
            "8",
            "--no-box",
            "--color-connections",
            "--white-screen",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Render(render_args) => {
                assert_eq!(render_args.output, Some(PathBuf::from("out.png")));
                assert!((render_args.xy_scale - 8.0).abs() < f32::EPSILON);
                assert!(render_args.no_box);
                assert!(render_args.color_connections);
                assert_eq!(render_args.white_screen, Some(0.9));
                assert!(!render_args.verbose);
            }
        }
    }

    #[test]
    fn test_white_screen_alpha_value() {
        let args = Cli::parse_from([
            "app",
            "render",
            "-i",
            "a.jpg",
            "-a",
            "a.json",
            "--white-screen",
            "0.5",
        ]);
        let Commands::Render(render_args) = args.command;
        assert_eq!(render_args.white_screen, Some(0.5));
    }

    #[test]
    fn test_missing_image_rejected() {
        assert!(Cli::try_parse_from(["app", "render", "--annotations", "a.json"]).is_err());
    }
}
