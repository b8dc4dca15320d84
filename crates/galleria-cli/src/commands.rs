// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations. The CLI stands in for the gallery host: it reads
// the picked file, drives the correction core and writes or stages the result.

use std::path::Path;

use galleria_core::CorrectionConfig;
use galleria_core::error::{GalleriaError, Result};
use galleria_core::types::{EncodedImage, PreparedUpload, UploadMode};
use galleria_imaging::correct::editor::default_corners;
use galleria_imaging::correct::{DisplayScale, DragState, output_size};
use galleria_imaging::{CornerEditor, ImageProcessor, Point, reencode_to_jpeg};
use image::RgbaImage;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::services::config_store;
use crate::services::staging::UploadStaging;
use crate::{Cli, Commands, ConfigAction, CorrectArgs, PreviewArgs, ReencodeArgs};

/// A handle drag from one display point to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Drag {
    pub from: Point,
    pub to: Point,
}

/// Parse `x,y:x,y` into a [`Drag`].
pub(crate) fn parse_drag(s: &str) -> std::result::Result<Drag, String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("drag '{s}' is not of the form x,y:x,y"))?;
    Ok(Drag {
        from: parse_point(from)?,
        to: parse_point(to)?,
    })
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("point '{s}' is not of the form x,y"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid coordinate '{v}': {err}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}

/// Everything a command needs besides its own arguments.
pub(crate) struct Context {
    pub config: CorrectionConfig,
    pub staging: UploadStaging,
}

pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(config_store::default_config_path);
    if let Commands::Config { action } = &cli.command {
        return config_command(&config_path, action);
    }

    let ctx = Context {
        config: config_store::load_config(&config_path)?,
        staging: UploadStaging::in_data_dir(),
    };
    match cli.command {
        Commands::Inspect { image } => inspect(&image, &ctx),
        Commands::Correct(args) => correct(args, &ctx).await,
        Commands::Reencode(args) => reencode(args, &ctx).await,
        Commands::Preview(args) => preview(args, &ctx),
        Commands::Config { .. } => Ok(()),
    }
}

// -- Commands -----------------------------------------------------------------

fn inspect(image: &Path, ctx: &Context) -> Result<()> {
    let source = load_source(image, &ctx.config)?;
    let corners = default_corners(&source, ctx.config.inset_fraction);
    let (out_w, out_h) = output_size(&corners, ctx.config.min_output_dimension);
    let display = DisplayScale::fit(source.width(), source.height(), ctx.config.preview_max_width);

    let report = json!({
        "width": source.width(),
        "height": source.height(),
        "corners": corners,
        "output": { "width": out_w, "height": out_h },
        "display": { "width": display.width, "height": display.height, "scale": display.scale },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[instrument(skip(ctx), fields(image = %args.image.display()))]
async fn correct(args: CorrectArgs, ctx: &Context) -> Result<()> {
    let source = load_source(&args.image, &ctx.config)?;
    let quality = args.quality.unwrap_or(ctx.config.jpeg_quality);

    let mut editor = CornerEditor::new(source, ctx.config.clone())?;
    if let Some(corners) = args.corners {
        editor.set_corners(corners)?;
    }
    let encoded = editor.export_request(quality).run_in_background().await?;

    write_output(&args.out, &encoded)?;
    info!(out = %args.out.display(), width = encoded.width, height = encoded.height, "Corrected image written");
    stage_if_requested(ctx, args.work_id, UploadMode::Corrected, encoded)
}

#[instrument(skip(ctx), fields(image = %args.image.display()))]
async fn reencode(args: ReencodeArgs, ctx: &Context) -> Result<()> {
    let data = std::fs::read(&args.image)?;
    let quality = args.quality.unwrap_or(ctx.config.jpeg_quality);
    let max_bytes = ctx.config.max_upload_bytes;

    let encoded = tokio::task::spawn_blocking(move || reencode_to_jpeg(&data, quality, max_bytes))
        .await
        .map_err(|err| GalleriaError::Encode(format!("re-encode task failed: {err}")))??;

    write_output(&args.out, &encoded)?;
    info!(out = %args.out.display(), width = encoded.width, height = encoded.height, "Image written as-is");
    stage_if_requested(ctx, args.work_id, UploadMode::AsIs, encoded)
}

fn preview(args: PreviewArgs, ctx: &Context) -> Result<()> {
    let source = load_source(&args.image, &ctx.config)?;
    let mut editor = CornerEditor::new(source, ctx.config.clone())?;
    if let Some(corners) = args.corners {
        editor.set_corners(corners)?;
    }

    for drag in &args.drags {
        if editor.pointer_down(drag.from.x, drag.from.y) == DragState::Idle {
            warn!(x = drag.from.x, y = drag.from.y, "No handle under drag start");
            continue;
        }
        if let Err(err) = editor.pointer_move(drag.to.x, drag.to.y) {
            editor.pointer_cancel();
            return Err(err);
        }
        editor.pointer_up(drag.to.x, drag.to.y)?;
    }

    ImageProcessor::from_rgba(editor.render_overlay()).save(&args.overlay)?;
    let preview = editor
        .preview()
        .cloned()
        .ok_or_else(|| GalleriaError::DegenerateGeometry("no preview for these corners".into()))?;
    let (width, height) = preview.dimensions();
    ImageProcessor::from_rgba(preview).save(&args.preview)?;

    let report = json!({
        "corners": editor.corners(),
        "preview": { "width": width, "height": height },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn config_command(path: &Path, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = config_store::load_config(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(GalleriaError::Config(format!(
                    "{} already exists; pass --force to replace it",
                    path.display()
                )));
            }
            config_store::persist_config(path, &CorrectionConfig::default())?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

// -- Helpers ------------------------------------------------------------------

fn load_source(path: &Path, config: &CorrectionConfig) -> Result<RgbaImage> {
    let data = std::fs::read(path)?;
    let processor = ImageProcessor::from_upload(&data, config.max_upload_bytes)?;
    info!(
        path = %path.display(),
        width = processor.width(),
        height = processor.height(),
        "Image loaded"
    );
    Ok(processor.into_rgba8())
}

fn write_output(path: &Path, encoded: &EncodedImage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &encoded.bytes)?;
    Ok(())
}

fn stage_if_requested(
    ctx: &Context,
    work_id: Option<Uuid>,
    mode: UploadMode,
    encoded: EncodedImage,
) -> Result<()> {
    let Some(work_id) = work_id else {
        return Ok(());
    };
    let records = ctx
        .staging
        .stage(work_id, &[PreparedUpload::new(mode, encoded)])?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::path::PathBuf;

    fn context(dir: &Path) -> Context {
        Context {
            config: CorrectionConfig::default(),
            staging: UploadStaging::new(dir.join("artworks")),
        }
    }

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("photo.png");
        let raster = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        });
        ImageProcessor::from_rgba(raster).save(&path).expect("save png");
        path
    }

    #[test]
    fn drag_parses_two_points() {
        let drag = parse_drag("10,20: 30.5,40").expect("parse");
        assert_eq!(drag.from, Point::new(10.0, 20.0));
        assert_eq!(drag.to, Point::new(30.5, 40.0));
    }

    #[test]
    fn malformed_drag_is_rejected() {
        assert!(parse_drag("10,20").is_err());
        assert!(parse_drag("10;20:1,2").is_err());
        assert!(parse_drag("a,b:1,2").is_err());
    }

    #[tokio::test]
    async fn correct_writes_inset_sized_jpeg_and_stages_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let work_id = Uuid::new_v4();
        let args = CorrectArgs {
            image: write_png(dir.path(), 400, 300),
            out: dir.path().join("out").join("corrected.jpg"),
            corners: None,
            quality: None,
            work_id: Some(work_id),
        };

        correct(args.clone(), &ctx).await.expect("correct");

        let written = std::fs::read(&args.out).expect("read output");
        let decoded = ImageProcessor::from_bytes(&written).expect("decode output");
        assert_eq!((decoded.width(), decoded.height()), (336, 252));

        let staged = ctx.staging.existing_images(work_id).expect("manifest");
        assert_eq!(staged.len(), 1);
        assert_eq!((staged[0].width, staged[0].height), (336, 252));
    }

    #[tokio::test]
    async fn collinear_corners_fail_without_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let args = CorrectArgs {
            image: write_png(dir.path(), 200, 100),
            out: dir.path().join("corrected.jpg"),
            corners: Some("0,0;50,0;100,0;150,0".parse().expect("quad")),
            quality: None,
            work_id: None,
        };

        let err = correct(args.clone(), &ctx).await.expect_err("degenerate");
        assert!(matches!(err, GalleriaError::DegenerateGeometry(_)));
        assert!(!args.out.exists());
    }

    #[tokio::test]
    async fn reencode_keeps_natural_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let args = ReencodeArgs {
            image: write_png(dir.path(), 120, 80),
            out: dir.path().join("as-is.jpg"),
            quality: Some(0.5),
            work_id: None,
        };

        reencode(args.clone(), &ctx).await.expect("reencode");
        let decoded = ImageProcessor::from_bytes(&std::fs::read(&args.out).expect("read"))
            .expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
    }

    #[test]
    fn preview_writes_overlay_at_display_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let args = PreviewArgs {
            image: write_png(dir.path(), 1800, 600),
            overlay: dir.path().join("overlay.png"),
            preview: dir.path().join("preview.png"),
            corners: None,
            // Top-left handle sits at (72, 24) on the 900x300 canvas.
            drags: vec![parse_drag("72,24:0,0").expect("drag")],
        };

        preview(args.clone(), &ctx).expect("preview");

        let overlay = ImageProcessor::from_bytes(&std::fs::read(&args.overlay).expect("read"))
            .expect("decode overlay");
        assert_eq!((overlay.width(), overlay.height()), (900, 300));
        assert!(args.preview.exists());
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        config_command(&path, &ConfigAction::Init { force: false }).expect("init");
        assert!(config_command(&path, &ConfigAction::Init { force: false }).is_err());
        config_command(&path, &ConfigAction::Init { force: true }).expect("forced init");
    }
}
