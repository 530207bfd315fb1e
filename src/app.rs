// ============================================================================
// MicroAlign application — one window: preview, load/save actions, sliders
// ============================================================================

use std::path::Path;

use eframe::egui;

use crate::io;
use crate::session::{DEFAULT_SCALE, Session};
use crate::stack::TiffStackDecoder;

pub struct MicroAlignApp {
    session: Session,

    /// GPU copy of the current composite preview.
    preview_texture: Option<egui::TextureHandle>,
    /// Set when the composite changed and the texture needs a re-upload.
    preview_dirty: bool,

    /// Last action outcome, shown in the status line.
    status: String,
}

impl MicroAlignApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: Session::new(DEFAULT_SCALE),
            preview_texture: None,
            preview_dirty: false,
            status: "Load two images to begin.".to_string(),
        }
    }

    // -- Actions ------------------------------------------------------------

    /// "Load Images": pick the moving image, then the reference image.
    /// Cancelling either dialog aborts the load; a decode failure leaves the
    /// previous session state intact.
    fn load_images(&mut self) {
        let Some(moving_path) = io::pick_source_image("Select the moving image") else {
            return;
        };
        let Some(reference_path) = io::pick_source_image("Select the reference image") else {
            return;
        };

        match io::load_pair(&moving_path, &reference_path, &TiffStackDecoder) {
            Ok((moving, reference)) => {
                if let Err(e) = self.session.install_pair(moving, reference) {
                    self.status = format!("Preview failed: {}", e);
                    log_err!("preview recompute after load failed: {}", e);
                    return;
                }
                self.preview_dirty = true;
                self.status = format!(
                    "Loaded {} over {}",
                    file_label(&moving_path),
                    file_label(&reference_path)
                );
                log_info!(
                    "loaded pair: {} / {}",
                    moving_path.display(),
                    reference_path.display()
                );
            }
            Err(e) => {
                log_err!("load failed: {}", e);
                self.error_dialog("Load", &format!("{}", e));
            }
        }
    }

    /// "Save Mask": the transformed moving image alone, at full resolution.
    fn save_mask(&mut self) {
        if !self.session.has_images() {
            self.info_dialog("Save", "No image to save.");
            return;
        }
        let Some(path) = io::pick_save_path("mask.png") else {
            return; // dialog cancelled — no-op
        };
        let Some(mask) = self.session.render_full_mask() else {
            return;
        };
        match io::write_image(&mask, &path) {
            Ok(()) => {
                log_info!("mask exported to {}", path.display());
                self.info_dialog("Save", "Image saved successfully.");
            }
            Err(e) => {
                log_err!("mask export failed: {}", e);
                self.error_dialog("Save", &format!("{}", e));
            }
        }
    }

    /// "Save Composite": transformed moving image plus the centered, ghosted
    /// reference, at full resolution.
    fn save_composite(&mut self) {
        if !self.session.has_images() {
            self.info_dialog("Save", "No overlayed image to save.");
            return;
        }
        let Some(path) = io::pick_save_path("overlay.png") else {
            return;
        };
        let Some(result) = self.session.render_full_composite() else {
            return;
        };
        match result {
            Ok(composite) => match io::write_image(&composite, &path) {
                Ok(()) => {
                    log_info!("composite exported to {}", path.display());
                    self.info_dialog("Save", "Images saved successfully.");
                }
                Err(e) => {
                    log_err!("composite export failed: {}", e);
                    self.error_dialog("Save", &format!("{}", e));
                }
            },
            Err(e) => {
                log_err!("composite render failed: {}", e);
                self.error_dialog("Save", &format!("{}", e));
            }
        }
    }

    // -- Helpers ------------------------------------------------------------

    fn info_dialog(&mut self, title: &str, message: &str) {
        self.status = message.to_string();
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .show();
    }

    fn error_dialog(&mut self, title: &str, message: &str) {
        self.status = message.to_string();
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .show();
    }

    /// Re-upload the composite preview to the GPU when it changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.preview_dirty {
            return;
        }
        self.preview_dirty = false;

        let Some(composite) = &self.session.composite else {
            self.preview_texture = None;
            return;
        };
        let size = [composite.width() as usize, composite.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, composite.as_raw());
        match &mut self.preview_texture {
            Some(tex) => tex.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.preview_texture = Some(ctx.load_texture(
                    "composite_preview",
                    color_image,
                    egui::TextureOptions::NEAREST,
                ));
            }
        }
    }
}

impl eframe::App for MicroAlignApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("actions").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Load Images").clicked() {
                    self.load_images();
                }
                if ui.button("Save Mask").clicked() {
                    self.save_mask();
                }
                if ui.button("Save Composite").clicked() {
                    self.save_composite();
                }
            });
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            // Ranges rebind to the preview dimensions after each load.
            let (bound_x, bound_y) = self.session.translation_bounds().unwrap_or((100, 100));

            let mut changed = false;
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.session.angle, -180.0..=180.0)
                        .text("Rotation Angle"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.session.tx, -bound_x..=bound_x)
                        .text("Translation X"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.session.ty, -bound_y..=bound_y)
                        .text("Translation Y"),
                )
                .changed();

            if changed && self.session.has_images() {
                match self.session.recompute_preview() {
                    Ok(()) => self.preview_dirty = true,
                    Err(e) => {
                        self.status = format!("Preview failed: {}", e);
                        log_warn!("preview recompute failed: {}", e);
                    }
                }
            }

            ui.separator();
            ui.label(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.refresh_texture(ctx);
            match &self.preview_texture {
                Some(tex) => {
                    // Fit to the panel without resampling the composite
                    let avail = ui.available_size();
                    let size = tex.size_vec2();
                    let fit = (avail.x / size.x).min(avail.y / size.y).min(1.0);
                    ui.centered_and_justified(|ui| {
                        ui.image((tex.id(), size * fit));
                    });
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label("No images loaded");
                    });
                }
            }
        });
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
