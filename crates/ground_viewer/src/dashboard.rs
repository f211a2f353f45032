//! Dashboard do Ground Viewer – strip chart ao vivo via eframe/egui.
//!
//! O tick de render (200 ms) é quem puxa o pipeline: drena a porta serial
//! sem bloquear, apara a janela e redesenha. Porta e espelho pertencem ao
//! app e são liberados pelo `Drop` quando a janela fecha – seja pelo [X],
//! por `Q`/`Esc` ou por um Ctrl-C no terminal (flag armado pelo handler de
//! sinal, consultado a cada tick).

use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotBounds, PlotPoints};
use serialport::SerialPort;
use std::fs::File;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::ingest::Ingestor;

/// Intervalo do tick de render.
const RENDER_TICK: Duration = Duration::from_millis(200);

/// O tick de render responde ao flag fechando a janela pelo caminho normal.
fn shutdown_requested(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}

pub struct GroundDashboard {
    port: Box<dyn SerialPort>,
    port_name: String,
    ingestor: Ingestor<File>,
    shutdown: Arc<AtomicBool>,
}

impl GroundDashboard {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        port: Box<dyn SerialPort>,
        port_name: String,
        ingestor: Ingestor<File>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            port,
            port_name,
            ingestor,
            shutdown,
        }
    }

    fn render_chart(&self, ui: &mut egui::Ui) {
        let window = self.ingestor.window();

        // Limites dos eixos calculados sobre a sequência visível
        let Some(bounds) = window.chart_bounds() else {
            return;
        };

        let points: PlotPoints = window.points().collect();
        let line = Line::new(points)
            .color(Color32::from_rgb(0, 255, 136))
            .width(2.0);

        Plot::new("methane_strip")
            .x_axis_label("Tempo (s, relativo)")
            .y_axis_label("Metano (unidades)")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [bounds.x_min, bounds.y_min],
                    [bounds.x_max, bounds.y_max],
                ));
                plot_ui.line(line);
            });
    }
}

impl eframe::App for GroundDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Ctrl-C no terminal fecha como o [X] da janela ──
        if shutdown_requested(&self.shutdown) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // ── Drenar o serial neste tick ──
        self.ingestor.drain_port(self.port.as_mut());

        // ── Próximo tick de render ──
        ctx.request_repaint_after(RENDER_TICK);

        // ── Atalhos de teclado ──
        ctx.input(|i: &egui::InputState| {
            if i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("LIVE METHANE (strip chart)")
                        .size(18.0)
                        .strong()
                        .monospace(),
                );
            });

            let window = self.ingestor.window();
            if window.is_empty() {
                // Estado idle: nada aceito ainda nesta sessão
                ui.vertical_centered(|ui: &mut egui::Ui| {
                    ui.add_space(24.0);
                    ui.label(
                        RichText::new(format!("○ Aguardando dados em {}...", self.port_name))
                            .color(Color32::LIGHT_RED)
                            .monospace(),
                    );
                });
                return;
            }

            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(
                    RichText::new(format!(
                        "● {} | {} amostras na janela | t+{:.1}s",
                        self.port_name,
                        window.len(),
                        window.newest_rel().unwrap_or(0.0)
                    ))
                    .color(Color32::from_rgb(0, 255, 136))
                    .monospace(),
                );
            });

            ui.add_space(8.0);
            self.render_chart(ui);

            ui.with_layout(
                egui::Layout::bottom_up(egui::Align::Center),
                |ui: &mut egui::Ui| {
                    ui.label(
                        RichText::new("[Q/Esc] Quit")
                            .color(Color32::GRAY)
                            .monospace()
                            .size(10.0),
                    );
                },
            );
        });
    }
}
