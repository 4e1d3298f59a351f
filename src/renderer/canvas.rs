//! `Reporter` backed by a `CanvasRenderingContext2d`

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::sim::{EntitySnapshot, GameEvent, Hud, Phase, Reporter};

const OUTLINE: &str = "#ffffff";
const LABEL_FONT: &str = "600 14px system-ui, Segoe UI, sans-serif";

pub struct CanvasReporter {
    ctx: CanvasRenderingContext2d,
    document: Option<Document>,
    width: f64,
    height: f64,
}

impl CanvasReporter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            document: web_sys::window().and_then(|w| w.document()),
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn draw_entity(&self, e: &EntitySnapshot) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_global_alpha(e.alpha.clamp(0.0, 1.0));

        ctx.begin_path();
        ctx.arc(e.x, e.y, e.radius, 0.0, std::f64::consts::TAU)?;
        ctx.set_fill_style_str(e.fill);
        ctx.fill();

        // White outline for contrast on the dark background
        ctx.set_line_width(2.5);
        ctx.set_stroke_style_str(OUTLINE);
        ctx.stroke();

        if let Some(label) = &e.label {
            ctx.set_fill_style_str(OUTLINE);
            ctx.set_font(LABEL_FONT);
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            ctx.fill_text(label, e.x, e.y)?;
        }

        ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.as_ref().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn show(&self, id: &str, visible: bool) {
        if let Some(el) = self.document.as_ref().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "modal" } else { "modal hidden" });
        }
    }
}

impl Reporter for CanvasReporter {
    fn frame(&mut self, _now_ms: f64, entities: &[EntitySnapshot]) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        for e in entities {
            if let Err(err) = self.draw_entity(e) {
                log::warn!("Draw error: {:?}", err);
            }
        }
    }

    fn event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::LevelStarted { level, .. } => {
                self.show("level-modal", false);
                self.show("summary-modal", false);
                self.set_text("level-title", &format!("Level {}", level));
            }
            GameEvent::LevelEnded(record) => {
                self.set_text(
                    "level-modal-body",
                    &format!(
                        "Level {}: {} popped, {} escaped, {}% in {:.1}s",
                        record.level,
                        record.killed,
                        record.escaped,
                        record.efficiency_pct,
                        record.elapsed_sec
                    ),
                );
                self.show("level-modal", true);
            }
            GameEvent::RunFinished(summary) => {
                self.set_text(
                    "summary-modal-body",
                    &format!(
                        "{} levels: {} popped, {} escaped, {}% in {:.1}s",
                        summary.levels.len(),
                        summary.total_killed,
                        summary.total_escaped,
                        summary.efficiency_pct,
                        summary.elapsed_sec
                    ),
                );
                self.show("level-modal", false);
                self.show("summary-modal", true);
            }
            GameEvent::Paused => self.show("pause-modal", true),
            GameEvent::Resumed => self.show("pause-modal", false),
            GameEvent::Reset => {
                self.show("pause-modal", false);
                self.show("level-modal", false);
                self.show("summary-modal", false);
            }
        }
    }

    fn hud(&mut self, hud: &Hud) {
        self.set_text("hud-level", &format!("{}/{}", hud.level, hud.levels));
        self.set_text("hud-killed", &format!("{}/{}", hud.killed, hud.target));
        self.set_text("hud-percent", &format!("{}%", hud.percent));
        let paused = if hud.phase == Phase::Paused { "Resume" } else { "Pause" };
        self.set_text("pause-btn", paused);
    }
}
