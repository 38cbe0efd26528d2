use std::collections::HashMap;

use cuboids::simulation::agent::InteractionKind;
use cuboids::simulation::event_log::EventLog;
use cuboids::simulation::population::{PopulationManager, PopulationStats};
use cuboids::simulation::world::{BodyHandle, PhysicsWorld, Visuals};
use geo::Point;
use macroquad::prelude::*;

trait ToScreen {
    type Output;
    fn to_screen(&self, half_size: f32) -> Self::Output;
}

impl ToScreen for Point<f32> {
    type Output = Vec2;
    fn to_screen(&self, half_size: f32) -> Vec2 {
        let scale = (screen_width().min(screen_height()) / 2.0) / half_size;
        vec2(
            screen_width() / 2.0 + self.x() * scale,
            screen_height() / 2.0 - self.y() * scale,
        )
    }
}

impl ToScreen for f32 {
    type Output = f32;
    fn to_screen(&self, half_size: f32) -> f32 {
        self * (screen_width().min(screen_height()) / 2.0) / half_size
    }
}

fn kind_color(kind: InteractionKind) -> Color {
    match kind {
        InteractionKind::Plant => Color::from_rgba(60, 170, 60, 255),
        InteractionKind::Predator => Color::from_rgba(210, 50, 50, 255),
        InteractionKind::Healer => Color::from_rgba(60, 110, 230, 255),
    }
}

/// One coloured box per live agent body.
#[derive(Default)]
pub struct SceneVisuals {
    shapes: HashMap<BodyHandle, Color>,
}

impl Visuals for SceneVisuals {
    fn add_visual(&mut self, body: BodyHandle, kind: InteractionKind) {
        self.shapes.insert(body, kind_color(kind));
    }

    fn remove_visual(&mut self, body: BodyHandle) {
        self.shapes.remove(&body);
    }
}

pub fn draw_agents<W: PhysicsWorld>(
    visuals: &SceneVisuals,
    population: &PopulationManager,
    world: &W,
) {
    let params = population.params();
    let half_size = params.world_half_size;
    let (w, h) = params.body_size();
    let (w, h) = (w.to_screen(half_size).max(2.0), h.to_screen(half_size).max(2.0));

    for (&body, &color) in &visuals.shapes {
        let pos = world.position(body).to_screen(half_size);
        draw_rectangle(pos.x - w / 2.0, pos.y - h / 2.0, w, h, color);

        // health bar, full at the reproduce threshold
        if let Some(agent) = population.agent_by_body(body) {
            let fill = (agent.health / params.reproduce_threshold).clamp(0.0, 1.0);
            let bar_width = w.max(6.0);
            draw_rectangle(
                pos.x - bar_width / 2.0,
                pos.y - h / 2.0 - 3.0,
                bar_width * fill,
                1.5,
                BLACK,
            );
        }
    }
}

pub fn draw_overlay(stats: &PopulationStats, tick: u64, log: &EventLog) {
    let font_size = 18.0;
    let lines = [
        format!("Tick: {tick}"),
        format!(
            "Agents: {} (plants {}, predators {}, healers {})",
            stats.count, stats.plants, stats.predators, stats.healers
        ),
        format!("Health: mean {:.1}, max {:.1}", stats.mean_health, stats.max_health),
        format!("Oldest: {}  Children: {}", stats.max_age, stats.total_children),
        "S: save elites".to_string(),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 10.0, 20.0 + i as f32 * font_size, font_size, DARKGRAY);
    }

    let top = screen_height() - 10.0;
    for (i, event) in log.latest(8).enumerate() {
        draw_text(&event.to_string(), 10.0, top - i as f32 * 14.0, 14.0, GRAY);
    }
}
