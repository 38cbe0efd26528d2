use cuboids::simulation::elite::FileStore;
use cuboids::simulation::params::Params;
use cuboids::simulation::population::PopulationManager;
use cuboids::simulation::simple_world::SimpleWorld;
use log::{error, info, warn};
use macroquad::prelude::*;

mod graphics;

use graphics::SceneVisuals;

const ELITE_DIR: &str = "elites";

fn load_params() -> Params {
    match std::env::args().nth(1) {
        Some(path) => match Params::from_file(&path) {
            Ok(params) => {
                info!("loaded params from {path}");
                params
            }
            Err(e) => {
                warn!("{e}; using default params");
                Params::default()
            }
        },
        None => Params::default(),
    }
}

struct Session {
    world: SimpleWorld,
    visuals: SceneVisuals,
    population: PopulationManager,
}

impl Session {
    fn start(params: &Params, store: &FileStore) -> Self {
        let mut world = SimpleWorld::new();
        let mut visuals = SceneVisuals::default();
        let mut population = PopulationManager::new(params.clone());
        let restored = population.load_elites(store, &mut world, &mut visuals);
        info!("starting with {} agents, {} restored", population.len(), restored);

        Self {
            world,
            visuals,
            population,
        }
    }
}

#[macroquad::main("Cuboids")]
async fn main() {
    env_logger::init();

    let params = load_params();
    let mut store = FileStore::new(ELITE_DIR);
    let mut session: Option<Session> = None;
    let mut halted = false;

    loop {
        if session.is_none() {
            clear_background(LIGHTGRAY);
            let text = "Start a new run by pressing Enter";
            let font_size = 30.0;

            let text_size = measure_text(text, None, font_size as _, 1.0);
            draw_text(
                text,
                screen_width() / 2. - text_size.width / 2.,
                screen_height() / 2. - text_size.height / 2.,
                font_size,
                DARKGRAY,
            );

            if is_key_down(KeyCode::Enter) {
                session = Some(Session::start(&params, &store));
            }
            next_frame().await;
            continue;
        }
        let Some(current) = session.as_mut() else {
            continue;
        };

        clear_background(WHITE);

        if !halted {
            current.world.step(get_frame_time().min(0.05));
            if let Err(e) = current.population.tick(&mut current.world, &mut current.visuals) {
                error!("simulation halted: {e}");
                halted = true;
            }
        }

        if is_key_pressed(KeyCode::S) {
            match current.population.save_elites(&mut store) {
                Ok(n) => info!("saved {n} elites to {ELITE_DIR}"),
                Err(e) => error!("failed to save elites: {e}"),
            }
        }

        graphics::draw_agents(&current.visuals, &current.population, &current.world);
        graphics::draw_overlay(
            &current.population.stats(),
            current.population.tick_count(),
            current.population.event_log(),
        );

        next_frame().await
    }
}
