extern crate surfacevis;

use surfacevis::host::{Host, HostConfig};
use surfacevis::platform::event::*;
use surfacevis::platform::GraphicsContext;
use surfacevis::plugin::{Registry, SURFACE_VIS};
use surfacevis::render::*;
use surfacevis::data::color::id_to_color;

/// Drives the surface editor with a scripted session and prints what would have been drawn.
fn main() {
    let _ctx = GraphicsContext::acquire("SurfaceVis Headless").expect("Graphics context in use");

    let config = HostConfig {
        resources_dir: std::env::temp_dir().join("surfacevis-demo"),
        ..HostConfig::default()
    };
    let mut host = Host::new(Recorder::new(), Registry::builtin(), config);
    host.select_plugin(SURFACE_VIS.idx).expect("No surface plugin");

    // pretend the pointer is over control point #6
    host.mouse_move(640., 360.);
    host.renderer_mut().pick_color = id_to_color(6);
    host.mouse_button(Button::Primary, ButtonAction::Press, Modifiers::SHIFT);
    host.mouse_button(Button::Primary, ButtonAction::Release, Modifiers::SHIFT);

    // lift it towards the viewer, then drag it across the screen
    host.mouse_button(Button::Secondary, ButtonAction::Press, Modifiers::SHIFT);
    host.mouse_move(640., 300.);
    host.mouse_button(Button::Secondary, ButtonAction::Release, Modifiers::SHIFT);
    host.mouse_button(Button::Middle, ButtonAction::Press, Modifiers::SHIFT);
    host.mouse_move(700., 280.);
    host.mouse_button(Button::Middle, ButtonAction::Release, Modifiers::SHIFT);

    // orbit a bit
    host.mouse_button(Button::Primary, ButtonAction::Press, Modifiers::default());
    host.mouse_move(760., 300.);
    host.mouse_button(Button::Primary, ButtonAction::Release, Modifiers::default());

    host.keyboard(KeyCode::S, KeyAction::Press, Modifiers::default());

    host.renderer_mut().clear();
    host.render();
    for command in host.renderer().commands() {
        match command {
            Command::Vertices { positions, .. } => {
                for p in positions.chunks(3) {
                    println!("point {:>8.4} {:>8.4} {:>8.4}", p[0], p[1], p[2]);
                }
            }
            Command::Draw(primitive) => println!("draw {:?}", primitive),
            _ => (),
        }
    }
}
