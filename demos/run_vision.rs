use cartpole_vision_gym::{CartPoleConfig, DepthPoleRenderer, Env, Renderer, VisionCartPoleEnv};
use minifb::{Key, Scale, Window, WindowOptions};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const WIDTH: usize = 128;
const HEIGHT: usize = 128;

/// Shade the pole by depth: brighter is closer to the camera.
fn depth_to_argb(pixel: u32) -> u32 {
    let [_, _, b, a] = pixel.to_le_bytes();
    let shade = ((b as u32) * (a as u32) / 255) & 0xff;
    0xff00_0000 | (shade << 16) | (shade << 8) | shade
}

fn main() {
    env_logger::init();

    // The environment owns the renderer; the window reads the last frame through a shared buffer.
    let last_frame = Rc::new(RefCell::new(vec![0u32; WIDTH * HEIGHT]));
    let mut renderer = DepthPoleRenderer::new(WIDTH as u32, HEIGHT as u32);
    let shared = Rc::clone(&last_frame);
    let recording_renderer = move |positions: &[f64], angles: &[f64], pixels: &mut Vec<u32>| {
        let size = renderer.render(positions, angles, pixels);
        shared.borrow_mut().clone_from(pixels);
        size
    };

    let cfg = CartPoleConfig::default().resolution(WIDTH, HEIGHT);
    let mut env = VisionCartPoleEnv::new(&cfg, recording_renderer);

    let mut window = Window::new(
        "cartpole-vision-gym: run_vision",
        WIDTH,
        HEIGHT,
        WindowOptions { scale: Scale::X4, ..WindowOptions::default() },
    ).expect("Unable to open window");
    let mut buffer = vec![0u32; WIDTH * HEIGHT];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        env.reset(None).expect("reset failed");
        let mut frame = 0;
        while window.is_open() && !window.is_key_down(Key::Escape) {
            frame += 1;
            let action = env.sample_action();
            let step = env.step(action).expect("step failed");

            for (dst, src) in buffer.iter_mut().zip(last_frame.borrow().iter()) {
                *dst = depth_to_argb(*src);
            }
            window.update_with_buffer(&buffer, WIDTH, HEIGHT).expect("Failed to update window buffer");

            if step.done {
                println!("Done in : {frame}");
                break;
            }
            std::thread::sleep(Duration::from_millis(32));
        }
    }
}
