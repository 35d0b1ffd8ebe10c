use std::{path::PathBuf, process::ExitCode, sync::Arc};

use flipbook::{
    app::{AppConfig, AppError, AppHandler, AppRunner, FrameTimer, Window},
    input::Input,
    math::{Vec2, uvec2, vec2},
    render::{Renderer, WgpuBackend},
    sprite::{SheetLayout, Sprite, SpriteAssets},
};

const CLEAR_COLOR: [f64; 4] = [0.35, 0.53, 0.7, 1.0];

/// Half extents of the area the donut bounces around in
const BOUNDS: Vec2 = vec2(5.0, 3.0);
const MIN_SIZE: f32 = 1.0;
const MAX_SIZE: f32 = 5.0;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// Bouncing & pulsing path of the donut sprite
struct DonutMotion {
    position: Vec2,
    size: Vec2,
    velocity: Vec2,
    growth: Vec2,
}

impl Default for DonutMotion {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ONE,
            velocity: vec2(5.0, 5.0),
            growth: vec2(2.0, 2.0),
        }
    }
}

impl DonutMotion {
    fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.size += self.growth * dt;

        if self.position.x.abs() > BOUNDS.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y.abs() > BOUNDS.y {
            self.velocity.y = -self.velocity.y;
        }
        if self.size.x > MAX_SIZE || self.size.x < MIN_SIZE {
            self.growth.x = -self.growth.x;
        }
        if self.size.y > MAX_SIZE || self.size.y < MIN_SIZE {
            self.growth.y = -self.growth.y;
        }

        // overshooting a corner snaps back onto it; single edges only bounce
        if self.position.cmpgt(BOUNDS).all() {
            self.position = BOUNDS;
        }
        if self.position.cmplt(-BOUNDS).all() {
            self.position = -BOUNDS;
        }
    }
}

struct Overlays {
    renderer: Renderer,
    numbers: Sprite<WgpuBackend>,
    donut: Sprite<WgpuBackend>,
}

#[derive(Default)]
struct Demo {
    motion: DonutMotion,
}

impl AppHandler<Overlays> for Demo {
    async fn with_resource(&mut self, window: Arc<Window>) -> Result<Overlays, AppError> {
        let size = window.inner_size();
        let mut renderer = Renderer::new(size.width, size.height, window)
            .await
            .map_err(AppError::resource)?;
        renderer.set_clear_color(CLEAR_COLOR);

        let assets = SpriteAssets::in_dir(assets_dir());

        let mut numbers = Sprite::new(renderer.backend(), &assets).map_err(AppError::resource)?;
        numbers.configure(512, 512, 15, 20, 5, 2, 10, 328, 4);
        numbers.set_position(vec2(-5.0, -3.0));
        numbers.set_size(vec2(0.5, 0.5));
        numbers.set_frame_delay(1.0);

        let mut donut = Sprite::new(renderer.backend(), &assets).map_err(AppError::resource)?;
        donut.configure_layout(SheetLayout::new(
            uvec2(512, 512),
            uvec2(64, 64),
            5,
            6,
            30,
        ));
        donut.set_position(self.motion.position);
        donut.set_size(self.motion.size);
        donut.set_frame_delay(0.01);

        Ok(Overlays {
            renderer,
            numbers,
            donut,
        })
    }

    fn frame(
        &mut self,
        _window: &Window,
        overlays: &mut Overlays,
        _input: &Input,
        timer: &FrameTimer,
    ) -> Result<(), AppError> {
        self.motion.step(timer.delta);
        overlays.donut.set_position(self.motion.position);
        overlays.donut.set_size(self.motion.size);

        let Some(mut frame) = overlays
            .renderer
            .begin_frame()
            .map_err(AppError::resource)?
        else {
            return Ok(());
        };

        {
            let mut pass = overlays.renderer.begin_overlay_pass(&mut frame);
            overlays.numbers.render(&mut pass);
            overlays.donut.render(&mut pass);
        }

        overlays.renderer.end_frame(frame);
        Ok(())
    }

    fn resize(&mut self, w: u32, h: u32, overlays: &mut Overlays) {
        overlays.renderer.resize(w, h);
    }
}

fn main() -> ExitCode {
    let config = AppConfig {
        title: "Animated Sprite Overlays".to_string(),
        width: Some(1024),
        height: Some(768),
        resizable: false,
        ..Default::default()
    };

    match AppRunner::new(Demo::default(), config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donut_bounces_off_the_right_edge() {
        let mut motion = DonutMotion {
            position: vec2(4.9, 0.0),
            ..Default::default()
        };
        motion.step(0.1);

        // an edge overshoot is kept & the next step carries it back
        assert!((motion.position.x - 5.4).abs() < 1e-5);
        assert!(motion.velocity.x < 0.0);
        assert!(motion.velocity.y > 0.0);

        motion.step(0.1);
        assert!(motion.position.x < 5.4);
    }

    #[test]
    fn donut_snaps_back_onto_an_overshot_corner() {
        let mut motion = DonutMotion {
            position: vec2(4.9, 2.9),
            ..Default::default()
        };
        motion.step(0.1);
        assert_eq!(motion.position, BOUNDS);
        assert!(motion.velocity.x < 0.0 && motion.velocity.y < 0.0);

        let mut motion = DonutMotion {
            position: vec2(-4.9, -2.9),
            velocity: vec2(-5.0, -5.0),
            ..Default::default()
        };
        motion.step(0.1);
        assert_eq!(motion.position, -BOUNDS);
        assert!(motion.velocity.x > 0.0 && motion.velocity.y > 0.0);
    }

    #[test]
    fn opposite_corners_do_not_snap() {
        let mut motion = DonutMotion {
            position: vec2(4.9, -2.9),
            velocity: vec2(5.0, -5.0),
            ..Default::default()
        };
        motion.step(0.1);
        assert!(motion.position.x > BOUNDS.x && motion.position.y < -BOUNDS.y);
    }

    #[test]
    fn donut_size_pulses_between_limits() {
        let mut motion = DonutMotion::default();
        for _ in 0..1000 {
            motion.step(1.0 / 60.0);
            assert!(motion.size.x > MIN_SIZE - 0.1 && motion.size.x < MAX_SIZE + 0.1);
        }
    }

    #[test]
    fn zero_delta_keeps_the_donut_still() {
        let mut motion = DonutMotion::default();
        motion.step(0.0);
        assert_eq!(motion.position, Vec2::ZERO);
        assert_eq!(motion.size, Vec2::ONE);
    }

    #[test]
    fn bundled_assets_are_present() {
        let assets = SpriteAssets::in_dir(assets_dir());
        assert!(assets.atlas.is_file());
        assert!(assets.vertex_shader.is_file());
        assert!(assets.fragment_shader.is_file());
    }
}
