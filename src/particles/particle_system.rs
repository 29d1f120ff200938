//! Fixed-pool particle system: simulation, depth sorting, GPU mirroring.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::Id;
use crate::math::{Matrix4, Vector3};

use super::emitter::{EmitterConfig, MAX_PARTICLES};
use super::gpu_resources::{ParticleGpuResources, SpriteParams};
use super::particle::Particle;
use super::pipeline::ParticlePipeline;
use super::sorter::DepthSorter;

/// Fixed simulation time step in seconds.
const STEP_SIZE: f32 = 0.01;

/// Gravity constant carried by every system. Declared for the integration
/// signature but not applied to trajectories; see `Particle::update`.
const GRAVITY: Vector3 = Vector3::new(0.0, -0.098, 0.0);

/// A fixed-capacity pool of particles advanced in lockstep with the render
/// loop and drawn with a single instanced call.
///
/// Per-frame contract: `set_camera`, then `update` at most once, then
/// `draw`. The pool size never changes after construction; expired
/// particles stay in the pool (invisible once faded) and are tallied so
/// the owner can drop the whole system when `is_done` reports true.
pub struct ParticleSystem {
    /// Unique identifier.
    id: Id,
    /// Construction-time sampling parameters.
    config: EmitterConfig,
    /// Current emission anchor; starts at `config.source`, moved by `lock`.
    source: Vector3,
    /// The particle pool. Length fixed at `min(config.count, MAX_PARTICLES)`;
    /// order is mutated only by the depth sort.
    particles: Vec<Particle>,
    /// Simulation time in seconds.
    sim_time: f32,
    /// Fixed step advanced per `update`.
    step_size: f32,
    /// Stored gravity vector, inert by design.
    gravity: Vector3,
    /// View matrix supplied by the caller each frame.
    camera: Matrix4,
    /// Whether `set_camera` has ever been called.
    camera_set: bool,
    /// Flat position mirror, 3 floats per particle, in current pool order.
    positions: Vec<f32>,
    /// Flat color mirror, 4 floats per particle, in current pool order.
    colors: Vec<f32>,
    /// Number of particles whose done flag has been observed set.
    done_count: usize,
    /// GPU mirror, created once by `init_gpu`.
    gpu: Option<ParticleGpuResources>,
    /// Per-system random source for birth sampling.
    rng: StdRng,
}

impl ParticleSystem {
    /// Create a system from an emitter configuration, birthing every
    /// particle immediately. Requested counts above [`MAX_PARTICLES`] are
    /// silently clamped. Does not touch the GPU.
    pub fn new(config: EmitterConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a system with a deterministic random seed.
    pub fn with_seed(config: EmitterConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EmitterConfig, mut rng: StdRng) -> Self {
        let count = config.count.min(MAX_PARTICLES);
        let source = config.source;

        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let mut particle = Particle::new(source);
            particle.rebirth(0.0, source, &config, &mut rng);
            particles.push(particle);
        }

        let mut system = Self {
            id: Id::new(),
            config,
            source,
            particles,
            sim_time: 0.0,
            step_size: STEP_SIZE,
            gravity: GRAVITY,
            camera: Matrix4::IDENTITY,
            camera_set: false,
            positions: vec![0.0; count * 3],
            colors: vec![0.0; count * 4],
            done_count: 0,
            gpu: None,
            rng,
        };
        system.pack_buffers();
        system
    }

    /// Allocate the GPU-resident buffers, seeded with the current CPU
    /// mirrors. Must be called exactly once before the first `draw`.
    /// Allocation failure is fatal: wgpu raises it through the device
    /// error machinery and nothing here can recover.
    pub fn init_gpu(&mut self, device: &wgpu::Device, pipeline: &ParticlePipeline) {
        debug_assert!(self.gpu.is_none(), "init_gpu called twice");
        self.gpu = Some(ParticleGpuResources::new(
            device,
            pipeline.params_layout(),
            &self.positions,
            &self.colors,
        ));
    }

    /// Store the view matrix used by the depth sort and the point-size
    /// contract. Call before `update` each frame.
    pub fn set_camera(&mut self, view: Matrix4) {
        self.camera = view;
        self.camera_set = true;
    }

    /// Advance the simulation one fixed step without touching the GPU:
    /// integrate every particle in pool order, tally newly expired ones,
    /// re-derive the depth sorter from the stored camera, sort the pool
    /// back-to-front, and repack the flat mirrors.
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            let was_done = particle.is_done();
            particle.update(self.sim_time, self.step_size, &self.gravity, &self.source);
            if particle.is_done() && !was_done {
                self.done_count += 1;
            }
        }
        self.sim_time += self.step_size;

        let sorter = DepthSorter::from_camera(&self.camera);
        self.particles.sort_unstable_by(|a, b| {
            sorter
                .depth_key(&a.position())
                .total_cmp(&sorter.depth_key(&b.position()))
        });

        self.pack_buffers();
    }

    /// Per-frame update: `step`, then rewrite both GPU vertex buffers in
    /// full and refresh the point-size params from the camera distance.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        debug_assert!(self.gpu.is_some(), "update called before init_gpu");
        debug_assert!(self.camera_set, "update called before set_camera");

        self.step();

        if let Some(gpu) = self.gpu.as_ref() {
            gpu.upload(queue, &self.positions, &self.colors);

            let eye = self.camera.inverse().get_position();
            let distance = eye.distance_to(&self.source).max(1e-6);
            gpu.write_params(
                queue,
                SpriteParams {
                    point_size: [self.config.point_scale * 1000.0 / distance, 0.0, 0.0, 0.0],
                },
            );
        }
    }

    /// Issue the instanced draw: one point sprite per particle, positions
    /// on vertex slot 0 and colors on slot 1, both stepped per instance.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a ParticlePipeline,
        sprite: &'a wgpu::BindGroup,
    ) {
        debug_assert!(self.gpu.is_some(), "draw called before init_gpu");
        debug_assert!(self.camera_set, "draw called before set_camera");
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        render_pass.set_pipeline(pipeline.wgpu_pipeline());
        render_pass.set_bind_group(0, pipeline.frame_bind_group(), &[]);
        render_pass.set_bind_group(1, &gpu.params_bind_group, &[]);
        render_pass.set_bind_group(2, sprite, &[]);
        render_pass.set_vertex_buffer(0, gpu.position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, gpu.color_buffer.slice(..));
        render_pass.draw(0..4, 0..self.particles.len() as u32);
    }

    /// True once every particle in the pool has expired.
    pub fn is_done(&self) -> bool {
        self.done_count == self.particles.len()
    }

    /// Pin every particle to the given position at full opacity and move
    /// the emission anchor there. Used to attach an effect to a moving
    /// object.
    pub fn lock(&mut self, position: Vector3) {
        for particle in self.particles.iter_mut() {
            particle.lock(self.sim_time, position);
        }
        self.source = position;
    }

    /// Rebirth every particle from the construction-time sampling
    /// parameters at the current anchor. Simulation time, the done tally,
    /// and the pool size are left untouched.
    pub fn reset(&mut self) {
        log::debug!("reset particle system {}", self.id);
        let source = self.source;
        for particle in self.particles.iter_mut() {
            particle.rebirth(0.0, source, &self.config, &mut self.rng);
        }
        self.pack_buffers();
    }

    /// Mirror the pool, in current order, into the flat arrays.
    fn pack_buffers(&mut self) {
        for (i, particle) in self.particles.iter().enumerate() {
            let position = particle.position();
            let color = particle.color();
            self.positions[i * 3..i * 3 + 3].copy_from_slice(&position.to_array());
            self.colors[i * 4..i * 4 + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Unique identifier.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The construction-time configuration.
    #[inline]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Number of particles in the pool (after clamping).
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current emission anchor.
    #[inline]
    pub fn source(&self) -> Vector3 {
        self.source
    }

    /// Sprite texture index into the caller-owned texture list.
    #[inline]
    pub fn texture_index(&self) -> usize {
        self.config.texture_index
    }

    /// Current simulation time.
    #[inline]
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Number of particles observed expired so far.
    #[inline]
    pub fn done_count(&self) -> usize {
        self.done_count
    }

    /// Flat position mirror, 3 floats per particle, in current pool order.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat color mirror, 4 floats per particle, in current pool order.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    fn still_config(count: usize, lifespan: f32) -> EmitterConfig {
        EmitterConfig {
            count,
            spawn_radius: 0.0,
            velocity_bias: Vector3::ZERO,
            velocity_spread: Vector3::ZERO,
            lifespan_min: lifespan,
            lifespan_spread: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_requested_count_is_clamped() {
        let config = EmitterConfig {
            count: 500,
            ..EmitterConfig::explosion(Vector3::ZERO, 1.0)
        };
        let mut system = ParticleSystem::with_seed(config, 1);
        assert_eq!(system.len(), MAX_PARTICLES);
        assert_eq!(system.positions().len(), MAX_PARTICLES * 3);
        assert_eq!(system.colors().len(), MAX_PARTICLES * 4);

        for _ in 0..10 {
            system.step();
        }
        assert_eq!(system.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_small_requests_are_not_clamped() {
        let system = ParticleSystem::with_seed(EmitterConfig::burst(Vector3::ZERO, 0.5), 1);
        assert_eq!(system.len(), 100);
    }

    #[test]
    fn test_zero_radius_spawns_at_source() {
        let config = EmitterConfig {
            source: Vector3::ZERO,
            ..still_config(40, 2.0)
        };
        let system = ParticleSystem::with_seed(config, 2);
        for particle in &system.particles {
            assert_eq!(particle.position(), Vector3::ZERO);
        }
        assert!(system.positions().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_spawn_radius_bounds_initial_positions() {
        let source = Vector3::new(10.0, 0.0, -3.0);
        let config = EmitterConfig {
            source,
            spawn_radius: 0.75,
            ..EmitterConfig::explosion(source, 0.75)
        };
        let system = ParticleSystem::with_seed(config, 3);
        for particle in &system.particles {
            assert!(particle.position().distance_to(&source) <= 0.75 + 1e-5);
        }
    }

    #[test]
    fn test_expiry_populates_done_tally() {
        let mut system = ParticleSystem::with_seed(still_config(5, 2.0), 4);
        system.set_camera(Matrix4::IDENTITY);

        // advance to sim_time 2.5, well past every death time
        for _ in 0..250 {
            system.step();
        }
        assert!((system.sim_time() - 2.5).abs() < 1e-3);
        assert!(system.particles.iter().all(|p| p.is_done()));
        assert_eq!(system.done_count(), 5);
        assert!(system.is_done());

        // the tally is a set: further steps never double-count
        for _ in 0..100 {
            system.step();
        }
        assert_eq!(system.done_count(), 5);
        assert!(system.is_done());
    }

    #[test]
    fn test_not_done_before_expiry() {
        let mut system = ParticleSystem::with_seed(still_config(5, 2.0), 5);
        for _ in 0..100 {
            system.step();
        }
        assert_eq!(system.done_count(), 0);
        assert!(!system.is_done());
    }

    #[test]
    fn test_step_sorts_back_to_front() {
        let config = EmitterConfig::explosion(Vector3::new(0.0, 0.0, -10.0), 3.0);
        let mut system = ParticleSystem::with_seed(config, 6);
        let camera = Matrix4::look_at(
            &Vector3::new(0.0, 2.0, 5.0),
            &Vector3::new(0.0, 0.0, -10.0),
            &Vector3::UP,
        );
        system.set_camera(camera);
        system.step();

        let sorter = DepthSorter::from_camera(&camera);
        let keys: Vec<f32> = system
            .particles
            .iter()
            .map(|p| sorter.depth_key(&p.position()))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_sort_is_pure_function_of_positions_and_camera() {
        // Static particles: repeating the sort under the same camera must
        // reproduce the same order.
        let config = EmitterConfig {
            spawn_radius: 2.0,
            ..still_config(30, 1000.0)
        };
        let mut system = ParticleSystem::with_seed(config, 7);
        let camera = Matrix4::from_axis_angle(&Vector3::UNIT_Y, 0.4);

        system.set_camera(camera);
        system.step();
        let first: Vec<f32> = system.positions().to_vec();

        system.set_camera(camera);
        system.step();
        assert_eq!(system.positions(), first.as_slice());
    }

    #[test]
    fn test_two_particle_depth_order() {
        // One particle at camera-space z=-5, one at z=-1: the farther one
        // must land first in pool order.
        let mut system = ParticleSystem::with_seed(still_config(2, 1000.0), 8);
        system.particles[0].lock(0.0, Vector3::new(0.0, 0.0, -1.0));
        system.particles[1].lock(0.0, Vector3::new(0.0, 0.0, -5.0));
        system.set_camera(Matrix4::IDENTITY);
        system.step();

        assert_eq!(system.positions()[2], -5.0);
        assert_eq!(system.positions()[5], -1.0);
    }

    #[test]
    fn test_buffers_mirror_pool_order() {
        let config = EmitterConfig::explosion(Vector3::new(1.0, 2.0, 3.0), 2.0);
        let mut system = ParticleSystem::with_seed(config, 9);
        system.set_camera(Matrix4::IDENTITY);
        system.step();

        for (i, particle) in system.particles.iter().enumerate() {
            let position = particle.position();
            let color = particle.color();
            assert_eq!(system.positions[i * 3], position.x);
            assert_eq!(system.positions[i * 3 + 1], position.y);
            assert_eq!(system.positions[i * 3 + 2], position.z);
            assert_eq!(system.colors[i * 4 + 3], color.a);
        }
    }

    #[test]
    fn test_lock_pins_pool_and_moves_anchor() {
        let mut system = ParticleSystem::with_seed(still_config(10, 1.0), 10);
        system.set_camera(Matrix4::IDENTITY);
        for _ in 0..150 {
            system.step();
        }
        assert!(system.is_done());

        let anchor = Vector3::new(3.0, 4.0, 5.0);
        system.lock(anchor);
        assert_eq!(system.source(), anchor);
        for particle in &system.particles {
            assert_eq!(particle.position(), anchor);
            assert_eq!(particle.color().a, 1.0);
        }
        // lock does not clear completion
        assert!(system.is_done());
    }

    #[test]
    fn test_reset_rebirths_at_current_anchor() {
        let mut system = ParticleSystem::with_seed(still_config(8, 1.0), 11);
        system.set_camera(Matrix4::IDENTITY);
        for _ in 0..200 {
            system.step();
        }
        let time_before = system.sim_time();
        let anchor = Vector3::new(-2.0, 6.0, 1.0);
        system.lock(anchor);

        system.reset();
        assert_eq!(system.sim_time(), time_before);
        assert_eq!(system.len(), 8);
        // done tally is deliberately not cleared by reset
        assert_eq!(system.done_count(), 8);
        for particle in &system.particles {
            assert_eq!(particle.position(), anchor);
            assert_eq!(particle.color().a, 1.0);
            // rebirth stamps death times from time zero, not sim_time
            assert_eq!(particle.death_time(), particle.lifespan());
        }
    }

    #[test]
    fn test_color_jitter_stays_near_base() {
        let config = EmitterConfig {
            base_color: Color::rgb(0.5, 0.2, 0.0),
            ..EmitterConfig::explosion(Vector3::ZERO, 1.0)
        };
        let system = ParticleSystem::with_seed(config, 12);
        for particle in &system.particles {
            let c = particle.color();
            assert!((c.r - 0.5).abs() <= 0.1 + 1e-6);
            assert!((c.g - 0.2).abs() <= 0.1 + 1e-6);
            assert!((c.b - 0.0).abs() <= 0.1 + 1e-6);
            assert_eq!(c.a, 1.0);
        }
    }
}
