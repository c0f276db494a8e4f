//! Rendering backend that replays scripted input without opening a window.

use std::time::Duration;

use anyhow::{Context, Result};
use outpost_core::FrameInput;
use outpost_rendering::{
    EntityKey, FogShade, Presentation, RenderHandles, RenderingBackend, Scene,
};

/// Backend that steps the scene once per scripted frame.
///
/// Presentation handles are plain counters; every frame the backend resolves
/// one handle per drawn entity exactly as a windowed backend would.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    frames: Vec<FrameInput>,
    frame_duration: Duration,
}

impl HeadlessBackend {
    pub(crate) fn new(frames: Vec<FrameInput>, frame_duration: Duration) -> Self {
        Self {
            frames,
            frame_duration,
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        let mut handles = RenderHandles::new();
        let mut next_handle = 0_u32;
        let mut allocate = |_: EntityKey| {
            next_handle += 1;
            next_handle
        };

        let _ = handles.register_missing(scene.required_handles(), &mut allocate);
        handles
            .ensure_complete(scene.required_handles())
            .context("presentation handles incomplete at startup")?;
        tracing::info!(title = %window_title, handles = handles.len(), "headless backend ready");

        let mut frames = 0_u64;
        let mut peak_draw_calls = 0;
        for input in self.frames {
            update_scene(self.frame_duration, input, &mut scene);

            let created = handles.register_missing(scene.required_handles(), &mut allocate);
            if created > 0 {
                tracing::debug!(created, "registered presentation handles");
            }
            let draw_calls = draw(&scene, &handles)
                .with_context(|| format!("frame {frames} references unknown entities"))?;
            frames += 1;
            peak_draw_calls = peak_draw_calls.max(draw_calls);
        }

        let explored_chunks = scene
            .fog
            .shades
            .iter()
            .filter(|shade| **shade != FogShade::Unexplored)
            .count();
        tracing::info!(
            frames,
            handles = handles.len(),
            peak_draw_calls,
            explored_chunks,
            enemies = scene.enemies.len(),
            buildings = scene.buildings.len(),
            "headless run finished"
        );
        Ok(())
    }
}

fn draw(scene: &Scene, handles: &RenderHandles<u32>) -> Result<usize> {
    let keys = std::iter::once(EntityKey::Player)
        .chain(scene.drawable_enemies().map(|(id, _)| EntityKey::Enemy(id)))
        .chain(
            scene
                .spawners
                .iter()
                .map(|spawner| EntityKey::Spawner(spawner.id)),
        )
        .chain(
            scene
                .buildings
                .iter()
                .map(|building| EntityKey::Building(building.id)),
        );

    let mut draw_calls = 0;
    for key in keys {
        handles.ensure_complete([key])?;
        draw_calls += 1;
    }
    Ok(draw_calls)
}
